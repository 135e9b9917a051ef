//! Request and response bodies exchanged over the APIs.
//!
//! These are plain wire types with OpenAPI schemas. Conversions from the core domain types live
//! next to them so every API surface renders records the same way.

use mw_core::{LoginOutcome, NewStaffInput, PatientRecord, SearchCriteria, StaffAccount};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of every non-2xx response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    #[schema(example = "patient not found")]
    pub error: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateStaffReq {
    #[schema(example = "EMP001")]
    pub employee_id: String,
    #[schema(example = "doctor1")]
    pub username: String,
    #[schema(example = "password123", min_length = 6)]
    pub password: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john.doe@hospital.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "0891234567")]
    pub phone_number: Option<String>,
    #[schema(example = "Doctor")]
    pub role: String,
    #[serde(default)]
    #[schema(example = "Cardiology")]
    pub department: Option<String>,
    #[schema(example = "Hospital A")]
    pub hospital: String,
}

impl From<CreateStaffReq> for NewStaffInput {
    fn from(req: CreateStaffReq) -> Self {
        NewStaffInput {
            employee_id: req.employee_id,
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone_number: req.phone_number,
            role: req.role,
            department: req.department,
            hospital: req.hospital,
        }
    }
}

/// A staff account as shown to API clients. Never carries the password hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StaffRes {
    pub id: i64,
    pub employee_id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub hospital: String,
}

impl From<StaffAccount> for StaffRes {
    fn from(staff: StaffAccount) -> Self {
        Self {
            id: staff.id,
            employee_id: staff.employee_id,
            username: staff.username,
            first_name: staff.first_name,
            last_name: staff.last_name,
            email: staff.email,
            phone_number: staff.phone_number,
            role: staff.role,
            department: staff.department,
            hospital: staff.hospital,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "doctor1")]
    pub username: String,
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoginRes {
    pub token: String,
    pub employee_id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    /// Empty when the account has no department.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub department: String,
    pub hospital: String,
}

impl From<LoginOutcome> for LoginRes {
    fn from(outcome: LoginOutcome) -> Self {
        let staff = outcome.staff;
        Self {
            token: outcome.token,
            employee_id: staff.employee_id,
            username: staff.username,
            first_name: staff.first_name,
            last_name: staff.last_name,
            email: staff.email,
            role: staff.role,
            department: staff.department.unwrap_or_default(),
            hospital: staff.hospital,
        }
    }
}

/// Query string of `GET /patient/search`. Every parameter is optional, but at least one must
/// be non-blank.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientSearchQuery {
    /// National ID or passport ID.
    pub id: Option<String>,
    pub patient_hn: Option<String>,
    pub national_id: Option<String>,
    pub passport_id: Option<String>,
    /// Partial, case-insensitive; English or Thai.
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    /// `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
}

impl TryFrom<PatientSearchQuery> for SearchCriteria {
    type Error = mw_core::MiddlewareError;

    /// Blank parameters are dropped. A non-blank `date_of_birth` must be `YYYY-MM-DD`.
    fn try_from(q: PatientSearchQuery) -> Result<Self, Self::Error> {
        let date_of_birth = q
            .date_of_birth
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(mw_core::models::parse_search_date)
            .transpose()?;

        Ok(SearchCriteria {
            id: q.id,
            national_id: q.national_id,
            passport_id: q.passport_id,
            patient_hn: q.patient_hn,
            first_name: q.first_name,
            middle_name: q.middle_name,
            last_name: q.last_name,
            date_of_birth,
            phone_number: q.phone_number,
            email: q.email,
            gender: q.gender,
        }
        .normalized())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name_th: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name_th: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name_th: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name_en: Option<String>,
    #[schema(example = "1985-03-15")]
    pub date_of_birth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[schema(example = "M")]
    pub gender: String,
    #[schema(example = "HN001")]
    pub patient_hn: String,
    #[schema(example = "Hospital A")]
    pub hospital: String,
    /// RFC 3339 time of the last local write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<PatientRecord> for PatientRes {
    fn from(p: PatientRecord) -> Self {
        Self {
            national_id: p.national_id,
            passport_id: p.passport_id,
            first_name_th: p.first_name_th,
            middle_name_th: p.middle_name_th,
            last_name_th: p.last_name_th,
            first_name_en: p.first_name_en,
            middle_name_en: p.middle_name_en,
            last_name_en: p.last_name_en,
            date_of_birth: p.date_of_birth.format("%Y-%m-%d").to_string(),
            phone_number: p.phone_number,
            email: p.email,
            gender: p.gender,
            patient_hn: p.patient_hn,
            hospital: p.hospital,
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientSearchRes {
    pub patients: Vec<PatientRes>,
    pub count: usize,
}

impl From<Vec<PatientRecord>> for PatientSearchRes {
    fn from(records: Vec<PatientRecord>) -> Self {
        let patients: Vec<PatientRes> = records.into_iter().map(PatientRes::from).collect();
        Self {
            count: patients.len(),
            patients,
        }
    }
}
