//! Patient record and search criteria types.
//!
//! `PatientRecord` is both the row shape of the local cache and the JSON body returned by the
//! HIS directory, so a fetched record can be written back without translation.

use chrono::{DateTime, NaiveDate, Utc};
use mw_types::NonEmptyText;
use serde::{Deserialize, Serialize};

use crate::{MiddlewareError, MiddlewareResult};

/// A patient record as held by one hospital.
///
/// `(patient_hn, hospital)` identifies a record. The same person may appear at several
/// hospitals under different HNs, so `national_id` and `passport_id` are not unique.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PatientRecord {
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

    #[serde(with = "date_of_birth")]
    pub date_of_birth: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub gender: String,

    pub patient_hn: String,
    pub hospital: String,

    /// Set by the store on every write; `None` for records that have not been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Filters for a patient search. Every populated field must match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Matches either `national_id` or `passport_id`. The only criterion the HIS can be
    /// queried by.
    pub id: Option<String>,
    pub national_id: Option<String>,
    pub passport_id: Option<String>,
    pub patient_hn: Option<String>,
    /// Partial, case-insensitive; checked against the English and Thai first names.
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
}

impl SearchCriteria {
    /// Criteria with only the generic identifier set.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Trims every text filter and drops the blank ones.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            NonEmptyText::optional(value).map(NonEmptyText::into_inner)
        }

        Self {
            id: clean(self.id),
            national_id: clean(self.national_id),
            passport_id: clean(self.passport_id),
            patient_hn: clean(self.patient_hn),
            first_name: clean(self.first_name),
            middle_name: clean(self.middle_name),
            last_name: clean(self.last_name),
            date_of_birth: self.date_of_birth,
            phone_number: clean(self.phone_number),
            email: clean(self.email),
            gender: clean(self.gender),
        }
    }

    /// True when no filter carries a non-blank value.
    pub fn is_empty(&self) -> bool {
        let text_fields = [
            &self.id,
            &self.national_id,
            &self.passport_id,
            &self.patient_hn,
            &self.first_name,
            &self.middle_name,
            &self.last_name,
            &self.phone_number,
            &self.email,
            &self.gender,
        ];

        self.date_of_birth.is_none() && text_fields.iter().all(|f| non_blank(f).is_none())
    }

    /// Rejects criteria with nothing to search by.
    ///
    /// Callers run this before handing criteria to the search orchestrator.
    pub fn validate(&self) -> MiddlewareResult<()> {
        if self.is_empty() {
            return Err(MiddlewareError::InvalidInput(
                "at least one search criteria must be provided".into(),
            ));
        }
        Ok(())
    }

    /// The identifier to query the HIS directory with, if one was supplied.
    pub fn lookup_id(&self) -> Option<&str> {
        non_blank(&self.id)
    }
}

/// Parse a `YYYY-MM-DD` date supplied as a search filter.
pub fn parse_search_date(value: &str) -> MiddlewareResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        MiddlewareError::InvalidInput(format!(
            "date_of_birth must be formatted as YYYY-MM-DD, got '{value}'"
        ))
    })
}

/// Borrow the trimmed value of an optional filter, treating blank strings as absent.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Serde adapter for `date_of_birth`.
///
/// Serializes as `YYYY-MM-DD`. Deserializes either that form or an RFC 3339 timestamp
/// (the HIS sends midnight timestamps such as `1985-03-15T00:00:00Z`), keeping the date part.
mod date_of_birth {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();

        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(date);
        }

        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .map_err(|_| {
                serde::de::Error::custom(format!(
                    "date_of_birth must be YYYY-MM-DD or RFC 3339, got '{raw}'"
                ))
            })
    }
}
