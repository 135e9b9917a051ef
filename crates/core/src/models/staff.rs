//! Staff account types.

use chrono::{DateTime, Utc};
use mw_types::{EmailAddress, NonEmptyText, TextError};
use serde::{Deserialize, Serialize};

use crate::constants::MIN_PASSWORD_LEN;
use crate::{MiddlewareError, MiddlewareResult};

/// A persisted staff account.
///
/// Accounts are created once through registration and are never edited by the middleware.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StaffAccount {
    pub id: i64,
    pub employee_id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: String,
    pub department: Option<String>,
    pub hospital: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated registration input, as received from an API request or the CLI.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewStaffInput {
    pub employee_id: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
    pub hospital: String,
}

/// Validated registration data.
///
/// Built from [`NewStaffInput`] with `TryFrom`; the password is still plaintext here and is
/// hashed by the auth service before anything is stored.
#[derive(Clone, Debug)]
pub struct NewStaff {
    pub employee_id: NonEmptyText,
    pub username: NonEmptyText,
    pub password: String,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub email: EmailAddress,
    pub phone_number: Option<NonEmptyText>,
    pub role: NonEmptyText,
    pub department: Option<NonEmptyText>,
    pub hospital: NonEmptyText,
}

impl TryFrom<NewStaffInput> for NewStaff {
    type Error = MiddlewareError;

    fn try_from(input: NewStaffInput) -> MiddlewareResult<Self> {
        fn required(field: &str, value: String) -> MiddlewareResult<NonEmptyText> {
            NonEmptyText::new(value)
                .map_err(|_| MiddlewareError::InvalidInput(format!("{field} is required")))
        }

        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(MiddlewareError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let email = EmailAddress::parse(&input.email).map_err(|e| match e {
            TextError::Empty => MiddlewareError::InvalidInput("email is required".into()),
            other => MiddlewareError::Text(other),
        })?;

        Ok(Self {
            employee_id: required("employee_id", input.employee_id)?,
            username: required("username", input.username)?,
            password: input.password,
            first_name: required("first_name", input.first_name)?,
            last_name: required("last_name", input.last_name)?,
            email,
            phone_number: NonEmptyText::optional(input.phone_number),
            role: required("role", input.role)?,
            department: NonEmptyText::optional(input.department),
            hospital: required("hospital", input.hospital)?,
        })
    }
}

/// Result of a successful login.
#[derive(Clone, Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub staff: StaffAccount,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewStaffInput {
        NewStaffInput {
            employee_id: "EMP001".into(),
            username: "testuser".into(),
            password: "password123".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john.doe@hospital.com".into(),
            phone_number: Some(" ".into()),
            role: "Doctor".into(),
            department: Some("Cardiology".into()),
            hospital: "Hospital A".into(),
        }
    }

    #[test]
    fn accepts_complete_registration() {
        let staff = NewStaff::try_from(input()).expect("registration should validate");
        assert_eq!(staff.username.as_str(), "testuser");
        assert_eq!(staff.email.as_str(), "john.doe@hospital.com");
        assert!(staff.phone_number.is_none(), "blank phone should be dropped");
        assert_eq!(
            staff.department.as_ref().map(NonEmptyText::as_str),
            Some("Cardiology")
        );
    }

    #[test]
    fn rejects_short_password() {
        let err = NewStaff::try_from(NewStaffInput {
            password: "12345".into(),
            ..input()
        })
        .expect_err("short password should be rejected");
        assert!(matches!(err, MiddlewareError::InvalidInput(msg) if msg.contains("password")));
    }

    #[test]
    fn rejects_missing_hospital() {
        let err = NewStaff::try_from(NewStaffInput {
            hospital: "  ".into(),
            ..input()
        })
        .expect_err("blank hospital should be rejected");
        assert!(matches!(err, MiddlewareError::InvalidInput(msg) if msg == "hospital is required"));
    }

    #[test]
    fn rejects_malformed_email() {
        let err = NewStaff::try_from(NewStaffInput {
            email: "john.doe".into(),
            ..input()
        })
        .expect_err("malformed email should be rejected");
        assert!(matches!(err, MiddlewareError::Text(TextError::InvalidEmail(_))));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let now = Utc::now();
        let account = StaffAccount {
            id: 1,
            employee_id: "EMP001".into(),
            username: "testuser".into(),
            password_hash: "$2b$04$secret".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john.doe@hospital.com".into(),
            phone_number: None,
            role: "Doctor".into(),
            department: None,
            hospital: "Hospital A".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&account).expect("should serialize");
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
    }
}
