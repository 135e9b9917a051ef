//! Staff registration, login and bearer tokens.
//!
//! Passwords are stored as bcrypt hashes. Tokens are HS256 JWTs carrying the staff ID, username
//! and hospital; verification always re-loads the account so a deactivated account stops
//! working before its token expires.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::models::{LoginOutcome, NewStaff, NewStaffInput, StaffAccount};
use crate::repositories::{StaffInsert, StaffRepository};
use crate::{MiddlewareError, MiddlewareResult};

/// Claims carried by an issued token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub staff_id: i64,
    pub username: String,
    pub hospital: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct AuthService {
    staff: StaffRepository,
    cfg: Arc<CoreConfig>,
    password_cost: u32,
}

impl AuthService {
    pub fn new(staff: StaffRepository, cfg: Arc<CoreConfig>) -> Self {
        Self {
            staff,
            cfg,
            password_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor. Tests use the minimum to stay fast.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Register a new active staff account.
    ///
    /// # Errors
    ///
    /// - `InvalidInput`/`Text` when a field fails validation,
    /// - `UsernameExists`, `EmailExists` or `EmployeeIdExists`, checked in that order,
    /// - `PasswordHash`/`Database` on internal failure.
    pub async fn create_staff(&self, input: NewStaffInput) -> MiddlewareResult<StaffAccount> {
        let new_staff = NewStaff::try_from(input)?;

        if self
            .staff
            .find_by_username(new_staff.username.as_str())
            .await?
            .is_some()
        {
            return Err(MiddlewareError::UsernameExists);
        }
        if self
            .staff
            .find_by_email(new_staff.email.as_str())
            .await?
            .is_some()
        {
            return Err(MiddlewareError::EmailExists);
        }
        if self
            .staff
            .find_by_employee_id(new_staff.employee_id.as_str())
            .await?
            .is_some()
        {
            return Err(MiddlewareError::EmployeeIdExists);
        }

        let password_hash = self.hash_password(new_staff.password.clone()).await?;

        let account = self
            .staff
            .create(StaffInsert {
                employee_id: new_staff.employee_id.as_str(),
                username: new_staff.username.as_str(),
                password_hash: &password_hash,
                first_name: new_staff.first_name.as_str(),
                last_name: new_staff.last_name.as_str(),
                email: new_staff.email.as_str(),
                phone_number: new_staff.phone_number.as_ref().map(|p| p.as_str()),
                role: new_staff.role.as_str(),
                department: new_staff.department.as_ref().map(|d| d.as_str()),
                hospital: new_staff.hospital.as_str(),
            })
            .await?;

        tracing::info!(
            staff_id = account.id,
            username = %account.username,
            hospital = %account.hospital,
            "staff account created"
        );
        Ok(account)
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown username, wrong password and inactive account are indistinguishable to the
    /// caller: all fail with `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> MiddlewareResult<LoginOutcome> {
        let Some(staff) = self.staff.find_by_username(username.trim()).await? else {
            return Err(MiddlewareError::InvalidCredentials);
        };

        if !staff.is_active {
            return Err(MiddlewareError::InvalidCredentials);
        }

        let password = password.to_string();
        let hash = staff.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
        if !matches {
            return Err(MiddlewareError::InvalidCredentials);
        }

        let token = self.issue_token(&staff)?;
        tracing::info!(staff_id = staff.id, "staff logged in");
        Ok(LoginOutcome { token, staff })
    }

    /// Sign a token for `staff` valid for the configured lifetime.
    pub fn issue_token(&self, staff: &StaffAccount) -> MiddlewareResult<String> {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.cfg.token_ttl().as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            staff_id: staff.id,
            username: staff.username.clone(),
            hospital: staff.hospital.clone(),
            iat,
            exp: iat.saturating_add(ttl),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.cfg.jwt_secret().as_str().as_bytes()),
        )?;
        Ok(token)
    }

    /// Validate a bearer token and return the account it was issued to.
    ///
    /// Fails with `InvalidToken` for a bad signature, an expired or malformed token, or an
    /// account that no longer exists or is inactive.
    pub async fn verify_token(&self, token: &str) -> MiddlewareResult<StaffAccount> {
        let claims = self.decode_claims(token)?;

        match self.staff.find_by_id(claims.staff_id).await? {
            Some(staff) if staff.is_active => Ok(staff),
            _ => Err(MiddlewareError::InvalidToken),
        }
    }

    fn decode_claims(&self, token: &str) -> MiddlewareResult<Claims> {
        let key = DecodingKey::from_secret(self.cfg.jwt_secret().as_str().as_bytes());
        decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                MiddlewareError::InvalidToken
            })
    }

    async fn hash_password(&self, password: String) -> MiddlewareResult<String> {
        let cost = self.password_cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }
}
