//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Services never read process-wide environment variables while
//! handling a request; binaries call [`CoreConfig::from_env`] (or hand raw values to the parsing
//! helpers below) before anything else runs.

use crate::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_HIS_API_BASE_URL, DEFAULT_HIS_API_TIMEOUT_SECS,
    DEFAULT_JWT_SECRET, DEFAULT_TOKEN_TTL_HOURS,
};
use crate::{MiddlewareError, MiddlewareResult};
use mw_types::NonEmptyText;
use reqwest::Url;
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_url: String,
    jwt_secret: NonEmptyText,
    token_ttl: Duration,
    his_api_base_url: Url,
    his_api_timeout: Duration,
    his_api_enabled: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `MiddlewareError::InvalidInput` if:
    /// - `database_url` is blank,
    /// - `token_ttl` or `his_api_timeout` is zero,
    /// - `his_api_base_url` is not an absolute `http`/`https` URL.
    pub fn new(
        database_url: String,
        jwt_secret: NonEmptyText,
        token_ttl: Duration,
        his_api_base_url: &str,
        his_api_timeout: Duration,
        his_api_enabled: bool,
    ) -> MiddlewareResult<Self> {
        if database_url.trim().is_empty() {
            return Err(MiddlewareError::InvalidInput(
                "database_url cannot be empty".into(),
            ));
        }

        if token_ttl.is_zero() {
            return Err(MiddlewareError::InvalidInput(
                "token lifetime must be greater than zero".into(),
            ));
        }

        if his_api_timeout.is_zero() {
            return Err(MiddlewareError::InvalidInput(
                "HIS API timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            database_url,
            jwt_secret,
            token_ttl,
            his_api_base_url: parse_base_url(his_api_base_url)?,
            his_api_timeout,
            his_api_enabled,
        })
    }

    /// Resolve the configuration from process environment variables.
    ///
    /// Reads `DATABASE_URL`, `JWT_SECRET`, `JWT_TTL_HOURS`, `HIS_API_BASE_URL`,
    /// `HIS_API_TIMEOUT_SECS` and `HIS_API_ENABLED`. Unset values take the defaults in
    /// [`crate::constants`]. Logs a warning when the development JWT secret is in use.
    pub fn from_env() -> MiddlewareResult<Self> {
        let env = |name: &str| std::env::var(name).ok();

        let database_url =
            non_blank(env("DATABASE_URL")).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = match NonEmptyText::optional(env("JWT_SECRET")) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET is not set; using the insecure development default");
                NonEmptyText::new(DEFAULT_JWT_SECRET)?
            }
        };

        Self::new(
            database_url,
            jwt_secret,
            token_ttl_from_env_value(env("JWT_TTL_HOURS"))?,
            &his_api_base_url_from_env_value(env("HIS_API_BASE_URL")),
            his_api_timeout_from_env_value(env("HIS_API_TIMEOUT_SECS"))?,
            flag_from_env_value("HIS_API_ENABLED", env("HIS_API_ENABLED"), true)?,
        )
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn jwt_secret(&self) -> &NonEmptyText {
        &self.jwt_secret
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn his_api_base_url(&self) -> &Url {
        &self.his_api_base_url
    }

    pub fn his_api_timeout(&self) -> Duration {
        self.his_api_timeout
    }

    pub fn his_api_enabled(&self) -> bool {
        self.his_api_enabled
    }
}

/// Parse the HIS base URL.
///
/// Only absolute `http`/`https` URLs that can carry path segments are accepted, so the
/// directory client can append `/patient/search/{id}` without string concatenation.
pub fn parse_base_url(value: &str) -> MiddlewareResult<Url> {
    let url = Url::parse(value.trim()).map_err(|e| {
        MiddlewareError::InvalidInput(format!("invalid HIS API base URL '{value}': {e}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(MiddlewareError::InvalidInput(format!(
            "HIS API base URL must be an http(s) URL, got '{value}'"
        )));
    }

    Ok(url)
}

/// Resolve the HIS base URL from an optional environment value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_HIS_API_BASE_URL`].
pub fn his_api_base_url_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_HIS_API_BASE_URL.to_string())
}

/// Parse the HIS timeout (whole seconds) from an optional environment value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_HIS_API_TIMEOUT_SECS`].
pub fn his_api_timeout_from_env_value(value: Option<String>) -> MiddlewareResult<Duration> {
    let secs = parse_u64("HIS_API_TIMEOUT_SECS", value)?.unwrap_or(DEFAULT_HIS_API_TIMEOUT_SECS);
    Ok(Duration::from_secs(secs))
}

/// Parse the token lifetime (whole hours) from an optional environment value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_TOKEN_TTL_HOURS`].
pub fn token_ttl_from_env_value(value: Option<String>) -> MiddlewareResult<Duration> {
    let hours = parse_u64("JWT_TTL_HOURS", value)?.unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
    Ok(Duration::from_secs(hours.saturating_mul(60 * 60)))
}

/// Parse an on/off flag from an optional environment value.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off` (case-insensitive). `None` or blank
/// returns `default`.
pub fn flag_from_env_value(
    name: &str,
    value: Option<String>,
    default: bool,
) -> MiddlewareResult<bool> {
    let Some(value) = non_blank(value) else {
        return Ok(default);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(MiddlewareError::InvalidInput(format!(
            "{name} must be a boolean flag, got '{value}'"
        ))),
    }
}

fn parse_u64(name: &str, value: Option<String>) -> MiddlewareResult<Option<u64>> {
    non_blank(value)
        .map(|v| {
            v.parse::<u64>().map_err(|_| {
                MiddlewareError::InvalidInput(format!(
                    "{name} must be a whole number, got '{v}'"
                ))
            })
        })
        .transpose()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
