//! Constants used throughout the middleware core crate.
//!
//! Defaults here are the values used when the corresponding environment variable is unset.

/// Default sqlx connection string. The file is created on first connect.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://middleware.db";

/// Development-only signing secret. Startup logs a warning when it is in use.
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key";

/// Default bearer token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;

/// Default base URL of the external HIS patient directory.
pub const DEFAULT_HIS_API_BASE_URL: &str = "https://hospital-a.api.co.th";

/// Default timeout for a single HIS request, in seconds.
pub const DEFAULT_HIS_API_TIMEOUT_SECS: u64 = 10;

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 6;
