//! # API Shared
//!
//! Shared utilities and definitions for the middleware APIs.
//!
//! Contains:
//! - Wire request/response schemas (`schemas` module)
//! - Shared services like `HealthService`
//! - Bearer header parsing
//!
//! Used by `api-rest` and the server binaries for common functionality.

pub mod auth;
pub mod health;
pub mod schemas;

pub use auth::{bearer_token, BearerError};
pub use health::HealthService;
pub use schemas::*;
