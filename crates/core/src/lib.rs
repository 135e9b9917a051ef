//! # Middleware Core
//!
//! Core business logic for the hospital middleware.
//!
//! This crate contains the domain operations and their persistence:
//! - Patient search across the local store and the external HIS directory, with a hospital
//!   access check on directory results and write-back caching
//! - Staff registration, login and bearer token verification
//! - SQLite schema setup and queries through `sqlx`
//!
//! **No API concerns**: HTTP routing, request parsing and response shaping belong in
//! `api-rest` and `api-shared`.

pub mod auth;
pub mod authorization;
pub mod config;
pub mod constants;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod patient;
pub mod repositories;

pub use auth::{AuthService, Claims};
pub use authorization::is_authorized;
pub use config::CoreConfig;
pub use db::Database;
pub use directory::{HisDirectoryClient, PatientDirectory};
pub use error::{MiddlewareError, MiddlewareResult};
pub use models::{
    LoginOutcome, NewStaffInput, PatientRecord, SearchCriteria, StaffAccount,
};
pub use mw_types::{EmailAddress, NonEmptyText, TextError};
pub use patient::PatientService;
pub use repositories::{PatientRepository, PatientStore, StaffRepository};
