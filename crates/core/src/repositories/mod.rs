//! Persistence for patient records and staff accounts.
//!
//! Both stores share one SQLite pool owned by [`crate::db::Database`].

pub mod patient;
pub mod staff;

pub use patient::{PatientRepository, PatientStore};
pub use staff::{StaffInsert, StaffRepository};
