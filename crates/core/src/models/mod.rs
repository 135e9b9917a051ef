//! Domain models shared by the stores, services and API layers.

pub mod patient;
pub mod staff;

pub use patient::{parse_search_date, PatientRecord, SearchCriteria};
pub use staff::{LoginOutcome, NewStaff, NewStaffInput, StaffAccount};
