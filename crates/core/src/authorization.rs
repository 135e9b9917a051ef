//! Hospital-scoped access rule.

/// Whether a caller from `caller_hospital` may view a record owned by `record_hospital`.
///
/// Any staff member of the owning hospital may view any of its records; role plays no part.
pub fn is_authorized(record_hospital: &str, caller_hospital: &str) -> bool {
    record_hospital == caller_hospital
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_hospital_is_authorized() {
        assert!(is_authorized("Hospital A", "Hospital A"));
    }

    #[test]
    fn other_hospital_is_denied() {
        assert!(!is_authorized("Hospital B", "Hospital A"));
    }

    #[test]
    fn comparison_is_exact() {
        assert!(!is_authorized("hospital a", "Hospital A"));
        assert!(!is_authorized("Hospital A ", "Hospital A"));
    }
}
