//! Patient search orchestration.
//!
//! A search first asks the local store, scoped to the caller's hospital. Only when that comes
//! back empty and an identifier was supplied is the external directory consulted. A record from
//! the directory passes the hospital check before it is cached locally and returned.

use std::sync::Arc;

use crate::authorization::is_authorized;
use crate::directory::PatientDirectory;
use crate::models::{PatientRecord, SearchCriteria};
use crate::repositories::PatientStore;
use crate::{MiddlewareError, MiddlewareResult};

/// Coordinates the store, the directory and the hospital check for one search.
///
/// Holds no per-request state; clone freely across handlers.
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn PatientStore>,
    directory: Arc<dyn PatientDirectory>,
}

impl PatientService {
    pub fn new(store: Arc<dyn PatientStore>, directory: Arc<dyn PatientDirectory>) -> Self {
        Self { store, directory }
    }

    /// Search for patients visible to `caller_hospital`.
    ///
    /// Returns an empty vector when nothing matches anywhere. The criteria are expected to have
    /// passed [`SearchCriteria::validate`] already.
    ///
    /// # Errors
    ///
    /// - `MiddlewareError::AccessDenied` if the directory returns a record owned by another
    ///   hospital. The store is not written in that case.
    /// - Store errors from the initial search are propagated. A failed write-back is only logged.
    pub async fn search_patient(
        &self,
        criteria: &SearchCriteria,
        caller_hospital: &str,
    ) -> MiddlewareResult<Vec<PatientRecord>> {
        let hits = self.store.search(criteria, caller_hospital).await?;
        if !hits.is_empty() {
            tracing::debug!(count = hits.len(), "patient search served from local store");
            return Ok(hits);
        }

        let Some(identifier) = criteria.lookup_id() else {
            return Ok(Vec::new());
        };

        let record = match self.directory.fetch(identifier).await {
            Ok(record) => record,
            Err(MiddlewareError::NotFound) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        if !is_authorized(&record.hospital, caller_hospital) {
            tracing::warn!(
                patient_hn = %record.patient_hn,
                record_hospital = %record.hospital,
                caller_hospital,
                "directory record belongs to another hospital"
            );
            return Err(MiddlewareError::AccessDenied);
        }

        match self.store.upsert(&record).await {
            Ok(()) => tracing::info!(
                patient_hn = %record.patient_hn,
                hospital = %record.hospital,
                "cached patient from directory"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                patient_hn = %record.patient_hn,
                "failed to cache patient from directory"
            ),
        }

        Ok(vec![record])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::directory::fixture_lookup;
    use crate::repositories::PatientRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory backed by the fixture table that counts its calls.
    #[derive(Default)]
    struct CountingDirectory {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PatientDirectory for CountingDirectory {
        async fn fetch(&self, identifier: &str) -> MiddlewareResult<PatientRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            fixture_lookup(identifier).ok_or(MiddlewareError::NotFound)
        }
    }

    /// Store that never finds anything and refuses every write.
    struct ReadOnlyStore;

    #[async_trait]
    impl PatientStore for ReadOnlyStore {
        async fn upsert(&self, _record: &PatientRecord) -> MiddlewareResult<()> {
            Err(MiddlewareError::Database(sqlx::Error::PoolClosed))
        }

        async fn find_by_key(&self, _hn: &str, _hospital: &str) -> MiddlewareResult<PatientRecord> {
            Err(MiddlewareError::NotFound)
        }

        async fn search(
            &self,
            _criteria: &SearchCriteria,
            _hospital: &str,
        ) -> MiddlewareResult<Vec<PatientRecord>> {
            Ok(Vec::new())
        }
    }

    async fn store() -> Arc<PatientRepository> {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        Arc::new(db.patients())
    }

    #[tokio::test]
    async fn directory_hit_is_returned_and_written_back() {
        let store = store().await;
        let service = PatientService::new(store.clone(), Arc::new(CountingDirectory::default()));

        let found = service
            .search_patient(&SearchCriteria::by_id("9876543210987"), "Hospital A")
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].patient_hn, "HN002");

        let cached = store.find_by_key("HN002", "Hospital A").await.unwrap();
        assert_eq!(cached.national_id.as_deref(), Some("9876543210987"));
    }

    #[tokio::test]
    async fn other_hospital_record_is_denied_and_not_cached() {
        let store = store().await;
        let service = PatientService::new(store.clone(), Arc::new(CountingDirectory::default()));

        let err = service
            .search_patient(&SearchCriteria::by_id("1111222233334"), "Hospital A")
            .await
            .unwrap_err();

        assert!(matches!(err, MiddlewareError::AccessDenied));
        assert_eq!(store.count_by_key("HN004", "Hospital B").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn miss_everywhere_is_empty_not_error() {
        let service = PatientService::new(store().await, Arc::new(CountingDirectory::default()));

        let found = service
            .search_patient(&SearchCriteria::by_id("9999999999999"), "Hospital A")
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn store_hit_skips_directory() {
        let store = store().await;
        let directory = Arc::new(CountingDirectory::default());
        let service = PatientService::new(store.clone(), directory.clone());

        // First search populates the store through the directory.
        service
            .search_patient(&SearchCriteria::by_id("9876543210987"), "Hospital A")
            .await
            .unwrap();
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);

        let again = service
            .search_patient(&SearchCriteria::by_id("9876543210987"), "Hospital A")
            .await
            .unwrap();
        assert_eq!(again.len(), 1);
        assert!(again[0].updated_at.is_some(), "second hit comes from the store");
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn without_id_directory_is_never_consulted() {
        let directory = Arc::new(CountingDirectory::default());
        let service = PatientService::new(store().await, directory.clone());

        let criteria = SearchCriteria {
            first_name: Some("somchai".into()),
            ..SearchCriteria::default()
        };
        let found = service.search_patient(&criteria, "Hospital A").await.unwrap();

        assert!(found.is_empty());
        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn name_search_finds_cached_record() {
        let store = store().await;
        let service = PatientService::new(store.clone(), Arc::new(CountingDirectory::default()));
        service
            .search_patient(&SearchCriteria::by_id("1234567890123"), "Hospital A")
            .await
            .unwrap();

        let criteria = SearchCriteria {
            first_name: Some("somchai".into()),
            ..SearchCriteria::default()
        };
        let found = service.search_patient(&criteria, "Hospital A").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name_en.as_deref(), Some("Somchai"));
    }

    #[tokio::test]
    async fn failed_write_back_does_not_fail_search() {
        let service = PatientService::new(
            Arc::new(ReadOnlyStore),
            Arc::new(CountingDirectory::default()),
        );

        let found = service
            .search_patient(&SearchCriteria::by_id("AB1234567"), "Hospital A")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].patient_hn, "HN003");
    }
}
