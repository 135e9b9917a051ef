//! SQLite-backed patient record store.
//!
//! Rows are keyed by `(patient_hn, hospital)`. Writes go through a single
//! `INSERT ... ON CONFLICT DO UPDATE` statement against a unique index, so concurrent upserts for
//! the same key always leave exactly one row.
//!
//! Each name column has a `*_fold` twin holding its Unicode lowercase form. Name filters match
//! against the twins, since SQLite `LIKE` only folds ASCII.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::patient::non_blank;
use crate::models::{PatientRecord, SearchCriteria};
use crate::{MiddlewareError, MiddlewareResult};

/// Persistence operations the search orchestrator relies on.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Insert the record, or overwrite every field of the row with the same
    /// `(patient_hn, hospital)`.
    async fn upsert(&self, record: &PatientRecord) -> MiddlewareResult<()>;

    /// Exact lookup by key. Fails with [`MiddlewareError::NotFound`] if absent.
    async fn find_by_key(&self, patient_hn: &str, hospital: &str)
        -> MiddlewareResult<PatientRecord>;

    /// All records owned by `hospital` that match every populated criterion.
    async fn search(
        &self,
        criteria: &SearchCriteria,
        hospital: &str,
    ) -> MiddlewareResult<Vec<PatientRecord>>;
}

const SELECT_COLUMNS: &str = "SELECT national_id, passport_id, \
     first_name_th, middle_name_th, last_name_th, \
     first_name_en, middle_name_en, last_name_en, \
     date_of_birth, phone_number, email, gender, patient_hn, hospital, updated_at \
     FROM patient";

#[derive(Clone, Debug)]
pub struct PatientRepository {
    pool: SqlitePool,
}

impl PatientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> MiddlewareResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patient (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                national_id     TEXT,
                passport_id     TEXT,
                first_name_th   TEXT,
                middle_name_th  TEXT,
                last_name_th    TEXT,
                first_name_en   TEXT,
                middle_name_en  TEXT,
                last_name_en    TEXT,
                first_name_th_fold   TEXT,
                middle_name_th_fold  TEXT,
                last_name_th_fold    TEXT,
                first_name_en_fold   TEXT,
                middle_name_en_fold  TEXT,
                last_name_en_fold    TEXT,
                date_of_birth   TEXT NOT NULL,
                phone_number    TEXT,
                email           TEXT,
                gender          TEXT NOT NULL,
                patient_hn      TEXT NOT NULL,
                hospital        TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_patient_hn_hospital ON patient (patient_hn, hospital)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_patient_national_id ON patient (national_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_patient_passport_id ON patient (passport_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Number of rows stored under a key. Zero or one while the unique index holds.
    #[cfg(test)]
    pub(crate) async fn count_by_key(&self, patient_hn: &str, hospital: &str) -> MiddlewareResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM patient WHERE patient_hn = ? AND hospital = ?")
                .bind(patient_hn)
                .bind(hospital)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

#[async_trait]
impl PatientStore for PatientRepository {
    async fn upsert(&self, record: &PatientRecord) -> MiddlewareResult<()> {
        sqlx::query(
            r#"
            INSERT INTO patient (
                national_id, passport_id,
                first_name_th, middle_name_th, last_name_th,
                first_name_en, middle_name_en, last_name_en,
                first_name_th_fold, middle_name_th_fold, last_name_th_fold,
                first_name_en_fold, middle_name_en_fold, last_name_en_fold,
                date_of_birth, phone_number, email, gender,
                patient_hn, hospital, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (patient_hn, hospital) DO UPDATE SET
                national_id    = excluded.national_id,
                passport_id    = excluded.passport_id,
                first_name_th  = excluded.first_name_th,
                middle_name_th = excluded.middle_name_th,
                last_name_th   = excluded.last_name_th,
                first_name_en  = excluded.first_name_en,
                middle_name_en = excluded.middle_name_en,
                last_name_en   = excluded.last_name_en,
                first_name_th_fold  = excluded.first_name_th_fold,
                middle_name_th_fold = excluded.middle_name_th_fold,
                last_name_th_fold   = excluded.last_name_th_fold,
                first_name_en_fold  = excluded.first_name_en_fold,
                middle_name_en_fold = excluded.middle_name_en_fold,
                last_name_en_fold   = excluded.last_name_en_fold,
                date_of_birth  = excluded.date_of_birth,
                phone_number   = excluded.phone_number,
                email          = excluded.email,
                gender         = excluded.gender,
                updated_at     = excluded.updated_at
            "#,
        )
        .bind(&record.national_id)
        .bind(&record.passport_id)
        .bind(&record.first_name_th)
        .bind(&record.middle_name_th)
        .bind(&record.last_name_th)
        .bind(&record.first_name_en)
        .bind(&record.middle_name_en)
        .bind(&record.last_name_en)
        .bind(fold(&record.first_name_th))
        .bind(fold(&record.middle_name_th))
        .bind(fold(&record.last_name_th))
        .bind(fold(&record.first_name_en))
        .bind(fold(&record.middle_name_en))
        .bind(fold(&record.last_name_en))
        .bind(record.date_of_birth)
        .bind(&record.phone_number)
        .bind(&record.email)
        .bind(&record.gender)
        .bind(&record.patient_hn)
        .bind(&record.hospital)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_key(
        &self,
        patient_hn: &str,
        hospital: &str,
    ) -> MiddlewareResult<PatientRecord> {
        let sql = format!("{SELECT_COLUMNS} WHERE patient_hn = ? AND hospital = ?");
        sqlx::query_as::<_, PatientRecord>(&sql)
            .bind(patient_hn)
            .bind(hospital)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(MiddlewareError::NotFound)
    }

    async fn search(
        &self,
        criteria: &SearchCriteria,
        hospital: &str,
    ) -> MiddlewareResult<Vec<PatientRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
        qb.push(" WHERE hospital = ").push_bind(hospital.to_string());

        if let Some(id) = non_blank(&criteria.id) {
            qb.push(" AND (national_id = ")
                .push_bind(id.to_string())
                .push(" OR passport_id = ")
                .push_bind(id.to_string())
                .push(")");
        }

        let exact = [
            ("national_id", &criteria.national_id),
            ("passport_id", &criteria.passport_id),
            ("patient_hn", &criteria.patient_hn),
            ("phone_number", &criteria.phone_number),
            ("email", &criteria.email),
            ("gender", &criteria.gender),
        ];
        for (column, value) in exact {
            if let Some(value) = non_blank(value) {
                qb.push(format!(" AND {column} = "))
                    .push_bind(value.to_string());
            }
        }

        if let Some(dob) = criteria.date_of_birth {
            qb.push(" AND date_of_birth = ").push_bind(dob);
        }

        let names = [
            ("first_name", &criteria.first_name),
            ("middle_name", &criteria.middle_name),
            ("last_name", &criteria.last_name),
        ];
        for (part, value) in names {
            if let Some(value) = non_blank(value) {
                let pattern = like_pattern(&value.to_lowercase());
                qb.push(format!(" AND ({part}_en_fold LIKE "))
                    .push_bind(pattern.clone())
                    .push(format!(" ESCAPE '\\' OR {part}_th_fold LIKE "))
                    .push_bind(pattern)
                    .push(" ESCAPE '\\')");
            }
        }

        qb.push(" ORDER BY patient_hn");

        let records = qb
            .build_query_as::<PatientRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}

/// Lowercase form stored in the `*_fold` name columns.
fn fold(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::to_lowercase)
}

/// Build a `LIKE` pattern that matches `value` anywhere, with wildcards in `value` escaped.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::NaiveDate;
    use std::sync::Arc;

    async fn repo() -> PatientRepository {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db.patients()
    }

    fn record(hn: &str, hospital: &str) -> PatientRecord {
        PatientRecord {
            national_id: Some("1234567890123".into()),
            passport_id: None,
            first_name_th: Some("สมชาย".into()),
            middle_name_th: None,
            last_name_th: Some("ใจดี".into()),
            first_name_en: Some("Somchai".into()),
            middle_name_en: None,
            last_name_en: Some("Jaidee".into()),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 15).unwrap(),
            phone_number: Some("0891234567".into()),
            email: Some("somchai@email.com".into()),
            gender: "M".into(),
            patient_hn: hn.into(),
            hospital: hospital.into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn upsert_twice_keeps_one_row_with_latest_values() {
        let repo = repo().await;
        repo.upsert(&record("HN001", "Hospital A")).await.unwrap();

        let mut changed = record("HN001", "Hospital A");
        changed.phone_number = Some("0800000000".into());
        changed.email = None;
        repo.upsert(&changed).await.unwrap();

        assert_eq!(repo.count_by_key("HN001", "Hospital A").await.unwrap(), 1);
        let stored = repo.find_by_key("HN001", "Hospital A").await.unwrap();
        assert_eq!(stored.phone_number.as_deref(), Some("0800000000"));
        assert_eq!(stored.email, None);
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn find_by_key_reports_not_found() {
        let repo = repo().await;
        let err = repo.find_by_key("HN404", "Hospital A").await.unwrap_err();
        assert!(matches!(err, MiddlewareError::NotFound));
    }

    #[tokio::test]
    async fn same_hn_at_two_hospitals_are_separate_rows() {
        let repo = repo().await;
        repo.upsert(&record("HN001", "Hospital A")).await.unwrap();
        let mut other = record("HN001", "Hospital B");
        other.first_name_en = Some("Somsri".into());
        repo.upsert(&other).await.unwrap();

        let criteria = SearchCriteria {
            patient_hn: Some("HN001".into()),
            ..SearchCriteria::default()
        };
        let a = repo.search(&criteria, "Hospital A").await.unwrap();
        let b = repo.search(&criteria, "Hospital B").await.unwrap();

        assert_eq!(a.len(), 1);
        assert_eq!(a[0].first_name_en.as_deref(), Some("Somchai"));
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].first_name_en.as_deref(), Some("Somsri"));
    }

    #[tokio::test]
    async fn id_matches_national_or_passport() {
        let repo = repo().await;
        repo.upsert(&record("HN001", "Hospital A")).await.unwrap();
        let mut foreign = record("HN003", "Hospital A");
        foreign.national_id = None;
        foreign.passport_id = Some("AB1234567".into());
        repo.upsert(&foreign).await.unwrap();

        let by_national = repo
            .search(&SearchCriteria::by_id("1234567890123"), "Hospital A")
            .await
            .unwrap();
        assert_eq!(by_national.len(), 1);
        assert_eq!(by_national[0].patient_hn, "HN001");

        let by_passport = repo
            .search(&SearchCriteria::by_id("AB1234567"), "Hospital A")
            .await
            .unwrap();
        assert_eq!(by_passport.len(), 1);
        assert_eq!(by_passport[0].patient_hn, "HN003");
    }

    #[tokio::test]
    async fn name_match_is_partial_and_case_insensitive_in_either_locale() {
        let repo = repo().await;
        repo.upsert(&record("HN001", "Hospital A")).await.unwrap();

        for (first, last) in [("somchai", None), ("MCHA", None), ("สมช", Some("ดี"))] {
            let criteria = SearchCriteria {
                first_name: Some(first.into()),
                last_name: last.map(Into::into),
                ..SearchCriteria::default()
            };
            let found = repo.search(&criteria, "Hospital A").await.unwrap();
            assert_eq!(found.len(), 1, "first_name={first}");
        }
    }

    #[tokio::test]
    async fn name_match_folds_non_ascii_case() {
        let repo = repo().await;
        let mut accented = record("HN020", "Hospital A");
        accented.first_name_en = Some("Élodie".into());
        accented.last_name_en = Some("Müller".into());
        repo.upsert(&accented).await.unwrap();

        for criteria in [
            SearchCriteria {
                first_name: Some("élodie".into()),
                ..SearchCriteria::default()
            },
            SearchCriteria {
                last_name: Some("MÜLLER".into()),
                ..SearchCriteria::default()
            },
        ] {
            let found = repo.search(&criteria, "Hospital A").await.unwrap();
            assert_eq!(found.len(), 1, "{criteria:?}");
            assert_eq!(found[0].first_name_en.as_deref(), Some("Élodie"));
        }
    }

    #[tokio::test]
    async fn wildcards_in_names_match_literally() {
        let repo = repo().await;
        repo.upsert(&record("HN001", "Hospital A")).await.unwrap();

        let criteria = SearchCriteria {
            first_name: Some("%".into()),
            ..SearchCriteria::default()
        };
        assert!(repo.search(&criteria, "Hospital A").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn criteria_are_combined_with_and() {
        let repo = repo().await;
        repo.upsert(&record("HN001", "Hospital A")).await.unwrap();

        let hit = SearchCriteria {
            first_name: Some("som".into()),
            gender: Some("M".into()),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 15),
            ..SearchCriteria::default()
        };
        assert_eq!(repo.search(&hit, "Hospital A").await.unwrap().len(), 1);

        let miss = SearchCriteria {
            gender: Some("F".into()),
            ..hit
        };
        assert!(repo.search(&miss, "Hospital A").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_never_leaks_other_hospitals() {
        let repo = repo().await;
        repo.upsert(&record("HN001", "Hospital B")).await.unwrap();

        let found = repo
            .search(&SearchCriteria::by_id("1234567890123"), "Hospital A")
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn concurrent_upserts_leave_a_single_row() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("patients.db").display());
        let db = Database::connect(&url).await.unwrap();
        db.migrate().await.unwrap();
        let repo = Arc::new(db.patients());

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let mut r = record("HN002", "Hospital A");
                r.phone_number = Some(format!("08000000{i:02}"));
                repo.upsert(&r).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.count_by_key("HN002", "Hospital A").await.unwrap(), 1);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ab"), "%ab%");
        assert_eq!(like_pattern("a%_\\"), "%a\\%\\_\\\\%");
    }
}
