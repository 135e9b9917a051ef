//! SQLite-backed staff account store.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::StaffAccount;
use crate::{MiddlewareError, MiddlewareResult};

const COLUMNS: &str = "id, employee_id, username, password_hash, first_name, last_name, email, \
     phone_number, role, department, hospital, is_active, created_at, updated_at";

/// Column values for a new staff row. The password is already hashed.
#[derive(Clone, Debug)]
pub struct StaffInsert<'a> {
    pub employee_id: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone_number: Option<&'a str>,
    pub role: &'a str,
    pub department: Option<&'a str>,
    pub hospital: &'a str,
}

#[derive(Clone, Debug)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> MiddlewareResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS staff (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id    TEXT NOT NULL UNIQUE,
                username       TEXT NOT NULL UNIQUE,
                password_hash  TEXT NOT NULL,
                first_name     TEXT NOT NULL,
                last_name      TEXT NOT NULL,
                email          TEXT NOT NULL UNIQUE,
                phone_number   TEXT,
                role           TEXT NOT NULL,
                department     TEXT,
                hospital       TEXT NOT NULL,
                is_active      BOOLEAN NOT NULL DEFAULT 1,
                created_at     TEXT NOT NULL,
                updated_at     TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new active account and return the stored row.
    ///
    /// A unique constraint violation is reported as the matching `*Exists` error, which covers
    /// the race where two registrations pass the service's pre-checks at the same time.
    pub async fn create(&self, staff: StaffInsert<'_>) -> MiddlewareResult<StaffAccount> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO staff (employee_id, username, password_hash, first_name, last_name, \
             email, phone_number, role, department, hospital, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?) \
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, StaffAccount>(&sql)
            .bind(staff.employee_id)
            .bind(staff.username)
            .bind(staff.password_hash)
            .bind(staff.first_name)
            .bind(staff.last_name)
            .bind(staff.email)
            .bind(staff.phone_number)
            .bind(staff.role)
            .bind(staff.department)
            .bind(staff.hospital)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    pub async fn find_by_id(&self, id: i64) -> MiddlewareResult<Option<StaffAccount>> {
        self.find_one("id", id).await
    }

    pub async fn find_by_username(&self, username: &str) -> MiddlewareResult<Option<StaffAccount>> {
        self.find_one("username", username.to_string()).await
    }

    pub async fn find_by_email(&self, email: &str) -> MiddlewareResult<Option<StaffAccount>> {
        self.find_one("email", email.to_string()).await
    }

    pub async fn find_by_employee_id(
        &self,
        employee_id: &str,
    ) -> MiddlewareResult<Option<StaffAccount>> {
        self.find_one("employee_id", employee_id.to_string()).await
    }

    async fn find_one<T>(
        &self,
        column: &'static str,
        value: T,
    ) -> MiddlewareResult<Option<StaffAccount>>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite> + Send,
    {
        let sql = format!("SELECT {COLUMNS} FROM staff WHERE {column} = ?");
        let account = sqlx::query_as::<_, StaffAccount>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }
}

fn map_unique_violation(err: sqlx::Error) -> MiddlewareError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("staff.username") {
                return MiddlewareError::UsernameExists;
            }
            if message.contains("staff.email") {
                return MiddlewareError::EmailExists;
            }
            if message.contains("staff.employee_id") {
                return MiddlewareError::EmployeeIdExists;
            }
        }
    }
    MiddlewareError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn repo() -> StaffRepository {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db.staff()
    }

    fn insert<'a>(employee_id: &'a str, username: &'a str, email: &'a str) -> StaffInsert<'a> {
        StaffInsert {
            employee_id,
            username,
            password_hash: "$2b$04$notarealhash",
            first_name: "John",
            last_name: "Doe",
            email,
            phone_number: None,
            role: "Doctor",
            department: Some("Cardiology"),
            hospital: "Hospital A",
        }
    }

    #[tokio::test]
    async fn create_returns_active_account() {
        let repo = repo().await;
        let account = repo
            .create(insert("EMP001", "testuser", "john@hospital.com"))
            .await
            .unwrap();

        assert!(account.id > 0);
        assert!(account.is_active);
        assert_eq!(account.department.as_deref(), Some("Cardiology"));
        assert_eq!(account.phone_number, None);

        let found = repo.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(found, account);
        assert!(repo.find_by_username("testuser").await.unwrap().is_some());
        assert!(repo.find_by_email("john@hospital.com").await.unwrap().is_some());
        assert!(repo.find_by_employee_id("EMP001").await.unwrap().is_some());
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unique_violations_map_to_domain_errors() {
        let repo = repo().await;
        repo.create(insert("EMP001", "testuser", "john@hospital.com"))
            .await
            .unwrap();

        let err = repo
            .create(insert("EMP002", "testuser", "other@hospital.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MiddlewareError::UsernameExists), "{err:?}");

        let err = repo
            .create(insert("EMP002", "other", "john@hospital.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MiddlewareError::EmailExists), "{err:?}");

        let err = repo
            .create(insert("EMP001", "other", "other@hospital.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MiddlewareError::EmployeeIdExists), "{err:?}");
    }
}
