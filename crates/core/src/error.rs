use mw_types::TextError;

pub use sqlx::Error as DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] TextError),

    #[error("record not found")]
    NotFound,
    #[error("access denied: patient does not belong to your hospital")]
    AccessDenied,

    #[error("username already exists")]
    UsernameExists,
    #[error("email already exists")]
    EmailExists,
    #[error("employee_id already exists")]
    EmployeeIdExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("failed to hash password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error("failed to encode token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("blocking task failed: {0}")]
    BlockingTask(#[from] tokio::task::JoinError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type MiddlewareResult<T> = std::result::Result<T, MiddlewareError>;
