use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single store-reported rule failure, in the shape the identity framework
/// of the original backend exposed them (`code` is machine-readable,
/// `description` is user-facing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub code: String,
    pub description: String,
}

impl RuleViolation {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input or store-rejected fields. Recoverable: the caller
    /// corrects the listed violations and retries.
    #[error("validation failed")]
    Validation(Vec<RuleViolation>),

    /// Entity absent. The message is returned verbatim to the caller.
    #[error("{0}")]
    NotFound(String),

    /// Store-enforced temporary login denial after repeated failures.
    #[error("account locked out")]
    LockedOut,

    /// Wrong password or reset code. Terminal for the attempt.
    #[error("Email ou Senha inválidos!")]
    InvalidCredentials,

    /// Signing key absent or malformed. Fatal at startup, never per-request.
    #[error("signing error: {0}")]
    Signing(String),

    /// Store did not answer within the request deadline. Safe to retry whole.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation_single(code: &str, description: &str) -> Self {
        AppError::Validation(vec![RuleViolation::new(code, description)])
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => AppError::Unavailable(e.to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    ValidationFailed,
    NotFound,
    LockedOut,
    InvalidCredentials,
    SigningError,
    StoreUnavailable,
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::LockedOut => "LOCKED_OUT",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::SigningError => "SIGNING_ERROR",
            ErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
