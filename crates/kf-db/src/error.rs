//! Error types for kf-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Operation unsupported by this dialect (D003)
    #[error("[D003] Not supported by {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },

    /// Mutex poisoned (D004)
    #[error("[D004] Backend mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Internal error (D005)
    #[error("[D005] Internal backend error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for DDL
        // failures, so everything surfaces as an execution error.
        DbError::ExecutionError(err.to_string())
    }
}
