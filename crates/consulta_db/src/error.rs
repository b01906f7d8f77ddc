//! Error types for the database client

use consulta_common::ConsultaError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A stored value could not be decoded into its domain type
    #[error("Database decode error: {0}")]
    DecodeError(String),

    /// A referenced record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write
    #[error("Duplicate record: {0}")]
    UniqueViolation(String),
}

impl DbError {
    /// Maps a failed query, singling out uniqueness violations.
    pub(crate) fn from_query(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::UniqueViolation(db_err.message().to_string())
            }
            _ => DbError::QueryError(err.to_string()),
        }
    }
}

impl From<DbError> for ConsultaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(message) => ConsultaError::NotFoundError(message),
            DbError::UniqueViolation(message) => ConsultaError::ConflictError(message),
            DbError::ConfigError(message) | DbError::UrlError(message) => {
                ConsultaError::ConfigError(message)
            }
            other => ConsultaError::StorageError(other.to_string()),
        }
    }
}
