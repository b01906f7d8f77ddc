// --- File: crates/consulta_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Consulta errors.
///
/// Crate-local errors (`DbError`, `BookingError`, ...) convert into this type
/// through `From`, which fixes the HTTP status they surface with.
#[derive(Error, Debug)]
pub enum ConsultaError {
    /// Malformed input. `fields` names every offending field.
    #[error("Validation error: {message}")]
    ValidationError { message: String, fields: Vec<String> },

    /// The requested slot or unique resource is already taken
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// A calendar, video or mail provider failed
    #[error("External service error: {service_name} - {message}")]
    ProviderError {
        service_name: String,
        message: String,
    },

    /// The persistence layer failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ConsultaError {
    /// Whether the message may be shown to clients verbatim.
    ///
    /// Storage, configuration and internal failures are logged server side and
    /// replaced by a generic message in responses.
    pub fn is_client_safe(&self) -> bool {
        !matches!(
            self,
            ConsultaError::StorageError(_)
                | ConsultaError::ConfigError(_)
                | ConsultaError::InternalError(_)
        )
    }
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ConsultaError {
    fn status_code(&self) -> u16 {
        match self {
            ConsultaError::ValidationError { .. } => 400,
            ConsultaError::ParseError(_) => 400,
            ConsultaError::AuthError(_) => 401,
            ConsultaError::NotFoundError(_) => 404,
            ConsultaError::ConflictError(_) => 409,
            ConsultaError::ProviderError { .. } => 502,
            ConsultaError::StorageError(_) => 500,
            ConsultaError::ConfigError(_) => 500,
            ConsultaError::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for ConsultaError {
    fn from(err: serde_json::Error) -> Self {
        ConsultaError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for ConsultaError {
    fn from(err: std::io::Error) -> Self {
        ConsultaError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> ConsultaError {
    ConsultaError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T, fields: Vec<String>) -> ConsultaError {
    ConsultaError::ValidationError {
        message: message.to_string(),
        fields,
    }
}

pub fn not_found<T: fmt::Display>(message: T) -> ConsultaError {
    ConsultaError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> ConsultaError {
    ConsultaError::ConflictError(message.to_string())
}

pub fn provider_error<T: fmt::Display>(service_name: &str, message: T) -> ConsultaError {
    ConsultaError::ProviderError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn storage_error<T: fmt::Display>(message: T) -> ConsultaError {
    ConsultaError::StorageError(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> ConsultaError {
    ConsultaError::InternalError(message.to_string())
}
