//! Errors of the booking core.

use axum::response::{IntoResponse, Response};
use chrono::NaiveDateTime;
use consulta_common::ConsultaError;
use consulta_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    /// Every field that is missing or malformed, in request order.
    #[error("Invalid or missing fields: {}", .fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Professional not found: {0}")]
    ProfessionalNotFound(String),

    #[error("Booking {0} not found")]
    BookingNotFound(i64),

    #[error("Slot occupied: professional {professional_id} already has a booking overlapping {start_at}")]
    SlotOccupied {
        professional_id: i64,
        start_at: NaiveDateTime,
    },

    #[error("A professional named '{0}' already exists")]
    DuplicateProfessional(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<BookingError> for ConsultaError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation { fields } => ConsultaError::ValidationError {
                message: format!("Invalid or missing fields: {}", fields.join(", ")),
                fields,
            },
            BookingError::BadRequest(message) => ConsultaError::ParseError(message),
            BookingError::ProfessionalNotFound(_) | BookingError::BookingNotFound(_) => {
                ConsultaError::NotFoundError(err.to_string())
            }
            BookingError::SlotOccupied { .. } | BookingError::DuplicateProfessional(_) => {
                ConsultaError::ConflictError(err.to_string())
            }
            BookingError::Configuration(message) => ConsultaError::ConfigError(message),
            BookingError::Storage(DbError::UniqueViolation(message)) => {
                ConsultaError::ConflictError(message)
            }
            BookingError::Storage(db_err) => db_err.into(),
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        ConsultaError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    fn status(err: BookingError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status(BookingError::Validation {
                fields: vec!["rut".to_string()]
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(BookingError::ProfessionalNotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(BookingError::SlotOccupied {
                professional_id: 1,
                start_at: NaiveDate::from_ymd_opt(2024, 6, 10)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(BookingError::DuplicateProfessional("Ana".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(BookingError::Storage(DbError::QueryError("boom".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
