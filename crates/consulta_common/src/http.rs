use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::{ConsultaError, HttpStatusCode};

/// Extension trait for ConsultaError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for ConsultaError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_message = if self.is_client_safe() {
            self.to_string()
        } else {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        };

        let body = match &self {
            ConsultaError::ValidationError { fields, .. } => json!({
                "error": {
                    "message": error_message,
                    "code": status_code.as_u16(),
                    "fields": fields,
                }
            }),
            _ => json!({
                "error": {
                    "message": error_message,
                    "code": status_code.as_u16(),
                }
            }),
        };

        (status_code, Json(body)).into_response()
    }
}

/// Implement IntoResponse for ConsultaError to make it easier to use in Axum handlers.
impl IntoResponse for ConsultaError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let err = crate::validation_error(
            "invalid booking",
            vec!["rut".to_string(), "email".to_string()],
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 400);
        assert_eq!(body["error"]["fields"], json!(["rut", "email"]));
    }

    #[tokio::test]
    async fn test_storage_error_hides_details() {
        let response = crate::storage_error("no such table: bookings").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_conflict_maps_to_409() {
        let response = crate::conflict("slot occupied").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Conflict: slot occupied");
    }
}
