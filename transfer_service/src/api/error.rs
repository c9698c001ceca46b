use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::TransferError;

// Definimos un error unificado para la API del Transfer Service
pub struct ApiError(pub TransferError);

// Permitimos convertir errores de dominio al ApiError implícitamente
impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.0 {
            TransferError::ValidationError(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            TransferError::InsufficientBalance => (StatusCode::BAD_REQUEST, self.0.to_string()),
            TransferError::AccountNotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            TransferError::NoMatchingAuthorization => (StatusCode::NOT_FOUND, self.0.to_string()),
            TransferError::LedgerRejected(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            TransferError::LedgerUnavailable(ref e) => {
                tracing::error!("Ledger Gateway Error: {}", e);
                (StatusCode::BAD_GATEWAY, self.0.to_string())
            }
            TransferError::RepositoryError(ref e) => {
                tracing::error!("Database Repository Error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            TransferError::SignalDelivery(_) | TransferError::DeadlineExceeded => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "status": "error",
            "message": error_message,
        }));

        (status, body).into_response()
    }
}
