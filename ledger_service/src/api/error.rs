use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::{LedgerError, RejectReason};

// Definimos un error unificado para la API del Ledger Service
pub struct ApiError(pub LedgerError);

// Permitimos convertir errores de dominio al ApiError implícitamente
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.0 {
            LedgerError::AccountNotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            LedgerError::ValidationError(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            // Mantenemos el mensaje que los clientes del API ya esperan.
            LedgerError::Rejected(RejectReason::InsufficientFunds) => {
                (StatusCode::BAD_REQUEST, "insufficient balance".to_string())
            }
            LedgerError::Rejected(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            LedgerError::StoreError(ref e) => {
                tracing::error!("Accounting store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": error_message,
        }));

        (status, body).into_response()
    }
}
