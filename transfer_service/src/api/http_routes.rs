use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::use_cases::authorize_payment::AuthorizePaymentUseCase;
use crate::use_cases::present_payment::PresentPaymentUseCase;

// Estado compartido de la aplicación
pub struct AppState {
    pub authorize_payment_use_case: AuthorizePaymentUseCase,
    pub present_payment_use_case: PresentPaymentUseCase,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/accounts/{id}/authorize", post(authorize))
        .route("/accounts/{id}/present", post(present))
        .with_state(state) // Inyectamos el estado (Casos de Uso)
}

// DTO de entrada para autorizar o presentar
#[derive(Deserialize, ToSchema)]
pub struct AmountRequest {
    /// Monto en dólares; se convierte a centavos con floor.
    pub amount: f64,
}

// Handler: Autorizar una compra (reserva fondos en el ledger)
// POST /accounts/{id}/authorize
#[utoipa::path(
    post,
    path = "/accounts/{id}/authorize",
    params(("id" = u64, Path, description = "Customer account id")),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Authorization workflow started", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Insufficient balance or invalid amount"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<AmountRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let workflow_id = state
        .authorize_payment_use_case
        .execute(id, payload.amount)
        .await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "workflow_id": workflow_id
    }))))
}

// Handler: Presentar un monto capturado (liquida la autorización que calza)
// POST /accounts/{id}/present
#[utoipa::path(
    post,
    path = "/accounts/{id}/present",
    params(("id" = u64, Path, description = "Customer account id")),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Presentment workflow started", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Account or matching authorization not found")
    )
)]
pub async fn present(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<AmountRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let workflow_id = state
        .present_payment_use_case
        .execute(id, payload.amount)
        .await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "workflow_id": workflow_id
    }))))
}
