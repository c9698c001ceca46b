use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::domain::entities::{Account, AccountFlags};
use crate::domain::error::LedgerError;
use crate::use_cases::{
    create_account::CreateAccountUseCase, get_account::GetAccountUseCase,
    post_transfer::PostTransferUseCase,
};

// Estado compartido de la aplicación
pub struct AppState {
    pub create_account_use_case: CreateAccountUseCase,
    pub get_account_use_case: GetAccountUseCase,
    pub post_transfer_use_case: PostTransferUseCase,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}/balance", get(get_balance))
        .route("/internal/transfers", post(internal_transfer))
        .with_state(state) // Inyectamos el estado (Casos de Uso)
}

// DTO de entrada para crear cuenta
#[derive(Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    pub id: u64,
    /// 1 = customer (credit-limited), 2 = bank settlement (debit-limited)
    pub account_type: u16,
}

// Proyección de cuenta para el API público
#[derive(Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: String,
    pub ledger: u32,
    pub code: u16,
    pub flags: String,
    pub debits_pending: u64,
    pub debits_posted: u64,
    pub credits_pending: u64,
    pub credits_posted: u64,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        let flags = match account.flags {
            AccountFlags::DebitsMustNotExceedCredits => "debits_must_not_exceed_credits",
            AccountFlags::CreditsMustNotExceedDebits => "credits_must_not_exceed_debits",
        };
        Self {
            id: account.id.to_string(),
            ledger: account.ledger,
            code: account.code,
            flags: flags.to_string(),
            debits_pending: account.debits_pending,
            debits_posted: account.debits_posted,
            credits_pending: account.credits_pending,
            credits_posted: account.credits_posted,
            timestamp: account.timestamp,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    pub available_balance: String,
    pub reserved_balance: String,
}

// DTO para transferencias internas (seed / pagos del cliente)
#[derive(Deserialize, ToSchema)]
pub struct InternalTransferRequest {
    pub from_account_id: u64,
    pub to_account_id: u64,
    pub amount: f64,
}

// Handler: Crear una cuenta en el motor contable
// POST /accounts
#[utoipa::path(
    post,
    path = "/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Account created or already existed", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid account type")
    )
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .create_account_use_case
        .execute(payload.id, payload.account_type)
        .await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "account_id": payload.id
    }))))
}

// Handler: Proyección completa de una cuenta
// GET /accounts/{id}
#[utoipa::path(
    get,
    path = "/accounts/{id}",
    params(("id" = u64, Path, description = "External account id")),
    responses(
        (status = 200, description = "Account projection", body = AccountResponse),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = state.get_account_use_case.execute(id).await?;

    Ok(Json(ApiResponse::success(account.into())))
}

// Handler: Balance disponible y reservado en formato "$d.cc"
// GET /accounts/{id}/balance
#[utoipa::path(
    get,
    path = "/accounts/{id}/balance",
    params(("id" = u64, Path, description = "External account id")),
    responses(
        (status = 200, description = "Available and reserved balance", body = BalanceResponse),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account = state.get_account_use_case.execute(id).await?;

    Ok(Json(BalanceResponse {
        available_balance: common::money::format_cents(account.available_balance()),
        reserved_balance: common::money::format_cents(account.reserved_balance()),
    }))
}

// Handler: Transferencia interna posted (pagos del cliente hacia el banco)
// POST /internal/transfers
#[utoipa::path(
    post,
    path = "/internal/transfers",
    request_body = InternalTransferRequest,
    responses(
        (status = 200, description = "Transfer posted", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid amount or account")
    )
)]
pub async fn internal_transfer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InternalTransferRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let cents = common::money::dollars_to_cents(payload.amount)
        .map_err(|e| LedgerError::ValidationError(e.to_string()))?;

    state
        .post_transfer_use_case
        .execute(payload.from_account_id, payload.to_account_id, cents)
        .await?;

    Ok(Json(ApiResponse::success(serde_json::json!(null))))
}
