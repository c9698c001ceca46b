pub mod authorization;
pub mod presentment;
pub mod retry;

use crate::workflows::retry::RetryPolicy;
use std::env;
use std::time::Duration;

/// Duración por defecto del hold de autorización. Valor de desarrollo;
/// producción usa horas o días vía `HOLD_TIMEOUT_SECS`.
const DEFAULT_HOLD_TIMEOUT_SECS: u64 = 100;

/// Cuenta de liquidación del banco por defecto.
const DEFAULT_BANK_ACCOUNT_ID: u64 = 2;

/// Parámetros de los workflows de pago.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Ventana `T_hold`: cuánto espera una autorización su presentment antes
    /// de anularse y liberar la reserva.
    pub hold_timeout: Duration,
    /// Política de retry de las activities del workflow de autorización.
    pub activity_retry: RetryPolicy,
    /// Política de retry del matcher dentro del workflow de presentment.
    pub matcher_retry: RetryPolicy,
    /// Cola de tareas del runtime durable: `<environment>-credit-card-transfer`.
    pub task_queue: String,
    /// Cuenta destino de toda autorización de tarjeta.
    pub bank_account_id: u64,
}

impl WorkflowSettings {
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let hold_timeout_secs = env::var("HOLD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HOLD_TIMEOUT_SECS);

        let bank_account_id = env::var("BANK_ACCOUNT_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BANK_ACCOUNT_ID);

        Self {
            hold_timeout: Duration::from_secs(hold_timeout_secs),
            bank_account_id,
            task_queue: format!("{}-credit-card-transfer", environment),
            ..Self::default()
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            hold_timeout: Duration::from_secs(DEFAULT_HOLD_TIMEOUT_SECS),
            activity_retry: RetryPolicy::authorization_default(),
            matcher_retry: RetryPolicy::presentment_default(),
            task_queue: "development-credit-card-transfer".to_string(),
            bank_account_id: DEFAULT_BANK_ACCOUNT_ID,
        }
    }
}
