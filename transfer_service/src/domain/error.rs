use thiserror::Error;

/// Error unificado del transfer service.
///
/// Las variantes conservan el tipo de fallo a través de las capas: los
/// rechazos del ledger son terminales, los fallos de transporte y base de
/// datos son transitorios y elegibles para retry de activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("account {0} not found")]
    AccountNotFound(u64),

    #[error("no transfer found for given authorization")]
    NoMatchingAuthorization,

    #[error("insufficient balance")]
    InsufficientBalance,

    /// El ledger rechazó la escritura; ningún retry cambia el resultado.
    #[error("ledger rejected the transfer: {0}")]
    LedgerRejected(String),

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("transfer repository error: {0}")]
    RepositoryError(String),

    #[error("signal delivery failed: {0}")]
    SignalDelivery(String),

    #[error("activity deadline exceeded")]
    DeadlineExceeded,
}

impl TransferError {
    /// Los fallos transitorios se reintentan bajo la política de la activity;
    /// el resto es terminal para el workflow.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransferError::LedgerUnavailable(_)
                | TransferError::RepositoryError(_)
                | TransferError::SignalDelivery(_)
                | TransferError::DeadlineExceeded
        )
    }
}
