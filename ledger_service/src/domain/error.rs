use thiserror::Error;

/// Motivo por el que el motor contable rechaza una operación.
///
/// Un rechazo es terminal: ningún reintento cambia el resultado.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("account not found")]
    AccountNotFound,

    #[error("account exists with different fields")]
    ExistsWithDifferentFields,

    #[error("amount must be at least one cent")]
    InvalidAmount,

    #[error("ledger number mismatch")]
    LedgerMismatch,

    #[error("pending transfer not found")]
    PendingNotFound,

    #[error("referenced transfer is not pending")]
    NotPending,

    #[error("pending transfer already finalized")]
    PendingAlreadyFinalized,

    #[error("balance sums would overflow")]
    Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("account {0} not found")]
    AccountNotFound(u128),

    #[error("transfer rejected: {0}")]
    Rejected(RejectReason),

    #[error("accounting store error: {0}")]
    StoreError(String),

    #[error("validation failed: {0}")]
    ValidationError(String),
}
