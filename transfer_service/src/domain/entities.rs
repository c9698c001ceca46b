use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Progreso visible de una transferencia en la base relacional.
///
/// Las transiciones solo avanzan; una vez en estado terminal la fila no
/// regresa. `Initiated` e `InProcess` son los únicos estados no terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferProgress {
    Initiated,
    InProcess,
    Settled,
    Cancelled,
    FailedLedgerSettlement,
    FailedLedgerTimeout,
    FailedExternalDb,
    FailedLedgerCancellation,
}

impl TransferProgress {
    /// Estados terminales: persistidos en la columna `transfer_progress` y
    /// usados por el guard monotónico del repositorio.
    pub const TERMINAL: [TransferProgress; 6] = [
        TransferProgress::Settled,
        TransferProgress::Cancelled,
        TransferProgress::FailedLedgerSettlement,
        TransferProgress::FailedLedgerTimeout,
        TransferProgress::FailedExternalDb,
        TransferProgress::FailedLedgerCancellation,
    ];

    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            TransferProgress::Initiated | TransferProgress::InProcess
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferProgress::Initiated => "initiated",
            TransferProgress::InProcess => "in_process",
            TransferProgress::Settled => "settled",
            TransferProgress::Cancelled => "cancelled",
            TransferProgress::FailedLedgerSettlement => "failed_ledger_settlement",
            TransferProgress::FailedLedgerTimeout => "failed_ledger_timeout",
            TransferProgress::FailedExternalDb => "failed_external_db",
            TransferProgress::FailedLedgerCancellation => "failed_ledger_cancellation",
        }
    }
}

impl fmt::Display for TransferProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransferProgress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initiated" => Ok(TransferProgress::Initiated),
            "in_process" => Ok(TransferProgress::InProcess),
            "settled" => Ok(TransferProgress::Settled),
            "cancelled" => Ok(TransferProgress::Cancelled),
            "failed_ledger_settlement" => Ok(TransferProgress::FailedLedgerSettlement),
            "failed_ledger_timeout" => Ok(TransferProgress::FailedLedgerTimeout),
            "failed_external_db" => Ok(TransferProgress::FailedExternalDb),
            "failed_ledger_cancellation" => Ok(TransferProgress::FailedLedgerCancellation),
            other => Err(format!("unknown transfer progress: {}", other)),
        }
    }
}

/// Fila de transferencia por workflow de autorización.
/// El id de la fila es el id del workflow y el id de la reserva en el ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: Uuid,
    pub debit_account_id: u64,
    pub credit_account_id: u64,
    pub amount: u64,
    pub created_at: DateTime<Utc>,
    pub progress: TransferProgress,
}

/// Datos para insertar una fila nueva (el progreso lo decide el caller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransferRecord {
    pub id: Uuid,
    pub debit_account_id: u64,
    pub credit_account_id: u64,
    pub amount: u64,
}

/// Tipo de transacción de tarjeta que el orquestador despacha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    CreditCardAuthorization,
    CreditCardPresentment,
}

/// Parámetros de un workflow de pago.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub workflow_id: Uuid,
    pub source_account: u64,
    pub target_account: u64,
    pub amount: u64,
}

/// Payload entregado por el canal `presentment-<workflow id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentmentSignal {
    pub id: Uuid,
}

/// Proyección de los balances de una cuenta, obtenida vía el ledger gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalances {
    pub debits_pending: u64,
    pub debits_posted: u64,
    pub credits_pending: u64,
    pub credits_posted: u64,
}

impl AccountBalances {
    pub fn available(&self) -> u64 {
        self.credits_posted
            .saturating_sub(self.debits_posted)
            .saturating_sub(self.debits_pending)
    }

    pub fn reserved(&self) -> u64 {
        self.debits_pending
    }
}
