use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Número de ledger del motor contable. Fijo en 1 para todo el sistema.
pub const LEDGER_NUMBER: u32 = 1;

/// Tipo de cuenta dentro del ledger de tarjetas.
///
/// El código determina los flags de dirección de balance: las cuentas de
/// cliente están limitadas por crédito, la cuenta de liquidación del banco
/// está limitada por débito.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Customer,
    BankSettlement,
}

impl AccountKind {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(AccountKind::Customer),
            2 => Some(AccountKind::BankSettlement),
            _ => None,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            AccountKind::Customer => 1,
            AccountKind::BankSettlement => 2,
        }
    }

    pub fn flags(&self) -> AccountFlags {
        match self {
            AccountKind::Customer => AccountFlags::DebitsMustNotExceedCredits,
            AccountKind::BankSettlement => AccountFlags::CreditsMustNotExceedDebits,
        }
    }
}

/// Restricción de dirección de balance que el motor contable aplica al crear
/// cada transferencia. Las sumas pendientes cuentan para la restricción.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountFlags {
    DebitsMustNotExceedCredits,
    CreditsMustNotExceedDebits,
}

/// Proyección de una cuenta del motor contable.
///
/// Las sumas acumuladas las administra el motor; el núcleo nunca las muta
/// directamente, solo a través de transferencias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: u128,
    pub ledger: u32,
    pub code: u16,
    pub flags: AccountFlags,
    pub debits_pending: u64,
    pub debits_posted: u64,
    pub credits_pending: u64,
    pub credits_posted: u64,
    pub timestamp: DateTime<Utc>,
}

impl Account {
    /// Balance disponible: `credits_posted - debits_posted - debits_pending`.
    pub fn available_balance(&self) -> u64 {
        self.credits_posted
            .saturating_sub(self.debits_posted)
            .saturating_sub(self.debits_pending)
    }

    /// Balance reservado por autorizaciones pendientes.
    pub fn reserved_balance(&self) -> u64 {
        self.debits_pending
    }
}

/// Solicitud de alta de cuenta hacia el motor contable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAccount {
    pub id: u128,
    pub kind: AccountKind,
}

/// Fase de una transferencia de doble entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferFlag {
    /// Transferencia directa: mueve fondos posted en un solo paso.
    Posted,
    /// Primera fase: reserva fondos (sumas pendientes).
    Pending,
    /// Segunda fase: confirma una transferencia pendiente.
    PostPending,
    /// Segunda fase: anula una transferencia pendiente.
    VoidPending,
}

/// Transferencia de doble entrada contra el motor contable.
///
/// Para `PostPending`/`VoidPending` el monto viaja en cero y el motor lo
/// resuelve desde la transferencia pendiente referenciada por `pending_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransfer {
    pub id: u128,
    pub debit_account_id: u128,
    pub credit_account_id: u128,
    pub amount: u64,
    pub flag: TransferFlag,
    pub pending_id: Option<u128>,
}

impl LedgerTransfer {
    pub fn posted(id: u128, debit_account_id: u128, credit_account_id: u128, amount: u64) -> Self {
        Self {
            id,
            debit_account_id,
            credit_account_id,
            amount,
            flag: TransferFlag::Posted,
            pending_id: None,
        }
    }

    pub fn pending(id: u128, debit_account_id: u128, credit_account_id: u128, amount: u64) -> Self {
        Self {
            id,
            debit_account_id,
            credit_account_id,
            amount,
            flag: TransferFlag::Pending,
            pending_id: None,
        }
    }

    pub fn post_pending(id: u128, pending_id: u128) -> Self {
        Self {
            id,
            debit_account_id: 0,
            credit_account_id: 0,
            amount: 0,
            flag: TransferFlag::PostPending,
            pending_id: Some(pending_id),
        }
    }

    pub fn void_pending(id: u128, pending_id: u128) -> Self {
        Self {
            id,
            debit_account_id: 0,
            credit_account_id: 0,
            amount: 0,
            flag: TransferFlag::VoidPending,
            pending_id: Some(pending_id),
        }
    }
}
