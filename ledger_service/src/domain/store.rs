use crate::domain::entities::{Account, LedgerTransfer, NewAccount};
use crate::domain::error::{LedgerError, RejectReason};
use async_trait::async_trait;

/// Resultado por elemento de una operación de creación id-keyed.
///
/// `AlreadyExists` es éxito para el caller: la operación ya fue aplicada por
/// un intento anterior con el mismo id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateResult {
    Created,
    AlreadyExists,
    Rejected(RejectReason),
}

impl CreateResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CreateResult::Created | CreateResult::AlreadyExists)
    }
}

// Port for the deterministic double-entry accounting engine.
// Batch, id-keyed operations; results align with the input by index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountingStore: Send + Sync {
    async fn create_accounts(
        &self,
        accounts: &[NewAccount],
    ) -> Result<Vec<CreateResult>, LedgerError>;

    async fn lookup_accounts(&self, ids: &[u128]) -> Result<Vec<Option<Account>>, LedgerError>;

    async fn create_transfers(
        &self,
        transfers: &[LedgerTransfer],
    ) -> Result<Vec<CreateResult>, LedgerError>;

    async fn lookup_transfers(
        &self,
        ids: &[u128],
    ) -> Result<Vec<Option<LedgerTransfer>>, LedgerError>;
}
