use crate::domain::entities::LedgerTransfer;
use crate::domain::error::LedgerError;
use crate::domain::store::{AccountingStore, CreateResult};
use crate::use_cases::WriteOutcome;
use std::sync::Arc;
use uuid::Uuid;

/// Caso de uso para la segunda fase de una autorización: liquidarla.
///
/// Crea una transferencia post-pending que confirma la pendiente. El motor
/// garantiza que cada pendiente se finaliza a lo sumo una vez.
pub struct SettleTransferUseCase {
    store: Arc<dyn AccountingStore>,
}

impl SettleTransferUseCase {
    pub fn new(store: Arc<dyn AccountingStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        settlement_id: Uuid,
        pending_id: Uuid,
    ) -> Result<WriteOutcome, LedgerError> {
        let transfer = LedgerTransfer::post_pending(
            common::ids::transfer_ledger_id(settlement_id),
            common::ids::transfer_ledger_id(pending_id),
        );

        let results = self.store.create_transfers(&[transfer]).await?;
        match results.into_iter().next() {
            Some(CreateResult::Created) => Ok(WriteOutcome::Created),
            Some(CreateResult::AlreadyExists) => Ok(WriteOutcome::AlreadyExists),
            Some(CreateResult::Rejected(reason)) => Err(LedgerError::Rejected(reason)),
            None => Err(LedgerError::StoreError(
                "empty result from create_transfers".to_string(),
            )),
        }
    }
}
