use crate::domain::entities::LedgerTransfer;
use crate::domain::error::LedgerError;
use crate::domain::store::{AccountingStore, CreateResult};
use crate::use_cases::WriteOutcome;
use std::sync::Arc;
use uuid::Uuid;

/// Caso de uso para anular una autorización pendiente y liberar la reserva.
pub struct VoidTransferUseCase {
    store: Arc<dyn AccountingStore>,
}

impl VoidTransferUseCase {
    pub fn new(store: Arc<dyn AccountingStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        cancel_id: Uuid,
        pending_id: Uuid,
    ) -> Result<WriteOutcome, LedgerError> {
        let transfer = LedgerTransfer::void_pending(
            common::ids::transfer_ledger_id(cancel_id),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TransferFlag;
    use crate::domain::error::RejectReason;
    use crate::domain::store::MockAccountingStore;

    #[tokio::test]
    async fn test_void_creates_void_pending_transfer() {
        let pending_id = Uuid::new_v4();
        let expected = common::ids::transfer_ledger_id(pending_id);

        let mut mock_store = MockAccountingStore::new();
        mock_store
            .expect_create_transfers()
            .withf(move |transfers| {
                let t = &transfers[0];
                t.flag == TransferFlag::VoidPending && t.pending_id == Some(expected)
            })
            .times(1)
            .returning(|_| Ok(vec![CreateResult::Created]));

        let use_case = VoidTransferUseCase::new(Arc::new(mock_store));

        assert_eq!(
            use_case.execute(Uuid::new_v4(), pending_id).await.unwrap(),
            WriteOutcome::Created
        );
    }

    #[tokio::test]
    async fn test_void_after_settlement_rejected() {
        let mut mock_store = MockAccountingStore::new();
        mock_store.expect_create_transfers().times(1).returning(|_| {
            Ok(vec![CreateResult::Rejected(
                RejectReason::PendingAlreadyFinalized,
            )])
        });

        let use_case = VoidTransferUseCase::new(Arc::new(mock_store));

        assert_eq!(
            use_case.execute(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(LedgerError::Rejected(RejectReason::PendingAlreadyFinalized))
        );
    }
}
