use crate::domain::entities::LedgerTransfer;
use crate::domain::error::LedgerError;
use crate::domain::store::{AccountingStore, CreateResult};
use crate::use_cases::WriteOutcome;
use std::sync::Arc;
use uuid::Uuid;

/// Caso de uso para la primera fase de una autorización: congelar fondos.
///
/// Crea una transferencia pendiente con el id que aporta el caller, lo que
/// hace la operación segura ante replay: un reintento con el mismo id
/// devuelve `AlreadyExists` sin duplicar la reserva.
pub struct FreezeAmountUseCase {
    store: Arc<dyn AccountingStore>,
}

impl FreezeAmountUseCase {
    pub fn new(store: Arc<dyn AccountingStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        transfer_id: Uuid,
        debit_account: u64,
        credit_account: u64,
        amount_cents: u64,
    ) -> Result<WriteOutcome, LedgerError> {
        if amount_cents == 0 {
            return Err(LedgerError::ValidationError(
                "amount must be at least one cent".to_string(),
            ));
        }

        let transfer = LedgerTransfer::pending(
            common::ids::transfer_ledger_id(transfer_id),
            common::ids::account_ledger_id(debit_account),
            common::ids::account_ledger_id(credit_account),
            amount_cents,
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
