use crate::domain::entities::LedgerTransfer;
use crate::domain::error::LedgerError;
use crate::domain::store::{AccountingStore, CreateResult};
use std::sync::Arc;
use uuid::Uuid;

/// Caso de uso para transferencias internas posted (un solo paso).
///
/// El débito va a la cuenta *destino*: en el ledger de tarjetas, un pago del
/// cliente hacia el banco acredita la cuenta del cliente y le restaura
/// crédito disponible, mientras el activo del banco crece como débito.
pub struct PostTransferUseCase {
    store: Arc<dyn AccountingStore>,
}

impl PostTransferUseCase {
    pub fn new(store: Arc<dyn AccountingStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        from_account: u64,
        to_account: u64,
        amount_cents: u64,
    ) -> Result<(), LedgerError> {
        if amount_cents == 0 {
            return Err(LedgerError::ValidationError(
                "amount must be at least one cent".to_string(),
            ));
        }

        let transfer = LedgerTransfer::posted(
            common::ids::transfer_ledger_id(Uuid::new_v4()),
            common::ids::account_ledger_id(to_account),
            common::ids::account_ledger_id(from_account),
            amount_cents,
        );

        let results = self.store.create_transfers(&[transfer]).await?;
        match results.into_iter().next() {
            Some(CreateResult::Created) | Some(CreateResult::AlreadyExists) => Ok(()),
            Some(CreateResult::Rejected(reason)) => Err(LedgerError::Rejected(reason)),
            None => Err(LedgerError::StoreError(
                "empty result from create_transfers".to_string(),
            )),
        }
    }
}
