use crate::domain::entities::Account;
use crate::domain::error::LedgerError;
use crate::domain::store::AccountingStore;
use std::sync::Arc;

/// Caso de uso para consultar la proyección de una cuenta.
pub struct GetAccountUseCase {
    store: Arc<dyn AccountingStore>,
}

impl GetAccountUseCase {
    pub fn new(store: Arc<dyn AccountingStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, account_id: u64) -> Result<Account, LedgerError> {
        let ledger_id = common::ids::account_ledger_id(account_id);
        let results = self.store.lookup_accounts(&[ledger_id]).await?;

        results
            .into_iter()
            .next()
            .flatten()
            .ok_or(LedgerError::AccountNotFound(ledger_id))
    }
}
