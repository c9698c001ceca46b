use crate::domain::entities::{AccountKind, NewAccount};
use crate::domain::error::LedgerError;
use crate::domain::store::{AccountingStore, CreateResult};
use std::sync::Arc;

/// Caso de uso para dar de alta una cuenta en el motor contable.
///
/// El alta es idempotente: si el id ya existe con los mismos campos, la
/// operación es éxito. Un mismo id con tipo distinto se rechaza.
pub struct CreateAccountUseCase {
    store: Arc<dyn AccountingStore>,
}

impl CreateAccountUseCase {
    pub fn new(store: Arc<dyn AccountingStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, account_id: u64, account_type: u16) -> Result<(), LedgerError> {
        let kind = AccountKind::from_code(account_type).ok_or_else(|| {
            LedgerError::ValidationError(format!(
                "account_type must be 1 (customer) or 2 (bank settlement), got {}",
                account_type
            ))
        })?;

        let account = NewAccount {
            id: common::ids::account_ledger_id(account_id),
            kind,
        };

        let results = self.store.create_accounts(&[account]).await?;
        match results.into_iter().next() {
            Some(CreateResult::Created) | Some(CreateResult::AlreadyExists) => Ok(()),
            Some(CreateResult::Rejected(reason)) => Err(LedgerError::Rejected(reason)),
            None => Err(LedgerError::StoreError(
                "empty result from create_accounts".to_string(),
            )),
        }
    }
}
