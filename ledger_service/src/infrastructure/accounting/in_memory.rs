use crate::domain::entities::{
    Account, AccountFlags, LedgerTransfer, NewAccount, TransferFlag, LEDGER_NUMBER,
};
use crate::domain::error::{LedgerError, RejectReason};
use crate::domain::store::{AccountingStore, CreateResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// Motor contable de doble entrada en memoria.
///
/// Implementa el contrato completo del motor externo: transferencias en dos
/// fases, restricciones de dirección de balance al momento de la
/// transferencia y finalización única de cada transferencia pendiente.
/// Respalda el arranque local y los tests de integración.
pub struct InMemoryAccountingStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<u128, Account>,
    transfers: HashMap<u128, LedgerTransfer>,
    finalized_pending: HashSet<u128>,
}

impl InMemoryAccountingStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl Default for InMemoryAccountingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn create_account(&mut self, account: &NewAccount) -> CreateResult {
        if let Some(existing) = self.accounts.get(&account.id) {
            // Alta idempotente: mismo id con los mismos campos es éxito.
            if existing.code == account.kind.code() && existing.flags == account.kind.flags() {
                return CreateResult::AlreadyExists;
            }
            return CreateResult::Rejected(RejectReason::ExistsWithDifferentFields);
        }

        self.accounts.insert(
            account.id,
            Account {
                id: account.id,
                ledger: LEDGER_NUMBER,
                code: account.kind.code(),
                flags: account.kind.flags(),
                debits_pending: 0,
                debits_posted: 0,
                credits_pending: 0,
                credits_posted: 0,
                timestamp: Utc::now(),
            },
        );
        CreateResult::Created
    }

    fn create_transfer(&mut self, transfer: &LedgerTransfer) -> CreateResult {
        if self.transfers.contains_key(&transfer.id) {
            return CreateResult::AlreadyExists;
        }

        match transfer.flag {
            TransferFlag::Posted | TransferFlag::Pending => self.create_first_phase(transfer),
            TransferFlag::PostPending | TransferFlag::VoidPending => {
                self.finalize_pending(transfer)
            }
        }
    }

    fn create_first_phase(&mut self, transfer: &LedgerTransfer) -> CreateResult {
        if transfer.amount == 0 {
            return CreateResult::Rejected(RejectReason::InvalidAmount);
        }
        if !self.accounts.contains_key(&transfer.debit_account_id)
            || !self.accounts.contains_key(&transfer.credit_account_id)
        {
            return CreateResult::Rejected(RejectReason::AccountNotFound);
        }

        let debit = &self.accounts[&transfer.debit_account_id];
        let credit = &self.accounts[&transfer.credit_account_id];

        if let Some(reason) = check_debit_limit(debit, transfer.amount) {
            return CreateResult::Rejected(reason);
        }
        if let Some(reason) = check_credit_limit(credit, transfer.amount) {
            return CreateResult::Rejected(reason);
        }

        let pending = transfer.flag == TransferFlag::Pending;
        let debit_sum = if pending {
            debit.debits_pending
        } else {
            debit.debits_posted
        };
        let credit_sum = if pending {
            credit.credits_pending
        } else {
            credit.credits_posted
        };
        let (Some(next_debit), Some(next_credit)) = (
            debit_sum.checked_add(transfer.amount),
            credit_sum.checked_add(transfer.amount),
        ) else {
            return CreateResult::Rejected(RejectReason::Overflow);
        };

        {
            let debit = self.accounts.get_mut(&transfer.debit_account_id).unwrap();
            if pending {
                debit.debits_pending = next_debit;
            } else {
                debit.debits_posted = next_debit;
            }
        }
        {
            let credit = self.accounts.get_mut(&transfer.credit_account_id).unwrap();
            if pending {
                credit.credits_pending = next_credit;
            } else {
                credit.credits_posted = next_credit;
            }
        }

        self.transfers.insert(transfer.id, transfer.clone());
        CreateResult::Created
    }

    fn finalize_pending(&mut self, transfer: &LedgerTransfer) -> CreateResult {
        let Some(pending_id) = transfer.pending_id else {
            return CreateResult::Rejected(RejectReason::PendingNotFound);
        };
        let Some(pending) = self.transfers.get(&pending_id).cloned() else {
            return CreateResult::Rejected(RejectReason::PendingNotFound);
        };
        if pending.flag != TransferFlag::Pending {
            return CreateResult::Rejected(RejectReason::NotPending);
        }
        // Una pendiente se finaliza a lo sumo una vez.
        if self.finalized_pending.contains(&pending_id) {
            return CreateResult::Rejected(RejectReason::PendingAlreadyFinalized);
        }

        let post = transfer.flag == TransferFlag::PostPending;
        {
            let debit = self.accounts.get_mut(&pending.debit_account_id).unwrap();
            debit.debits_pending -= pending.amount;
            if post {
                debit.debits_posted += pending.amount;
            }
        }
        {
            let credit = self.accounts.get_mut(&pending.credit_account_id).unwrap();
            credit.credits_pending -= pending.amount;
            if post {
                credit.credits_posted += pending.amount;
            }
        }

        self.finalized_pending.insert(pending_id);
        self.transfers.insert(
            transfer.id,
            LedgerTransfer {
                id: transfer.id,
                debit_account_id: pending.debit_account_id,
                credit_account_id: pending.credit_account_id,
                amount: pending.amount,
                flag: transfer.flag,
                pending_id: Some(pending_id),
            },
        );
        CreateResult::Created
    }
}

/// La restricción de débito cuenta posted + pending contra credits_posted.
fn check_debit_limit(account: &Account, amount: u64) -> Option<RejectReason> {
    if account.flags != AccountFlags::DebitsMustNotExceedCredits {
        return None;
    }
    let total = account
        .debits_posted
        .checked_add(account.debits_pending)
        .and_then(|t| t.checked_add(amount));
    match total {
        Some(total) if total <= account.credits_posted => None,
        Some(_) => Some(RejectReason::InsufficientFunds),
        None => Some(RejectReason::Overflow),
    }
}

fn check_credit_limit(account: &Account, amount: u64) -> Option<RejectReason> {
    if account.flags != AccountFlags::CreditsMustNotExceedDebits {
        return None;
    }
    let total = account
        .credits_posted
        .checked_add(account.credits_pending)
        .and_then(|t| t.checked_add(amount));
    match total {
        Some(total) if total <= account.debits_posted => None,
        Some(_) => Some(RejectReason::InsufficientFunds),
        None => Some(RejectReason::Overflow),
    }
}

#[async_trait]
impl AccountingStore for InMemoryAccountingStore {
    async fn create_accounts(
        &self,
        accounts: &[NewAccount],
    ) -> Result<Vec<CreateResult>, LedgerError> {
        let mut inner = self.inner.lock().await;
        Ok(accounts.iter().map(|a| inner.create_account(a)).collect())
    }

    async fn lookup_accounts(&self, ids: &[u128]) -> Result<Vec<Option<Account>>, LedgerError> {
        let inner = self.inner.lock().await;
        Ok(ids.iter().map(|id| inner.accounts.get(id).cloned()).collect())
    }

    async fn create_transfers(
        &self,
        transfers: &[LedgerTransfer],
    ) -> Result<Vec<CreateResult>, LedgerError> {
        let mut inner = self.inner.lock().await;
        Ok(transfers.iter().map(|t| inner.create_transfer(t)).collect())
    }

    async fn lookup_transfers(
        &self,
        ids: &[u128],
    ) -> Result<Vec<Option<LedgerTransfer>>, LedgerError> {
        let inner = self.inner.lock().await;
        Ok(ids
            .iter()
            .map(|id| inner.transfers.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOMER: u128 = 1;
    const BANK: u128 = 2;

    async fn store_with_accounts() -> InMemoryAccountingStore {
        let store = InMemoryAccountingStore::new();
        let results = store
            .create_accounts(&[
                NewAccount {
                    id: CUSTOMER,
                    kind: crate::domain::entities::AccountKind::Customer,
                },
                NewAccount {
                    id: BANK,
                    kind: crate::domain::entities::AccountKind::BankSettlement,
                },
            ])
            .await
            .unwrap();
        assert!(results.iter().all(|r| r.is_success()));
        store
    }

    async fn seed(store: &InMemoryAccountingStore, amount: u64) {
        // Pago del cliente al banco: acredita al cliente, debita al banco.
        let results = store
            .create_transfers(&[LedgerTransfer::posted(100, BANK, CUSTOMER, amount)])
            .await
            .unwrap();
        assert_eq!(results[0], CreateResult::Created);
    }

    async fn account(store: &InMemoryAccountingStore, id: u128) -> Account {
        store.lookup_accounts(&[id]).await.unwrap()[0]
            .clone()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_account_is_idempotent() {
        let store = store_with_accounts().await;

        let results = store
            .create_accounts(&[NewAccount {
                id: CUSTOMER,
                kind: crate::domain::entities::AccountKind::Customer,
            }])
            .await
            .unwrap();

        assert_eq!(results[0], CreateResult::AlreadyExists);
    }

    #[tokio::test]
    async fn test_create_account_rejects_conflicting_fields() {
        let store = store_with_accounts().await;

        let results = store
            .create_accounts(&[NewAccount {
                id: CUSTOMER,
                kind: crate::domain::entities::AccountKind::BankSettlement,
            }])
            .await
            .unwrap();

        assert_eq!(
            results[0],
            CreateResult::Rejected(RejectReason::ExistsWithDifferentFields)
        );
    }

    #[tokio::test]
    async fn test_pending_transfer_reserves_funds() {
        let store = store_with_accounts().await;
        seed(&store, 10_000).await;

        let results = store
            .create_transfers(&[LedgerTransfer::pending(200, CUSTOMER, BANK, 3000)])
            .await
            .unwrap();
        assert_eq!(results[0], CreateResult::Created);

        let customer = account(&store, CUSTOMER).await;
        assert_eq!(customer.available_balance(), 7000);
        assert_eq!(customer.reserved_balance(), 3000);
        assert_eq!(customer.debits_posted, 0);
    }

    #[tokio::test]
    async fn test_pending_counts_against_available_balance() {
        let store = store_with_accounts().await;
        seed(&store, 5000).await;

        store
            .create_transfers(&[LedgerTransfer::pending(200, CUSTOMER, BANK, 4000)])
            .await
            .unwrap();

        // Solo quedan $10 disponibles; una reserva de $20 debe rechazarse.
        let results = store
            .create_transfers(&[LedgerTransfer::pending(201, CUSTOMER, BANK, 2000)])
            .await
            .unwrap();

        assert_eq!(
            results[0],
            CreateResult::Rejected(RejectReason::InsufficientFunds)
        );
    }

    #[tokio::test]
    async fn test_freeze_then_settle_posts_the_debit() {
        let store = store_with_accounts().await;
        seed(&store, 10_000).await;

        store
            .create_transfers(&[LedgerTransfer::pending(200, CUSTOMER, BANK, 3000)])
            .await
            .unwrap();
        let results = store
            .create_transfers(&[LedgerTransfer::post_pending(201, 200)])
            .await
            .unwrap();
        assert_eq!(results[0], CreateResult::Created);

        let customer = account(&store, CUSTOMER).await;
        assert_eq!(customer.debits_pending, 0);
        assert_eq!(customer.debits_posted, 3000);
        assert_eq!(customer.available_balance(), 7000);

        let bank = account(&store, BANK).await;
        assert_eq!(bank.credits_posted, 3000);
        assert_eq!(bank.credits_pending, 0);
    }

    #[tokio::test]
    async fn test_freeze_then_void_restores_available_balance() {
        let store = store_with_accounts().await;
        seed(&store, 10_000).await;
        let before = account(&store, CUSTOMER).await.available_balance();

        store
            .create_transfers(&[LedgerTransfer::pending(200, CUSTOMER, BANK, 2500)])
            .await
            .unwrap();
        store
            .create_transfers(&[LedgerTransfer::void_pending(201, 200)])
            .await
            .unwrap();

        let customer = account(&store, CUSTOMER).await;
        assert_eq!(customer.available_balance(), before);
        assert_eq!(customer.debits_pending, 0);
        assert_eq!(customer.debits_posted, 0);
    }

    #[tokio::test]
    async fn test_pending_finalizes_at_most_once() {
        let store = store_with_accounts().await;
        seed(&store, 10_000).await;

        store
            .create_transfers(&[LedgerTransfer::pending(200, CUSTOMER, BANK, 1000)])
            .await
            .unwrap();
        store
            .create_transfers(&[LedgerTransfer::post_pending(201, 200)])
            .await
            .unwrap();

        // Segundo intento de finalización, con cualquier fase, se rechaza.
        let void = store
            .create_transfers(&[LedgerTransfer::void_pending(202, 200)])
            .await
            .unwrap();
        assert_eq!(
            void[0],
            CreateResult::Rejected(RejectReason::PendingAlreadyFinalized)
        );

        let post = store
            .create_transfers(&[LedgerTransfer::post_pending(203, 200)])
            .await
            .unwrap();
        assert_eq!(
            post[0],
            CreateResult::Rejected(RejectReason::PendingAlreadyFinalized)
        );
    }

    #[tokio::test]
    async fn test_transfer_with_same_id_already_exists() {
        let store = store_with_accounts().await;
        seed(&store, 10_000).await;

        let first = store
            .create_transfers(&[LedgerTransfer::pending(200, CUSTOMER, BANK, 1000)])
            .await
            .unwrap();
        assert_eq!(first[0], CreateResult::Created);

        let replay = store
            .create_transfers(&[LedgerTransfer::pending(200, CUSTOMER, BANK, 1000)])
            .await
            .unwrap();
        assert_eq!(replay[0], CreateResult::AlreadyExists);

        // El replay no duplica la reserva.
        assert_eq!(account(&store, CUSTOMER).await.reserved_balance(), 1000);
    }

    #[tokio::test]
    async fn test_transfer_against_unknown_account_rejected() {
        let store = store_with_accounts().await;

        let results = store
            .create_transfers(&[LedgerTransfer::pending(200, 99, BANK, 1000)])
            .await
            .unwrap();

        assert_eq!(
            results[0],
            CreateResult::Rejected(RejectReason::AccountNotFound)
        );
    }

    #[tokio::test]
    async fn test_finalize_unknown_pending_rejected() {
        let store = store_with_accounts().await;

        let results = store
            .create_transfers(&[LedgerTransfer::post_pending(201, 999)])
            .await
            .unwrap();

        assert_eq!(
            results[0],
            CreateResult::Rejected(RejectReason::PendingNotFound)
        );
    }

    #[tokio::test]
    async fn test_finalize_posted_transfer_rejected() {
        let store = store_with_accounts().await;
        seed(&store, 10_000).await;

        // El seed (id 100) es una transferencia posted, no pendiente.
        let results = store
            .create_transfers(&[LedgerTransfer::void_pending(201, 100)])
            .await
            .unwrap();

        assert_eq!(results[0], CreateResult::Rejected(RejectReason::NotPending));
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let store = store_with_accounts().await;
        seed(&store, 10_000).await;

        let results = store
            .create_transfers(&[LedgerTransfer::pending(200, CUSTOMER, BANK, 0)])
            .await
            .unwrap();

        assert_eq!(
            results[0],
            CreateResult::Rejected(RejectReason::InvalidAmount)
        );
    }

    #[tokio::test]
    async fn test_customer_conservation_invariant_holds() {
        let store = store_with_accounts().await;
        seed(&store, 10_000).await;

        // Mezcla de reservas, settlements y voids.
        store
            .create_transfers(&[LedgerTransfer::pending(200, CUSTOMER, BANK, 4000)])
            .await
            .unwrap();
        store
            .create_transfers(&[LedgerTransfer::pending(201, CUSTOMER, BANK, 3000)])
            .await
            .unwrap();
        store
            .create_transfers(&[LedgerTransfer::post_pending(202, 200)])
            .await
            .unwrap();
        store
            .create_transfers(&[LedgerTransfer::void_pending(203, 201)])
            .await
            .unwrap();

        let customer = account(&store, CUSTOMER).await;
        assert!(
            customer.credits_posted >= customer.debits_posted + customer.debits_pending,
            "customer invariant violated: {:?}",
            customer
        );
    }
}
