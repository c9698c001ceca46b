use crate::domain::entities::{
    NewTransferRecord, PresentmentSignal, TransferProgress, TransferRecord,
};
use crate::domain::error::TransferError;
use crate::domain::gateways::WorkflowSignaler;
use crate::domain::repository::{MatchOutcome, PresentmentMatcher, TransferRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Repositorio de transferencias en memoria con la misma semántica que el de
/// PostgreSQL: insert idempotente sobre id y guard monotónico de progreso.
/// Respalda los tests de integración del flujo completo.
pub struct InMemoryTransferRepository {
    rows: Mutex<HashMap<Uuid, TransferRecord>>,
}

impl InMemoryTransferRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTransferRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn oldest_initiated(
    rows: &HashMap<Uuid, TransferRecord>,
    debit_account_id: u64,
    amount: u64,
) -> Option<TransferRecord> {
    rows.values()
        .filter(|r| {
            r.progress == TransferProgress::Initiated
                && r.debit_account_id == debit_account_id
                && r.amount == amount
        })
        .min_by_key(|r| r.created_at)
        .cloned()
}

#[async_trait]
impl TransferRepository for InMemoryTransferRepository {
    async fn insert(&self, record: NewTransferRecord) -> Result<(), TransferError> {
        self.insert_with_progress(record, TransferProgress::Initiated)
            .await
    }

    async fn insert_with_progress(
        &self,
        record: NewTransferRecord,
        progress: TransferProgress,
    ) -> Result<(), TransferError> {
        let mut rows = self.rows.lock().await;
        // on-conflict-do-nothing
        rows.entry(record.id).or_insert_with(|| TransferRecord {
            id: record.id,
            debit_account_id: record.debit_account_id,
            credit_account_id: record.credit_account_id,
            amount: record.amount,
            created_at: Utc::now(),
            progress,
        });
        Ok(())
    }

    async fn update_progress(
        &self,
        id: Uuid,
        progress: TransferProgress,
    ) -> Result<(), TransferError> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows.get_mut(&id) {
            if !row.progress.is_terminal() {
                row.progress = progress;
            }
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TransferRecord>, TransferError> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn find_initiated(
        &self,
        debit_account_id: u64,
        amount: u64,
    ) -> Result<Option<TransferRecord>, TransferError> {
        let rows = self.rows.lock().await;
        Ok(oldest_initiated(&rows, debit_account_id, amount))
    }
}

/// Matcher en memoria: el mutex del repositorio hace de lock de fila, se
/// retiene desde la selección hasta el cambio a `in_process`.
pub struct InMemoryPresentmentMatcher {
    repository: Arc<InMemoryTransferRepository>,
    signaler: Arc<dyn WorkflowSignaler>,
}

impl InMemoryPresentmentMatcher {
    pub fn new(
        repository: Arc<InMemoryTransferRepository>,
        signaler: Arc<dyn WorkflowSignaler>,
    ) -> Self {
        Self {
            repository,
            signaler,
        }
    }
}

#[async_trait]
impl PresentmentMatcher for InMemoryPresentmentMatcher {
    async fn match_and_signal(
        &self,
        debit_account_id: u64,
        amount: u64,
    ) -> Result<MatchOutcome, TransferError> {
        let mut rows = self.repository.rows.lock().await;

        let Some(row) = oldest_initiated(&rows, debit_account_id, amount) else {
            return Ok(MatchOutcome::NoMatch);
        };

        // Si la entrega falla, soltamos el lock sin tocar la fila (rollback).
        self.signaler
            .signal_presentment(row.id, PresentmentSignal { id: row.id })
            .await?;

        if let Some(row) = rows.get_mut(&row.id) {
            row.progress = TransferProgress::InProcess;
        }

        Ok(MatchOutcome::Matched(row.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateways::MockWorkflowSignaler;
    use mockall::predicate::*;

    fn record(id: Uuid, amount: u64) -> NewTransferRecord {
        NewTransferRecord {
            id,
            debit_account_id: 1,
            credit_account_id: 2,
            amount,
        }
    }

    #[tokio::test]
    async fn test_insert_is_idempotent_on_id() {
        let repo = InMemoryTransferRepository::new();
        let id = Uuid::new_v4();

        repo.insert(record(id, 1000)).await.unwrap();
        repo.update_progress(id, TransferProgress::Settled)
            .await
            .unwrap();
        // Replay del insert: no pisa la fila existente.
        repo.insert(record(id, 1000)).await.unwrap();

        let row = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(row.progress, TransferProgress::Settled);
    }

    #[tokio::test]
    async fn test_terminal_progress_never_regresses() {
        let repo = InMemoryTransferRepository::new();
        let id = Uuid::new_v4();

        repo.insert(record(id, 1000)).await.unwrap();
        repo.update_progress(id, TransferProgress::Cancelled)
            .await
            .unwrap();
        repo.update_progress(id, TransferProgress::InProcess)
            .await
            .unwrap();

        let row = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(row.progress, TransferProgress::Cancelled);
    }

    #[tokio::test]
    async fn test_matcher_picks_the_oldest_initiated_row() {
        let repo = Arc::new(InMemoryTransferRepository::new());
        let older = Uuid::new_v4();
        let newer = Uuid::new_v4();

        repo.insert(record(older, 1000)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.insert(record(newer, 1000)).await.unwrap();

        let mut mock_signaler = MockWorkflowSignaler::new();
        mock_signaler
            .expect_signal_presentment()
            .with(eq(older), always())
            .times(1)
            .returning(|_, _| Ok(()));

        let matcher = InMemoryPresentmentMatcher::new(repo.clone(), Arc::new(mock_signaler));
        let outcome = matcher.match_and_signal(1, 1000).await.unwrap();

        assert_eq!(outcome, MatchOutcome::Matched(older));
        assert_eq!(
            repo.find_by_id(older).await.unwrap().unwrap().progress,
            TransferProgress::InProcess
        );
        assert_eq!(
            repo.find_by_id(newer).await.unwrap().unwrap().progress,
            TransferProgress::Initiated
        );
    }

    #[tokio::test]
    async fn test_claimed_row_is_not_rematched() {
        let repo = Arc::new(InMemoryTransferRepository::new());
        let only = Uuid::new_v4();
        repo.insert(record(only, 1000)).await.unwrap();

        let mut mock_signaler = MockWorkflowSignaler::new();
        mock_signaler
            .expect_signal_presentment()
            .times(1)
            .returning(|_, _| Ok(()));

        let matcher = InMemoryPresentmentMatcher::new(repo.clone(), Arc::new(mock_signaler));

        assert_eq!(
            matcher.match_and_signal(1, 1000).await.unwrap(),
            MatchOutcome::Matched(only)
        );
        // La fila ya está en in_process: un segundo match no encuentra nada.
        assert_eq!(
            matcher.match_and_signal(1, 1000).await.unwrap(),
            MatchOutcome::NoMatch
        );
    }

    #[tokio::test]
    async fn test_failed_signal_leaves_row_initiated() {
        let repo = Arc::new(InMemoryTransferRepository::new());
        let id = Uuid::new_v4();
        repo.insert(record(id, 1000)).await.unwrap();

        let mut mock_signaler = MockWorkflowSignaler::new();
        mock_signaler
            .expect_signal_presentment()
            .times(1)
            .returning(|_, _| Err(TransferError::SignalDelivery("no listener".into())));

        let matcher = InMemoryPresentmentMatcher::new(repo.clone(), Arc::new(mock_signaler));
        let result = matcher.match_and_signal(1, 1000).await;

        assert!(matches!(result, Err(TransferError::SignalDelivery(_))));
        assert_eq!(
            repo.find_by_id(id).await.unwrap().unwrap().progress,
            TransferProgress::Initiated
        );
    }

    #[tokio::test]
    async fn test_no_match_for_different_amount() {
        let repo = Arc::new(InMemoryTransferRepository::new());
        repo.insert(record(Uuid::new_v4(), 2500)).await.unwrap();

        let matcher = InMemoryPresentmentMatcher::new(
            repo.clone(),
            Arc::new(MockWorkflowSignaler::new()),
        );

        assert_eq!(
            matcher.match_and_signal(1, 2600).await.unwrap(),
            MatchOutcome::NoMatch
        );
    }
}
