use crate::domain::entities::{NewTransferRecord, TransferProgress, TransferRecord};
use crate::domain::error::TransferError;
use async_trait::async_trait;
use uuid::Uuid;

// Port for the relational transfer record store.
// Every write is idempotent: inserts are on-conflict-do-nothing and progress
// updates never move a row out of a terminal state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransferRepository: Send + Sync {
    /// Inserta una fila nueva con progreso `initiated`.
    async fn insert(&self, record: NewTransferRecord) -> Result<(), TransferError>;

    /// Inserta con un progreso inicial explícito (usado por la compensación).
    async fn insert_with_progress(
        &self,
        record: NewTransferRecord,
        progress: TransferProgress,
    ) -> Result<(), TransferError>;

    /// Avanza el progreso de una fila. Intentos de salir de un estado
    /// terminal se ignoran sin error.
    async fn update_progress(
        &self,
        id: Uuid,
        progress: TransferProgress,
    ) -> Result<(), TransferError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TransferRecord>, TransferError>;

    /// Fila `initiated` más antigua para `(cuenta débito, monto)`, sin lock.
    /// Es el guard de prevalidación del presentment; el match real con lock
    /// de fila vive en el `PresentmentMatcher`.
    async fn find_initiated(
        &self,
        debit_account_id: u64,
        amount: u64,
    ) -> Result<Option<TransferRecord>, TransferError>;
}

/// Resultado del matcher de presentments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Se localizó una autorización y su workflow recibió la señal.
    Matched(Uuid),
    NoMatch,
}

// Port for the presentment matcher (C3). The implementation owns the store
// transaction: row lock, signal delivery, progress update, commit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresentmentMatcher: Send + Sync {
    async fn match_and_signal(
        &self,
        debit_account_id: u64,
        amount: u64,
    ) -> Result<MatchOutcome, TransferError>;
}
