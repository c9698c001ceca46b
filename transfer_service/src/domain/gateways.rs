use crate::domain::entities::{AccountBalances, PaymentDetails, PresentmentSignal};
use crate::domain::error::TransferError;
use async_trait::async_trait;
use uuid::Uuid;

// Port for the ledger (C1). Every write takes a caller-supplied id; the
// implementation folds the ledger's AlreadyExists into success so activities
// can replay safely.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn get_account(&self, account_id: u64) -> Result<AccountBalances, TransferError>;

    /// Crea la transferencia pendiente que reserva fondos.
    async fn freeze(
        &self,
        transfer_id: Uuid,
        debit_account_id: u64,
        credit_account_id: u64,
        amount_cents: u64,
    ) -> Result<(), TransferError>;

    /// Confirma una pendiente (post-pending).
    async fn settle(&self, settlement_id: Uuid, pending_id: Uuid) -> Result<(), TransferError>;

    /// Anula una pendiente (void-pending) y libera la reserva.
    async fn void(&self, cancel_id: Uuid, pending_id: Uuid) -> Result<(), TransferError>;
}

// Port for delivering presentment signals to a waiting workflow. Delivery
// fails if the workflow already finished and abandoned its channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowSignaler: Send + Sync {
    async fn signal_presentment(
        &self,
        workflow_id: Uuid,
        signal: PresentmentSignal,
    ) -> Result<(), TransferError>;
}

// Port for the durable workflow runtime. Submissions are fire-and-forget:
// the call returns once the workflow is started, not when it completes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowRuntime: Send + Sync {
    async fn start_authorization(&self, details: PaymentDetails) -> Result<(), TransferError>;

    async fn start_presentment(&self, details: PaymentDetails) -> Result<(), TransferError>;
}
