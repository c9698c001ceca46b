use crate::domain::entities::{PaymentDetails, TransactionType};
use crate::domain::error::TransferError;
use crate::domain::gateways::WorkflowRuntime;
use crate::workflows::WorkflowSettings;
use std::sync::Arc;
use uuid::Uuid;

/// Orquestador de transferencias: punto de entrada único hacia el runtime.
///
/// Genera la identidad del workflow (UUID v4) y despacha el workflow que
/// corresponde al tipo de transacción. La llamada retorna cuando el workflow
/// quedó arrancado, no cuando termina: la durabilidad fire-and-forget la da
/// el runtime.
#[derive(Clone)]
pub struct SubmitTransferUseCase {
    runtime: Arc<dyn WorkflowRuntime>,
    settings: Arc<WorkflowSettings>,
}

impl SubmitTransferUseCase {
    pub fn new(runtime: Arc<dyn WorkflowRuntime>, settings: Arc<WorkflowSettings>) -> Self {
        Self { runtime, settings }
    }

    pub async fn execute(
        &self,
        txn_type: TransactionType,
        customer_account: u64,
        amount_cents: u64,
    ) -> Result<Uuid, TransferError> {
        let workflow_id = Uuid::new_v4();

        let details = PaymentDetails {
            workflow_id,
            source_account: customer_account,
            target_account: self.settings.bank_account_id,
            amount: amount_cents,
        };

        match txn_type {
            TransactionType::CreditCardAuthorization => {
                self.runtime.start_authorization(details).await?
            }
            TransactionType::CreditCardPresentment => {
                self.runtime.start_presentment(details).await?
            }
        }

        Ok(workflow_id)
    }
}
