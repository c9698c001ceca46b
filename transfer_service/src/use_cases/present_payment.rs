use crate::domain::entities::TransactionType;
use crate::domain::error::TransferError;
use crate::domain::gateways::LedgerGateway;
use crate::domain::repository::TransferRepository;
use crate::use_cases::submit_transfer::SubmitTransferUseCase;
use std::sync::Arc;
use uuid::Uuid;

/// Caso de uso del endpoint de presentment.
///
/// Verifica que la cuenta exista y que haya una autorización `initiated` para
/// `(cuenta, monto)` antes de despachar el workflow. Es solo un guard de
/// borde: el match real, con lock de fila, ocurre dentro del matcher.
pub struct PresentPaymentUseCase {
    ledger_gateway: Arc<dyn LedgerGateway>,
    transfer_repo: Arc<dyn TransferRepository>,
    submit_transfer: SubmitTransferUseCase,
}

impl PresentPaymentUseCase {
    pub fn new(
        ledger_gateway: Arc<dyn LedgerGateway>,
        transfer_repo: Arc<dyn TransferRepository>,
        submit_transfer: SubmitTransferUseCase,
    ) -> Self {
        Self {
            ledger_gateway,
            transfer_repo,
            submit_transfer,
        }
    }

    pub async fn execute(&self, account_id: u64, amount: f64) -> Result<Uuid, TransferError> {
        let cents = common::money::dollars_to_cents(amount)
            .map_err(|e| TransferError::ValidationError(e.to_string()))?;
        if cents == 0 {
            return Err(TransferError::ValidationError(
                "amount must be at least one cent".to_string(),
            ));
        }

        self.ledger_gateway.get_account(account_id).await?;

        if self
            .transfer_repo
            .find_initiated(account_id, cents)
            .await?
            .is_none()
        {
            return Err(TransferError::NoMatchingAuthorization);
        }

        self.submit_transfer
            .execute(TransactionType::CreditCardPresentment, account_id, cents)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AccountBalances, TransferProgress, TransferRecord};
    use crate::domain::gateways::{MockLedgerGateway, MockWorkflowRuntime};
    use crate::domain::repository::MockTransferRepository;
    use crate::workflows::WorkflowSettings;
    use chrono::Utc;
    use mockall::predicate::*;

    fn gateway_with_account() -> MockLedgerGateway {
        let mut mock_gateway = MockLedgerGateway::new();
        mock_gateway.expect_get_account().returning(|_| {
            Ok(AccountBalances {
                debits_pending: 2500,
                debits_posted: 0,
                credits_pending: 0,
                credits_posted: 10_000,
            })
        });
        mock_gateway
    }

    fn initiated_record(amount: u64) -> TransferRecord {
        TransferRecord {
            id: uuid::Uuid::new_v4(),
            debit_account_id: 1,
            credit_account_id: 2,
            amount,
            created_at: Utc::now(),
            progress: TransferProgress::Initiated,
        }
    }

    fn submit_with(runtime: MockWorkflowRuntime) -> SubmitTransferUseCase {
        SubmitTransferUseCase::new(Arc::new(runtime), Arc::new(WorkflowSettings::default()))
    }

    #[tokio::test]
    async fn test_present_with_matching_authorization_starts_workflow() {
        let mut mock_repo = MockTransferRepository::new();
        mock_repo
            .expect_find_initiated()
            .with(eq(1u64), eq(2500u64))
            .times(1)
            .returning(|_, _| Ok(Some(initiated_record(2500))));

        let mut mock_runtime = MockWorkflowRuntime::new();
        mock_runtime
            .expect_start_presentment()
            .withf(|details| details.amount == 2500)
            .times(1)
            .returning(|_| Ok(()));

        let use_case = PresentPaymentUseCase::new(
            Arc::new(gateway_with_account()),
            Arc::new(mock_repo),
            submit_with(mock_runtime),
        );

        assert!(use_case.execute(1, 25.0).await.is_ok());
    }

    #[tokio::test]
    async fn test_present_without_authorization_is_not_found() {
        let mut mock_repo = MockTransferRepository::new();
        // Monto distinto al autorizado: no hay fila iniciada que coincida.
        mock_repo
            .expect_find_initiated()
            .with(eq(1u64), eq(2600u64))
            .times(1)
            .returning(|_, _| Ok(None));

        let mock_runtime = MockWorkflowRuntime::new();

        let use_case = PresentPaymentUseCase::new(
            Arc::new(gateway_with_account()),
            Arc::new(mock_repo),
            submit_with(mock_runtime),
        );

        assert_eq!(
            use_case.execute(1, 26.0).await,
            Err(TransferError::NoMatchingAuthorization)
        );
    }

    #[tokio::test]
    async fn test_present_unknown_account_not_found() {
        let mut mock_gateway = MockLedgerGateway::new();
        mock_gateway
            .expect_get_account()
            .times(1)
            .returning(|_| Err(TransferError::AccountNotFound(9)));

        let mock_repo = MockTransferRepository::new();
        let mock_runtime = MockWorkflowRuntime::new();

        let use_case = PresentPaymentUseCase::new(
            Arc::new(mock_gateway),
            Arc::new(mock_repo),
            submit_with(mock_runtime),
        );

        assert_eq!(
            use_case.execute(9, 25.0).await,
            Err(TransferError::AccountNotFound(9))
        );
    }
}
