use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use mockall::mock;
use mockall::predicate::*;
use std::sync::Arc;
use transfer_service::api::http_routes::{authorize, present, AmountRequest, AppState};
use transfer_service::domain::entities::{
    AccountBalances, NewTransferRecord, PaymentDetails, TransferProgress, TransferRecord,
};
use transfer_service::domain::error::TransferError;
use transfer_service::domain::gateways::{LedgerGateway, WorkflowRuntime};
use transfer_service::domain::repository::TransferRepository;
use transfer_service::use_cases::authorize_payment::AuthorizePaymentUseCase;
use transfer_service::use_cases::present_payment::PresentPaymentUseCase;
use transfer_service::use_cases::submit_transfer::SubmitTransferUseCase;
use transfer_service::workflows::WorkflowSettings;
use uuid::Uuid;

mock! {
    pub LedgerGatewayImpl {}

    #[async_trait]
    impl LedgerGateway for LedgerGatewayImpl {
        async fn get_account(&self, account_id: u64) -> Result<AccountBalances, TransferError>;
        async fn freeze(
            &self,
            transfer_id: Uuid,
            debit_account_id: u64,
            credit_account_id: u64,
            amount_cents: u64,
        ) -> Result<(), TransferError>;
        async fn settle(&self, settlement_id: Uuid, pending_id: Uuid) -> Result<(), TransferError>;
        async fn void(&self, cancel_id: Uuid, pending_id: Uuid) -> Result<(), TransferError>;
    }
}

mock! {
    pub WorkflowRuntimeImpl {}

    #[async_trait]
    impl WorkflowRuntime for WorkflowRuntimeImpl {
        async fn start_authorization(&self, details: PaymentDetails) -> Result<(), TransferError>;
        async fn start_presentment(&self, details: PaymentDetails) -> Result<(), TransferError>;
    }
}

mock! {
    pub TransferRepositoryImpl {}

    #[async_trait]
    impl TransferRepository for TransferRepositoryImpl {
        async fn insert(&self, record: NewTransferRecord) -> Result<(), TransferError>;
        async fn insert_with_progress(
            &self,
            record: NewTransferRecord,
            progress: TransferProgress,
        ) -> Result<(), TransferError>;
        async fn update_progress(
            &self,
            id: Uuid,
            progress: TransferProgress,
        ) -> Result<(), TransferError>;
        async fn find_by_id(&self, id: Uuid) -> Result<Option<TransferRecord>, TransferError>;
        async fn find_initiated(
            &self,
            debit_account_id: u64,
            amount: u64,
        ) -> Result<Option<TransferRecord>, TransferError>;
    }
}

fn balances(credits_posted: u64) -> AccountBalances {
    AccountBalances {
        debits_pending: 0,
        debits_posted: 0,
        credits_pending: 0,
        credits_posted,
    }
}

fn app_state(
    gateway: MockLedgerGatewayImpl,
    runtime: MockWorkflowRuntimeImpl,
    repo: MockTransferRepositoryImpl,
) -> Arc<AppState> {
    let gateway: Arc<dyn LedgerGateway> = Arc::new(gateway);
    let settings = Arc::new(WorkflowSettings::default());
    let submit = SubmitTransferUseCase::new(Arc::new(runtime), settings);

    Arc::new(AppState {
        authorize_payment_use_case: AuthorizePaymentUseCase::new(gateway.clone(), submit.clone()),
        present_payment_use_case: PresentPaymentUseCase::new(gateway, Arc::new(repo), submit),
    })
}

#[tokio::test]
async fn test_authorize_endpoint_returns_success_envelope() {
    // Arrange
    let mut mock_gateway = MockLedgerGatewayImpl::new();
    mock_gateway
        .expect_get_account()
        .with(eq(1u64))
        .times(1)
        .returning(|_| Ok(balances(10_000)));

    let mut mock_runtime = MockWorkflowRuntimeImpl::new();
    mock_runtime
        .expect_start_authorization()
        .withf(|details| details.amount == 3000)
        .times(1)
        .returning(|_| Ok(()));

    let state = app_state(
        mock_gateway,
        mock_runtime,
        MockTransferRepositoryImpl::new(),
    );

    // Act
    let result = authorize(
        State(state),
        Path(1),
        Json(AmountRequest { amount: 30.0 }),
    )
    .await;

    // Assert
    assert!(result.is_ok(), "El Request debe ser exitoso");
    let body = result.unwrap_or_else(|_| panic!("Expected Ok")).0;
    assert_eq!(body.status, "success");
    assert!(body.data["workflow_id"].is_string());
}

#[tokio::test]
async fn test_authorize_endpoint_rejects_insufficient_balance() {
    // Arrange
    let mut mock_gateway = MockLedgerGatewayImpl::new();
    mock_gateway
        .expect_get_account()
        .times(1)
        .returning(|_| Ok(balances(5000)));

    let state = app_state(
        mock_gateway,
        MockWorkflowRuntimeImpl::new(),
        MockTransferRepositoryImpl::new(),
    );

    // Act
    let result = authorize(
        State(state),
        Path(1),
        Json(AmountRequest { amount: 60.0 }),
    )
    .await;

    // Assert
    let err = match result {
        Err(e) => e,
        Ok(_) => panic!("Expected Err"),
    };
    assert_eq!(err.0, TransferError::InsufficientBalance);
}

#[tokio::test]
async fn test_present_endpoint_requires_a_matching_authorization() {
    // Arrange
    let mut mock_gateway = MockLedgerGatewayImpl::new();
    mock_gateway
        .expect_get_account()
        .times(1)
        .returning(|_| Ok(balances(10_000)));

    let mut mock_repo = MockTransferRepositoryImpl::new();
    mock_repo
        .expect_find_initiated()
        .with(eq(1u64), eq(2600u64))
        .times(1)
        .returning(|_, _| Ok(None));

    let state = app_state(mock_gateway, MockWorkflowRuntimeImpl::new(), mock_repo);

    // Act
    let result = present(
        State(state),
        Path(1),
        Json(AmountRequest { amount: 26.0 }),
    )
    .await;

    // Assert
    let err = match result {
        Err(e) => e,
        Ok(_) => panic!("Expected Err"),
    };
    assert_eq!(err.0, TransferError::NoMatchingAuthorization);
}

#[tokio::test]
async fn test_present_endpoint_starts_the_presentment_workflow() {
    // Arrange
    let mut mock_gateway = MockLedgerGatewayImpl::new();
    mock_gateway
        .expect_get_account()
        .times(1)
        .returning(|_| Ok(balances(10_000)));

    let mut mock_repo = MockTransferRepositoryImpl::new();
    mock_repo.expect_find_initiated().times(1).returning(|_, _| {
        Ok(Some(TransferRecord {
            id: Uuid::new_v4(),
            debit_account_id: 1,
            credit_account_id: 2,
            amount: 2500,
            created_at: Utc::now(),
            progress: TransferProgress::Initiated,
        }))
    });

    let mut mock_runtime = MockWorkflowRuntimeImpl::new();
    mock_runtime
        .expect_start_presentment()
        .withf(|details| details.amount == 2500)
        .times(1)
        .returning(|_| Ok(()));

    let state = app_state(mock_gateway, mock_runtime, mock_repo);

    // Act
    let result = present(
        State(state),
        Path(1),
        Json(AmountRequest { amount: 25.0 }),
    )
    .await;

    // Assert
    assert!(result.is_ok());
}
