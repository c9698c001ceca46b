use crate::domain::entities::TransactionType;
use crate::domain::error::TransferError;
use crate::domain::gateways::LedgerGateway;
use crate::use_cases::submit_transfer::SubmitTransferUseCase;
use std::sync::Arc;
use uuid::Uuid;

/// Caso de uso del endpoint de autorización.
///
/// Prevalida en el borde: convierte el monto a centavos (floor), verifica que
/// la cuenta exista y que el balance disponible alcance, y recién entonces
/// despacha el workflow de autorización. La validación dura de fondos la
/// repite el ledger al congelar; este chequeo evita arrancar workflows que
/// van a fallar seguro.
pub struct AuthorizePaymentUseCase {
    ledger_gateway: Arc<dyn LedgerGateway>,
    submit_transfer: SubmitTransferUseCase,
}

impl AuthorizePaymentUseCase {
    pub fn new(
        ledger_gateway: Arc<dyn LedgerGateway>,
        submit_transfer: SubmitTransferUseCase,
    ) -> Self {
        Self {
            ledger_gateway,
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

        let balances = self.ledger_gateway.get_account(account_id).await?;
        if balances.available() < cents {
            return Err(TransferError::InsufficientBalance);
        }

        self.submit_transfer
            .execute(TransactionType::CreditCardAuthorization, account_id, cents)
            .await
    }
}
