use crate::api::proto::ledger::ledger_client::LedgerClient;
use crate::api::proto::ledger::{
    transfer_ack, FinalizeRequest, FreezeFundsRequest, GetAccountRequest, TransferAck,
};
use crate::domain::entities::AccountBalances;
use crate::domain::error::TransferError;
use crate::domain::gateways::LedgerGateway;
use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::Code;
use uuid::Uuid;

/// Gateway gRPC hacia el Ledger Service.
///
/// Pliega el `ALREADY_EXISTS` del ledger en éxito: toda escritura lleva un id
/// del caller y puede repetirse tras un crash sin duplicar movimientos. Un
/// `REJECTED` es terminal y se preserva como `LedgerRejected`.
pub struct GrpcLedgerGateway {
    ledger_url: String,
}

impl GrpcLedgerGateway {
    pub fn new(ledger_url: String) -> Self {
        Self { ledger_url }
    }

    async fn client(&self) -> Result<LedgerClient<Channel>, TransferError> {
        LedgerClient::connect(self.ledger_url.clone())
            .await
            .map_err(|e| {
                TransferError::LedgerUnavailable(format!(
                    "Fallo de conexión al Ledger Service: {}",
                    e
                ))
            })
    }
}

fn transport_error(status: tonic::Status) -> TransferError {
    TransferError::LedgerUnavailable(status.to_string())
}

fn handle_ack(ack: TransferAck) -> Result<(), TransferError> {
    match ack.outcome() {
        transfer_ack::Outcome::Ok | transfer_ack::Outcome::AlreadyExists => Ok(()),
        transfer_ack::Outcome::Rejected => Err(TransferError::LedgerRejected(ack.detail)),
        transfer_ack::Outcome::Unspecified => Err(TransferError::LedgerUnavailable(
            "unspecified transfer outcome".to_string(),
        )),
    }
}

#[async_trait]
impl LedgerGateway for GrpcLedgerGateway {
    async fn get_account(&self, account_id: u64) -> Result<AccountBalances, TransferError> {
        let mut client = self.client().await?;

        match client
            .get_account(GetAccountRequest { account_id })
            .await
        {
            Ok(response) => {
                let snapshot = response.into_inner();
                Ok(AccountBalances {
                    debits_pending: snapshot.debits_pending,
                    debits_posted: snapshot.debits_posted,
                    credits_pending: snapshot.credits_pending,
                    credits_posted: snapshot.credits_posted,
                })
            }
            Err(status) if status.code() == Code::NotFound => {
                Err(TransferError::AccountNotFound(account_id))
            }
            Err(status) => Err(transport_error(status)),
        }
    }

    async fn freeze(
        &self,
        transfer_id: Uuid,
        debit_account_id: u64,
        credit_account_id: u64,
        amount_cents: u64,
    ) -> Result<(), TransferError> {
        let mut client = self.client().await?;

        let ack = client
            .freeze_funds(FreezeFundsRequest {
                transfer_id: transfer_id.to_string(),
                debit_account_id,
                credit_account_id,
                amount_cents,
            })
            .await
            .map_err(transport_error)?
            .into_inner();

        handle_ack(ack)
    }

    async fn settle(&self, settlement_id: Uuid, pending_id: Uuid) -> Result<(), TransferError> {
        let mut client = self.client().await?;

        let ack = client
            .settle_transfer(FinalizeRequest {
                transfer_id: settlement_id.to_string(),
                pending_transfer_id: pending_id.to_string(),
            })
            .await
            .map_err(transport_error)?
            .into_inner();

        handle_ack(ack)
    }

    async fn void(&self, cancel_id: Uuid, pending_id: Uuid) -> Result<(), TransferError> {
        let mut client = self.client().await?;

        let ack = client
            .void_transfer(FinalizeRequest {
                transfer_id: cancel_id.to_string(),
                pending_transfer_id: pending_id.to_string(),
            })
            .await
            .map_err(transport_error)?
            .into_inner();

        handle_ack(ack)
    }
}
