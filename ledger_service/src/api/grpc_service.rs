// Definicion del servicio gRPC para comunicacion inter-servicios.
// El transfer service consume este contrato desde sus activities.

use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::api::proto::ledger::ledger_server::Ledger;
use crate::api::proto::ledger::{
    transfer_ack, AccountSnapshot, FinalizeRequest, FreezeFundsRequest, GetAccountRequest,
    TransferAck,
};
use crate::domain::error::LedgerError;
use crate::use_cases::{
    freeze_amount::FreezeAmountUseCase, get_account::GetAccountUseCase,
    settle_transfer::SettleTransferUseCase, void_transfer::VoidTransferUseCase, WriteOutcome,
};

pub struct LedgerGrpcService {
    get_account_use_case: GetAccountUseCase,
    freeze_amount_use_case: FreezeAmountUseCase,
    settle_transfer_use_case: SettleTransferUseCase,
    void_transfer_use_case: VoidTransferUseCase,
}

impl LedgerGrpcService {
    pub fn new(
        get_account_use_case: GetAccountUseCase,
        freeze_amount_use_case: FreezeAmountUseCase,
        settle_transfer_use_case: SettleTransferUseCase,
        void_transfer_use_case: VoidTransferUseCase,
    ) -> Self {
        Self {
            get_account_use_case,
            freeze_amount_use_case,
            settle_transfer_use_case,
            void_transfer_use_case,
        }
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(raw)
        .map_err(|_| Status::invalid_argument(format!("invalid transfer id: {}", raw)))
}

fn ack(outcome: WriteOutcome) -> TransferAck {
    let outcome = match outcome {
        WriteOutcome::Created => transfer_ack::Outcome::Ok,
        WriteOutcome::AlreadyExists => transfer_ack::Outcome::AlreadyExists,
    };
    TransferAck {
        outcome: outcome as i32,
        detail: String::new(),
    }
}

// Los rechazos del motor viajan dentro del TransferAck para que el cliente
// los distinga de fallos de transporte; todo lo demás se vuelve un Status.
fn write_result(result: Result<WriteOutcome, LedgerError>) -> Result<Response<TransferAck>, Status> {
    match result {
        Ok(outcome) => Ok(Response::new(ack(outcome))),
        Err(LedgerError::Rejected(reason)) => Ok(Response::new(TransferAck {
            outcome: transfer_ack::Outcome::Rejected as i32,
            detail: reason.to_string(),
        })),
        Err(LedgerError::ValidationError(msg)) => Err(Status::invalid_argument(msg)),
        Err(other) => Err(Status::unavailable(other.to_string())),
    }
}

#[tonic::async_trait]
impl Ledger for LedgerGrpcService {
    async fn get_account(
        &self,
        request: Request<GetAccountRequest>,
    ) -> Result<Response<AccountSnapshot>, Status> {
        let req = request.into_inner();

        let account = self
            .get_account_use_case
            .execute(req.account_id)
            .await
            .map_err(|e| match e {
                LedgerError::AccountNotFound(_) => Status::not_found(e.to_string()),
                other => Status::unavailable(other.to_string()),
            })?;

        Ok(Response::new(AccountSnapshot {
            account_id: req.account_id,
            code: account.code as u32,
            debits_pending: account.debits_pending,
            debits_posted: account.debits_posted,
            credits_pending: account.credits_pending,
            credits_posted: account.credits_posted,
        }))
    }

    async fn freeze_funds(
        &self,
        request: Request<FreezeFundsRequest>,
    ) -> Result<Response<TransferAck>, Status> {
        let req = request.into_inner();
        let transfer_id = parse_uuid(&req.transfer_id)?;

        write_result(
            self.freeze_amount_use_case
                .execute(
                    transfer_id,
                    req.debit_account_id,
                    req.credit_account_id,
                    req.amount_cents,
                )
                .await,
        )
    }

    async fn settle_transfer(
        &self,
        request: Request<FinalizeRequest>,
    ) -> Result<Response<TransferAck>, Status> {
        let req = request.into_inner();
        let transfer_id = parse_uuid(&req.transfer_id)?;
        let pending_id = parse_uuid(&req.pending_transfer_id)?;

        write_result(
            self.settle_transfer_use_case
                .execute(transfer_id, pending_id)
                .await,
        )
    }

    async fn void_transfer(
        &self,
        request: Request<FinalizeRequest>,
    ) -> Result<Response<TransferAck>, Status> {
        let req = request.into_inner();
        let transfer_id = parse_uuid(&req.transfer_id)?;
        let pending_id = parse_uuid(&req.pending_transfer_id)?;

        write_result(
            self.void_transfer_use_case
                .execute(transfer_id, pending_id)
                .await,
        )
    }
}
