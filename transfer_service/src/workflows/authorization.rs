use crate::domain::entities::{
    NewTransferRecord, PaymentDetails, PresentmentSignal, TransferProgress,
};
use crate::domain::error::TransferError;
use crate::domain::gateways::LedgerGateway;
use crate::domain::repository::TransferRepository;
use crate::workflows::retry::with_retry;
use crate::workflows::WorkflowSettings;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Evento observado por el selector del workflow.
enum Awaited {
    Signal(PresentmentSignal),
    TimedOut,
}

/// Workflow de autorización: una instancia por autorización.
///
/// Identidad: el id del workflow es el id de la transferencia de
/// autorización (la reserva pendiente en el ledger y la fila relacional).
///
/// Máquina de estados: congelar fondos, registrar la fila `initiated`,
/// esperar el presentment o el vencimiento del hold, y liquidar o anular.
/// Cada escritura al ledger lleva un id propio y `AlreadyExists` cuenta como
/// éxito, así cualquier activity puede repetirse tras un crash sin duplicar
/// movimientos.
pub async fn run(
    ledger: Arc<dyn LedgerGateway>,
    records: Arc<dyn TransferRepository>,
    mut presentment_rx: mpsc::Receiver<PresentmentSignal>,
    settings: &WorkflowSettings,
    details: PaymentDetails,
) -> Result<TransferProgress, TransferError> {
    let auth_id = details.workflow_id;
    let policy = &settings.activity_retry;

    // Fase 1: reservar fondos. Un rechazo del ledger (fondos insuficientes,
    // cuenta inexistente) es terminal y el workflow falla sin dejar fila.
    with_retry(policy, || {
        let ledger = ledger.clone();
        let details = details.clone();
        async move {
            ledger
                .freeze(
                    details.workflow_id,
                    details.source_account,
                    details.target_account,
                    details.amount,
                )
                .await
        }
    })
    .await?;

    // Fase 2: registrar la transferencia en la base externa.
    let record = NewTransferRecord {
        id: auth_id,
        debit_account_id: details.source_account,
        credit_account_id: details.target_account,
        amount: details.amount,
    };

    let insert_result = with_retry(policy, || {
        let records = records.clone();
        let record = record.clone();
        async move { records.insert(record).await }
    })
    .await;

    if let Err(insert_err) = insert_result {
        compensate_record_failure(&ledger, &records, settings, &record).await;
        // Devolvemos el fallo original; el resultado de la compensación ya
        // quedó en el log.
        return Err(insert_err);
    }

    // Fase 3: esperar el presentment o el vencimiento del hold.
    let awaited = tokio::select! {
        signal = presentment_rx.recv() => match signal {
            Some(signal) => Awaited::Signal(signal),
            // Canal cerrado por el runtime: equivale a no recibir señal.
            None => Awaited::TimedOut,
        },
        _ = tokio::time::sleep(settings.hold_timeout) => Awaited::TimedOut,
    };

    match awaited {
        Awaited::Signal(signal) if signal.id == auth_id => {
            settle(&ledger, &records, settings, auth_id).await
        }
        Awaited::Signal(signal) => {
            // Señal con id ajeno: no debería ocurrir con el matcher bajo
            // lock de fila, se trata igual que un vencimiento.
            warn!(
                workflow_id = %auth_id,
                signal_id = %signal.id,
                "presentment signal for a different authorization, cancelling"
            );
            cancel(&ledger, &records, settings, auth_id).await
        }
        Awaited::TimedOut => {
            info!(workflow_id = %auth_id, "authorization hold expired, cancelling");
            cancel(&ledger, &records, settings, auth_id).await
        }
    }
}

/// Liquidación: post-pending sobre la reserva y progreso `settled`.
async fn settle(
    ledger: &Arc<dyn LedgerGateway>,
    records: &Arc<dyn TransferRepository>,
    settings: &WorkflowSettings,
    auth_id: Uuid,
) -> Result<TransferProgress, TransferError> {
    let policy = &settings.activity_retry;
    let settlement_id = Uuid::new_v4();

    let settle_result = with_retry(policy, || {
        let ledger = ledger.clone();
        async move { ledger.settle(settlement_id, auth_id).await }
    })
    .await;

    if let Err(settle_err) = settle_result {
        record_progress(
            records,
            settings,
            auth_id,
            TransferProgress::FailedLedgerSettlement,
        )
        .await;
        return Err(settle_err);
    }

    finish(records, settings, auth_id, TransferProgress::Settled).await
}

/// Cancelación: void-pending sobre la reserva y progreso `cancelled`.
async fn cancel(
    ledger: &Arc<dyn LedgerGateway>,
    records: &Arc<dyn TransferRepository>,
    settings: &WorkflowSettings,
    auth_id: Uuid,
) -> Result<TransferProgress, TransferError> {
    let policy = &settings.activity_retry;
    let cancel_id = Uuid::new_v4();

    let void_result = with_retry(policy, || {
        let ledger = ledger.clone();
        async move { ledger.void(cancel_id, auth_id).await }
    })
    .await;

    if let Err(void_err) = void_result {
        record_progress(
            records,
            settings,
            auth_id,
            TransferProgress::FailedLedgerTimeout,
        )
        .await;
        return Err(void_err);
    }

    finish(records, settings, auth_id, TransferProgress::Cancelled).await
}

/// Escribe el progreso terminal del camino feliz. Si la base externa falla,
/// deja `failed_external_db` como mejor esfuerzo: la verdad del dinero ya
/// está en el ledger.
async fn finish(
    records: &Arc<dyn TransferRepository>,
    settings: &WorkflowSettings,
    auth_id: Uuid,
    progress: TransferProgress,
) -> Result<TransferProgress, TransferError> {
    let update_result = with_retry(&settings.activity_retry, || {
        let records = records.clone();
        async move { records.update_progress(auth_id, progress).await }
    })
    .await;

    match update_result {
        Ok(()) => Ok(progress),
        Err(update_err) => {
            record_progress(records, settings, auth_id, TransferProgress::FailedExternalDb).await;
            Err(update_err)
        }
    }
}

/// Compensación de un fallo persistente al registrar la fila: anular la
/// reserva y dejar una fila `failed_ledger_cancellation` como rastro.
async fn compensate_record_failure(
    ledger: &Arc<dyn LedgerGateway>,
    records: &Arc<dyn TransferRepository>,
    settings: &WorkflowSettings,
    record: &NewTransferRecord,
) {
    let policy = &settings.activity_retry;
    let cancel_id = Uuid::new_v4();
    let auth_id = record.id;

    let void_result = with_retry(policy, || {
        let ledger = ledger.clone();
        async move { ledger.void(cancel_id, auth_id).await }
    })
    .await;
    if let Err(void_err) = void_result {
        error!(
            workflow_id = %auth_id,
            error = %void_err,
            "compensating void failed after record failure; reservation requires reconciliation"
        );
    }

    let insert_result = with_retry(policy, || {
        let records = records.clone();
        let record = record.clone();
        async move {
            records
                .insert_with_progress(record, TransferProgress::FailedLedgerCancellation)
                .await
        }
    })
    .await;
    if let Err(record_err) = insert_result {
        error!(
            workflow_id = %auth_id,
            error = %record_err,
            "failed to record the compensation result"
        );
    }
}

/// Escritura de progreso de fallo, mejor esfuerzo: el error original del
/// camino principal es el que viaja hacia arriba.
async fn record_progress(
    records: &Arc<dyn TransferRepository>,
    settings: &WorkflowSettings,
    auth_id: Uuid,
    progress: TransferProgress,
) {
    let result = with_retry(&settings.activity_retry, || {
        let records = records.clone();
        async move { records.update_progress(auth_id, progress).await }
    })
    .await;

    if let Err(err) = result {
        error!(
            workflow_id = %auth_id,
            ?progress,
            error = %err,
            "failed to record terminal progress"
        );
    }
}
