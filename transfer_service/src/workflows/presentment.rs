use crate::domain::entities::PaymentDetails;
use crate::domain::error::TransferError;
use crate::domain::repository::{MatchOutcome, PresentmentMatcher};
use crate::workflows::retry::with_retry;
use crate::workflows::WorkflowSettings;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Workflow de presentment: una sola activity.
///
/// Localiza la autorización pendiente para `(cuenta, monto)` y le entrega la
/// señal. El matcher es transaccional sobre la base relacional y el ledger no
/// se toca, así que no hay compensación: si el retry se agota, el workflow
/// simplemente falla.
///
/// `NoMatch` es determinístico (no hay fila que encontrar) y corta sin
/// consumir el presupuesto de retry.
pub async fn run(
    matcher: Arc<dyn PresentmentMatcher>,
    settings: &WorkflowSettings,
    details: PaymentDetails,
) -> Result<Uuid, TransferError> {
    let outcome = with_retry(&settings.matcher_retry, || {
        let matcher = matcher.clone();
        let details = details.clone();
        async move {
            matcher
                .match_and_signal(details.source_account, details.amount)
                .await
        }
    })
    .await?;

    match outcome {
        MatchOutcome::Matched(authorization_id) => {
            info!(
                workflow_id = %details.workflow_id,
                %authorization_id,
                "presentment matched and signalled"
            );
            Ok(authorization_id)
        }
        MatchOutcome::NoMatch => Err(TransferError::NoMatchingAuthorization),
    }
}
