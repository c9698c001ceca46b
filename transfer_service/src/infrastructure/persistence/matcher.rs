use crate::domain::entities::{PresentmentSignal, TransferProgress};
use crate::domain::error::TransferError;
use crate::domain::gateways::WorkflowSignaler;
use crate::domain::repository::{MatchOutcome, PresentmentMatcher};
use crate::infrastructure::persistence::models::TransferModel;
use crate::infrastructure::persistence::with_deadline;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;

/// Matcher de presentments sobre PostgreSQL.
///
/// El orden dentro de la transacción es lo que da la garantía de un solo
/// match: el `FOR UPDATE` retiene la fila desde la selección hasta el commit,
/// así dos presentments concurrentes por el mismo `(cuenta, monto)` nunca
/// señalan la misma autorización. El pase a `in_process` evita reselecciones
/// después del commit.
pub struct PgPresentmentMatcher {
    pool: PgPool,
    signaler: Arc<dyn WorkflowSignaler>,
}

impl PgPresentmentMatcher {
    pub fn new(pool: PgPool, signaler: Arc<dyn WorkflowSignaler>) -> Self {
        Self { pool, signaler }
    }
}

#[async_trait]
impl PresentmentMatcher for PgPresentmentMatcher {
    async fn match_and_signal(
        &self,
        debit_account_id: u64,
        amount: u64,
    ) -> Result<MatchOutcome, TransferError> {
        let mut tx = with_deadline(self.pool.begin()).await?;

        // Fila iniciada más antigua, con lock de fila.
        let row = with_deadline(
            sqlx::query_as::<_, TransferModel>(
                r#"
                SELECT * FROM transfers
                WHERE debit_account_id = $1 AND amount = $2 AND transfer_progress = 'initiated'
                ORDER BY created_at ASC
                LIMIT 1
                FOR UPDATE
                "#,
            )
            .bind(debit_account_id as i64)
            .bind(amount as i64)
            .fetch_optional(&mut *tx),
        )
        .await?;

        let Some(model) = row else {
            let _ = tx.rollback().await;
            return Ok(MatchOutcome::NoMatch);
        };
        let workflow_id = model.id;

        // La señal viaja con el lock tomado; si la entrega falla, la fila
        // queda `initiated` para el siguiente intento.
        if let Err(signal_err) = self
            .signaler
            .signal_presentment(workflow_id, PresentmentSignal { id: workflow_id })
            .await
        {
            warn!(
                %workflow_id,
                error = %signal_err,
                "signal delivery failed, releasing matched row"
            );
            let _ = tx.rollback().await;
            return Err(signal_err);
        }

        with_deadline(
            sqlx::query("UPDATE transfers SET transfer_progress = $1 WHERE id = $2")
                .bind(TransferProgress::InProcess.as_str())
                .bind(workflow_id)
                .execute(&mut *tx),
        )
        .await?;

        with_deadline(tx.commit()).await?;

        Ok(MatchOutcome::Matched(workflow_id))
    }
}
