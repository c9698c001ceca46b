use crate::domain::entities::{NewTransferRecord, TransferProgress, TransferRecord};
use crate::domain::error::TransferError;
use crate::domain::repository::TransferRepository;
use crate::infrastructure::persistence::models::TransferModel;
use crate::infrastructure::persistence::with_deadline;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Repositorio de transferencias implementado para PostgreSQL.
///
/// Utiliza consultas SQL parametrizadas directas con `sqlx` (Runtime-checked)
/// y `sqlx::query_as` para mapear los resultados a `TransferModel`. Toda
/// operación corre bajo el deadline de la base relacional.
pub struct PostgresTransferRepository {
    /// Pool de conexiones a la base de datos PostgreSQL.
    pool: PgPool,
}

impl PostgresTransferRepository {
    /// Crea una nueva instancia del repositorio.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Guard monotónico: una fila en estado terminal nunca regresa. El UPDATE
/// simplemente no afecta filas y eso no es un error.
const NOT_TERMINAL_GUARD: &str = "transfer_progress NOT IN ('settled', 'cancelled', \
     'failed_ledger_settlement', 'failed_ledger_timeout', 'failed_external_db', \
     'failed_ledger_cancellation')";

#[async_trait]
impl TransferRepository for PostgresTransferRepository {
    /// Inserta una fila nueva en estado `initiated` (INSERT).
    ///
    /// Idempotente sobre `id`: un replay de la activity no duplica la fila.
    async fn insert(&self, record: NewTransferRecord) -> Result<(), TransferError> {
        with_deadline(
            sqlx::query(
                r#"
                INSERT INTO transfers (id, debit_account_id, credit_account_id, amount)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(record.id)
            .bind(record.debit_account_id as i64)
            .bind(record.credit_account_id as i64)
            .bind(record.amount as i64)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    /// Inserta con un progreso inicial explícito.
    ///
    /// Lo usa la compensación del workflow para dejar rastro de una reserva
    /// anulada cuando el insert normal falló.
    async fn insert_with_progress(
        &self,
        record: NewTransferRecord,
        progress: TransferProgress,
    ) -> Result<(), TransferError> {
        with_deadline(
            sqlx::query(
                r#"
                INSERT INTO transfers (id, debit_account_id, credit_account_id, amount, transfer_progress)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(record.id)
            .bind(record.debit_account_id as i64)
            .bind(record.credit_account_id as i64)
            .bind(record.amount as i64)
            .bind(progress.as_str())
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    /// Avanza el progreso de una fila (UPDATE con guard monotónico).
    async fn update_progress(
        &self,
        id: Uuid,
        progress: TransferProgress,
    ) -> Result<(), TransferError> {
        let query = format!(
            "UPDATE transfers SET transfer_progress = $1 WHERE id = $2 AND {}",
            NOT_TERMINAL_GUARD
        );

        with_deadline(
            sqlx::query(&query)
                .bind(progress.as_str())
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    /// Busca una transferencia por su ID único (UUID).
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TransferRecord>, TransferError> {
        let model_opt = with_deadline(
            sqlx::query_as::<_, TransferModel>(r#"SELECT * FROM transfers WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?;

        model_opt.map(TransferRecord::try_from).transpose()
    }

    /// Fila `initiated` más antigua para `(cuenta débito, monto)`, sin lock.
    async fn find_initiated(
        &self,
        debit_account_id: u64,
        amount: u64,
    ) -> Result<Option<TransferRecord>, TransferError> {
        let model_opt = with_deadline(
            sqlx::query_as::<_, TransferModel>(
                r#"
                SELECT * FROM transfers
                WHERE debit_account_id = $1 AND amount = $2 AND transfer_progress = 'initiated'
                ORDER BY created_at ASC
                LIMIT 1
                "#,
            )
            .bind(debit_account_id as i64)
            .bind(amount as i64)
            .fetch_optional(&self.pool),
        )
        .await?;

        model_opt.map(TransferRecord::try_from).transpose()
    }
}
