use crate::domain::entities::{TransferProgress, TransferRecord};
use crate::domain::error::TransferError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Fila cruda de la tabla `transfers`. Los montos y cuentas viven como
/// BIGINT en Postgres; la conversión a dominio valida signo y progreso.
#[derive(Debug, FromRow)]
pub struct TransferModel {
    pub id: Uuid,
    pub debit_account_id: i64,
    pub credit_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub transfer_progress: String,
}

impl TryFrom<TransferModel> for TransferRecord {
    type Error = TransferError;

    fn try_from(m: TransferModel) -> Result<Self, Self::Error> {
        let progress: TransferProgress = m
            .transfer_progress
            .parse()
            .map_err(TransferError::RepositoryError)?;

        let to_u64 = |value: i64, field: &str| -> Result<u64, TransferError> {
            u64::try_from(value).map_err(|_| {
                TransferError::RepositoryError(format!(
                    "negative {} in transfers row {}",
                    field, m.id
                ))
            })
        };

        Ok(Self {
            id: m.id,
            debit_account_id: to_u64(m.debit_account_id, "debit_account_id")?,
            credit_account_id: to_u64(m.credit_account_id, "credit_account_id")?,
            amount: to_u64(m.amount, "amount")?,
            created_at: m.created_at,
            progress,
        })
    }
}
