pub mod in_memory;
pub mod matcher;
pub mod models;
pub mod transfer_repository;

use crate::domain::error::TransferError;
use std::future::Future;
use std::time::Duration;

/// Deadline de toda operación contra la base relacional.
pub(crate) const DB_DEADLINE: Duration = Duration::from_secs(2);

/// Aplica el deadline y unifica el error de sqlx en el error de dominio.
pub(crate) async fn with_deadline<T, Fut>(operation: Fut) -> Result<T, TransferError>
where
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(DB_DEADLINE, operation).await {
        Ok(result) => result.map_err(|e| TransferError::RepositoryError(e.to_string())),
        Err(_) => Err(TransferError::RepositoryError(
            "database operation timed out".to_string(),
        )),
    }
}
