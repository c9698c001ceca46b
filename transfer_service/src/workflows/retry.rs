use crate::domain::error::TransferError;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::warn;

/// Política de retry de una activity: backoff exponencial con tope y un
/// start-to-close por intento.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub maximum_interval: Duration,
    pub maximum_attempts: u32,
    pub start_to_close_timeout: Duration,
}

impl RetryPolicy {
    /// Activities del workflow de autorización: 1s inicial, 5s máximo,
    /// 5 intentos, 1 minuto por intento.
    pub fn authorization_default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            maximum_interval: Duration::from_secs(5),
            maximum_attempts: 5,
            start_to_close_timeout: Duration::from_secs(60),
        }
    }

    /// Activity del matcher de presentments: 100ms inicial, 2s máximo,
    /// 5 intentos.
    pub fn presentment_default() -> Self {
        Self {
            initial_interval: Duration::from_millis(100),
            maximum_interval: Duration::from_secs(2),
            maximum_attempts: 5,
            start_to_close_timeout: Duration::from_secs(60),
        }
    }
}

/// Ejecuta una activity bajo la política dada.
///
/// Solo los errores con `is_retryable() == true` consumen intentos; un
/// rechazo del ledger corta de inmediato. Exceder el start-to-close de un
/// intento cuenta como fallo transitorio.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, TransferError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransferError>>,
{
    let mut interval = policy.initial_interval;
    let mut attempt: u32 = 1;

    loop {
        let result = match timeout(policy.start_to_close_timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(TransferError::DeadlineExceeded),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.maximum_attempts => {
                warn!(attempt, error = %err, "activity failed, retrying");
                sleep(interval).await;
                interval = (interval * 2).min(policy.maximum_interval);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(maximum_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            initial_interval: Duration::from_millis(1),
            maximum_interval: Duration::from_millis(4),
            maximum_attempts,
            start_to_close_timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn test_transient_error_retries_until_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = with_retry(&fast_policy(5), || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TransferError::LedgerUnavailable("flaky".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_immediately() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), _> = with_retry(&fast_policy(5), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(TransferError::LedgerRejected("insufficient funds".into()))
            }
        })
        .await;

        assert_eq!(
            result,
            Err(TransferError::LedgerRejected("insufficient funds".into()))
        );
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_budget_is_bounded() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), _> = with_retry(&fast_policy(3), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(TransferError::RepositoryError("deadlock".into()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_start_to_close_counts_as_transient_failure() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = with_retry(&fast_policy(2), || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    // Primer intento se cuelga más allá del start-to-close.
                    sleep(Duration::from_secs(5)).await;
                }
                Ok(7)
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
