//! Transport retry: re-invokes a model after transient failures.
//!
//! Only rate limiting, timeouts and network errors are retried. Every
//! other [`ModelError`] (bad key, malformed request, empty completion)
//! is returned on the first attempt. The reason-act loop itself never
//! retries, so this wrapper is the only place a model call repeats.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rustedreason_core::error::ModelError;
use rustedreason_core::model::Model;
use tracing::{info, warn};

/// Longest single wait between attempts.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// A model that retries its inner model with exponential backoff.
pub struct RetryModel {
    inner: Arc<dyn Model>,
    retries: u32,
    base_delay: Duration,
}

impl RetryModel {
    /// Wrap `inner`, allowing up to `retries` extra attempts.
    pub fn new(inner: Arc<dyn Model>, retries: u32) -> Self {
        Self {
            inner,
            retries,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Delay before the first retry. Later retries double it.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }

    fn delay_for(&self, retry: u32, error: &ModelError) -> Duration {
        let backoff = self.base_delay.saturating_mul(2u32.saturating_pow(retry));
        let wait = match error {
            ModelError::RateLimited { retry_after_secs } => {
                backoff.max(Duration::from_secs(*retry_after_secs))
            }
            _ => backoff,
        };
        wait.min(MAX_DELAY)
    }
}

/// Whether a failure is worth another attempt.
pub fn is_transient(error: &ModelError) -> bool {
    matches!(
        error,
        ModelError::RateLimited { .. } | ModelError::Timeout(_) | ModelError::Network(_)
    )
}

#[async_trait]
impl Model for RetryModel {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
        let mut retry = 0;
        loop {
            match self.inner.invoke(prompt).await {
                Ok(text) => {
                    if retry > 0 {
                        info!(model = self.inner.name(), attempt = retry + 1, "Model call recovered");
                    }
                    return Ok(text);
                }
                Err(e) if is_transient(&e) && retry < self.retries => {
                    let wait = self.delay_for(retry, &e);
                    warn!(
                        model = self.inner.name(),
                        attempt = retry + 1,
                        total = self.max_attempts(),
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Model call failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails with each queued error in turn, then answers "ok".
    struct FlakyModel {
        failures: Mutex<Vec<ModelError>>,
        calls: AtomicUsize,
    }

    impl FlakyModel {
        fn new(mut failures: Vec<ModelError>) -> Arc<Self> {
            failures.reverse();
            Arc::new(Self {
                failures: Mutex::new(failures),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Model for FlakyModel {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn invoke(&self, _prompt: &str) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failures.lock().unwrap().pop() {
                Some(e) => Err(e),
                None => Ok("ok".into()),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let inner = FlakyModel::new(vec![
            ModelError::Network("connection reset".into()),
            ModelError::RateLimited { retry_after_secs: 1 },
        ]);
        let model = RetryModel::new(inner.clone(), 2);

        assert_eq!(model.invoke("hi").await.unwrap(), "ok");
        assert_eq!(inner.calls(), 3);
        assert_eq!(model.name(), "flaky");
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_the_last_retry() {
        let inner = FlakyModel::new(vec![
            ModelError::Timeout("slow".into()),
            ModelError::Timeout("slow".into()),
            ModelError::Timeout("still slow".into()),
        ]);
        let model = RetryModel::new(inner.clone(), 2);

        let err = model.invoke("hi").await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout(ref m) if m == "still slow"));
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let inner = FlakyModel::new(vec![ModelError::AuthenticationFailed("bad key".into())]);
        let model = RetryModel::new(inner.clone(), 5);

        let err = model.invoke("hi").await.unwrap_err();
        assert!(matches!(err, ModelError::AuthenticationFailed(_)));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn zero_retries_means_one_attempt() {
        let inner = FlakyModel::new(vec![ModelError::Network("down".into())]);
        let model = RetryModel::new(inner.clone(), 0);

        assert!(model.invoke("hi").await.is_err());
        assert_eq!(inner.calls(), 1);
    }

    #[test]
    fn backoff_doubles_and_honours_retry_after() {
        let model = RetryModel::new(FlakyModel::new(vec![]), 3)
            .with_base_delay(Duration::from_millis(100));
        let network = ModelError::Network("x".into());

        assert_eq!(model.delay_for(0, &network), Duration::from_millis(100));
        assert_eq!(model.delay_for(2, &network), Duration::from_millis(400));
        assert_eq!(
            model.delay_for(0, &ModelError::RateLimited { retry_after_secs: 3 }),
            Duration::from_secs(3)
        );
        assert_eq!(
            model.delay_for(0, &ModelError::RateLimited { retry_after_secs: 600 }),
            MAX_DELAY
        );
    }
}
