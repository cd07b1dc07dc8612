use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::catalog::{CatalogPage, InventoryItemId, PageCursor};
use crate::executor::UpdateExecutor;
use crate::record::Cost;
use crate::source::CatalogSource;
use crate::transport::TransportError;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How often and how patiently to repeat a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Backoff before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Err(e) if e.is_transient() && retry < self.max_retries => {
                    let delay = self.delay_for(retry);
                    warn!(
                        what,
                        error = %e,
                        attempt = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                result => return result,
            }
        }
    }
}

/// Wraps a catalog source or an update executor and retries transient
/// failures (network errors, 429, 5xx) according to a [`RetryPolicy`].
pub struct Retry<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retry<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait::async_trait]
impl<S: CatalogSource> CatalogSource for Retry<S> {
    fn label(&self) -> &str {
        self.inner.label()
    }

    fn max_page_size(&self) -> u32 {
        self.inner.max_page_size()
    }

    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
        page_size: u32,
    ) -> Result<CatalogPage, TransportError> {
        self.policy
            .run("catalog page", || self.inner.fetch_page(cursor, page_size))
            .await
    }
}

#[async_trait::async_trait]
impl<E: UpdateExecutor> UpdateExecutor for Retry<E> {
    fn label(&self) -> &str {
        self.inner.label()
    }

    fn is_dry_run(&self) -> bool {
        self.inner.is_dry_run()
    }

    async fn apply(&self, item: InventoryItemId, cost: Cost) -> Result<(), TransportError> {
        self.policy
            .run("cost update", || self.inner.apply(item, cost))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Flaky {
        failures_left: Mutex<u32>,
        error: TransportError,
        calls: Mutex<u32>,
    }

    impl Flaky {
        fn new(failures: u32, error: TransportError) -> Self {
            Self {
                failures_left: Mutex::new(failures),
                error,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl UpdateExecutor for Flaky {
        fn label(&self) -> &str {
            "flaky"
        }

        async fn apply(&self, _item: InventoryItemId, _cost: Cost) -> Result<(), TransportError> {
            *self.calls.lock().unwrap() += 1;
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(self.error.clone());
            }
            Ok(())
        }
    }

    fn quick(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    fn cost() -> Cost {
        Cost::new(1.0).unwrap()
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let executor = Retry::new(Flaky::new(2, TransportError::status(503, "busy")), quick(3));

        let result = executor.apply(InventoryItemId::new(1), cost()).await;

        assert!(result.is_ok());
        assert_eq!(executor.into_inner().calls(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let executor = Retry::new(Flaky::new(5, TransportError::status(429, "slow down")), quick(2));

        let result = executor.apply(InventoryItemId::new(1), cost()).await;

        assert_eq!(result.unwrap_err().status_code(), Some(429));
        assert_eq!(executor.into_inner().calls(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let executor = Retry::new(Flaky::new(1, TransportError::status(422, "invalid")), quick(3));

        let result = executor.apply(InventoryItemId::new(1), cost()).await;

        assert!(result.is_err());
        assert_eq!(executor.into_inner().calls(), 1);
    }

    #[tokio::test]
    async fn zero_retries_is_a_passthrough() {
        let executor = Retry::new(Flaky::new(1, TransportError::Network("reset".into())), quick(0));

        assert!(executor.apply(InventoryItemId::new(1), cost()).await.is_err());
        assert_eq!(executor.into_inner().calls(), 1);
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1));
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(10), MAX_BACKOFF);
    }
}
