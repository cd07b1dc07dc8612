use std::sync::Arc;

use tracing::debug;

use crate::catalog::InventoryItemId;
use crate::record::Cost;
use crate::transport::TransportError;

/// Writes a new cost onto a single inventory item.
///
/// Each call is independent: no read-before-write, no batching, and only
/// the cost field is touched.
#[async_trait::async_trait]
pub trait UpdateExecutor: Send + Sync {
    /// Human-readable label identifying this executor.
    fn label(&self) -> &str;

    /// True when calls have no remote effect.
    fn is_dry_run(&self) -> bool {
        false
    }

    async fn apply(&self, item: InventoryItemId, cost: Cost) -> Result<(), TransportError>;
}

#[async_trait::async_trait]
impl<T: UpdateExecutor + ?Sized> UpdateExecutor for Arc<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn is_dry_run(&self) -> bool {
        (**self).is_dry_run()
    }

    async fn apply(&self, item: InventoryItemId, cost: Cost) -> Result<(), TransportError> {
        (**self).apply(item, cost).await
    }
}

/// Previews updates without touching the remote catalog. Always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

#[async_trait::async_trait]
impl UpdateExecutor for DryRunExecutor {
    fn label(&self) -> &str {
        "dry-run"
    }

    fn is_dry_run(&self) -> bool {
        true
    }

    async fn apply(&self, item: InventoryItemId, cost: Cost) -> Result<(), TransportError> {
        debug!(inventory_item = %item, %cost, "dry run: skipping cost update");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_always_succeeds() {
        let executor = DryRunExecutor;
        let cost = Cost::new(12.5).unwrap();

        assert!(executor.is_dry_run());
        assert!(executor.apply(InventoryItemId::new(1), cost).await.is_ok());
    }

    #[tokio::test]
    async fn arc_delegates_to_inner() {
        let executor: Arc<dyn UpdateExecutor> = Arc::new(DryRunExecutor);
        assert_eq!(executor.label(), "dry-run");
        assert!(executor.is_dry_run());
    }
}
