pub mod catalog;
pub mod format;
pub mod preview;
pub mod reconcile;

use std::sync::Arc;

use anyhow::Result;
use cost_sync::{CatalogSource, DryRunExecutor, Retry, UpdateExecutor};
use cost_sync_shopify::{ShopifyCatalog, ShopifyConfig, ShopifyInventory};

use crate::config::SyncSection;

/// The store's catalog, wrapped in retries when configured.
pub fn catalog_source(shop: ShopifyConfig, sync: &SyncSection) -> Result<Arc<dyn CatalogSource>> {
    let catalog: Arc<dyn CatalogSource> = Arc::new(ShopifyCatalog::new(shop)?);

    Ok(match sync.retry_policy() {
        Some(policy) => Arc::new(Retry::new(catalog, policy)),
        None => catalog,
    })
}

/// Live inventory writes, or a dry run that only reports what would change.
pub fn update_executor(
    shop: ShopifyConfig,
    sync: &SyncSection,
    dry_run: bool,
) -> Result<Arc<dyn UpdateExecutor>> {
    if dry_run {
        return Ok(Arc::new(DryRunExecutor));
    }

    let inventory: Arc<dyn UpdateExecutor> = Arc::new(ShopifyInventory::new(shop)?);

    Ok(match sync.retry_policy() {
        Some(policy) => Arc::new(Retry::new(inventory, policy)),
        None => inventory,
    })
}
