use std::sync::Arc;

use anyhow::Result;
use cost_sync::{CatalogEntry, CatalogSource, FetchError, PagePacing, Paginator};
use futures::{StreamExt, TryStreamExt};

use super::format;
use crate::config::AppConfig;

pub async fn run(config: &AppConfig, limit: Option<usize>, page_size: Option<u32>) -> Result<()> {
    let source = super::catalog_source(config.shopify()?, &config.sync)?;
    let page_size = page_size.unwrap_or(config.sync.page_size);

    println!("Fetching variants from {}...", source.label());
    let entries = collect_entries(source.as_ref(), page_size, config.sync.pacing(), limit).await?;

    format::print_catalog_table(&entries);
    Ok(())
}

/// Walks the catalog, stopping as soon as `limit` entries are in hand so
/// no further pages are requested.
pub async fn collect_entries(
    source: &dyn CatalogSource,
    page_size: u32,
    pacing: Arc<dyn PagePacing>,
    limit: Option<usize>,
) -> Result<Vec<CatalogEntry>, FetchError> {
    let entries = Paginator::new(source, page_size)
        .with_pacing(pacing)
        .entries();

    match limit {
        Some(n) => entries.take(n).try_collect().await,
        None => entries.try_collect().await,
    }
}
