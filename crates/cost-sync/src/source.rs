use std::sync::Arc;

use crate::catalog::{CatalogPage, PageCursor};
use crate::transport::TransportError;

/// Largest page most catalog services accept.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 250;

/// A remote catalog that can be read one page at a time.
///
/// Implementations only know how to fetch a single page for a given
/// cursor; walking the whole catalog is the job of
/// [`Paginator`](crate::fetch::Paginator).
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable label identifying this catalog.
    fn label(&self) -> &str;

    /// Upper bound on the page size the service will honor.
    fn max_page_size(&self) -> u32 {
        DEFAULT_MAX_PAGE_SIZE
    }

    /// Fetch one page. `None` requests the first page.
    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
        page_size: u32,
    ) -> Result<CatalogPage, TransportError>;
}

#[async_trait::async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn max_page_size(&self) -> u32 {
        (**self).max_page_size()
    }

    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
        page_size: u32,
    ) -> Result<CatalogPage, TransportError> {
        (**self).fetch_page(cursor, page_size).await
    }
}
