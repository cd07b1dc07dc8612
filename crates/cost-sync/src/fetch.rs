use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::catalog::{CatalogEntry, CatalogPage, PageCursor};
use crate::pacing::{FixedDelay, PagePacing};
use crate::source::CatalogSource;
use crate::transport::TransportError;

/// Errors that end a catalog walk.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("catalog walk exceeded {max_pages} pages")]
    PageLimit { max_pages: usize },
}

/// Walks a [`CatalogSource`] page by page, following continuation cursors.
///
/// The resulting streams are lazy: a page is only requested once the
/// consumer has pulled every entry of the page before it. Nothing is
/// retried; the first failure ends the stream. Unless told otherwise, pages
/// are spaced [`DEFAULT_PAGE_DELAY`](crate::pacing::DEFAULT_PAGE_DELAY) apart.
pub struct Paginator<'a> {
    source: &'a dyn CatalogSource,
    page_size: u32,
    pacing: Arc<dyn PagePacing>,
    start: Option<PageCursor>,
    max_pages: Option<usize>,
}

enum Walk {
    Next {
        cursor: Option<PageCursor>,
        delay: Duration,
        fetched: usize,
    },
    Done,
}

impl<'a> Paginator<'a> {
    pub fn new(source: &'a dyn CatalogSource, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            pacing: Arc::new(FixedDelay::default()),
            start: None,
            max_pages: None,
        }
    }

    pub fn with_pacing(mut self, pacing: Arc<dyn PagePacing>) -> Self {
        self.pacing = pacing;
        self
    }

    /// Begin the walk at a previously obtained cursor instead of page one.
    pub fn starting_at(mut self, cursor: PageCursor) -> Self {
        self.start = Some(cursor);
        self
    }

    /// Fail the walk instead of requesting more than `max_pages` pages.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Page size actually sent, clamped to what the source accepts.
    pub fn page_size(&self) -> u32 {
        self.page_size
            .clamp(1, self.source.max_page_size().max(1))
    }

    pub fn pages(self) -> BoxStream<'a, Result<CatalogPage, FetchError>> {
        let page_size = self.page_size();
        let Self {
            source,
            pacing,
            start,
            max_pages,
            ..
        } = self;

        let initial = Walk::Next {
            cursor: start,
            delay: Duration::ZERO,
            fetched: 0,
        };

        stream::try_unfold(initial, move |walk| {
            next_page(source, Arc::clone(&pacing), walk, page_size, max_pages)
        })
        .boxed()
    }

    pub fn entries(self) -> BoxStream<'a, Result<CatalogEntry, FetchError>> {
        self.pages()
            .map_ok(|page| stream::iter(page.entries.into_iter().map(Ok::<_, FetchError>)))
            .try_flatten()
            .boxed()
    }
}

async fn next_page(
    source: &dyn CatalogSource,
    pacing: Arc<dyn PagePacing>,
    walk: Walk,
    page_size: u32,
    max_pages: Option<usize>,
) -> Result<Option<(CatalogPage, Walk)>, FetchError> {
    let Walk::Next {
        cursor,
        delay,
        fetched,
    } = walk
    else {
        return Ok(None);
    };

    if let Some(max_pages) = max_pages
        && fetched >= max_pages
    {
        return Err(FetchError::PageLimit { max_pages });
    }

    if !delay.is_zero() {
        debug!(delay_ms = delay.as_millis() as u64, "pausing before next catalog page");
        tokio::time::sleep(delay).await;
    }

    debug!(
        source = source.label(),
        page = fetched + 1,
        page_size,
        "fetching catalog page"
    );

    let page = source.fetch_page(cursor.as_ref(), page_size).await?;

    debug!(
        source = source.label(),
        entries = page.entries.len(),
        has_next = page.next_cursor.is_some(),
        "fetched catalog page"
    );

    let next = match &page.next_cursor {
        Some(cursor) => Walk::Next {
            cursor: Some(cursor.clone()),
            delay: pacing.delay_after(&page),
            fetched: fetched + 1,
        },
        None => Walk::Done,
    };

    Ok(Some((page, next)))
}
