use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Mutex;

use crate::event::{Notice, Progress, ProgressSink, RunEvent, RunPhase};
use crate::{
    CatalogEntry, CatalogPage, CatalogSource, Cost, InventoryItemId, LocalRecord, PageCursor,
    TransportError, UpdateExecutor,
};

/// Shorthand for a catalog entry whose ids derive from `item`.
pub fn entry(sku: &str, item: u64) -> CatalogEntry {
    CatalogEntry {
        product_id: item * 10,
        title: format!("Product {item}"),
        variant_id: item * 100,
        sku: Some(sku.to_owned()),
        inventory_item_id: InventoryItemId::new(item),
    }
}

pub fn record(part_number: &str, cost: f64) -> LocalRecord {
    LocalRecord::new(part_number, cost_of(cost))
}

pub fn cost_of(value: f64) -> Cost {
    match Cost::new(value) {
        Ok(cost) => cost,
        Err(e) => panic!("invalid test cost {value}: {e}"),
    }
}

/// In-memory paged catalog. Page `n` (1-based) is reached with cursor
/// `page-n`; every request is recorded.
pub struct InMemoryCatalog {
    label: String,
    pages: Vec<Vec<CatalogEntry>>,
    max_page_size: u32,
    failures: HashMap<usize, TransportError>,
    requests: Mutex<Vec<(Option<PageCursor>, u32)>>,
}

impl InMemoryCatalog {
    pub fn paged(label: impl Into<String>, pages: Vec<Vec<CatalogEntry>>) -> Self {
        Self {
            label: label.into(),
            pages,
            max_page_size: crate::source::DEFAULT_MAX_PAGE_SIZE,
            failures: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A catalog served as a single page.
    pub fn single(label: impl Into<String>, entries: Vec<CatalogEntry>) -> Self {
        Self::paged(label, vec![entries])
    }

    pub fn with_max_page_size(mut self, max: u32) -> Self {
        self.max_page_size = max;
        self
    }

    /// Make the request for 1-based page `page` fail with `error`.
    pub fn failing_on_page(mut self, page: usize, error: TransportError) -> Self {
        self.failures.insert(page, error);
        self
    }

    pub fn requests(&self) -> Vec<(Option<PageCursor>, u32)> {
        self.requests.lock().unwrap().clone()
    }

    fn page_number(cursor: Option<&PageCursor>) -> Option<usize> {
        match cursor {
            None => Some(1),
            Some(c) => c.as_str().strip_prefix("page-")?.parse().ok(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogSource for InMemoryCatalog {
    fn label(&self) -> &str {
        &self.label
    }

    fn max_page_size(&self) -> u32 {
        self.max_page_size
    }

    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
        page_size: u32,
    ) -> Result<CatalogPage, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((cursor.cloned(), page_size));

        let number = Self::page_number(cursor)
            .filter(|n| *n >= 1 && *n <= self.pages.len().max(1))
            .ok_or_else(|| TransportError::status(400, "invalid page_info"))?;

        if let Some(error) = self.failures.get(&number) {
            return Err(error.clone());
        }

        let entries = self.pages.get(number - 1).cloned().unwrap_or_default();
        let next_cursor =
            (number < self.pages.len()).then(|| PageCursor::new(format!("page-{}", number + 1)));

        Ok(CatalogPage {
            entries,
            next_cursor,
            call_limit: None,
        })
    }
}

/// Executor that records every call and fails for chosen items.
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<(InventoryItemId, Cost)>>,
    failures: HashMap<InventoryItemId, TransportError>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, item: u64, error: TransportError) -> Self {
        self.failures.insert(InventoryItemId::new(item), error);
        self
    }

    pub fn calls(&self) -> Vec<(InventoryItemId, Cost)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl UpdateExecutor for RecordingExecutor {
    fn label(&self) -> &str {
        "recording"
    }

    async fn apply(&self, item: InventoryItemId, cost: Cost) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push((item, cost));
        match self.failures.get(&item) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Sink that keeps every event; optionally asks to stop after `n` outcomes.
#[derive(Default)]
pub struct CollectingSink {
    pub events: Vec<RunEvent>,
    stop_after: Option<usize>,
    stop_requested: bool,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stopping_after(n: usize) -> Self {
        Self {
            stop_after: Some(n),
            ..Self::default()
        }
    }

    /// A sink whose stop request is already raised when the run starts.
    pub fn stopped() -> Self {
        Self {
            stop_requested: true,
            ..Self::default()
        }
    }

    pub fn phases(&self) -> Vec<RunPhase> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Phase(phase) => Some(*phase),
                _ => None,
            })
            .collect()
    }

    pub fn progress_counts(&self) -> Vec<(usize, usize)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Progress {
                    completed, total, ..
                } => Some((*completed, *total)),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<&Notice> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Notice(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for CollectingSink {
    fn phase(&mut self, phase: RunPhase) {
        self.events.push(RunEvent::Phase(phase));
    }

    fn notice(&mut self, notice: Notice) {
        self.events.push(RunEvent::Notice(notice));
    }

    fn progress(&mut self, progress: Progress<'_>) -> ControlFlow<()> {
        self.events.push(RunEvent::from(progress));
        match self.stop_after {
            Some(n) if progress.completed >= n => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }

    fn should_stop(&self) -> bool {
        self.stop_requested
    }
}
