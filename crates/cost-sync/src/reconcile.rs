use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::event::{Notice, Progress, ProgressSink, RunPhase};
use crate::executor::UpdateExecutor;
use crate::fetch::{FetchError, Paginator};
use crate::index::{CatalogIndex, DuplicateSkuPolicy, IndexError, IndexStats};
use crate::outcome::{RunSummary, UpdateOutcome};
use crate::pacing::{FixedDelay, PagePacing};
use crate::record::{LocalRecord, ValidationError};
use crate::source::{CatalogSource, DEFAULT_MAX_PAGE_SIZE};

/// Errors that abort a whole run. Per-record failures never end up here;
/// they become [`UpdateOutcome::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("catalog fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("catalog index failed: {0}")]
    Index(#[from] IndexError),
}

/// Tunables for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub page_size: u32,
    pub max_pages: Option<usize>,
    pub duplicate_policy: DuplicateSkuPolicy,
    /// Updates allowed in flight at once. Outcomes stay in input order.
    pub concurrency: usize,
    /// Minimum spacing between the start of two update calls.
    pub update_interval: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_MAX_PAGE_SIZE,
            max_pages: None,
            duplicate_policy: DuplicateSkuPolicy::default(),
            concurrency: 1,
            update_interval: Duration::ZERO,
        }
    }
}

/// Result of matching a record set against an index.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub outcomes: Vec<UpdateOutcome>,
    pub summary: RunSummary,
    /// True when the sink stopped the run before every record was handled.
    pub cancelled: bool,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<UpdateOutcome>,
    pub summary: RunSummary,
    pub catalog: IndexStats,
    pub cancelled: bool,
    pub dry_run: bool,
}

/// Spaces out update dispatches across concurrent tasks.
struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    async fn ready(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.interval).await;
        }
        *last = Some(Instant::now());
    }
}

/// Matches local records against a built index and dispatches updates.
pub struct Reconciler<'a> {
    executor: &'a dyn UpdateExecutor,
    concurrency: usize,
    throttle: Throttle,
}

impl<'a> Reconciler<'a> {
    pub fn new(executor: &'a dyn UpdateExecutor) -> Self {
        Self {
            executor,
            concurrency: 1,
            throttle: Throttle::new(Duration::ZERO),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.throttle = Throttle::new(interval);
        self
    }

    /// Produces one outcome per record, in input order, reporting each to
    /// `sink` as soon as it is known.
    ///
    /// Once the sink asks to stop, no further record is dispatched. Updates
    /// already in flight are awaited and their outcomes kept, so every write
    /// that was sent is accounted for.
    pub async fn reconcile(
        &self,
        records: &[LocalRecord],
        index: &CatalogIndex,
        sink: &mut dyn ProgressSink,
    ) -> Reconciliation {
        let total = records.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut summary = RunSummary::default();
        let stop = AtomicBool::new(sink.should_stop());

        let mut pending = pin!(
            stream::iter(records)
                .map(|record| self.resolve(record, index, &stop))
                .buffered(self.concurrency)
        );

        while let Some(outcome) = pending.next().await {
            // Skipped after a stop request.
            let Some(outcome) = outcome else {
                continue;
            };

            summary.record(&outcome);
            let completed = outcomes.len() + 1;

            let flow = sink.progress(Progress {
                outcome: &outcome,
                completed,
                total,
            });
            outcomes.push(outcome);

            if flow.is_break() || sink.should_stop() {
                stop.store(true, Ordering::SeqCst);
            }
        }

        let cancelled = outcomes.len() < total;
        if cancelled {
            info!(completed = outcomes.len(), total, "run stopped by caller");
        }

        Reconciliation {
            outcomes,
            summary,
            cancelled,
        }
    }

    /// `None` when the run was stopped before this record was dispatched.
    async fn resolve(
        &self,
        record: &LocalRecord,
        index: &CatalogIndex,
        stop: &AtomicBool,
    ) -> Option<UpdateOutcome> {
        if stop.load(Ordering::SeqCst) {
            return None;
        }

        let sku = record.part_number.trim();

        let Some(item) = index.lookup(sku) else {
            return Some(UpdateOutcome::NotFound {
                part_number: record.part_number.clone(),
            });
        };

        self.throttle.ready().await;
        if stop.load(Ordering::SeqCst) {
            return None;
        }

        let outcome = match self.executor.apply(item, record.cost).await {
            Ok(()) => UpdateOutcome::Updated {
                sku: sku.to_owned(),
                cost: record.cost,
                inventory_item_id: item,
            },
            Err(e) => {
                warn!(
                    part_number = %record.part_number,
                    inventory_item = %item,
                    error = %e,
                    "cost update failed"
                );
                UpdateOutcome::Failed {
                    part_number: record.part_number.clone(),
                    error: e.to_string(),
                }
            }
        };
        Some(outcome)
    }
}

/// A full reconciliation run: fetch the catalog, index it, then match and
/// update every record.
pub struct CostSync<'a> {
    source: &'a dyn CatalogSource,
    executor: &'a dyn UpdateExecutor,
    pacing: Arc<dyn PagePacing>,
    options: RunOptions,
}

impl<'a> CostSync<'a> {
    pub fn new(source: &'a dyn CatalogSource, executor: &'a dyn UpdateExecutor) -> Self {
        Self {
            source,
            executor,
            pacing: Arc::new(FixedDelay::default()),
            options: RunOptions::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Arc<dyn PagePacing>) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Walks the whole catalog and builds the index. Either the complete
    /// catalog is indexed or an error is returned; partial catalogs are
    /// never handed out.
    pub async fn build_index(&self, sink: &mut dyn ProgressSink) -> Result<CatalogIndex, RunError> {
        sink.phase(RunPhase::Fetching);
        info!(source = self.source.label(), "fetching catalog");

        let mut paginator = Paginator::new(self.source, self.options.page_size)
            .with_pacing(Arc::clone(&self.pacing));
        if let Some(max_pages) = self.options.max_pages {
            paginator = paginator.with_max_pages(max_pages);
        }

        let entries: Vec<_> = paginator.entries().try_collect().await?;

        sink.phase(RunPhase::Indexing);
        let index = CatalogIndex::build(entries, self.options.duplicate_policy)?;
        let stats = index.stats();

        info!(
            entries = stats.entries_seen,
            indexed = stats.indexed,
            duplicates = stats.duplicates,
            without_sku = stats.without_sku,
            "catalog indexed"
        );
        sink.notice(Notice::info(format!(
            "indexed {} SKUs from {} catalog entries",
            stats.indexed, stats.entries_seen
        )));

        if stats.duplicates > 0 {
            let kept = match index.policy() {
                DuplicateSkuPolicy::LastSeen => "last-seen",
                _ => "first-seen",
            };
            sink.notice(Notice::warning(format!(
                "{} duplicate SKU(s) in catalog; kept {kept} entries",
                stats.duplicates
            )));
        }

        Ok(index)
    }

    /// Runs `Fetching → Indexing → Matching → Completed`.
    ///
    /// A fetch or index failure jumps straight to `Completed` and returns
    /// the error before any update is attempted.
    pub async fn run(
        &self,
        records: &[LocalRecord],
        sink: &mut dyn ProgressSink,
    ) -> Result<RunReport, RunError> {
        sink.phase(RunPhase::Idle);

        let index = match self.build_index(sink).await {
            Ok(index) => index,
            Err(e) => {
                sink.phase(RunPhase::Completed);
                return Err(e);
            }
        };

        sink.phase(RunPhase::Matching);
        info!(
            records = records.len(),
            executor = self.executor.label(),
            "matching records"
        );

        let reconciliation = Reconciler::new(self.executor)
            .with_concurrency(self.options.concurrency)
            .with_update_interval(self.options.update_interval)
            .reconcile(records, &index, sink)
            .await;

        sink.phase(RunPhase::Completed);
        info!(summary = %reconciliation.summary, "run completed");

        Ok(RunReport {
            outcomes: reconciliation.outcomes,
            summary: reconciliation.summary,
            catalog: index.stats(),
            cancelled: reconciliation.cancelled,
            dry_run: self.executor.is_dry_run(),
        })
    }
}
