pub mod catalog;
pub mod event;
pub mod executor;
pub mod fetch;
pub mod index;
pub mod outcome;
pub mod pacing;
pub mod reconcile;
pub mod record;
pub mod retry;
pub mod source;
pub mod transport;

pub use catalog::{CallLimit, CatalogEntry, CatalogPage, InventoryItemId, PageCursor};
pub use event::{ChannelSink, Notice, NullSink, Progress, ProgressSink, RunEvent, RunPhase};
pub use executor::{DryRunExecutor, UpdateExecutor};
pub use fetch::{FetchError, Paginator};
pub use index::{CatalogIndex, DuplicateSku, DuplicateSkuPolicy, IndexError, IndexStats};
pub use outcome::{RunSummary, UpdateOutcome};
pub use pacing::{CallLimitPacing, DEFAULT_PAGE_DELAY, FixedDelay, PacingMode, PagePacing};
pub use reconcile::{CostSync, Reconciler, Reconciliation, RunError, RunOptions, RunReport};
pub use record::{
    Cost, LocalRecord, RecordColumns, ValidationError, read_records, read_records_from_path,
};
pub use retry::{Retry, RetryPolicy};
pub use source::{CatalogSource, DEFAULT_MAX_PAGE_SIZE};
pub use transport::TransportError;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
