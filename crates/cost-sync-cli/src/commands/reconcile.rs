use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use cost_sync::{CostSync, Notice, Progress, ProgressSink, RunPhase, RunReport, read_records_from_path};
use tracing::{debug, info, warn};

use super::format;
use crate::config::AppConfig;

pub struct ReconcileArgs {
    pub csv: PathBuf,
    pub dry_run: bool,
    pub page_size: Option<u32>,
    pub concurrency: Option<usize>,
}

/// Prints phases and notices, and one line per record as it completes.
/// Asks the run to stop once `stop` is raised, which may happen before
/// matching has even started.
pub struct TerminalSink {
    stop: Arc<AtomicBool>,
}

impl TerminalSink {
    pub fn new(stop: Arc<AtomicBool>) -> Self {
        Self { stop }
    }
}

impl ProgressSink for TerminalSink {
    fn phase(&mut self, phase: RunPhase) {
        match phase {
            RunPhase::Fetching => println!("Fetching catalog..."),
            RunPhase::Indexing => println!("Indexing catalog..."),
            RunPhase::Matching => println!("Matching records..."),
            RunPhase::Idle | RunPhase::Completed => {}
        }
    }

    fn notice(&mut self, notice: Notice) {
        if notice.is_warning() {
            eprintln!("{notice}");
        } else {
            println!("{notice}");
        }
    }

    fn progress(&mut self, progress: Progress<'_>) -> ControlFlow<()> {
        println!(
            "[{}/{}] {}",
            progress.completed, progress.total, progress.outcome
        );
        ControlFlow::Continue(())
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

pub async fn run(config: &AppConfig, args: ReconcileArgs) -> Result<()> {
    // The cost list is validated before anything touches the network.
    let records = read_records_from_path(&args.csv, &config.columns)
        .with_context(|| format!("failed to read {}", args.csv.display()))?;
    if records.is_empty() {
        warn!(path = %args.csv.display(), "cost list contains no records");
    }
    debug!(records = records.len(), dry_run = args.dry_run, "cost list loaded");

    let mut sync = config.sync.clone();
    if let Some(page_size) = args.page_size {
        sync.page_size = page_size;
    }
    if let Some(concurrency) = args.concurrency {
        sync.concurrency = concurrency;
    }

    let shop = config.shopify()?;
    let source = super::catalog_source(shop.clone(), &sync)?;
    let executor = super::update_executor(shop, &sync, args.dry_run)?;

    let stop = Arc::new(AtomicBool::new(false));
    let watcher = tokio::spawn(watch_interrupt(Arc::clone(&stop)));
    let mut sink = TerminalSink::new(stop);

    let result = CostSync::new(source.as_ref(), executor.as_ref())
        .with_pacing(sync.pacing())
        .with_options(sync.run_options())
        .run(&records, &mut sink)
        .await;
    watcher.abort();

    let report = result?;
    finish(&report, records.len())
}

/// Prints the summary and turns failed updates into a non-zero exit.
pub fn finish(report: &RunReport, total: usize) -> Result<()> {
    println!();
    if report.cancelled {
        eprintln!(
            "Stopped after {} of {total} records.",
            report.outcomes.len()
        );
    }
    println!("{}", format::summary_line(&report.summary, report.dry_run));

    if report.summary.has_failures() {
        anyhow::bail!("{} cost update(s) failed", report.summary.failed);
    }
    Ok(())
}

/// First Ctrl-C stops the run between records; a second one exits at once.
async fn watch_interrupt(stop: Arc<AtomicBool>) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    stop.store(true, Ordering::SeqCst);
    info!("interrupt received, stopping run");
    eprintln!("\nInterrupted: no further records will be updated (Ctrl-C again to abort).");

    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(130);
    }
}
