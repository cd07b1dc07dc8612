mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::reconcile::ReconcileArgs;

#[derive(Parser)]
#[command(name = "cost-sync")]
#[command(about = "Reconcile a local cost list against a Shopify catalog")]
struct Cli {
    /// Config file (defaults to ~/.config/cost-sync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match a CSV cost list against the catalog and write costs
    Reconcile {
        /// CSV file with part number and cost columns
        csv: PathBuf,
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Catalog page size (capped at 250)
        #[arg(long)]
        page_size: Option<u32>,
        /// Updates allowed in flight at once
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// List catalog variants with their SKUs and inventory items
    Catalog {
        /// Stop after this many variants
        #[arg(long)]
        limit: Option<usize>,
        /// Catalog page size (capped at 250)
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Validate a CSV cost list and show its first rows
    Preview {
        /// CSV file with part number and cost columns
        csv: PathBuf,
        /// Rows to show
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app_config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Reconcile {
            csv,
            dry_run,
            page_size,
            concurrency,
        } => {
            let args = ReconcileArgs {
                csv,
                dry_run,
                page_size,
                concurrency,
            };
            commands::reconcile::run(&app_config, args).await
        }
        Command::Catalog { limit, page_size } => {
            commands::catalog::run(&app_config, limit, page_size).await
        }
        Command::Preview { csv, rows } => commands::preview::run(&app_config, &csv, rows),
    }
}
