use std::path::Path;

use anyhow::{Context, Result};
use cost_sync::read_records_from_path;

use super::format;
use crate::config::AppConfig;

/// Validates the cost list and shows its first `rows` records.
pub fn run(config: &AppConfig, csv: &Path, rows: usize) -> Result<()> {
    let records = read_records_from_path(csv, &config.columns)
        .with_context(|| format!("failed to read {}", csv.display()))?;

    println!("{} records in {}", records.len(), csv.display());
    if records.is_empty() {
        return Ok(());
    }
    println!();

    let shown = rows.min(records.len());
    format::print_record_table(
        &records[..shown],
        &config.columns.part_number,
        &config.columns.cost,
    );

    if records.len() > shown {
        println!("… {} more", records.len() - shown);
    }

    Ok(())
}
