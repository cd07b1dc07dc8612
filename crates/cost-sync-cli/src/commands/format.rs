use cost_sync::{CatalogEntry, LocalRecord, RunSummary};

const MAX_TITLE_WIDTH: usize = 40;
const MAX_SKU_WIDTH: usize = 24;
const MAX_PART_WIDTH: usize = 30;

pub fn print_catalog_table(entries: &[CatalogEntry]) {
    if entries.is_empty() {
        println!("No variants found.");
        return;
    }

    let title_width = column_width(entries.iter().map(|e| e.title.as_str()), "Title", MAX_TITLE_WIDTH);
    let sku_width = column_width(
        entries.iter().map(|e| e.sku.as_deref().unwrap_or("")),
        "SKU",
        MAX_SKU_WIDTH,
    );

    println!(
        "{:<12}  {:<title_width$}  {:<12}  {:<sku_width$}  {}",
        "Product", "Title", "Variant", "SKU", "Inventory Item"
    );

    for entry in entries {
        let sku = entry.sku.as_deref().unwrap_or("-");
        println!(
            "{:<12}  {:<title_width$}  {:<12}  {:<sku_width$}  {}",
            entry.product_id,
            truncate(&entry.title, title_width),
            entry.variant_id,
            truncate(sku, sku_width),
            entry.inventory_item_id,
        );
    }

    let without_sku = entries.iter().filter(|e| e.normalized_sku().is_none()).count();
    println!("\n{} variants ({without_sku} without SKU)", entries.len());
}

pub fn print_record_table(records: &[LocalRecord], part_header: &str, cost_header: &str) {
    let part_width = column_width(
        records.iter().map(|r| r.part_number.as_str()),
        part_header,
        MAX_PART_WIDTH,
    );

    println!("{:>6}  {:<part_width$}  {}", "Line", part_header, cost_header);

    for record in records {
        let line = record.line.map(|l| l.to_string()).unwrap_or_default();
        println!(
            "{:>6}  {:<part_width$}  {}",
            line,
            truncate(&record.part_number, part_width),
            record.cost
        );
    }
}

pub fn summary_line(summary: &RunSummary, dry_run: bool) -> String {
    if dry_run {
        format!("Dry run: {summary} (no changes written)")
    } else {
        format!("Done: {summary}")
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str, max: usize) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
        .min(max)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}
