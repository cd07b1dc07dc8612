use std::fmt;

use crate::catalog::InventoryItemId;
use crate::record::Cost;

/// What happened to one local record.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated {
        sku: String,
        cost: Cost,
        inventory_item_id: InventoryItemId,
    },
    NotFound {
        part_number: String,
    },
    Failed {
        part_number: String,
        error: String,
    },
}

impl UpdateOutcome {
    /// The record key this outcome belongs to.
    pub fn part_number(&self) -> &str {
        match self {
            Self::Updated { sku, .. } => sku,
            Self::NotFound { part_number } | Self::Failed { part_number, .. } => part_number,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated {
                sku,
                cost,
                inventory_item_id,
            } => write!(f, "updated {sku}: cost {cost} (inventory item {inventory_item_id})"),
            Self::NotFound { part_number } => {
                write!(f, "no catalog SKU matches part number {part_number}")
            }
            Self::Failed { part_number, error } => write!(f, "failed {part_number}: {error}"),
        }
    }
}

/// Per-category counts over a run's outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub updated: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &UpdateOutcome) {
        match outcome {
            UpdateOutcome::Updated { .. } => self.updated += 1,
            UpdateOutcome::NotFound { .. } => self.not_found += 1,
            UpdateOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.updated + self.not_found + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl<'a> FromIterator<&'a UpdateOutcome> for RunSummary {
    fn from_iter<I: IntoIterator<Item = &'a UpdateOutcome>>(iter: I) -> Self {
        let mut summary = Self::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} not found, {} failed",
            self.updated, self.not_found, self.failed
        )
    }
}
