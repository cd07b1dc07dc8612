use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{CatalogEntry, InventoryItemId};

/// What to do when two catalog entries carry the same (trimmed) SKU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateSkuPolicy {
    /// Keep the entry encountered first in fetch order.
    #[default]
    FirstSeen,
    /// Let later entries replace earlier ones.
    LastSeen,
    /// Refuse to build an index over an ambiguous catalog.
    Reject,
}

/// A SKU that appeared on more than one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSku {
    pub sku: String,
    pub kept: InventoryItemId,
    pub discarded: InventoryItemId,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("SKU {sku:?} is shared by inventory items {first} and {second}")]
    DuplicateSku {
        sku: String,
        first: InventoryItemId,
        second: InventoryItemId,
    },
}

/// Lookup from SKU to the inventory item that carries it.
///
/// SKUs are trimmed on insert and on lookup; comparison is case-sensitive.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    by_sku: HashMap<String, InventoryItemId>,
    policy: DuplicateSkuPolicy,
    duplicates: Vec<DuplicateSku>,
    entries_seen: usize,
    without_sku: usize,
}

impl CatalogIndex {
    pub fn new(policy: DuplicateSkuPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Builds an index from a complete catalog.
    pub fn build(
        entries: impl IntoIterator<Item = CatalogEntry>,
        policy: DuplicateSkuPolicy,
    ) -> Result<Self, IndexError> {
        let mut index = Self::new(policy);
        for entry in entries {
            index.insert(&entry)?;
        }
        Ok(index)
    }

    /// Adds one entry, applying the duplicate policy.
    pub fn insert(&mut self, entry: &CatalogEntry) -> Result<(), IndexError> {
        self.entries_seen += 1;

        let Some(sku) = entry.normalized_sku() else {
            self.without_sku += 1;
            return Ok(());
        };

        let incoming = entry.inventory_item_id;

        let Some(&existing) = self.by_sku.get(sku) else {
            self.by_sku.insert(sku.to_owned(), incoming);
            return Ok(());
        };

        match self.policy {
            DuplicateSkuPolicy::Reject => {
                return Err(IndexError::DuplicateSku {
                    sku: sku.to_owned(),
                    first: existing,
                    second: incoming,
                });
            }
            DuplicateSkuPolicy::FirstSeen => {
                warn!(sku, kept = %existing, discarded = %incoming, "duplicate SKU in catalog");
                self.duplicates.push(DuplicateSku {
                    sku: sku.to_owned(),
                    kept: existing,
                    discarded: incoming,
                });
            }
            DuplicateSkuPolicy::LastSeen => {
                warn!(sku, kept = %incoming, discarded = %existing, "duplicate SKU in catalog");
                self.by_sku.insert(sku.to_owned(), incoming);
                self.duplicates.push(DuplicateSku {
                    sku: sku.to_owned(),
                    kept: incoming,
                    discarded: existing,
                });
            }
        }

        Ok(())
    }

    pub fn lookup(&self, sku: &str) -> Option<InventoryItemId> {
        self.by_sku.get(sku.trim()).copied()
    }

    /// Number of distinct SKUs indexed.
    pub fn len(&self) -> usize {
        self.by_sku.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sku.is_empty()
    }

    pub fn policy(&self) -> DuplicateSkuPolicy {
        self.policy
    }

    pub fn duplicates(&self) -> &[DuplicateSku] {
        &self.duplicates
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            entries_seen: self.entries_seen,
            indexed: self.by_sku.len(),
            duplicates: self.duplicates.len(),
            without_sku: self.without_sku,
        }
    }
}

/// Counts describing how a catalog mapped onto the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub entries_seen: usize,
    pub indexed: usize,
    pub duplicates: usize,
    pub without_sku: usize,
}
