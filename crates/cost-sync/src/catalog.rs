use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Remote identifier of an inventory item, the entity whose cost is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryItemId(u64);

impl InventoryItemId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InventoryItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One sellable variant as read from the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub product_id: u64,
    pub title: String,
    pub variant_id: u64,
    pub sku: Option<String>,
    pub inventory_item_id: InventoryItemId,
}

impl CatalogEntry {
    /// The SKU with surrounding whitespace removed, or `None` when the
    /// variant has no usable SKU.
    pub fn normalized_sku(&self) -> Option<&str> {
        self.sku
            .as_deref()
            .map(str::trim)
            .filter(|sku| !sku.is_empty())
    }
}

/// Opaque continuation token handed back by the catalog transport.
///
/// Never parsed or derived from entry content; only passed back as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rate-limit bucket state reported alongside a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallLimit {
    pub used: u32,
    pub max: u32,
}

impl CallLimit {
    /// Remaining calls before the bucket is full.
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.used)
    }
}

impl FromStr for CallLimit {
    type Err = String;

    /// Parses the `used/max` form, e.g. `32/40`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (used, max) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("malformed call limit: {s}"))?;

        let used = used
            .trim()
            .parse()
            .map_err(|_| format!("malformed call limit: {s}"))?;
        let max = max
            .trim()
            .parse()
            .map_err(|_| format!("malformed call limit: {s}"))?;

        Ok(Self { used, max })
    }
}

/// One page of catalog entries plus the transport metadata needed to walk on.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    pub next_cursor: Option<PageCursor>,
    pub call_limit: Option<CallLimit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(sku: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            product_id: 1,
            title: "Widget".into(),
            variant_id: 2,
            sku: sku.map(str::to_owned),
            inventory_item_id: InventoryItemId::new(3),
        }
    }

    #[test]
    fn normalized_sku_trims_whitespace() {
        assert_eq!(entry(Some("  A1 ")).normalized_sku(), Some("A1"));
    }

    #[test]
    fn blank_sku_is_treated_as_missing() {
        assert_eq!(entry(Some("   ")).normalized_sku(), None);
        assert_eq!(entry(None).normalized_sku(), None);
    }

    #[test]
    fn call_limit_parses_used_over_max() {
        let limit: CallLimit = "32/40".parse().unwrap();
        assert_eq!(limit, CallLimit { used: 32, max: 40 });
        assert_eq!(limit.remaining(), 8);
    }

    #[test]
    fn call_limit_rejects_garbage() {
        assert!("forty".parse::<CallLimit>().is_err());
        assert!("1/x".parse::<CallLimit>().is_err());
    }
}
