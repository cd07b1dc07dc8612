use cost_sync::{CatalogEntry, InventoryItemId};
use serde::Deserialize;

/// Fields requested from `products.json`; everything else is left out of
/// the response to keep pages small.
pub const PRODUCT_FIELDS: &str = "id,title,variants";

/// Response from `GET /admin/api/{version}/products.json`.
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
pub struct Variant {
    pub id: u64,
    pub sku: Option<String>,
    pub inventory_item_id: u64,
}

impl ProductsResponse {
    /// Flattens products into one catalog entry per variant, preserving the
    /// order the API returned them in.
    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.products
            .into_iter()
            .flat_map(|product| {
                let Product {
                    id: product_id,
                    title,
                    variants,
                } = product;

                variants.into_iter().map(move |variant| CatalogEntry {
                    product_id,
                    title: title.clone(),
                    variant_id: variant.id,
                    sku: variant.sku,
                    inventory_item_id: InventoryItemId::new(variant.inventory_item_id),
                })
            })
            .collect()
    }
}
