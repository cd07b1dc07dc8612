use cost_sync::{CatalogPage, CatalogSource, PageCursor, TransportError};
use reqwest::Method;
use tracing::debug;

use crate::client::{AdminClient, status_error};
use crate::config::ShopifyConfig;
use crate::pagination::{call_limit_from_headers, cursor_from_headers};
use crate::products::{PRODUCT_FIELDS, ProductsResponse};

/// Shopify's hard cap on `limit` for `products.json`.
pub const MAX_PRODUCTS_PER_PAGE: u32 = 250;

/// Reads the product catalog of one store, one `products.json` page at a
/// time.
pub struct ShopifyCatalog {
    client: AdminClient,
}

impl ShopifyCatalog {
    pub fn new(config: ShopifyConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: AdminClient::new(config)?,
        })
    }

    pub fn from_client(client: AdminClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl CatalogSource for ShopifyCatalog {
    fn label(&self) -> &str {
        &self.client.config().shop
    }

    fn max_page_size(&self) -> u32 {
        MAX_PRODUCTS_PER_PAGE
    }

    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
        page_size: u32,
    ) -> Result<CatalogPage, TransportError> {
        let mut query = vec![
            ("limit", page_size.to_string()),
            ("fields", PRODUCT_FIELDS.to_owned()),
        ];
        if let Some(cursor) = cursor {
            query.push(("page_info", cursor.as_str().to_owned()));
        }

        let url = self.client.url("products.json", &query)?;
        debug!(%url, "fetching product page");

        let response = self
            .client
            .send(self.client.request(Method::GET, url))
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let next_cursor = cursor_from_headers(response.headers());
        let call_limit = call_limit_from_headers(response.headers());

        let body: ProductsResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))?;

        let entries = body.into_entries();
        debug!(
            entries = entries.len(),
            has_next = next_cursor.is_some(),
            "product page received"
        );

        Ok(CatalogPage {
            entries,
            next_cursor,
            call_limit,
        })
    }
}
