use cost_sync::{Cost, InventoryItemId, TransportError, UpdateExecutor};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::client::{AdminClient, status_error};
use crate::config::ShopifyConfig;

#[derive(Debug, Serialize)]
struct InventoryItemUpdate {
    inventory_item: InventoryItemCost,
}

#[derive(Debug, Serialize)]
struct InventoryItemCost {
    id: InventoryItemId,
    cost: Cost,
}

/// Writes costs to inventory items with `PUT inventory_items/{id}.json`.
pub struct ShopifyInventory {
    client: AdminClient,
}

impl ShopifyInventory {
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
impl UpdateExecutor for ShopifyInventory {
    fn label(&self) -> &str {
        "live"
    }

    async fn apply(&self, item: InventoryItemId, cost: Cost) -> Result<(), TransportError> {
        let url = self
            .client
            .url(&format!("inventory_items/{item}.json"), &[])?;

        let body = InventoryItemUpdate {
            inventory_item: InventoryItemCost { id: item, cost },
        };

        let response = self
            .client
            .send(self.client.request(Method::PUT, url).json(&body))
            .await?;

        // Redirects are not followed, so a 3xx lands here as a failure too.
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        debug!(%item, %cost, "inventory item cost updated");
        Ok(())
    }
}
