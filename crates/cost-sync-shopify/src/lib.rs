pub mod catalog;
pub mod client;
pub mod config;
pub mod inventory;
pub mod pagination;
pub mod products;

pub use catalog::ShopifyCatalog;
pub use client::AdminClient;
pub use config::{DEFAULT_API_VERSION, ShopifyConfig};
pub use inventory::ShopifyInventory;
