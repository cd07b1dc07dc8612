use std::fmt;

/// Admin API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-04";

/// Connection details for one Shopify store.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Store handle (`my-shop`) or full host (`my-shop.myshopify.com`).
    pub shop: String,
    pub access_token: String,
    pub api_version: String,
    /// Overrides the store URL, e.g. to point at a mock server.
    pub api_base_url: Option<String>,
}

impl ShopifyConfig {
    pub fn new(shop: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            shop: shop.into(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            api_base_url: None,
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    fn base_url(&self) -> String {
        match &self.api_base_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None if self.shop.contains('.') => format!("https://{}", self.shop),
            None => format!("https://{}.myshopify.com", self.shop),
        }
    }

    /// Full URL of an Admin REST resource, e.g. `products.json`.
    pub fn admin_url(&self, resource: &str) -> String {
        format!(
            "{}/admin/api/{}/{}",
            self.base_url(),
            self.api_version,
            resource
        )
    }
}

impl fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("shop", &self.shop)
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}
