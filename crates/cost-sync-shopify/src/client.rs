use cost_sync::TransportError;
use reqwest::{Method, RequestBuilder, Response, Url, redirect};

use crate::config::ShopifyConfig;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const USER_AGENT: &str = "cost-sync";

/// Thin wrapper over `reqwest` that knows how to address and authenticate
/// against the Admin REST API.
///
/// Redirects are never followed: anything but a 2xx is reported to the
/// caller as a failure.
#[derive(Debug, Clone)]
pub struct AdminClient {
    config: ShopifyConfig,
    client: reqwest::Client,
}

impl AdminClient {
    pub fn new(config: ShopifyConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ShopifyConfig {
        &self.config
    }

    /// URL of `resource` with query parameters appended.
    pub fn url(&self, resource: &str, query: &[(&str, String)]) -> Result<Url, TransportError> {
        let base = self.config.admin_url(resource);
        let url = if query.is_empty() {
            Url::parse(&base)
        } else {
            Url::parse_with_params(&base, query)
        };
        url.map_err(|e| TransportError::Parse(format!("invalid URL for {resource}: {e}")))
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(ACCESS_TOKEN_HEADER, &self.config.access_token)
            .header("Accept", "application/json")
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

/// Turns a non-success response into a [`TransportError`] carrying its
/// status and body.
pub async fn status_error(response: Response) -> TransportError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown".into());
    TransportError::status(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AdminClient {
        AdminClient::new(ShopifyConfig::new("acme", "token")).unwrap()
    }

    #[test]
    fn url_without_query_has_no_trailing_separator() {
        let url = client().url("inventory_items/7.json", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://acme.myshopify.com/admin/api/2024-04/inventory_items/7.json"
        );
    }

    #[test]
    fn url_encodes_query_parameters() {
        let url = client()
            .url(
                "products.json",
                &[("limit", "50".into()), ("fields", "id,title".into())],
            )
            .unwrap();
        assert_eq!(url.query(), Some("limit=50&fields=id%2Ctitle"));
    }
}
