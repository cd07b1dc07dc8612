use cost_sync::{CallLimit, CatalogSource, InventoryItemId, PageCursor, Paginator};
use cost_sync_shopify::{ShopifyCatalog, ShopifyConfig};
use futures::TryStreamExt;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRODUCTS_PATH: &str = "/admin/api/2024-04/products.json";

fn catalog_for(server: &MockServer) -> ShopifyCatalog {
    let config = ShopifyConfig::new("acme", "shpat_test").with_api_base_url(server.uri());
    ShopifyCatalog::new(config).unwrap()
}

fn next_link(server: &MockServer, cursor: &str) -> String {
    format!(
        r#"<{}{PRODUCTS_PATH}?limit=2&page_info={cursor}>; rel="next""#,
        server.uri()
    )
}

#[tokio::test]
async fn single_page_without_link_header() {
    let server = MockServer::start().await;
    let fixture = include_str!("fixtures/products_page1.json");

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .and(query_param("limit", "250"))
        .and(query_param("fields", "id,title,variants"))
        .and(query_param_is_missing("page_info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture, "application/json")
                .insert_header("X-Shopify-Shop-Api-Call-Limit", "1/40"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let page = catalog.fetch_page(None, 250).await.unwrap();

    assert_eq!(page.entries.len(), 3);
    assert_eq!(page.entries[0].title, "Hex Bolt M8");
    assert_eq!(page.entries[0].sku.as_deref(), Some("HB-M8-20"));
    assert_eq!(page.entries[2].sku, None);
    assert_eq!(page.entries[2].inventory_item_id, InventoryItemId::new(102));
    assert_eq!(page.next_cursor, None);
    assert_eq!(page.call_limit, Some(CallLimit { used: 1, max: 40 }));
}

#[tokio::test]
async fn sends_access_token_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"products":[]}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = catalog_for(&server).fetch_page(None, 10).await.unwrap();
    assert!(page.entries.is_empty());
}

#[tokio::test]
async fn follows_link_header_across_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .and(query_param_is_missing("page_info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(include_str!("fixtures/products_page1.json"), "application/json")
                .insert_header("Link", next_link(&server, "cursor-2").as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .and(query_param("page_info", "cursor-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(include_str!("fixtures/products_page2.json"), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let entries: Vec<_> = Paginator::new(&catalog, 2)
        .entries()
        .try_collect()
        .await
        .unwrap();

    let skus: Vec<_> = entries.iter().map(|e| e.sku.as_deref()).collect();
    assert_eq!(
        skus,
        vec![Some("HB-M8-20"), Some("HB-M8-40"), None, Some("LN-M8")]
    );
}

#[tokio::test]
async fn cursor_is_sent_back_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .and(query_param("page_info", "opaque-token"))
        .and(query_param("limit", "5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"products":[]}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cursor = PageCursor::new("opaque-token");
    let page = catalog_for(&server)
        .fetch_page(Some(&cursor), 5)
        .await
        .unwrap();
    assert!(page.entries.is_empty());
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = catalog_for(&server).fetch_page(None, 250).await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.to_string(), "500 - boom");
    assert!(err.is_transient());
}

#[tokio::test]
async fn failure_on_second_page_aborts_the_walk() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .and(query_param_is_missing("page_info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(include_str!("fixtures/products_page1.json"), "application/json")
                .insert_header("Link", next_link(&server, "cursor-2").as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .and(query_param("page_info", "cursor-2"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let result: Result<Vec<_>, _> = Paginator::new(&catalog, 2).entries().try_collect().await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let err = catalog_for(&server).fetch_page(None, 250).await.unwrap_err();
    assert!(matches!(err, cost_sync::TransportError::Parse(_)));
}

#[tokio::test]
async fn label_is_shop_and_page_size_is_capped() {
    let server = MockServer::start().await;
    let catalog = catalog_for(&server);

    assert_eq!(catalog.label(), "acme");
    assert_eq!(catalog.max_page_size(), 250);
    assert_eq!(Paginator::new(&catalog, 1000).page_size(), 250);
}
