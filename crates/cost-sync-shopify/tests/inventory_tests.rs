use cost_sync::test_support::{entry, record};
use cost_sync::{
    CatalogIndex, Cost, DuplicateSkuPolicy, InventoryItemId, NullSink, Reconciler,
    UpdateExecutor, UpdateOutcome,
};
use cost_sync_shopify::{ShopifyConfig, ShopifyInventory};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn inventory_for(server: &MockServer) -> ShopifyInventory {
    let config = ShopifyConfig::new("acme", "shpat_test").with_api_base_url(server.uri());
    ShopifyInventory::new(config).unwrap()
}

#[tokio::test]
async fn puts_cost_for_inventory_item() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/2024-04/inventory_items/100.json"))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .and(body_json(json!({
            "inventory_item": { "id": 100, "cost": 9.99 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"inventory_item":{"id":100,"cost":"9.99"}}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let inventory = inventory_for(&server);
    inventory
        .apply(InventoryItemId::new(100), Cost::new(9.99).unwrap())
        .await
        .unwrap();

    assert_eq!(inventory.label(), "live");
    assert!(!inventory.is_dry_run());
}

#[tokio::test]
async fn unprocessable_entity_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/2024-04/inventory_items/100.json"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string(r#"{"errors":{"cost":["is invalid"]}}"#),
        )
        .mount(&server)
        .await;

    let err = inventory_for(&server)
        .apply(InventoryItemId::new(100), Cost::new(1.0).unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(422));
    assert!(!err.is_transient());
    assert_eq!(
        err.to_string(),
        r#"422 - {"errors":{"cost":["is invalid"]}}"#
    );
}

#[tokio::test]
async fn redirect_is_not_followed_and_counts_as_failure() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/2024-04/inventory_items/100.json"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/elsewhere", server.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = inventory_for(&server)
        .apply(InventoryItemId::new(100), Cost::new(1.0).unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(302));
}

#[tokio::test]
async fn reconciler_reports_live_outcomes() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/2024-04/inventory_items/100.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/2024-04/inventory_items/200.json"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad cost"))
        .expect(1)
        .mount(&server)
        .await;

    let index = CatalogIndex::build(
        [entry("A1", 100), entry("B2", 200)],
        DuplicateSkuPolicy::FirstSeen,
    )
    .unwrap();

    let inventory = inventory_for(&server);
    let records = vec![record("A1", 5.0), record("ZZ", 1.0), record("B2", 2.5)];
    let result = Reconciler::new(&inventory)
        .reconcile(&records, &index, &mut NullSink)
        .await;

    assert!(matches!(result.outcomes[0], UpdateOutcome::Updated { .. }));
    assert!(matches!(result.outcomes[1], UpdateOutcome::NotFound { .. }));
    match &result.outcomes[2] {
        UpdateOutcome::Failed { part_number, error } => {
            assert_eq!(part_number, "B2");
            assert_eq!(error, "422 - bad cost");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(result.summary.updated, 1);
    assert_eq!(result.summary.not_found, 1);
    assert_eq!(result.summary.failed, 1);
}
