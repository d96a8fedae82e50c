//! Health and banner endpoint integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_check_returns_ok() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "rehber-service");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn banner_lists_endpoints() {
    let harness = TestHarness::new();

    let response = harness.server.get("/").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["endpoints"]["api"], "/api");
    assert_eq!(body["endpoints"]["admin"], "/api/admin");
}
