//! Behavior when the store is unreachable: reads serve fallbacks, writes fail.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{FailingStore, TestHarness};
use serde_json::json;

fn harness() -> TestHarness {
    TestHarness::with_store(Arc::new(FailingStore))
}

#[tokio::test]
async fn public_notes_fall_back_to_welcome_note() {
    let harness = harness();

    let response = harness.server.get("/api/guncelleme-notlari").await;

    response.assert_status_ok();
    let notes: Vec<serde_json::Value> = response.json();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"], 1);
    assert_eq!(notes[0]["title"], "Hoş Geldiniz!");
    assert_eq!(harness.failures.snapshot().read_fallbacks, 1);
}

#[tokio::test]
async fn public_photos_fall_back_to_default_photo() {
    let harness = harness();

    let photos: Vec<serde_json::Value> =
        harness.server.get("/api/nostalji-fotograflar").await.json();

    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0]["id"], "k1");
    assert_eq!(photos[0]["title"], "Eski Knight Online");
}

#[tokio::test]
async fn app_status_falls_back_to_defaults() {
    let harness = harness();

    let response = harness.server.get("/api/app-status").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "active");
    assert_eq!(body["maintenance"], false);
}

#[tokio::test]
async fn stats_fall_back_to_zeros() {
    let harness = harness();
    let auth = harness.admin_auth_header().await;

    let response = harness
        .server
        .get("/api/admin/stats")
        .add_header("authorization", &auth)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["totalUsers"], 0);
    assert_eq!(body["activeUsers"], 0);
    assert_eq!(body["sentNotifications"], 0);
    assert_eq!(body["usersWithPushToken"], 0);
    assert_eq!(body["appStatus"], "active");
    assert_eq!(body["swallowedFailures"]["readFallbacks"], 5);
}

#[tokio::test]
async fn admin_listings_fall_back_to_empty() {
    let harness = harness();
    let auth = harness.admin_auth_header().await;

    for path in [
        "/api/admin/notifications",
        "/api/admin/updates",
        "/api/admin/photos",
        "/api/admin/users",
    ] {
        let response = harness
            .server
            .get(path)
            .add_header("authorization", &auth)
            .await;
        response.assert_status_ok();
        let items: Vec<serde_json::Value> = response.json();
        assert!(items.is_empty(), "{path} should be empty");
    }
}

#[tokio::test]
async fn admin_writes_fail_with_server_error() {
    let harness = harness();
    let auth = harness.admin_auth_header().await;

    let cases = [
        (
            "/api/admin/add-update",
            json!({ "title": "t", "content": "c" }),
            "Güncelleme notu eklenemedi",
        ),
        (
            "/api/admin/add-photo",
            json!({ "title": "t", "url": "/a.jpg" }),
            "Fotoğraf eklenemedi",
        ),
        (
            "/api/admin/send-notification",
            json!({ "title": "t", "message": "m" }),
            "Bildirim gönderilemedi",
        ),
        (
            "/api/admin/app-status",
            json!({ "status": "maintenance" }),
            "Durum güncellenemedi",
        ),
        (
            "/api/admin/version-settings",
            json!({ "minVersion": "2.0.0" }),
            "Ayarlar kaydedilemedi",
        ),
    ];

    for (path, body, error) in cases {
        let response = harness
            .server
            .post(path)
            .add_header("authorization", &auth)
            .json(&body)
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], error);
    }
}

#[tokio::test]
async fn register_reports_failure_in_body() {
    let harness = harness();

    let response = harness
        .server
        .post("/api/notifications/register")
        .json(&json!({ "userId": "u1", "token": "t1" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Token kaydedilemedi");
}

#[tokio::test]
async fn usage_ping_succeeds_and_counts_the_dropped_write() {
    let harness = harness();

    let response = harness
        .server
        .post("/api/stats")
        .json(&json!({ "userId": "u1", "action": "app_open" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(harness.failures.snapshot().usage_events, 1);
}
