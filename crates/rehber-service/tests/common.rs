//! Common test utilities for rehber-service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;

use rehber_core::{
    AppSettings, DeviceFilter, DeviceRegistration, DeviceUpsert, NewNotification, NewPhoto,
    NewUpdateNote, NostalgiaPhoto, Notification, SettingsPatch, UpdateNote, UsageEvent,
};
use rehber_service::config::Secret;
use rehber_service::push::PushError;
use rehber_service::{
    create_router, AppState, CredentialStore, FailureCounters, PushDispatcher, ServiceConfig,
};
use rehber_store::{Collection, MemoryStore, Store, StoreError};

/// Admin username accepted by the test credential store.
pub const ADMIN_USERNAME: &str = "Aga";

/// Admin password accepted by the test credential store.
pub const ADMIN_PASSWORD: &str = "test-password";

/// Credential store accepting exactly one fixed pair.
pub struct FixedCredentials;

impl CredentialStore for FixedCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == ADMIN_USERNAME && password == ADMIN_PASSWORD
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server.
    pub store: Arc<dyn Store>,
    /// Swallowed-failure counters of the running state.
    pub failures: Arc<FailureCounters>,
}

impl TestHarness {
    /// Create a new test harness over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Create a harness over the given store.
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self::build(store, None)
    }

    /// Create a harness with a custom push dispatcher.
    pub fn with_push(push: Arc<dyn PushDispatcher>) -> Self {
        Self::build(Arc::new(MemoryStore::new()), Some(push))
    }

    fn build(store: Arc<dyn Store>, push: Option<Arc<dyn PushDispatcher>>) -> Self {
        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            jwt_secret: Some(Secret::new("test-jwt-secret")),
            app_version: "1.0.0".into(),
            ..ServiceConfig::default()
        };

        let mut state = AppState::new(store.clone(), config, Arc::new(FixedCredentials))
            .expect("Failed to build state");
        if let Some(push) = push {
            state = state.with_push(push);
        }
        let failures = state.failures.clone();

        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            failures,
        }
    }

    /// Log in and return the bearer token.
    pub async fn admin_token(&self) -> String {
        let response = self
            .server
            .post("/api/admin/login")
            .json(&serde_json::json!({
                "username": ADMIN_USERNAME,
                "password": ADMIN_PASSWORD,
            }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        body["token"].as_str().expect("token in login response").to_string()
    }

    /// Get the authorization header for admin requests.
    pub async fn admin_auth_header(&self) -> String {
        format!("Bearer {}", self.admin_token().await)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Store whose every operation fails as if the database were unreachable.
pub struct FailingStore;

fn down<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("connection refused".into()))
}

#[async_trait]
impl Store for FailingStore {
    async fn list_update_notes(&self, _limit: Option<usize>) -> Result<Vec<UpdateNote>, StoreError> {
        down()
    }

    async fn create_update_note(&self, _note: NewUpdateNote) -> Result<UpdateNote, StoreError> {
        down()
    }

    async fn list_photos(&self, _limit: Option<usize>) -> Result<Vec<NostalgiaPhoto>, StoreError> {
        down()
    }

    async fn create_photo(&self, _photo: NewPhoto) -> Result<NostalgiaPhoto, StoreError> {
        down()
    }

    async fn list_notifications(
        &self,
        _limit: Option<usize>,
    ) -> Result<Vec<Notification>, StoreError> {
        down()
    }

    async fn create_notification(
        &self,
        _notification: NewNotification,
    ) -> Result<Notification, StoreError> {
        down()
    }

    async fn list_devices(
        &self,
        _limit: Option<usize>,
    ) -> Result<Vec<DeviceRegistration>, StoreError> {
        down()
    }

    async fn upsert_device(&self, _upsert: DeviceUpsert) -> Result<DeviceRegistration, StoreError> {
        down()
    }

    async fn count_devices(&self, _filter: DeviceFilter) -> Result<u64, StoreError> {
        down()
    }

    async fn count(&self, _collection: Collection) -> Result<u64, StoreError> {
        down()
    }

    async fn get_settings(&self) -> Result<AppSettings, StoreError> {
        down()
    }

    async fn update_settings(&self, _patch: SettingsPatch) -> Result<AppSettings, StoreError> {
        down()
    }

    async fn record_usage(&self, _event: UsageEvent) -> Result<(), StoreError> {
        down()
    }
}

/// Push dispatcher that always fails.
pub struct FailingDispatcher;

#[async_trait]
impl PushDispatcher for FailingDispatcher {
    async fn dispatch(&self, _notification: &Notification) -> Result<(), PushError> {
        Err(PushError("gateway down".into()))
    }
}
