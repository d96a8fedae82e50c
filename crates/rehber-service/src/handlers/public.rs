//! Mobile app handlers. No authentication.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rehber_core::{
    seed, AppSettings, DeviceFilter, DeviceRegistration, DeviceUpsert, NostalgiaPhoto,
    UpdateNote, UsageEvent,
};

use super::{json_body, or_fallback};
use crate::error::ApiError;
use crate::state::AppState;

/// Maximum update notes returned to the app.
pub const PUBLIC_UPDATE_NOTES_CAP: usize = 10;

/// App status as seen by the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatusResponse {
    /// `active` or `maintenance`.
    pub status: String,
    /// Whether to show the maintenance screen.
    pub maintenance: bool,
    /// Maintenance text, empty unless in maintenance.
    pub maintenance_message: String,
    /// Oldest supported app version.
    pub min_version: String,
    /// Message shown when an update is forced.
    pub force_update_message: String,
}

impl From<AppSettings> for AppStatusResponse {
    fn from(settings: AppSettings) -> Self {
        let maintenance = settings.is_maintenance();
        Self {
            status: settings.app_status,
            maintenance,
            maintenance_message: if maintenance {
                settings.maintenance_message
            } else {
                String::new()
            },
            min_version: settings.min_version,
            force_update_message: settings.force_update_message,
        }
    }
}

/// Current app status.
pub async fn app_status(State(state): State<Arc<AppState>>) -> Json<AppStatusResponse> {
    let result = state.store.get_settings().await;
    Json(or_fallback(&state, "settings", result, AppSettings::default).into())
}

/// Latest update notes.
pub async fn update_notes(State(state): State<Arc<AppState>>) -> Json<Vec<UpdateNote>> {
    let result = state
        .store
        .list_update_notes(Some(PUBLIC_UPDATE_NOTES_CAP))
        .await;
    let notes = or_fallback(&state, "update_notes", result, seed::fallback_update_notes);
    tracing::debug!(count = notes.len(), "Served update notes");
    Json(notes)
}

/// All nostalgia photos.
pub async fn nostalgia_photos(State(state): State<Arc<AppState>>) -> Json<Vec<NostalgiaPhoto>> {
    let result = state.store.list_photos(None).await;
    let photos = or_fallback(&state, "photos", result, seed::fallback_photos);
    tracing::debug!(count = photos.len(), "Served nostalgia photos");
    Json(photos)
}

/// Device registration request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Client-chosen device id.
    pub user_id: Option<String>,
    /// Push token.
    pub token: Option<String>,
    /// App version.
    pub app_version: Option<String>,
    /// Client platform.
    pub platform: Option<String>,
    /// Display name.
    pub username: Option<String>,
}

/// Device registration result.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RegisterResponse {
    /// The device was stored.
    #[serde(rename_all = "camelCase")]
    Registered {
        /// Always true.
        success: bool,
        /// Confirmation text.
        message: &'static str,
        /// Registered devices after this call.
        total_users: u64,
        /// The stored registration.
        device: DeviceRegistration,
    },
    /// The store rejected the write.
    Failed {
        /// Always false.
        success: bool,
        /// Error text.
        error: &'static str,
    },
}

/// Create or refresh a device registration.
///
/// A store failure is reported in the body with `success: false`, not as an
/// HTTP error.
pub async fn register_device(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RegisterResponse>, ApiError> {
    let req: RegisterRequest = json_body(&body)?;
    let upsert = DeviceUpsert::new(
        req.user_id,
        req.token,
        req.app_version,
        req.platform,
        req.username,
    )
    .map_err(|_| ApiError::BadRequest("Kullanıcı ID gerekli".into()))?;

    let device = match state.store.upsert_device(upsert).await {
        Ok(device) => device,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register device");
            return Ok(Json(RegisterResponse::Failed {
                success: false,
                error: "Token kaydedilemedi",
            }));
        }
    };

    let total_users = or_fallback(
        &state,
        "total_users",
        state.store.count_devices(DeviceFilter::All).await,
        || 0,
    );

    tracing::info!(device_id = %device.id, total_users, "Device registered");

    Ok(Json(RegisterResponse::Registered {
        success: true,
        message: "Token kaydedildi",
        total_users,
        device,
    }))
}

/// Usage ping request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRequest {
    /// Device id.
    pub user_id: Option<String>,
    /// Action name.
    pub action: Option<String>,
    /// Client timestamp: RFC 3339 string or epoch milliseconds.
    pub timestamp: Option<serde_json::Value>,
    /// App version.
    pub app_version: Option<String>,
    /// Client platform.
    pub platform: Option<String>,
}

/// Always-successful response.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    /// Always true.
    pub success: bool,
}

/// Record a usage ping. Always succeeds; failures are only logged and counted.
pub async fn submit_usage(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Json<AckResponse> {
    let req = match json_body::<UsageRequest>(&body) {
        Ok(req) => req,
        Err(e) => {
            state.failures.record_usage_event();
            tracing::warn!(error = %e, "Dropped malformed usage event");
            return Json(AckResponse { success: true });
        }
    };

    let event = UsageEvent {
        user_id: req.user_id,
        action: req.action,
        timestamp: req.timestamp.as_ref().and_then(parse_timestamp),
        app_version: req.app_version,
        platform: req.platform,
        received_at: Utc::now(),
    };

    if let Err(e) = state.store.record_usage(event).await {
        state.failures.record_usage_event();
        tracing::warn!(error = %e, "Failed to record usage event");
    }

    Json(AckResponse { success: true })
}

/// Parse a client timestamp given as RFC 3339 text or epoch milliseconds.
fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
