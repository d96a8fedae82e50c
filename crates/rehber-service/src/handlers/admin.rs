//! Admin panel handlers.
//!
//! Every handler except `login` requires an [`AdminAuth`] token.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use rehber_core::{
    AppSettings, DeviceFilter, DeviceRegistration, NewNotification, NewPhoto, NewUpdateNote,
    NostalgiaPhoto, Notification, SettingsPatch, UpdateNote,
};
use rehber_store::Collection;

use super::{json_body, or_fallback};
use crate::auth::{AdminAuth, ADMIN_ROLE};
use crate::error::ApiError;
use crate::failures::FailureSnapshot;
use crate::state::AppState;

/// Maximum records returned by the admin listings.
pub const ADMIN_LIST_CAP: usize = 20;

// ============================================================================
// Login
// ============================================================================

/// Login request.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Admin username.
    pub username: Option<String>,
    /// Admin password.
    pub password: Option<String>,
}

/// The logged-in admin.
#[derive(Debug, Serialize)]
pub struct AdminUser {
    /// Admin username.
    pub username: String,
    /// Always `"admin"`.
    pub role: &'static str,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Always true.
    pub success: bool,
    /// Bearer token for the admin endpoints.
    pub token: String,
    /// The logged-in admin.
    pub user: AdminUser,
}

/// Exchange the admin login for a session token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    let req: LoginRequest = json_body(&body)?;
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    if !state.credentials.verify(&username, &password) {
        tracing::warn!(username = %username, "Rejected admin login");
        return Err(ApiError::Unauthorized(
            "Geçersiz kullanıcı adı veya şifre".into(),
        ));
    }

    let token = state.tokens.issue(&username).map_err(|e| {
        tracing::error!(error = %e, "Failed to sign admin token");
        ApiError::Internal("Sunucu hatası".into())
    })?;

    tracing::info!(username = %username, "Admin logged in");

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: AdminUser {
            username,
            role: ADMIN_ROLE,
        },
    }))
}

// ============================================================================
// Stats
// ============================================================================

/// Dashboard statistics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Always true.
    pub success: bool,
    /// Registered devices.
    pub total_users: u64,
    /// Devices seen in the last 7 days.
    pub active_users: u64,
    /// Notifications sent.
    pub sent_notifications: u64,
    /// Devices holding a push token.
    pub users_with_push_token: u64,
    /// Configured app version.
    pub app_version: String,
    /// Current app status.
    pub app_status: String,
    /// Failures swallowed since startup.
    pub swallowed_failures: FailureSnapshot,
}

/// Aggregate counts for the dashboard. Never fails; unreadable counts are zero.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Json<StatsResponse> {
    let store = &state.store;
    let now = Utc::now();

    let total_users = or_fallback(
        &state,
        "total_users",
        store.count_devices(DeviceFilter::All).await,
        || 0,
    );
    let active_users = or_fallback(
        &state,
        "active_users",
        store.count_devices(DeviceFilter::active_at(now)).await,
        || 0,
    );
    let sent_notifications = or_fallback(
        &state,
        "sent_notifications",
        store.count(Collection::Notifications).await,
        || 0,
    );
    let users_with_push_token = or_fallback(
        &state,
        "users_with_push_token",
        store.count_devices(DeviceFilter::WithPushToken).await,
        || 0,
    );
    let settings = or_fallback(
        &state,
        "settings",
        store.get_settings().await,
        AppSettings::default,
    );

    Json(StatsResponse {
        success: true,
        total_users,
        active_users,
        sent_notifications,
        users_with_push_token,
        app_version: state.config.app_version.clone(),
        app_status: settings.app_status,
        swallowed_failures: state.failures.snapshot(),
    })
}

// ============================================================================
// Content writes
// ============================================================================

/// Successful admin write: a message plus the stored record under its own key.
#[derive(Debug, Serialize)]
pub struct WriteResponse<T: Serialize> {
    /// Always true.
    pub success: bool,
    /// Confirmation shown in the panel.
    pub message: &'static str,
    /// The stored record.
    #[serde(flatten)]
    pub record: T,
}

/// Record wrappers naming the response key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Record {
    /// A sent notification.
    Notification(Notification),
    /// A new update note.
    Update(UpdateNote),
    /// A new photo.
    Photo(NostalgiaPhoto),
    /// The settings after a change.
    Settings(AppSettings),
}

fn written(message: &'static str, record: Record) -> Json<WriteResponse<Record>> {
    Json(WriteResponse {
        success: true,
        message,
        record,
    })
}

/// Send notification request.
#[derive(Debug, Default, Deserialize)]
pub struct SendNotificationRequest {
    /// Notification title.
    pub title: Option<String>,
    /// Notification body.
    pub message: Option<String>,
    /// Audience (default `all`).
    pub target: Option<String>,
}

/// Record a notification and hand it to the push dispatcher.
pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    body: Bytes,
) -> Result<Json<WriteResponse<Record>>, ApiError> {
    let req: SendNotificationRequest = json_body(&body)?;
    let new = NewNotification::new(req.title, req.message, req.target)
        .map_err(|_| ApiError::BadRequest("Başlık ve mesaj gerekli".into()))?;

    let recipients = or_fallback(
        &state,
        "recipients",
        state.store.count_devices(DeviceFilter::All).await,
        || 0,
    );

    let notification = state
        .store
        .create_notification(new.with_sent_count(recipients))
        .await
        .map_err(|e| ApiError::storage("Bildirim gönderilemedi", &e))?;

    if let Err(e) = state.push.dispatch(&notification).await {
        state.failures.record_push_dispatch();
        tracing::warn!(error = %e, notification_id = notification.id, "Push dispatch failed");
    }

    Ok(written(
        "Bildirim başarıyla gönderildi!",
        Record::Notification(notification),
    ))
}

/// Add update note request.
#[derive(Debug, Default, Deserialize)]
pub struct AddUpdateRequest {
    /// Note title.
    pub title: Option<String>,
    /// Note body.
    pub content: Option<String>,
    /// Importance (default `normal`).
    pub importance: Option<String>,
}

/// Publish an update note.
pub async fn add_update(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    body: Bytes,
) -> Result<Json<WriteResponse<Record>>, ApiError> {
    let req: AddUpdateRequest = json_body(&body)?;
    let new = NewUpdateNote::new(req.title, req.content, req.importance)
        .map_err(|_| ApiError::BadRequest("Başlık ve içerik gerekli".into()))?;

    let note = state
        .store
        .create_update_note(new)
        .await
        .map_err(|e| ApiError::storage("Güncelleme notu eklenemedi", &e))?;

    tracing::info!(id = note.id, title = %note.title, "Update note added");

    Ok(written(
        "Güncelleme notu başarıyla eklendi!",
        Record::Update(note),
    ))
}

/// Add photo request.
#[derive(Debug, Default, Deserialize)]
pub struct AddPhotoRequest {
    /// Photo caption.
    pub title: Option<String>,
    /// Image URL.
    pub url: Option<String>,
}

/// Add a nostalgia photo.
pub async fn add_photo(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    body: Bytes,
) -> Result<Json<WriteResponse<Record>>, ApiError> {
    let req: AddPhotoRequest = json_body(&body)?;
    let new = NewPhoto::new(req.title, req.url)
        .map_err(|_| ApiError::BadRequest("Başlık ve URL gerekli".into()))?;

    let photo = state
        .store
        .create_photo(new)
        .await
        .map_err(|e| ApiError::storage("Fotoğraf eklenemedi", &e))?;

    tracing::info!(id = %photo.id, title = %photo.title, "Photo added");

    Ok(written("Fotoğraf başarıyla eklendi!", Record::Photo(photo)))
}

// ============================================================================
// Settings
// ============================================================================

/// Set app status request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatusRequest {
    /// New status (default `active`).
    pub status: Option<String>,
    /// Maintenance message (default canned text).
    pub maintenance_message: Option<String>,
}

/// Switch the app between active and maintenance.
pub async fn set_app_status(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    body: Bytes,
) -> Result<Json<WriteResponse<Record>>, ApiError> {
    let req: AppStatusRequest = json_body(&body)?;

    let settings = state
        .store
        .update_settings(SettingsPatch::status(req.status, req.maintenance_message))
        .await
        .map_err(|e| ApiError::storage("Durum güncellenemedi", &e))?;

    tracing::info!(status = %settings.app_status, "App status changed");

    Ok(written(
        "Uygulama durumu güncellendi!",
        Record::Settings(settings),
    ))
}

/// Version settings request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSettingsRequest {
    /// Oldest app version allowed to run.
    pub min_version: Option<String>,
    /// Message shown when an update is forced.
    pub force_update_message: Option<String>,
}

/// Change the minimum supported app version.
pub async fn set_version_settings(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    body: Bytes,
) -> Result<Json<WriteResponse<Record>>, ApiError> {
    let req: VersionSettingsRequest = json_body(&body)?;

    let settings = state
        .store
        .update_settings(SettingsPatch::version(
            req.min_version,
            req.force_update_message,
        ))
        .await
        .map_err(|e| ApiError::storage("Ayarlar kaydedilemedi", &e))?;

    tracing::info!(min_version = %settings.min_version, "Version settings changed");

    Ok(written(
        "Versiyon ayarları kaydedildi!",
        Record::Settings(settings),
    ))
}

// ============================================================================
// Listings
// ============================================================================

/// Latest notifications.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Json<Vec<Notification>> {
    let result = state.store.list_notifications(Some(ADMIN_LIST_CAP)).await;
    Json(or_fallback(&state, "notifications", result, Vec::new))
}

/// Latest update notes.
pub async fn list_updates(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Json<Vec<UpdateNote>> {
    let result = state.store.list_update_notes(Some(ADMIN_LIST_CAP)).await;
    Json(or_fallback(&state, "update_notes", result, Vec::new))
}

/// Latest photos.
pub async fn list_photos(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Json<Vec<NostalgiaPhoto>> {
    let result = state.store.list_photos(Some(ADMIN_LIST_CAP)).await;
    Json(or_fallback(&state, "photos", result, Vec::new))
}

/// Most recently registered devices.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Json<Vec<DeviceRegistration>> {
    let result = state.store.list_devices(Some(ADMIN_LIST_CAP)).await;
    Json(or_fallback(&state, "devices", result, Vec::new))
}
