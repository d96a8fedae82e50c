//! PostgreSQL storage implementation.
//!
//! The pool connects lazily with a short acquire timeout: an unreachable
//! database fails the request that needed it, never the process. The schema
//! is migrated once, before the first query; a failed migration is retried
//! by the next request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tokio::sync::OnceCell;

use rehber_core::{
    AppSettings, DeviceFilter, DeviceRegistration, DeviceUpsert, NewNotification, NewPhoto,
    NewUpdateNote, NostalgiaPhoto, Notification, PhotoId, SettingsPatch, UpdateNote, UsageEvent,
};

use crate::error::{Result, StoreError};
use crate::{Collection, Store};

/// Maximum pooled connections.
const MAX_CONNECTIONS: u32 = 5;

/// PostgreSQL-backed storage implementation.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    migrated: Arc<OnceCell<()>>,
}

impl PgStore {
    /// Create a store over a lazily connected pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection URL cannot be parsed.
    pub fn connect_lazy(database_url: &str, acquire_timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)?;

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            migrated: Arc::new(OnceCell::new()),
        }
    }

    /// Run pending migrations unless a previous call already succeeded.
    async fn ensure_schema(&self) -> Result<()> {
        self.migrated
            .get_or_try_init(|| async {
                sqlx::migrate!("./migrations").run(&self.pool).await?;
                tracing::info!("Database schema ready");
                Ok::<_, StoreError>(())
            })
            .await?;
        Ok(())
    }
}

/// SQL `LIMIT` argument; `NULL` means no limit.
fn sql_limit(limit: Option<usize>) -> Option<i64> {
    limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX))
}

fn sql_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

// =============================================================================
// Row types
// =============================================================================

#[derive(FromRow)]
struct UpdateNoteRow {
    id: i64,
    title: String,
    content: String,
    importance: String,
    date: String,
    created_at: DateTime<Utc>,
}

impl From<UpdateNoteRow> for UpdateNote {
    fn from(row: UpdateNoteRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            importance: row.importance,
            date: row.date,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct PhotoRow {
    id: String,
    title: String,
    image_url: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PhotoRow> for NostalgiaPhoto {
    type Error = StoreError;

    fn try_from(row: PhotoRow) -> Result<Self> {
        Ok(Self {
            id: row
                .id
                .parse::<PhotoId>()
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            title: row.title,
            image_url: row.image_url,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct NotificationRow {
    id: i64,
    title: String,
    message: String,
    target: String,
    sent_count: i64,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            message: row.message,
            target: row.target,
            sent_count: sql_count(row.sent_count),
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct DeviceRow {
    id: String,
    username: String,
    push_token: String,
    platform: Option<String>,
    app_version: Option<String>,
    last_active: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<DeviceRow> for DeviceRegistration {
    fn from(row: DeviceRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            push_token: row.push_token,
            platform: row.platform,
            app_version: row.app_version,
            last_active: row.last_active,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct SettingsRow {
    app_status: String,
    maintenance_message: String,
    min_version: String,
    force_update_message: String,
}

impl From<SettingsRow> for AppSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            app_status: row.app_status,
            maintenance_message: row.maintenance_message,
            min_version: row.min_version,
            force_update_message: row.force_update_message,
        }
    }
}

const DEVICE_COLUMNS: &str =
    "id, username, push_token, platform, app_version, last_active, created_at";

#[async_trait]
impl Store for PgStore {
    async fn migrate(&self) -> Result<()> {
        self.ensure_schema().await
    }

    // =========================================================================
    // Content
    // =========================================================================

    async fn list_update_notes(&self, limit: Option<usize>) -> Result<Vec<UpdateNote>> {
        self.ensure_schema().await?;
        let rows = sqlx::query_as::<_, UpdateNoteRow>(
            "SELECT id, title, content, importance, date, created_at
             FROM update_notes
             ORDER BY created_at DESC, id DESC
             LIMIT $1",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_update_note(&self, note: NewUpdateNote) -> Result<UpdateNote> {
        self.ensure_schema().await?;
        let row = sqlx::query_as::<_, UpdateNoteRow>(
            "INSERT INTO update_notes (title, content, importance, date, created_at)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING id, title, content, importance, date, created_at",
        )
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.importance)
        .bind(&note.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_photos(&self, limit: Option<usize>) -> Result<Vec<NostalgiaPhoto>> {
        self.ensure_schema().await?;
        let rows = sqlx::query_as::<_, PhotoRow>(
            "SELECT id, title, image_url, created_at
             FROM nostalgia_photos
             ORDER BY created_at DESC, id DESC
             LIMIT $1",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(NostalgiaPhoto::try_from).collect()
    }

    async fn create_photo(&self, photo: NewPhoto) -> Result<NostalgiaPhoto> {
        self.ensure_schema().await?;
        let row = sqlx::query_as::<_, PhotoRow>(
            "INSERT INTO nostalgia_photos (id, title, image_url, created_at)
             VALUES ('k' || nextval('nostalgia_photo_seq'), $1, $2, NOW())
             RETURNING id, title, image_url, created_at",
        )
        .bind(&photo.title)
        .bind(&photo.image_url)
        .fetch_one(&self.pool)
        .await?;

        NostalgiaPhoto::try_from(row)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    async fn list_notifications(&self, limit: Option<usize>) -> Result<Vec<Notification>> {
        self.ensure_schema().await?;
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, title, message, target, sent_count, created_at
             FROM notifications
             ORDER BY created_at DESC, id DESC
             LIMIT $1",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        self.ensure_schema().await?;
        let row = sqlx::query_as::<_, NotificationRow>(
            "INSERT INTO notifications (title, message, target, sent_count, created_at)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING id, title, message, target, sent_count, created_at",
        )
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.target)
        .bind(i64::try_from(notification.sent_count).unwrap_or(i64::MAX))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    // =========================================================================
    // Devices
    // =========================================================================

    async fn list_devices(&self, limit: Option<usize>) -> Result<Vec<DeviceRegistration>> {
        self.ensure_schema().await?;
        let rows = sqlx::query_as::<_, DeviceRow>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices ORDER BY created_seq DESC LIMIT $1"
        ))
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_device(&self, upsert: DeviceUpsert) -> Result<DeviceRegistration> {
        self.ensure_schema().await?;
        let now = Utc::now();
        let fresh = DeviceRegistration::from_upsert(upsert.clone(), now);

        let row = sqlx::query_as::<_, DeviceRow>(&format!(
            "INSERT INTO devices (id, username, push_token, platform, app_version, last_active, created_at)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $6)
             ON CONFLICT (id) DO UPDATE SET
                 push_token = COALESCE($3, devices.push_token),
                 platform = COALESCE($4, devices.platform),
                 app_version = COALESCE($5, devices.app_version),
                 last_active = $6
             RETURNING {DEVICE_COLUMNS}"
        ))
        .bind(&upsert.id)
        .bind(&fresh.username)
        .bind(upsert.push_token.as_deref())
        .bind(upsert.platform.as_deref())
        .bind(upsert.app_version.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn count_devices(&self, filter: DeviceFilter) -> Result<u64> {
        self.ensure_schema().await?;
        let count: i64 = match filter {
            DeviceFilter::All => {
                sqlx::query_scalar("SELECT COUNT(*) FROM devices")
                    .fetch_one(&self.pool)
                    .await?
            }
            DeviceFilter::ActiveSince(since) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM devices WHERE last_active > $1")
                    .bind(since)
                    .fetch_one(&self.pool)
                    .await?
            }
            DeviceFilter::WithPushToken => {
                sqlx::query_scalar("SELECT COUNT(*) FROM devices WHERE push_token <> ''")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(sql_count(count))
    }

    // =========================================================================
    // Aggregates, settings and usage
    // =========================================================================

    async fn count(&self, collection: Collection) -> Result<u64> {
        self.ensure_schema().await?;
        let table = match collection {
            Collection::UpdateNotes => "update_notes",
            Collection::Photos => "nostalgia_photos",
            Collection::Notifications => "notifications",
            Collection::Devices => "devices",
            Collection::UsageEvents => "usage_events",
        };

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;

        Ok(sql_count(count))
    }

    async fn get_settings(&self) -> Result<AppSettings> {
        self.ensure_schema().await?;
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT app_status, maintenance_message, min_version, force_update_message
             FROM app_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into).unwrap_or_default())
    }

    async fn update_settings(&self, patch: SettingsPatch) -> Result<AppSettings> {
        self.ensure_schema().await?;
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, SettingsRow>(
            "SELECT app_status, maintenance_message, min_version, force_update_message
             FROM app_settings WHERE id = 1 FOR UPDATE",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let mut settings: AppSettings = current.map(Into::into).unwrap_or_default();
        settings.apply(patch);

        sqlx::query(
            "INSERT INTO app_settings (id, app_status, maintenance_message, min_version, force_update_message)
             VALUES (1, $1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
                 app_status = EXCLUDED.app_status,
                 maintenance_message = EXCLUDED.maintenance_message,
                 min_version = EXCLUDED.min_version,
                 force_update_message = EXCLUDED.force_update_message",
        )
        .bind(&settings.app_status)
        .bind(&settings.maintenance_message)
        .bind(&settings.min_version)
        .bind(&settings.force_update_message)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(settings)
    }

    async fn record_usage(&self, event: UsageEvent) -> Result<()> {
        self.ensure_schema().await?;
        sqlx::query(
            "INSERT INTO usage_events (user_id, action, client_timestamp, app_version, platform, received_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(event.user_id.as_deref())
        .bind(event.action.as_deref())
        .bind(event.timestamp)
        .bind(event.app_version.as_deref())
        .bind(event.platform.as_deref())
        .bind(event.received_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
