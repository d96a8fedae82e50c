//! In-memory storage implementation.
//!
//! Data lives for the lifetime of the process. Each `MemoryStore` is an
//! independent instance handed to the service, so tests never share state.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use rehber_core::{
    AppSettings, DeviceFilter, DeviceRegistration, DeviceUpsert, NewNotification, NewPhoto,
    NewUpdateNote, NostalgiaPhoto, Notification, PhotoId, SettingsPatch, UpdateNote, UsageEvent,
};

use crate::error::Result;
use crate::{len_u64, take_limit, Collection, Store};

/// Process-local storage backend.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

/// Records are kept in creation order; listings walk them in reverse.
#[derive(Default)]
struct MemoryData {
    update_notes: Vec<UpdateNote>,
    photos: Vec<NostalgiaPhoto>,
    notifications: Vec<Notification>,
    devices: Vec<DeviceRegistration>,
    usage_events: Vec<UsageEvent>,
    settings: Option<AppSettings>,
    last_note_id: i64,
    last_notification_id: i64,
    last_photo_seq: u64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_update_notes(&self, limit: Option<usize>) -> Result<Vec<UpdateNote>> {
        let data = self.data.read().await;
        Ok(take_limit(data.update_notes.iter().rev().cloned(), limit))
    }

    async fn create_update_note(&self, note: NewUpdateNote) -> Result<UpdateNote> {
        let mut data = self.data.write().await;
        data.last_note_id += 1;
        let note = UpdateNote::from_new(data.last_note_id, note, Utc::now());
        data.update_notes.push(note.clone());
        Ok(note)
    }

    async fn list_photos(&self, limit: Option<usize>) -> Result<Vec<NostalgiaPhoto>> {
        let data = self.data.read().await;
        Ok(take_limit(data.photos.iter().rev().cloned(), limit))
    }

    async fn create_photo(&self, photo: NewPhoto) -> Result<NostalgiaPhoto> {
        let mut data = self.data.write().await;
        data.last_photo_seq += 1;
        let photo = NostalgiaPhoto::from_new(
            PhotoId::from_sequence(data.last_photo_seq),
            photo,
            Utc::now(),
        );
        data.photos.push(photo.clone());
        Ok(photo)
    }

    async fn list_notifications(&self, limit: Option<usize>) -> Result<Vec<Notification>> {
        let data = self.data.read().await;
        Ok(take_limit(data.notifications.iter().rev().cloned(), limit))
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        let mut data = self.data.write().await;
        data.last_notification_id += 1;
        let notification =
            Notification::from_new(data.last_notification_id, notification, Utc::now());
        data.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_devices(&self, limit: Option<usize>) -> Result<Vec<DeviceRegistration>> {
        let data = self.data.read().await;
        Ok(take_limit(data.devices.iter().rev().cloned(), limit))
    }

    async fn upsert_device(&self, upsert: DeviceUpsert) -> Result<DeviceRegistration> {
        let now = Utc::now();
        let mut data = self.data.write().await;

        if let Some(device) = data.devices.iter_mut().find(|d| d.id == upsert.id) {
            device.apply(upsert, now);
            return Ok(device.clone());
        }

        let device = DeviceRegistration::from_upsert(upsert, now);
        data.devices.push(device.clone());
        Ok(device)
    }

    async fn count_devices(&self, filter: DeviceFilter) -> Result<u64> {
        let data = self.data.read().await;
        Ok(len_u64(
            data.devices.iter().filter(|d| d.matches(filter)).count(),
        ))
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        let data = self.data.read().await;
        let len = match collection {
            Collection::UpdateNotes => data.update_notes.len(),
            Collection::Photos => data.photos.len(),
            Collection::Notifications => data.notifications.len(),
            Collection::Devices => data.devices.len(),
            Collection::UsageEvents => data.usage_events.len(),
        };
        Ok(len_u64(len))
    }

    async fn get_settings(&self) -> Result<AppSettings> {
        let data = self.data.read().await;
        Ok(data.settings.clone().unwrap_or_default())
    }

    async fn update_settings(&self, patch: SettingsPatch) -> Result<AppSettings> {
        let mut data = self.data.write().await;
        let settings = data.settings.get_or_insert_with(AppSettings::default);
        settings.apply(patch);
        Ok(settings.clone())
    }

    async fn record_usage(&self, event: UsageEvent) -> Result<()> {
        self.data.write().await.usage_events.push(event);
        Ok(())
    }
}
