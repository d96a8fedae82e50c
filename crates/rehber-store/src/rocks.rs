//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//! Records are stored as CBOR documents. Ids are allocated from per-collection
//! sequences; allocation and the record write land in the same `WriteBatch`.
//!
//! `RocksDB` calls block, so every operation runs on the blocking thread pool.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};
use ulid::Ulid;

use rehber_core::{
    AppSettings, DeviceFilter, DeviceRegistration, DeviceUpsert, NewNotification, NewPhoto,
    NewUpdateNote, NostalgiaPhoto, Notification, PhotoId, SettingsPatch, UpdateNote, UsageEvent,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf, SETTINGS_KEY};
use crate::{len_u64, Collection, Store};

/// RocksDB-backed storage implementation.
#[derive(Clone)]
pub struct RocksStore {
    inner: Arc<RocksInner>,
}

struct RocksInner {
    db: DBWithThreadMode<MultiThreaded>,
    /// Serializes read-modify-write cycles (sequences, upserts, settings).
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(RocksInner {
                db,
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Run `op` against the database on the blocking thread pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&RocksInner) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&inner))
            .await
            .map_err(|e| StoreError::Database(format!("storage task failed: {e}")))?
    }
}

impl RocksInner {
    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Read the last value issued for a sequence. Caller must hold the write lock.
    fn current_sequence(&self, name: &[u8]) -> Result<u64> {
        let cf = self.cf(cf::SEQUENCES)?;
        let value = self
            .db
            .get_cf(&cf, name)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(keys::decode_sequence(value.as_deref()))
    }

    /// Write `record` under the next value of `sequence`, returning that value.
    fn insert_sequenced<T: serde::Serialize>(
        &self,
        family: &str,
        sequence: &[u8],
        build: impl FnOnce(u64) -> T,
    ) -> Result<T> {
        let _guard = self.lock()?;
        let next = self.current_sequence(sequence)? + 1;
        let record = build(next);

        let cf_records = self.cf(family)?;
        let cf_sequences = self.cf(cf::SEQUENCES)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_records, keys::sequence_key(next), Self::serialize(&record)?);
        batch.put_cf(&cf_sequences, sequence, next.to_be_bytes());

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(record)
    }

    /// Read up to `limit` documents from a sequence-keyed family, newest first.
    fn list_newest<T: serde::de::DeserializeOwned>(
        &self,
        family: &str,
        limit: Option<usize>,
    ) -> Result<Vec<T>> {
        let cf = self.cf(family)?;
        let limit = limit.unwrap_or(usize::MAX);
        let mut records = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::End) {
            if records.len() >= limit {
                break;
            }
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            records.push(Self::deserialize(&value)?);
        }

        Ok(records)
    }

    fn get_device(&self, device_id: &str) -> Result<Option<DeviceRegistration>> {
        let cf = self.cf(cf::DEVICES)?;

        self.db
            .get_cf(&cf, keys::device_key(device_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_devices(&self, limit: Option<usize>) -> Result<Vec<DeviceRegistration>> {
        let cf_index = self.cf(cf::DEVICES_BY_CREATION)?;
        let limit = limit.unwrap_or(usize::MAX);
        let mut devices = Vec::new();

        for item in self.db.iterator_cf(&cf_index, IteratorMode::End) {
            if devices.len() >= limit {
                break;
            }
            let (_, device_id) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let device_id = String::from_utf8_lossy(&device_id);
            if let Some(device) = self.get_device(&device_id)? {
                devices.push(device);
            }
        }

        Ok(devices)
    }

    fn upsert_device(&self, upsert: DeviceUpsert) -> Result<DeviceRegistration> {
        let now = Utc::now();
        let _guard = self.lock()?;

        let cf_devices = self.cf(cf::DEVICES)?;
        let key = keys::device_key(&upsert.id);
        let mut batch = WriteBatch::default();

        let device = if let Some(mut existing) = self.get_device(&upsert.id)? {
            existing.apply(upsert, now);
            existing
        } else {
            let cf_index = self.cf(cf::DEVICES_BY_CREATION)?;
            let cf_sequences = self.cf(cf::SEQUENCES)?;
            let next = self.current_sequence(keys::seq::DEVICES)? + 1;

            batch.put_cf(&cf_index, keys::sequence_key(next), &key);
            batch.put_cf(&cf_sequences, keys::seq::DEVICES, next.to_be_bytes());
            DeviceRegistration::from_upsert(upsert, now)
        };

        batch.put_cf(&cf_devices, &key, Self::serialize(&device)?);
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(device)
    }

    fn count_devices(&self, filter: DeviceFilter) -> Result<u64> {
        if filter == DeviceFilter::All {
            return self.count_family(cf::DEVICES);
        }

        let cf = self.cf(cf::DEVICES)?;
        let mut count = 0usize;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let device: DeviceRegistration = Self::deserialize(&value)?;
            if device.matches(filter) {
                count += 1;
            }
        }
        Ok(len_u64(count))
    }

    fn count_family(&self, family: &str) -> Result<u64> {
        let cf = self.cf(family)?;
        let mut count = 0u64;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            item.map_err(|e| StoreError::Database(e.to_string()))?;
            count += 1;
        }
        Ok(count)
    }

    fn read_settings(&self) -> Result<AppSettings> {
        let cf = self.cf(cf::SETTINGS)?;

        Ok(self
            .db
            .get_cf(&cf, SETTINGS_KEY)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()?
            .unwrap_or_default())
    }

    fn update_settings(&self, patch: SettingsPatch) -> Result<AppSettings> {
        let _guard = self.lock()?;
        let mut settings = self.read_settings()?;
        settings.apply(patch);

        let cf = self.cf(cf::SETTINGS)?;
        self.db
            .put_cf(&cf, SETTINGS_KEY, Self::serialize(&settings)?)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(settings)
    }

    fn record_usage(&self, event: &UsageEvent) -> Result<()> {
        let cf = self.cf(cf::USAGE_EVENTS)?;
        let key = keys::usage_event_key(&Ulid::new());

        self.db
            .put_cf(&cf, key, Self::serialize(event)?)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Store for RocksStore {
    // =========================================================================
    // Content
    // =========================================================================

    async fn list_update_notes(&self, limit: Option<usize>) -> Result<Vec<UpdateNote>> {
        self.blocking(move |db| db.list_newest(cf::UPDATE_NOTES, limit))
            .await
    }

    async fn create_update_note(&self, note: NewUpdateNote) -> Result<UpdateNote> {
        self.blocking(move |db| {
            db.insert_sequenced(cf::UPDATE_NOTES, keys::seq::UPDATE_NOTES, |seq| {
                UpdateNote::from_new(i64::try_from(seq).unwrap_or(i64::MAX), note, Utc::now())
            })
        })
        .await
    }

    async fn list_photos(&self, limit: Option<usize>) -> Result<Vec<NostalgiaPhoto>> {
        self.blocking(move |db| db.list_newest(cf::PHOTOS, limit)).await
    }

    async fn create_photo(&self, photo: NewPhoto) -> Result<NostalgiaPhoto> {
        self.blocking(move |db| {
            db.insert_sequenced(cf::PHOTOS, keys::seq::PHOTOS, |seq| {
                NostalgiaPhoto::from_new(PhotoId::from_sequence(seq), photo, Utc::now())
            })
        })
        .await
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    async fn list_notifications(&self, limit: Option<usize>) -> Result<Vec<Notification>> {
        self.blocking(move |db| db.list_newest(cf::NOTIFICATIONS, limit))
            .await
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        self.blocking(move |db| {
            db.insert_sequenced(cf::NOTIFICATIONS, keys::seq::NOTIFICATIONS, |seq| {
                Notification::from_new(
                    i64::try_from(seq).unwrap_or(i64::MAX),
                    notification,
                    Utc::now(),
                )
            })
        })
        .await
    }

    // =========================================================================
    // Devices
    // =========================================================================

    async fn list_devices(&self, limit: Option<usize>) -> Result<Vec<DeviceRegistration>> {
        self.blocking(move |db| db.list_devices(limit)).await
    }

    async fn upsert_device(&self, upsert: DeviceUpsert) -> Result<DeviceRegistration> {
        self.blocking(move |db| db.upsert_device(upsert)).await
    }

    async fn count_devices(&self, filter: DeviceFilter) -> Result<u64> {
        self.blocking(move |db| db.count_devices(filter)).await
    }

    // =========================================================================
    // Aggregates, settings and usage
    // =========================================================================

    async fn count(&self, collection: Collection) -> Result<u64> {
        let family = match collection {
            Collection::UpdateNotes => cf::UPDATE_NOTES,
            Collection::Photos => cf::PHOTOS,
            Collection::Notifications => cf::NOTIFICATIONS,
            Collection::Devices => cf::DEVICES,
            Collection::UsageEvents => cf::USAGE_EVENTS,
        };
        self.blocking(move |db| db.count_family(family)).await
    }

    async fn get_settings(&self) -> Result<AppSettings> {
        self.blocking(RocksInner::read_settings).await
    }

    async fn update_settings(&self, patch: SettingsPatch) -> Result<AppSettings> {
        self.blocking(move |db| db.update_settings(patch)).await
    }

    async fn record_usage(&self, event: UsageEvent) -> Result<()> {
        self.blocking(move |db| db.record_usage(&event)).await
    }
}
