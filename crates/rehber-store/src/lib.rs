//! Storage layer for Knight Rehber.
//!
//! This crate provides uniform access to the app's record collections (update
//! notes, nostalgia photos, notifications, device registrations, usage events)
//! and the settings singleton, behind one [`Store`] trait with three
//! interchangeable backends:
//!
//! - [`MemoryStore`]: process-local, for development and tests
//! - [`RocksStore`]: document store on `RocksDB` (feature `rocksdb-backend`)
//! - [`PgStore`]: relational store on PostgreSQL
//!
//! Listings are returned newest-created first. Creation assigns ids and
//! `created_at`. Device registrations are upserted by device id.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> rehber_store::Result<()> {
//! use rehber_core::NewPhoto;
//! use rehber_store::{bootstrap, MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! bootstrap(&store).await?;
//!
//! let photo = NewPhoto::new(Some("Moradon".into()), Some("/ko2.jpg".into())).unwrap();
//! let stored = store.create_photo(photo).await?;
//! assert_eq!(stored.id.as_str(), "k2");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;
#[cfg(feature = "rocksdb-backend")]
pub mod keys;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

#[cfg(test)]
pub(crate) mod conformance;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use async_trait::async_trait;

use rehber_core::{
    seed, AppSettings, DeviceFilter, DeviceRegistration, DeviceUpsert, NewNotification, NewPhoto,
    NewUpdateNote, NostalgiaPhoto, Notification, SettingsPatch, UpdateNote, UsageEvent,
};

/// The record collections a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Update notes.
    UpdateNotes,
    /// Nostalgia photos.
    Photos,
    /// Sent notifications.
    Notifications,
    /// Device registrations.
    Devices,
    /// Usage events.
    UsageEvents,
}

/// The storage trait defining all persistence operations.
///
/// Implementations report failures faithfully; deciding whether a failure is
/// served as a fallback or surfaced to the caller is left to the API layer.
#[async_trait]
pub trait Store: Send + Sync {
    /// Prepare the backing schema. A no-op for schemaless backends.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created or migrated.
    async fn migrate(&self) -> Result<()> {
        Ok(())
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// List update notes, newest first, at most `limit` if given.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_update_notes(&self, limit: Option<usize>) -> Result<Vec<UpdateNote>>;

    /// Store a new update note, assigning its id and creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn create_update_note(&self, note: NewUpdateNote) -> Result<UpdateNote>;

    /// List nostalgia photos, newest first, at most `limit` if given.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_photos(&self, limit: Option<usize>) -> Result<Vec<NostalgiaPhoto>>;

    /// Store a new photo under a fresh `k<n>` id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn create_photo(&self, photo: NewPhoto) -> Result<NostalgiaPhoto>;

    // =========================================================================
    // Notifications
    // =========================================================================

    /// List sent notifications, newest first, at most `limit` if given.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_notifications(&self, limit: Option<usize>) -> Result<Vec<Notification>>;

    /// Record a sent notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification>;

    // =========================================================================
    // Devices
    // =========================================================================

    /// List device registrations, newest-created first, at most `limit` if given.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_devices(&self, limit: Option<usize>) -> Result<Vec<DeviceRegistration>>;

    /// Create or refresh the registration for `upsert.id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn upsert_device(&self, upsert: DeviceUpsert) -> Result<DeviceRegistration>;

    /// Count device registrations matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count_devices(&self, filter: DeviceFilter) -> Result<u64>;

    // =========================================================================
    // Aggregates, settings and usage
    // =========================================================================

    /// Count all records in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count(&self, collection: Collection) -> Result<u64>;

    /// Read the settings singleton, or the defaults if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_settings(&self) -> Result<AppSettings>;

    /// Apply a partial update to the settings singleton and return the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn update_settings(&self, patch: SettingsPatch) -> Result<AppSettings>;

    /// Append a usage event.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn record_usage(&self, event: UsageEvent) -> Result<()>;
}

/// One-time initialization: migrate the schema, then seed empty collections.
///
/// Seeding only touches collections with no records, so running this on every
/// start is safe.
///
/// # Errors
///
/// Returns an error if migration or seeding fails.
pub async fn bootstrap(store: &dyn Store) -> Result<()> {
    store.migrate().await?;

    if store.count(Collection::UpdateNotes).await? == 0 {
        let note = store.create_update_note(seed::launch_note()).await?;
        tracing::info!(id = note.id, "Seeded launch update note");
    }

    if store.count(Collection::Photos).await? == 0 {
        let photo = store.create_photo(seed::seed_photo()).await?;
        tracing::info!(id = %photo.id, "Seeded nostalgia photo");
    }

    Ok(())
}

/// Apply an optional limit to an iterator.
pub(crate) fn take_limit<T>(items: impl Iterator<Item = T>, limit: Option<usize>) -> Vec<T> {
    items.take(limit.unwrap_or(usize::MAX)).collect()
}

/// Convert a collection length to a count.
pub(crate) fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
