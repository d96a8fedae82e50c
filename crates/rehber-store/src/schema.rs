//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Update notes, keyed by big-endian note id.
    pub const UPDATE_NOTES: &str = "update_notes";

    /// Nostalgia photos, keyed by big-endian photo sequence.
    pub const PHOTOS: &str = "nostalgia_photos";

    /// Sent notifications, keyed by big-endian notification id.
    pub const NOTIFICATIONS: &str = "notifications";

    /// Device registrations, keyed by device id.
    pub const DEVICES: &str = "devices";

    /// Index: devices in creation order, keyed by big-endian sequence.
    /// Value is the device id.
    pub const DEVICES_BY_CREATION: &str = "devices_by_creation";

    /// Usage events, keyed by ULID (time-ordered).
    pub const USAGE_EVENTS: &str = "usage_events";

    /// The settings singleton under [`super::SETTINGS_KEY`].
    pub const SETTINGS: &str = "settings";

    /// Last-issued sequence numbers, keyed by sequence name.
    pub const SEQUENCES: &str = "sequences";
}

/// Key of the settings document.
pub const SETTINGS_KEY: &[u8] = b"app";

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::UPDATE_NOTES,
        cf::PHOTOS,
        cf::NOTIFICATIONS,
        cf::DEVICES,
        cf::DEVICES_BY_CREATION,
        cf::USAGE_EVENTS,
        cf::SETTINGS,
        cf::SEQUENCES,
    ]
}
