//! Key encoding utilities for `RocksDB`.
//!
//! Sequence keys are big-endian so that byte order matches numeric order and a
//! reverse iterator yields the newest record first.

use ulid::Ulid;

/// Encode a sequence number as an 8-byte big-endian key.
#[must_use]
pub fn sequence_key(seq: u64) -> Vec<u8> {
    seq.to_be_bytes().to_vec()
}

/// Decode a stored sequence value. Missing or malformed values read as zero.
#[must_use]
pub fn decode_sequence(value: Option<&[u8]>) -> u64 {
    value
        .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
        .map_or(0, u64::from_be_bytes)
}

/// Create a device key from a device id.
#[must_use]
pub fn device_key(device_id: &str) -> Vec<u8> {
    device_id.as_bytes().to_vec()
}

/// Create a usage event key. ULIDs sort by creation time.
#[must_use]
pub fn usage_event_key(id: &Ulid) -> Vec<u8> {
    id.to_bytes().to_vec()
}

/// Sequence names stored in the `sequences` column family.
pub mod seq {
    /// Update note ids.
    pub const UPDATE_NOTES: &[u8] = b"update_notes";
    /// Photo id numbers.
    pub const PHOTOS: &[u8] = b"nostalgia_photos";
    /// Notification ids.
    pub const NOTIFICATIONS: &[u8] = b"notifications";
    /// Device creation order.
    pub const DEVICES: &[u8] = b"devices";
}
