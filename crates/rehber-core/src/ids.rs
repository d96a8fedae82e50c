//! Identifier types.
//!
//! Update notes and notifications use plain integer ids assigned by the store.
//! Nostalgia photos use short string ids of the form `k<n>`, where `n` comes
//! from a per-store sequence so a new id never collides with an existing one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Prefix shared by every photo id.
const PHOTO_ID_PREFIX: char = 'k';

/// A nostalgia photo identifier (`k1`, `k2`, ...).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoId(String);

impl PhotoId {
    /// Build the id for the given sequence number.
    #[must_use]
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("{PHOTO_ID_PREFIX}{seq}"))
    }

    /// The sequence number encoded in this id.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        // Validated on construction
        self.0[1..].parse().unwrap_or_default()
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PhotoId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(PHOTO_ID_PREFIX)
            .ok_or_else(|| CoreError::InvalidPhotoId(s.to_string()))?;

        if digits.is_empty() || digits.parse::<u64>().is_err() {
            return Err(CoreError::InvalidPhotoId(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhotoId({})", self.0)
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhotoId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PhotoId> for String {
    fn from(id: PhotoId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_roundtrip() {
        let id = PhotoId::from_sequence(42);
        assert_eq!(id.as_str(), "k42");
        assert_eq!(id.sequence(), 42);
        assert_eq!("k42".parse::<PhotoId>().unwrap(), id);
    }

    #[test]
    fn rejects_malformed() {
        assert!("42".parse::<PhotoId>().is_err());
        assert!("k".parse::<PhotoId>().is_err());
        assert!("kx1".parse::<PhotoId>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&PhotoId::from_sequence(3)).unwrap();
        assert_eq!(json, "\"k3\"");
        let back: PhotoId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sequence(), 3);
    }
}
