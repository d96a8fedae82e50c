//! Device registrations ("users" in the admin panel).
//!
//! A mobile client registers on every app open. The first call for a device id
//! creates the record; later calls refresh it in place. There is no deletion.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A device counts as active if it was seen within this many days.
pub const ACTIVE_WINDOW_DAYS: i64 = 7;

/// A registered mobile device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    /// Client-supplied device id, unique per device.
    pub id: String,
    /// Display name.
    pub username: String,
    /// Push token, empty if the client never sent one.
    pub push_token: String,
    /// Client platform (`android`, `ios`, ...).
    pub platform: Option<String>,
    /// App version reported by the client.
    pub app_version: Option<String>,
    /// Last registration time.
    pub last_active: DateTime<Utc>,
    /// First registration time.
    pub created_at: DateTime<Utc>,
}

impl DeviceRegistration {
    /// Create a registration from the first upsert for a device.
    #[must_use]
    pub fn from_upsert(upsert: DeviceUpsert, now: DateTime<Utc>) -> Self {
        let username = upsert
            .username
            .unwrap_or_else(|| format!("Kullanıcı-{}", now.timestamp_millis()));

        Self {
            id: upsert.id,
            username,
            push_token: upsert.push_token.unwrap_or_default(),
            platform: upsert.platform,
            app_version: upsert.app_version,
            last_active: now,
            created_at: now,
        }
    }

    /// Refresh an existing registration.
    ///
    /// Only `last_active` always changes; the other fields change when the
    /// client supplied a value. The username and creation time are kept.
    pub fn apply(&mut self, upsert: DeviceUpsert, now: DateTime<Utc>) {
        self.last_active = now;
        if let Some(token) = upsert.push_token {
            self.push_token = token;
        }
        if upsert.platform.is_some() {
            self.platform = upsert.platform;
        }
        if upsert.app_version.is_some() {
            self.app_version = upsert.app_version;
        }
    }

    /// Whether the device was seen within the active window ending at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.last_active > now - Duration::days(ACTIVE_WINDOW_DAYS)
    }

    /// Whether the device can receive push notifications.
    #[must_use]
    pub fn has_push_token(&self) -> bool {
        !self.push_token.is_empty()
    }

    /// Whether the device matches a count filter.
    #[must_use]
    pub fn matches(&self, filter: DeviceFilter) -> bool {
        match filter {
            DeviceFilter::All => true,
            DeviceFilter::ActiveSince(since) => self.last_active > since,
            DeviceFilter::WithPushToken => self.has_push_token(),
        }
    }
}

/// Validated input for a device upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceUpsert {
    /// Device id.
    pub id: String,
    /// Push token, if the client has one.
    pub push_token: Option<String>,
    /// Client platform.
    pub platform: Option<String>,
    /// App version.
    pub app_version: Option<String>,
    /// Display name, used only on first registration.
    pub username: Option<String>,
}

impl DeviceUpsert {
    /// Validate client input.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingField` if the device id is absent or blank.
    pub fn new(
        id: Option<String>,
        push_token: Option<String>,
        app_version: Option<String>,
        platform: Option<String>,
        username: Option<String>,
    ) -> Result<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        Ok(Self {
            id: id
                .filter(|v| !v.trim().is_empty())
                .ok_or(CoreError::MissingField("userId"))?,
            push_token: non_empty(push_token),
            platform: non_empty(platform),
            app_version: non_empty(app_version),
            username: non_empty(username),
        })
    }
}

/// Predicate for counting device registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Every registration.
    All,
    /// Registrations seen after the given instant.
    ActiveSince(DateTime<Utc>),
    /// Registrations holding a push token.
    WithPushToken,
}

impl DeviceFilter {
    /// Devices active within the standard window ending at `now`.
    #[must_use]
    pub fn active_at(now: DateTime<Utc>) -> Self {
        Self::ActiveSince(now - Duration::days(ACTIVE_WINDOW_DAYS))
    }
}
