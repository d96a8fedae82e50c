//! The application settings singleton.

use serde::{Deserialize, Serialize};

/// Status that puts the app into maintenance mode.
pub const MAINTENANCE_STATUS: &str = "maintenance";

/// Status applied when the admin leaves it blank.
pub const DEFAULT_STATUS: &str = "active";

/// Message shown while the app is in maintenance.
pub const DEFAULT_MAINTENANCE_MESSAGE: &str = "Uygulama bakım modundadır.";

/// Minimum supported client version before an admin sets one.
pub const DEFAULT_MIN_VERSION: &str = "1.0.0";

/// App-wide flags read by every client on startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// `active`, `maintenance`, or another admin-chosen status.
    pub app_status: String,
    /// Message shown in maintenance mode.
    pub maintenance_message: String,
    /// Oldest client version still supported.
    pub min_version: String,
    /// Message shown to clients older than `min_version`.
    #[serde(default)]
    pub force_update_message: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_status: DEFAULT_STATUS.to_string(),
            maintenance_message: DEFAULT_MAINTENANCE_MESSAGE.to_string(),
            min_version: DEFAULT_MIN_VERSION.to_string(),
            force_update_message: String::new(),
        }
    }
}

impl AppSettings {
    /// Whether clients should show the maintenance screen.
    #[must_use]
    pub fn is_maintenance(&self) -> bool {
        self.app_status == MAINTENANCE_STATUS
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(status) = patch.app_status {
            self.app_status = status;
        }
        if let Some(message) = patch.maintenance_message {
            self.maintenance_message = message;
        }
        if let Some(version) = patch.min_version {
            self.min_version = version;
        }
        if let Some(message) = patch.force_update_message {
            self.force_update_message = message;
        }
    }
}

/// A partial update to `AppSettings`; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    /// New status.
    pub app_status: Option<String>,
    /// New maintenance message.
    pub maintenance_message: Option<String>,
    /// New minimum version.
    pub min_version: Option<String>,
    /// New force-update message.
    pub force_update_message: Option<String>,
}

impl SettingsPatch {
    /// The admin "set status" action: blank status becomes `active`, blank
    /// message becomes the canned maintenance message.
    #[must_use]
    pub fn status(status: Option<String>, maintenance_message: Option<String>) -> Self {
        Self {
            app_status: Some(crate::error::or_default(status, DEFAULT_STATUS)),
            maintenance_message: Some(crate::error::or_default(
                maintenance_message,
                DEFAULT_MAINTENANCE_MESSAGE,
            )),
            ..Self::default()
        }
    }

    /// The admin "version settings" action; only supplied fields change.
    #[must_use]
    pub fn version(min_version: Option<String>, force_update_message: Option<String>) -> Self {
        Self {
            min_version: min_version.filter(|v| !v.trim().is_empty()),
            force_update_message,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_patch_defaults() {
        let mut settings = AppSettings {
            app_status: MAINTENANCE_STATUS.into(),
            maintenance_message: "back soon".into(),
            ..AppSettings::default()
        };
        settings.apply(SettingsPatch::status(None, None));
        assert_eq!(settings.app_status, DEFAULT_STATUS);
        assert_eq!(settings.maintenance_message, DEFAULT_MAINTENANCE_MESSAGE);
        assert!(!settings.is_maintenance());
    }

    #[test]
    fn version_patch_leaves_status_alone() {
        let mut settings = AppSettings::default();
        settings.apply(SettingsPatch::status(Some("maintenance".into()), None));
        settings.apply(SettingsPatch::version(Some("1.2.0".into()), None));
        assert!(settings.is_maintenance());
        assert_eq!(settings.min_version, "1.2.0");
        assert_eq!(settings.force_update_message, "");
    }
}
