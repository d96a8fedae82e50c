//! Usage pings submitted by the mobile client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fire-and-forget usage event. Written once, never read back by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    /// Reporting device id.
    pub user_id: Option<String>,
    /// What the user did (`app_open`, `screen_view`, ...).
    pub action: Option<String>,
    /// Client-side timestamp, if it parsed.
    pub timestamp: Option<DateTime<Utc>>,
    /// App version.
    pub app_version: Option<String>,
    /// Client platform.
    pub platform: Option<String>,
    /// Server receive time.
    pub received_at: DateTime<Utc>,
}
