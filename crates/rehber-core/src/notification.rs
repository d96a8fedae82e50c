//! Admin-composed push notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{or_default, required, Result};

/// Audience used when the admin does not pick one.
pub const DEFAULT_TARGET: &str = "all";

/// A notification as recorded at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Store-assigned id.
    pub id: i64,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// `all` or a cohort tag.
    pub target: String,
    /// Registered device count when the notification was sent.
    pub sent_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Materialize a stored notification from its creation input.
    #[must_use]
    pub fn from_new(id: i64, new: NewNotification, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            message: new.message,
            target: new.target,
            sent_count: new.sent_count,
            created_at,
        }
    }
}

/// Validated input for a new notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Audience.
    pub target: String,
    /// Recipient snapshot, filled in by the sender before storing.
    pub sent_count: u64,
}

impl NewNotification {
    /// Validate admin input, defaulting the target to `all`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingField` if the title or message is absent or blank.
    pub fn new(
        title: Option<String>,
        message: Option<String>,
        target: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            title: required("title", title)?,
            message: required("message", message)?,
            target: or_default(target, DEFAULT_TARGET),
            sent_count: 0,
        })
    }

    /// Record how many devices the notification goes out to.
    #[must_use]
    pub fn with_sent_count(mut self, sent_count: u64) -> Self {
        self.sent_count = sent_count;
        self
    }
}
