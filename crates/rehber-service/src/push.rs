//! Push notification dispatch.
//!
//! Delivery to devices is not implemented; the production dispatcher records
//! each send in the log. Dispatch failures never fail the admin request.

use async_trait::async_trait;

use rehber_core::Notification;

/// Push dispatch error.
#[derive(Debug, thiserror::Error)]
#[error("push dispatch failed: {0}")]
pub struct PushError(pub String);

/// Sends a stored notification to devices.
#[async_trait]
pub trait PushDispatcher: Send + Sync {
    /// Dispatch `notification` to its target audience.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be handed off.
    async fn dispatch(&self, notification: &Notification) -> Result<(), PushError>;
}

/// Dispatcher that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

#[async_trait]
impl PushDispatcher for LogDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), PushError> {
        tracing::info!(
            notification_id = notification.id,
            title = %notification.title,
            target = %notification.target,
            recipients = notification.sent_count,
            "Notification dispatched"
        );
        Ok(())
    }
}
