//! Core types for the Knight Rehber admin backend.
//!
//! This crate provides the records shared by the storage layer and the HTTP service:
//!
//! - **Content**: `UpdateNote`, `NostalgiaPhoto` and their creation inputs
//! - **Notifications**: `Notification`, `NewNotification`
//! - **Devices**: `DeviceRegistration`, `DeviceUpsert`, `DeviceFilter`
//! - **Settings**: `AppSettings`, `SettingsPatch`
//! - **Usage**: `UsageEvent`
//! - **Seed**: bootstrap rows and the fallback content served when storage is down
//!
//! Records are created once and never edited, with two exceptions: device
//! registrations are upserted by device id, and `AppSettings` is a singleton
//! patched by admin actions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod content;
pub mod device;
pub mod error;
pub mod ids;
pub mod notification;
pub mod seed;
pub mod settings;
pub mod usage;

pub use content::{
    display_date, NewPhoto, NewUpdateNote, NostalgiaPhoto, UpdateNote, DEFAULT_IMPORTANCE,
};
pub use device::{DeviceFilter, DeviceRegistration, DeviceUpsert, ACTIVE_WINDOW_DAYS};
pub use error::{CoreError, Result};
pub use ids::PhotoId;
pub use notification::{NewNotification, Notification, DEFAULT_TARGET};
pub use settings::{AppSettings, SettingsPatch, DEFAULT_MAINTENANCE_MESSAGE};
pub use usage::UsageEvent;
