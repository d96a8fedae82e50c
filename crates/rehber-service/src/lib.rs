//! Knight Rehber HTTP API Service.
//!
//! This crate provides the HTTP API behind the Knight Rehber mobile app and its
//! admin panel:
//!
//! - Public endpoints for the app (update notes, nostalgia photos, app status,
//!   device registration, usage pings)
//! - Admin endpoints (notifications, content, app status, statistics)
//!
//! # Authentication
//!
//! Admin endpoints require a bearer token obtained from `POST /api/admin/login`.
//! Tokens are HS256 JWTs signed with the configured secret and valid for 24 hours.
//! Public endpoints need no token.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers without awaits stay async for routing

pub mod auth;
pub mod config;
pub mod error;
pub mod failures;
pub mod handlers;
pub mod push;
pub mod routes;
pub mod state;

pub use auth::{ConfiguredCredentials, CredentialStore, TokenIssuer};
pub use config::{ServiceConfig, StoreBackend};
pub use error::{ApiError, StartupError};
pub use failures::FailureCounters;
pub use push::{LogDispatcher, PushDispatcher};
pub use routes::create_router;
pub use state::{open_store, AppState};
