//! Health check and banner handlers.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "rehber-service";

/// Banner endpoint map.
#[derive(Debug, Serialize)]
pub struct Endpoints {
    /// Admin API prefix.
    pub admin: &'static str,
    /// Public API prefix.
    pub api: &'static str,
}

/// Banner response.
#[derive(Debug, Serialize)]
pub struct BannerResponse {
    /// Greeting.
    pub message: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Where things live.
    pub endpoints: Endpoints,
}

/// Service banner.
pub async fn root() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Knight Rehber API Çalışıyor",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            admin: "/api/admin",
            api: "/api",
        },
    })
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Human-readable status.
    pub message: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Knight Rehber API çalışıyor",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}
