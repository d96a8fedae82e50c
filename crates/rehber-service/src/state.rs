//! Application state.

use std::sync::Arc;
use std::time::Duration;

use rehber_store::{MemoryStore, PgStore, Store};

use crate::auth::{CredentialStore, TokenIssuer};
use crate::config::{ConfigError, ServiceConfig, StoreBackend};
use crate::error::StartupError;
use crate::failures::FailureCounters;
use crate::push::{LogDispatcher, PushDispatcher};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Admin login check.
    pub credentials: Arc<dyn CredentialStore>,

    /// Admin session tokens.
    pub tokens: TokenIssuer,

    /// Push delivery.
    pub push: Arc<dyn PushDispatcher>,

    /// Counters for failures that are deliberately not surfaced to callers.
    pub failures: Arc<FailureCounters>,
}

impl AppState {
    /// Create a new application state with the logging push dispatcher.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingJwtSecret` if no signing secret is configured.
    pub fn new(
        store: Arc<dyn Store>,
        config: ServiceConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ConfigError> {
        let secret = config
            .jwt_secret
            .as_ref()
            .ok_or(ConfigError::MissingJwtSecret)?;
        let tokens = TokenIssuer::new(secret.expose());

        if config.admin.is_none() {
            tracing::warn!("Admin login not configured - every login attempt will be rejected");
        }

        Ok(Self {
            store,
            config,
            credentials,
            tokens,
            push: Arc::new(LogDispatcher),
            failures: Arc::new(FailureCounters::default()),
        })
    }

    /// Replace the push dispatcher.
    #[must_use]
    pub fn with_push(mut self, push: Arc<dyn PushDispatcher>) -> Self {
        self.push = push;
        self
    }
}

/// Open the configured storage backend.
///
/// # Errors
///
/// Returns an error if the backend is misconfigured or cannot be opened.
pub fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, StartupError> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store - data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::RocksDb => open_rocks(config),
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(ConfigError::MissingDatabaseUrl)?;
            let timeout = Duration::from_secs(config.db_connect_timeout_seconds);
            tracing::info!(
                timeout_seconds = config.db_connect_timeout_seconds,
                "Using PostgreSQL store"
            );
            Ok(Arc::new(PgStore::connect_lazy(url, timeout)?))
        }
    }
}

#[cfg(feature = "rocksdb-backend")]
fn open_rocks(config: &ServiceConfig) -> Result<Arc<dyn Store>, StartupError> {
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    Ok(Arc::new(rehber_store::RocksStore::open(&config.data_dir)?))
}

#[cfg(not(feature = "rocksdb-backend"))]
fn open_rocks(_config: &ServiceConfig) -> Result<Arc<dyn Store>, StartupError> {
    Err(ConfigError::BackendNotCompiled.into())
}
