//! Service configuration.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Which storage backend to open at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Process-local store, lost on restart.
    #[default]
    Memory,
    /// `RocksDB` document store under `DATA_DIR`.
    RocksDb,
    /// PostgreSQL at `DATABASE_URL`.
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "rocksdb" | "rocks" => Ok(Self::RocksDb),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `STORE_BACKEND` named an unknown backend.
    #[error("unknown store backend: {0}")]
    InvalidBackend(String),

    /// `JWT_SECRET` was not provided.
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,

    /// The Postgres backend was selected without `DATABASE_URL`.
    #[error("DATABASE_URL must be set for the postgres backend")]
    MissingDatabaseUrl,

    /// The RocksDB backend was selected but not compiled in.
    #[error("this build does not include the rocksdb backend")]
    BackendNotCompiled,

    /// `ADMIN_PASSWORD_SHA256` was not a 32-byte hex digest.
    #[error("invalid admin password digest")]
    InvalidPasswordDigest,
}

/// A secret string that never prints its contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// The admin login, with the password kept only as a SHA-256 digest.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    /// Admin username.
    pub username: String,
    /// SHA-256 of the admin password.
    pub password_sha256: [u8; 32],
}

impl AdminCredentials {
    /// Build from a plaintext password.
    #[must_use]
    pub fn from_plain(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_sha256: Sha256::digest(password.as_bytes()).into(),
        }
    }

    /// Build from a hex-encoded SHA-256 password digest.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPasswordDigest` if `hex_digest` is not 64 hex chars.
    pub fn from_digest_hex(
        username: impl Into<String>,
        hex_digest: &str,
    ) -> Result<Self, ConfigError> {
        let bytes = hex::decode(hex_digest.trim()).map_err(|_| ConfigError::InvalidPasswordDigest)?;
        let password_sha256 =
            <[u8; 32]>::try_from(bytes).map_err(|_| ConfigError::InvalidPasswordDigest)?;

        Ok(Self {
            username: username.into(),
            password_sha256,
        })
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:3000").
    pub listen_addr: String,

    /// Storage backend (default: memory).
    pub store_backend: StoreBackend,

    /// Path to `RocksDB` data directory (default: "./data/rehber").
    pub data_dir: String,

    /// PostgreSQL connection URL.
    pub database_url: Option<String>,

    /// Bound on acquiring a database connection, in seconds.
    pub db_connect_timeout_seconds: u64,

    /// Token signing secret.
    pub jwt_secret: Option<Secret>,

    /// Admin login, if configured.
    pub admin: Option<AdminCredentials>,

    /// App version reported by the stats endpoint.
    pub app_version: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Admin secrets file structure.
#[derive(Debug, Default, Deserialize)]
struct AdminSecrets {
    username: Option<String>,
    password: Option<String>,
    password_sha256: Option<String>,
    jwt_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let secrets = load_admin_secrets();

        let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
            format!("0.0.0.0:{port}")
        });

        let store_backend = std::env::var("STORE_BACKEND")
            .ok()
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or_default();

        let jwt_secret = secrets
            .jwt_secret
            .clone()
            .or_else(|| std::env::var("JWT_SECRET").ok())
            .filter(|s| !s.is_empty())
            .map(Secret::new);

        Ok(Self {
            listen_addr,
            store_backend,
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            database_url: std::env::var("DATABASE_URL").ok(),
            db_connect_timeout_seconds: env_parse("DB_CONNECT_TIMEOUT_SECONDS")
                .unwrap_or(defaults.db_connect_timeout_seconds),
            jwt_secret,
            admin: admin_credentials(secrets)?,
            app_version: std::env::var("APP_VERSION").unwrap_or(defaults.app_version),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        })
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Resolve the admin login: secrets file first, then environment.
fn admin_credentials(secrets: AdminSecrets) -> Result<Option<AdminCredentials>, ConfigError> {
    let Some(username) = secrets
        .username
        .or_else(|| std::env::var("ADMIN_USERNAME").ok())
        .filter(|u| !u.is_empty())
    else {
        return Ok(None);
    };

    if let Some(digest) = secrets
        .password_sha256
        .or_else(|| std::env::var("ADMIN_PASSWORD_SHA256").ok())
    {
        return AdminCredentials::from_digest_hex(username, &digest).map(Some);
    }

    Ok(secrets
        .password
        .or_else(|| std::env::var("ADMIN_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .map(|password| AdminCredentials::from_plain(username, &password)))
}

/// Load admin secrets from the first secrets file found.
fn load_admin_secrets() -> AdminSecrets {
    let secret_paths = [".secrets/admin.json", "../.secrets/admin.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<AdminSecrets>(path) {
            tracing::info!(path = %path, "Loaded admin secrets from file");
            return secrets;
        }
    }

    tracing::debug!("Admin secrets file not found, using environment variables");
    AdminSecrets::default()
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".into(),
            store_backend: StoreBackend::Memory,
            data_dir: "./data/rehber".into(),
            database_url: None,
            db_connect_timeout_seconds: 5,
            jwt_secret: None,
            admin: None,
            app_version: "1.0.0".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backends() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("RocksDB".parse::<StoreBackend>().unwrap(), StoreBackend::RocksDb);
        assert_eq!("pg".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert!(matches!(
            "mongo".parse::<StoreBackend>(),
            Err(ConfigError::InvalidBackend(name)) if name == "mongo"
        ));
    }

    #[test]
    fn digest_and_plain_credentials_agree() {
        let plain = AdminCredentials::from_plain("admin", "s3cret");
        let hex_digest = hex::encode(plain.password_sha256);
        let hashed = AdminCredentials::from_digest_hex("admin", &hex_digest).unwrap();
        assert_eq!(plain, hashed);
    }

    #[test]
    fn rejects_short_digest() {
        assert!(matches!(
            AdminCredentials::from_digest_hex("admin", "abcd"),
            Err(ConfigError::InvalidPasswordDigest)
        ));
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let config = ServiceConfig {
            jwt_secret: Some(Secret::new("top-secret")),
            admin: Some(AdminCredentials::from_plain("admin", "hunter2")),
            ..ServiceConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("top-secret"));
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("admin"));
    }

    #[test]
    fn defaults_match_documentation() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.db_connect_timeout_seconds, 5);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
    }
}
