//! Process configuration
//!
//! Everything the services need from the environment is read here, once, at
//! startup. The resulting [`AppConfig`] is handed to constructors explicitly;
//! no other module reads environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::database::DatabaseConfig;
use crate::error::ConfigError;

/// Top-level configuration for the carstock API process
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    /// Build the full configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            upload: UploadConfig::from_env()?,
        })
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// # Environment Variables
    /// - `HOST`: bind address (default: 0.0.0.0)
    /// - `PORT`: bind port (default: 5000)
    /// - `CORS_ORIGINS`: comma-separated origins (default: the two Vite dev ports)
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:5174".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            host,
            port,
            cors_origins,
        }
    }

    /// Socket address string suitable for `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Symmetric secret used to sign and verify tokens (HS256)
    pub secret: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: signing secret (required)
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let access_token_expiry = env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string()) // 15 minutes
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .unwrap_or(604800);

        Ok(Self {
            secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// What happens to a staged file when ingestion fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Delete only after a successful persist; failed imports stay on disk
    OnSuccess,
    /// Delete on every exit path
    Always,
}

impl FromStr for CleanupPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on_success" | "on-success" => Ok(CleanupPolicy::OnSuccess),
            "always" => Ok(CleanupPolicy::Always),
            other => Err(ConfigError::Invalid {
                name: "UPLOAD_CLEANUP",
                reason: format!("expected `on_success` or `always`, got `{}`", other),
            }),
        }
    }
}

/// Upload staging configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory staged uploads are written to; created on first use
    pub staging_dir: PathBuf,
    /// Largest accepted upload in bytes
    pub max_bytes: usize,
    pub cleanup: CleanupPolicy,
    /// Cron expression (with seconds) for the stale-file sweeper
    pub sweep_schedule: String,
    /// Staged files older than this many seconds are removed by the sweeper
    pub stale_after_secs: u64,
}

impl UploadConfig {
    /// # Environment Variables
    /// - `UPLOAD_DIR` (default: uploads)
    /// - `UPLOAD_MAX_BYTES` (default: 5 MiB)
    /// - `UPLOAD_CLEANUP`: `on_success` or `always` (default: on_success)
    /// - `UPLOAD_SWEEP_SCHEDULE` (default: hourly)
    /// - `UPLOAD_STALE_AFTER_SECS` (default: 86400)
    pub fn from_env() -> Result<Self, ConfigError> {
        let staging_dir =
            PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));

        let max_bytes = env::var("UPLOAD_MAX_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5 * 1024 * 1024);

        let cleanup = match env::var("UPLOAD_CLEANUP") {
            Ok(value) => value.parse()?,
            Err(_) => CleanupPolicy::OnSuccess,
        };

        let sweep_schedule =
            env::var("UPLOAD_SWEEP_SCHEDULE").unwrap_or_else(|_| "0 0 * * * *".to_string());

        let stale_after_secs = env::var("UPLOAD_STALE_AFTER_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        Ok(Self {
            staging_dir,
            max_bytes,
            cleanup,
            sweep_schedule,
            stale_after_secs,
        })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("uploads"),
            max_bytes: 5 * 1024 * 1024,
            cleanup: CleanupPolicy::OnSuccess,
            sweep_schedule: "0 0 * * * *".to_string(),
            stale_after_secs: 86400,
        }
    }
}
