use anyhow::{bail, Context};
use orgman_auth::DEFAULT_TOKEN_EXPIRATION_MINUTES;
use orgman_database::DatabaseConfig;

/// Where organization metadata and partitions live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub store_backend: StoreBackend,
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let store_backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => bail!("Unknown STORE_BACKEND: {}", other),
        };

        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            database: DatabaseConfig::from_env().context("Invalid database configuration")?,
            store_backend,
            jwt_secret,
            jwt_expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TOKEN_EXPIRATION_MINUTES),
            log_format,
        })
    }
}
