//! # configs
//!
//! Layered runtime settings: an optional `quillpress.toml` file overridden by
//! `APP__`-prefixed environment variables (e.g. `APP__SERVER__PORT=9000`).
//! The signing secret is held behind `secrecy` so it never lands in logs.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite:quillpress.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 signing secret for confirm/reset/session tokens.
    pub secret_key: SecretString,
    /// Lifetime of confirm/reset tokens, seconds.
    pub token_ttl_secs: i64,
    /// Treat every account as confirmed. Meant for deployments without
    /// outbound mail; never enable in production.
    pub always_confirmed: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret_key: SecretString::from("change me".to_string()),
            token_ttl_secs: 600,
            always_confirmed: false,
        }
    }
}

impl Settings {
    /// Load settings from `.env`, the optional config file and the
    /// environment, in increasing order of precedence.
    pub fn load() -> Result<Settings, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            tracing::debug!("loaded environment from .env");
        }
        let settings = Config::builder()
            .add_source(File::with_name("quillpress").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
