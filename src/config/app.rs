//! Application settings.
//!
//! Non-secret settings live in `config.toml` (path overridable with `CONFIG_PATH`);
//! every section and field is optional and falls back to a default. Secrets such as
//! `JWT_SECRET` are read from the environment instead, see [`jwt_secret`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Token lifetimes
    pub auth: AuthConfig,
    /// Password reset link settings
    pub reset_password: ResetPasswordConfig,
    /// Outbound mail settings
    pub mail: MailConfig,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

/// `[auth]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Lifetime of login/register access tokens
    pub access_token_ttl_secs: i64,
    /// Lifetime of the token embedded in password reset links
    pub reset_token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_ttl_secs: 7 * 24 * 3600,
            reset_token_ttl_secs: 15 * 60,
        }
    }
}

/// `[reset_password]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResetPasswordConfig {
    /// Front-end origin the emailed link points at
    pub link_base: String,
}

impl Default for ResetPasswordConfig {
    fn default() -> Self {
        Self {
            link_base: "http://localhost:5173".to_string(),
        }
    }
}

/// `[mail]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Sender address used on outbound mail
    pub from_address: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_address: "Storefront <no-reply@storefront.local>".to_string(),
        }
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML syntax is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse TOML from config file {path_ref:?}: {e}"),
    })
}

/// Loads configuration from `CONFIG_PATH` or `./config.toml`.
///
/// A missing file is not an error: defaults are used instead.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {}", path);
        Ok(config)
    } else {
        info!("No configuration file at {}, using defaults", path);
        Ok(AppConfig::default())
    }
}

/// Reads the token signing secret from `JWT_SECRET`.
pub fn jwt_secret() -> Result<String> {
    let secret = std::env::var("JWT_SECRET")?;
    if secret.trim().is_empty() {
        return Err(Error::Config {
            message: "JWT_SECRET must not be empty".to_string(),
        });
    }
    Ok(secret)
}
