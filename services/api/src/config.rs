//! Service configuration
//!
//! Values come from built-in defaults overridden by environment variables.
//!
//! # Environment Variables
//! - `SECRET_KEY`: HMAC secret for signing and verifying tokens (default: "secret-dev")
//! - `PORT`: Port the HTTP server listens on (default: 3001)
//! - `TOKEN_EXPIRY`: Token lifetime in seconds; tokens never expire when unset

use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::jwt::JwtConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Shared secret for HS256 tokens
    pub secret_key: String,
    /// HTTP listen port
    pub port: u16,
    /// Optional token lifetime in seconds
    pub token_expiry: Option<u64>,
}

impl AppConfig {
    /// Load the configuration from defaults and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("secret_key", "secret-dev")?
            .set_default("port", 3001)?
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// JWT settings derived from this configuration
    pub fn jwt(&self) -> JwtConfig {
        JwtConfig {
            secret: self.secret_key.clone(),
            token_expiry: self.token_expiry,
        }
    }
}
