//! Application settings loaded from environment variables.
//!
//! All values have defaults suitable for local development; a `.env` file is
//! loaded by `main` before this module reads the environment.

use crate::errors::{Error, Result};

/// Default SQLite database path, created on demand.
const DEFAULT_DATABASE_URL: &str = "sqlite://data/classhours.sqlite?mode=rwc";
/// Default listen address for the HTTP server.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Default WeChat API base; tests point this at a local stub.
const DEFAULT_WECHAT_API_BASE: &str = "https://api.weixin.qq.com";
/// Default session lifetime: one day.
const DEFAULT_SESSION_TTL_SECONDS: i64 = 86_400;

/// Typed application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SeaORM connection string
    pub database_url: String,
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// Base URL of the upstream WeChat API
    pub wechat_api_base: String,
    /// Lifetime of a login session in seconds
    pub session_ttl_seconds: i64,
}

impl AppConfig {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if `SESSION_TTL_SECONDS` is set but not a positive
    /// integer.
    pub fn from_env() -> Result<Self> {
        let session_ttl_seconds = match std::env::var("SESSION_TTL_SECONDS") {
            Ok(raw) => raw.parse::<i64>().ok().filter(|ttl| *ttl > 0).ok_or_else(|| {
                Error::Config {
                    message: format!("SESSION_TTL_SECONDS must be a positive integer, got '{raw}'"),
                }
            })?,
            Err(_) => DEFAULT_SESSION_TTL_SECONDS,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            wechat_api_base: std::env::var("WECHAT_API_BASE")
                .unwrap_or_else(|_| DEFAULT_WECHAT_API_BASE.to_string()),
            session_ttl_seconds,
        })
    }
}
