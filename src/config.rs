//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_GEOCODING_BASE_URL, DEFAULT_GEOCODING_COUNTRY,
    DEFAULT_GEOCODING_LANGUAGE, DEFAULT_GEOCODING_TIMEOUT_SECS, DEFAULT_MAX_IMPORT_SIZE_MB,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SESSION_MAX_AGE_DAYS,
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub geocoding: GeocodingConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound for uploaded import files, in bytes
    pub max_import_bytes: usize,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    /// Public base URL of the site; used as token issuer and CORS origin
    pub url: String,
    pub max_age_days: i64,
}

/// MapTiler geocoding configuration
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub api_key: String,
    pub base_url: String,
    pub language: String,
    pub country: String,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            session: SessionConfig::from_env()?,
            geocoding: GeocodingConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_import_mb: usize = parse_or("MAX_IMPORT_SIZE_MB", DEFAULT_MAX_IMPORT_SIZE_MB)?;

        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_import_bytes: max_import_mb * 1024 * 1024,
        })
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: required("DATABASE_URL")?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
        })
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: required("SESSION_SECRET")?,
            url: required("SESSION_URL")?,
            max_age_days: parse_or("SESSION_MAX_AGE_DAYS", DEFAULT_SESSION_MAX_AGE_DAYS)?,
        })
    }
}

impl GeocodingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 = parse_or("GEOCODING_TIMEOUT_SECS", DEFAULT_GEOCODING_TIMEOUT_SECS)?;

        Ok(Self {
            api_key: required("MAPTILER_KEY")?,
            base_url: env::var("GEOCODING_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODING_BASE_URL.to_string()),
            language: env::var("GEOCODING_LANGUAGE")
                .unwrap_or_else(|_| DEFAULT_GEOCODING_LANGUAGE.to_string()),
            country: env::var("GEOCODING_COUNTRY")
                .unwrap_or_else(|_| DEFAULT_GEOCODING_COUNTRY.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Read a required, non-empty environment variable
fn required(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name.to_string())),
    }
}

/// Parse an optional environment variable, falling back to a default
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
