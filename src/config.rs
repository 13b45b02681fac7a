//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup. Secrets (JWT signing key, admin key) are injected
//! as environment variables by the deployment.

use std::env;
use std::str::FromStr;

/// Largest accepted offset for the leaderboard calendar (±14h, like real zones).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Which document store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store for local development and tests; data is lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Document store implementation
    pub store_backend: StoreBackend,
    /// Fixed UTC offset (minutes) used for date strings and week boundaries
    pub utc_offset_minutes: i32,

    // --- Secrets ---
    /// Shared key used to verify identity provider session tokens (HS256)
    pub jwt_signing_key: Vec<u8>,
    /// Key required by `/admin/*` routes; admin routes are closed when unset
    pub admin_api_key: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            utc_offset_minutes: 0,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            admin_api_key: Some("test_admin_key".to_string()),
        }
    }
}

impl Config {
    /// Config with fixed test values (in-memory store, UTC calendar).
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Firestore,
        };

        let utc_offset_minutes = match env::var("LEADERBOARD_UTC_OFFSET_MINUTES") {
            Ok(raw) => parse_utc_offset(&raw)?,
            Err(_) => 0,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            utc_offset_minutes,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            admin_api_key: env::var("ADMIN_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

fn parse_utc_offset(raw: &str) -> Result<i32, ConfigError> {
    let minutes: i32 = raw.trim().parse().map_err(|_| {
        ConfigError::Invalid("LEADERBOARD_UTC_OFFSET_MINUTES", raw.to_string())
    })?;
    if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(ConfigError::Invalid(
            "LEADERBOARD_UTC_OFFSET_MINUTES",
            raw.to_string(),
        ));
    }
    Ok(minutes)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("LEADERBOARD_UTC_OFFSET_MINUTES", "-420");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.utc_offset_minutes, -420);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(
            "Firestore".parse::<StoreBackend>().unwrap(),
            StoreBackend::Firestore
        );
        assert!("postgres".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_utc_offset_bounds() {
        assert_eq!(parse_utc_offset("330").unwrap(), 330);
        assert!(parse_utc_offset("900").is_err());
        assert!(parse_utc_offset("abc").is_err());
    }
}
