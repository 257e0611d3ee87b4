//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::location::{
    DEFAULT_FENCE_LATITUDE, DEFAULT_FENCE_LONGITUDE, DEFAULT_FENCE_RADIUS_METERS,
};
use crate::models::GeofenceConfig;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore project)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Root directory of the local progress store
    pub data_dir: PathBuf,
    /// Fence used until a trainer publishes one
    pub default_fence: GeofenceConfig,
    /// `host:port` of the Firestore emulator, if used
    pub firestore_emulator_host: Option<String>,
    /// `host:port` of the Auth emulator, if used
    pub auth_emulator_host: Option<String>,

    // --- Secrets ---
    /// Web API key for the Identity Toolkit
    pub firebase_api_key: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Static bearer token for Firestore instead of default credentials
    pub firestore_bearer_token: Option<String>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:8081".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            default_fence: GeofenceConfig::default(),
            firestore_emulator_host: None,
            auth_emulator_host: None,
            firebase_api_key: "test_api_key".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            firestore_bearer_token: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let default_fence = GeofenceConfig {
            latitude: parse_or(&var, "DEFAULT_FENCE_LATITUDE", DEFAULT_FENCE_LATITUDE)?,
            longitude: parse_or(&var, "DEFAULT_FENCE_LONGITUDE", DEFAULT_FENCE_LONGITUDE)?,
            radius_meters: parse_or(
                &var,
                "DEFAULT_FENCE_RADIUS_METERS",
                DEFAULT_FENCE_RADIUS_METERS,
            )?,
        };
        if default_fence.radius_meters <= 0.0 {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_FENCE_RADIUS_METERS",
                message: "must be positive".to_string(),
            });
        }

        Ok(Self {
            frontend_url: var("FRONTEND_URL").unwrap_or_else(|| "http://localhost:8081".to_string()),
            gcp_project_id: var("GCP_PROJECT_ID").unwrap_or_else(|| "local-dev".to_string()),
            port: parse_or(&var, "PORT", 8080)?,
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            default_fence,
            firestore_emulator_host: var("FIRESTORE_EMULATOR_HOST"),
            auth_emulator_host: var("FIREBASE_AUTH_EMULATOR_HOST"),

            firebase_api_key: required("FIREBASE_API_KEY")?,
            jwt_signing_key: required("JWT_SIGNING_KEY")?.into_bytes(),
            firestore_bearer_token: var("FIRESTORE_BEARER_TOKEN"),
        })
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {message}")]
    Invalid {
        name: &'static str,
        message: String,
    },
}
