//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ULTRE_STORAGE_PATH` - Path of the JSON state file. Unset runs the
//!   engine on the in-memory backend (state dies with the process).
//! - `ULTRE_SEED_BLOG` - Whether an empty store gets the demo blog posts
//!   (default: true). Accepts `true`/`false`/`1`/`0`.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// State engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// JSON state file; `None` selects the in-memory backend.
    pub storage_path: Option<PathBuf>,
    /// Seed the demo blog posts into an empty store.
    pub seed_blog: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            seed_blog: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] when a flag value is not a
    /// recognized boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_path = std::env::var_os("ULTRE_STORAGE_PATH").map(PathBuf::from);

        let seed_blog = match std::env::var("ULTRE_SEED_BLOG") {
            Ok(raw) => parse_bool_flag(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar("ULTRE_SEED_BLOG".to_owned(), raw.clone())
            })?,
            Err(_) => true,
        };

        Ok(Self {
            storage_path,
            seed_blog,
        })
    }
}

fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
