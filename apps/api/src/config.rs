use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Directory holding the two persisted stores (`user_data.json`,
    /// `access_codes.json`).
    pub data_dir: PathBuf,
    /// Environment mode. `development` exposes the administrative
    /// access-code issuance endpoint.
    pub app_env: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }

    /// Path of the per-code credit ledger store.
    pub fn user_data_path(&self) -> PathBuf {
        self.data_dir.join("user_data.json")
    }

    /// Path of the issuable access-code registry store.
    pub fn access_codes_path(&self) -> PathBuf {
        self.data_dir.join("access_codes.json")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
