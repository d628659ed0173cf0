use std::path::Path;

use anyhow::{Context, bail};
use chrono::Duration;
use tracing::{info, warn};

use crate::auth::SessionBackend;

const DEFAULT_DATABASE_URL: &str = "sqlite://academies.db";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

pub fn load_environment() -> Result<(), Box<dyn std::error::Error>> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub session_backend: SessionBackend,
    pub session_ttl: Duration,
    pub otlp_endpoint: Option<String>,
    pub otlp_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            session_backend: SessionBackend::Sqlite,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            otlp_endpoint: None,
            otlp_api_key: None,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    dotenvy::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let session_backend = match non_empty_var("SESSION_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.session_backend,
        };

        let session_ttl = match non_empty_var("SESSION_TTL_HOURS") {
            Some(value) => {
                let hours: i64 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("SESSION_TTL_HOURS is not a number: {}", value))?;
                if hours <= 0 {
                    bail!("SESSION_TTL_HOURS must be positive, got {}", hours);
                }
                Duration::hours(hours)
            }
            None => defaults.session_ttl,
        };

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL").unwrap_or(defaults.database_url),
            session_backend,
            session_ttl,
            otlp_endpoint: non_empty_var("OTEL_EXPORTER_OTLP_ENDPOINT"),
            otlp_api_key: non_empty_var("OTEL_API_KEY"),
        })
    }
}
