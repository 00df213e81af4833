use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_INTERVAL_MINUTES: u64 = 1440;

/// How the process runs after startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// HTTP API; the scheduler is started on boot and controllable over HTTP
    #[default]
    Api,
    /// Scheduler only, with one generation right away
    Standalone,
}

impl FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(RunMode::Api),
            "standalone" => Ok(RunMode::Standalone),
            other => bail!("Unknown run mode '{}' (expected 'api' or 'standalone')", other),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Api => write!(f, "api"),
            RunMode::Standalone => write!(f, "standalone"),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub serper_api_key: Option<String>,
    pub run_mode: RunMode,
    pub generation_interval_minutes: u64,
    pub misfire_grace: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_var("PORT", DEFAULT_PORT)?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| crate::kernel::openai::DEFAULT_MODEL.to_string()),
            openai_base_url: non_empty_var("OPENAI_BASE_URL"),
            serper_api_key: non_empty_var("SERPER_API_KEY"),
            run_mode: parse_var("RUN_MODE", RunMode::Api)?,
            generation_interval_minutes: parse_var(
                "GENERATION_INTERVAL_MINUTES",
                DEFAULT_INTERVAL_MINUTES,
            )?,
            misfire_grace: Duration::from_secs(parse_var("MISFIRE_GRACE_SECS", 300u64)?),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}
