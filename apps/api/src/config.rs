use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
///
/// `ANTHROPIC_API_KEY` is deliberately optional: a missing key is reported by each
/// analysis or generation request before any work is attempted.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub stage_timeout: Duration,
    pub pdftoppm_bin: String,
    pub render_dpi: u32,
    /// Builder sessions idle for longer than this are discarded.
    pub builder_session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let stage_timeout_secs = parse_env("STAGE_TIMEOUT_SECS", 180u64)?;
        if stage_timeout_secs == 0 {
            bail!("STAGE_TIMEOUT_SECS must be greater than zero");
        }

        let session_ttl_secs = parse_env("BUILDER_SESSION_TTL_SECS", 86_400u64)?;
        if session_ttl_secs == 0 {
            bail!("BUILDER_SESSION_TTL_SECS must be greater than zero");
        }

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            stage_timeout: Duration::from_secs(stage_timeout_secs),
            pdftoppm_bin: std::env::var("PDFTOPPM_BIN").unwrap_or_else(|_| "pdftoppm".to_string()),
            render_dpi: parse_env("RENDER_DPI", 110u32)?,
            builder_session_ttl: Duration::from_secs(session_ttl_secs),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
