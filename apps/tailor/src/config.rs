use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Holds the master profile, career context and job requirement PDFs.
    pub reference_bucket: String,
    /// Receives the rendered resume and cover letter PDFs.
    pub output_bucket: String,
    pub user_initials: String,
    pub aws_region: String,
    /// Custom endpoint for MinIO or other S3-compatible stores. AWS default when unset.
    pub s3_endpoint: Option<String>,
    /// Static credentials. The default AWS credential chain is used when unset.
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub anthropic_api_key: String,
    pub generation_timeout: Duration,
    pub stylesheet_path: PathBuf,
    pub log_level: String,
}

/// The subset of configuration the pipeline needs to locate inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub reference_bucket: String,
    pub output_bucket: String,
    pub initials: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let user_initials = require_env("USER_INITIALS")?;
        validate_initials(&user_initials)?;

        let timeout_secs = std::env::var("GENERATION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse::<u64>()
            .context("GENERATION_TIMEOUT_SECS must be a whole number of seconds")?;
        if timeout_secs == 0 {
            bail!("GENERATION_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            reference_bucket: require_env("REFERENCE_BUCKET")?,
            output_bucket: require_env("OUTPUT_BUCKET")?,
            user_initials,
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            s3_endpoint: optional_env("S3_ENDPOINT"),
            aws_access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            generation_timeout: Duration::from_secs(timeout_secs),
            stylesheet_path: std::env::var("STYLESHEET_PATH")
                .unwrap_or_else(|_| "resume_style.json".to_string())
                .into(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            reference_bucket: self.reference_bucket.clone(),
            output_bucket: self.output_bucket.clone(),
            initials: self.user_initials.clone(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Initials are embedded in `_`-delimited object keys, so they must not contain `_`.
fn validate_initials(initials: &str) -> Result<()> {
    if initials.trim().is_empty() {
        bail!("USER_INITIALS cannot be empty");
    }
    if initials.contains('_') || initials.contains('/') {
        bail!("USER_INITIALS '{initials}' must not contain '_' or '/'");
    }
    Ok(())
}
