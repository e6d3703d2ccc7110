mod batch;
mod config;
mod errors;
mod extraction;
mod generation;
mod llm_client;
mod naming;
mod pipeline;
mod render;
mod storage;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::batch::run_batch;
use crate::batch::selector::local_today;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pipeline::ApplicationPipeline;
use crate::render::{DocumentRenderer, StylesheetSource};
use crate::storage::s3::S3ObjectStore;
use crate::storage::ObjectStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.log_level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::from_config(&config).await);
    info!(
        "S3 client initialized (region: {}, endpoint: {})",
        config.aws_region,
        config.s3_endpoint.as_deref().unwrap_or("aws default")
    );

    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.generation_timeout)?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s)",
        llm_client::MODEL,
        config.generation_timeout.as_secs()
    );

    let renderer = DocumentRenderer::new(StylesheetSource::File(config.stylesheet_path.clone()));

    let pipeline = ApplicationPipeline::new(
        config.pipeline_settings(),
        store,
        Arc::new(llm),
        renderer,
    );

    let report = run_batch(&pipeline, local_today()).await;

    if report.all_succeeded() {
        info!("All {} job(s) processed", report.completed.len());
    } else {
        for (key, cause) in &report.skipped {
            warn!("Skipped {key}: {cause}");
        }
        for (key, code, cause) in &report.failed {
            warn!("Failed {key} [{code}]: {cause}");
        }
        if let Some(cause) = &report.listing_error {
            warn!("Listing stopped early: {cause}");
        }
    }

    Ok(())
}
