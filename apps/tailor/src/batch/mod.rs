//! Daily batch: every job requirement uploaded today, one at a time.
//!
//! A failing job is logged with its key and cause, recorded in the report,
//! and the loop continues with the next key.

pub mod selector;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::pipeline::{ApplicationPipeline, JobOutcome};
use selector::select_today;

/// Per-key results of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<String>,
    /// (job key, generation failure)
    pub skipped: Vec<(String, String)>,
    /// (job key, error code, cause)
    pub failed: Vec<(String, &'static str, String)>,
    /// Set when the bucket listing itself broke off.
    pub listing_error: Option<String>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.completed.len() + self.skipped.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty() && self.listing_error.is_none()
    }
}

/// Processes every job requirement last modified on `today`.
pub async fn run_batch(pipeline: &ApplicationPipeline, today: NaiveDate) -> BatchReport {
    let settings = pipeline.settings();
    let mut listing = select_today(
        pipeline.store(),
        &settings.reference_bucket,
        &settings.initials,
        today,
    );
    let mut report = BatchReport::default();

    loop {
        let job_key = match listing.next_key().await {
            Ok(Some(key)) => key,
            Ok(None) => break,
            Err(e) => {
                error!("Listing s3://{} failed: {e}", settings.reference_bucket);
                report.listing_error = Some(e.to_string());
                break;
            }
        };

        info!("Processing: {job_key}");
        match pipeline.process_job(&job_key).await {
            Ok(JobOutcome::Completed(keys)) => {
                info!(
                    "Completed: {job_key} -> {}, {}",
                    keys.resume, keys.cover_letter
                );
                report.completed.push(job_key);
            }
            Ok(JobOutcome::Skipped(failure)) => {
                report.skipped.push((job_key, failure.to_string()));
            }
            Err(e) => {
                error!(key = %job_key, code = e.code(), "Job failed: {e}");
                report.failed.push((job_key, e.code(), e.to_string()));
            }
        }
    }

    info!(
        "Batch finished for {}: {} processed, {} completed, {} skipped, {} failed",
        today,
        report.processed(),
        report.completed.len(),
        report.skipped.len(),
        report.failed.len()
    );

    report
}
