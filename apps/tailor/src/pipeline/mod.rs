//! Application pipeline: turns one job requirement PDF into a resume and a cover letter.
//!
//! Flow: output keys → read profile, context, job PDF → extract → compose →
//!       generate → parse → render ×2 → write ×2.
//!
//! The generation call is the only step whose failure is absorbed here: it is
//! logged and the job comes back as `JobOutcome::Skipped`. Every other failure
//! is returned to the batch loop, which records it and moves on.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::config::PipelineSettings;
use crate::errors::{PipelineError, RollbackStatus};
use crate::extraction::{DocumentExtractor, ExtractionError};
use crate::generation::composer::compose;
use crate::generation::response::parse;
use crate::llm_client::{GenerationFailure, TextGenerator};
use crate::naming::{career_context_key, master_profile_key, output_keys, OutputKeys};
use crate::render::{DocumentRenderer, RenderError, RenderedDocument};
use crate::storage::{ObjectStore, StorageError, StorageReader, StorageWriter};

#[derive(Debug)]
pub enum JobOutcome {
    /// Both documents were written.
    Completed(OutputKeys),
    /// The generation backend failed; nothing was written.
    Skipped(GenerationFailure),
}

pub struct ApplicationPipeline {
    settings: PipelineSettings,
    store: Arc<dyn ObjectStore>,
    reader: StorageReader,
    writer: StorageWriter,
    extractor: DocumentExtractor,
    generator: Arc<dyn TextGenerator>,
    renderer: DocumentRenderer,
}

impl ApplicationPipeline {
    pub fn new(
        settings: PipelineSettings,
        store: Arc<dyn ObjectStore>,
        generator: Arc<dyn TextGenerator>,
        renderer: DocumentRenderer,
    ) -> Self {
        Self {
            settings,
            reader: StorageReader::new(store.clone()),
            writer: StorageWriter::new(store.clone()),
            store,
            extractor: DocumentExtractor,
            generator,
            renderer,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn store(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }

    /// Runs the full pipeline for one job requirement key.
    pub async fn process_job(&self, job_key: &str) -> Result<JobOutcome, PipelineError> {
        let settings = &self.settings;

        // Naming first: a bad filename should not cost a generation call.
        let keys = output_keys(&settings.initials, job_key)?;

        let profile = self
            .reader
            .read_text(&settings.reference_bucket, &master_profile_key(&settings.initials))
            .await?;
        let context = self
            .reader
            .read_text(&settings.reference_bucket, &career_context_key(&settings.initials))
            .await?;
        let job_pdf = self.reader.read(&settings.reference_bucket, job_key).await?;

        let extractor = self.extractor;
        let job_text = tokio::task::spawn_blocking(move || extractor.extract_text(&job_pdf.body))
            .await
            .map_err(|e| {
                ExtractionError::MalformedDocument(format!("extraction task failed: {e}"))
            })??;

        if job_text.trim().is_empty() {
            warn!("Job requirement {job_key} has no extractable text; generating anyway");
        }

        let request = compose(&context, &profile, &job_text);

        info!("Generating documents for {} ({})", job_key, keys.company);
        let raw = match self.generator.generate(&request).await {
            Ok(raw) => raw,
            Err(failure) => {
                error!("Failed to generate materials for {job_key}: {failure}");
                return Ok(JobOutcome::Skipped(failure));
            }
        };

        let documents = parse(&raw)?;

        // Render both before writing either, so a render failure leaves no output behind.
        let resume = self.render_off_thread(&keys.resume, documents.resume).await?;
        let cover_letter = self
            .render_off_thread(&keys.cover_letter, documents.cover_letter)
            .await?;

        self.write_pair(&keys, resume, cover_letter).await?;

        Ok(JobOutcome::Completed(keys))
    }

    async fn render_off_thread(
        &self,
        title: &str,
        markup: String,
    ) -> Result<RenderedDocument, RenderError> {
        let renderer = self.renderer.clone();
        let title = title.trim_end_matches(".pdf").to_string();
        tokio::task::spawn_blocking(move || {
            let doc = renderer.render(&title, &markup)?;
            debug!("Rendered {title}: {} page(s)", doc.page_count);
            Ok::<_, RenderError>(doc)
        })
        .await
        .map_err(|e| RenderError::Pdf(format!("render task failed: {e}")))?
    }

    /// Writes resume then cover letter. A failed cover letter puts the resume
    /// key back the way it was before this run.
    async fn write_pair(
        &self,
        keys: &OutputKeys,
        resume: RenderedDocument,
        cover_letter: RenderedDocument,
    ) -> Result<(), PipelineError> {
        let bucket = &self.settings.output_bucket;

        // A re-run overwrites an existing pair; keep the old resume for rollback.
        let previous_resume = match self.reader.read(bucket, &keys.resume).await {
            Ok(doc) => Some(doc.body),
            Err(StorageError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        self.writer.write(bucket, &keys.resume, resume.bytes).await?;

        if let Err(cause) = self
            .writer
            .write(bucket, &keys.cover_letter, cover_letter.bytes)
            .await
        {
            let rollback = self
                .roll_back_resume(bucket, &keys.resume, previous_resume)
                .await;
            return Err(PipelineError::PartialWrite {
                written: keys.resume.clone(),
                failed: keys.cover_letter.clone(),
                cause,
                rollback,
            });
        }

        Ok(())
    }

    async fn roll_back_resume(
        &self,
        bucket: &str,
        key: &str,
        previous: Option<Bytes>,
    ) -> RollbackStatus {
        let outcome = match previous {
            Some(bytes) => self
                .writer
                .write(bucket, key, bytes.to_vec())
                .await
                .map(|()| RollbackStatus::Restored),
            None => self
                .writer
                .remove(bucket, key)
                .await
                .map(|()| RollbackStatus::Removed),
        };

        outcome.unwrap_or_else(|e| {
            error!("Rollback failed, s3://{bucket}/{key} no longer matches its cover letter: {e}");
            RollbackStatus::Failed
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support;
