use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::generation::response::ParseError;
use crate::naming::NamingError;
use crate::render::RenderError;
use crate::storage::StorageError;

/// Failure of a single job inside the batch.
///
/// Generation backend failures are not represented here: the pipeline
/// catches `GenerationFailure` at the call site and records the job as skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Response error: {0}")]
    Parse(#[from] ParseError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Naming error: {0}")]
    Naming(#[from] NamingError),

    /// The resume was written but the cover letter was not.
    #[error("Partial write: {written} was written but {failed} failed ({cause}); rollback {rollback}")]
    PartialWrite {
        written: String,
        failed: String,
        cause: StorageError,
        rollback: RollbackStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackStatus {
    /// The resume from an earlier run was written back.
    Restored,
    /// No earlier resume existed; the new one was deleted.
    Removed,
    Failed,
}

impl std::fmt::Display for RollbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollbackStatus::Restored => write!(f, "restored the previous resume"),
            RollbackStatus::Removed => write!(f, "removed the orphaned object"),
            RollbackStatus::Failed => write!(f, "failed, the resume no longer matches its cover letter"),
        }
    }
}

impl PipelineError {
    /// Short machine-friendly code used in logs and the batch report.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Storage(StorageError::NotFound { .. }) => "NOT_FOUND",
            PipelineError::Storage(StorageError::Access { .. }) => "ACCESS_DENIED",
            PipelineError::Storage(StorageError::Backend { .. }) => "STORAGE_ERROR",
            PipelineError::Extraction(_) => "MALFORMED_DOCUMENT",
            PipelineError::Parse(_) => "MALFORMED_RESPONSE",
            PipelineError::Render(_) => "RENDER_ERROR",
            PipelineError::Naming(_) => "FILENAME_FORMAT",
            PipelineError::PartialWrite { .. } => "PARTIAL_WRITE",
        }
    }
}
