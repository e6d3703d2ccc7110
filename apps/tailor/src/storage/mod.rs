//! Object storage access. This is the only module that talks to buckets.
//!
//! Business logic depends on the `ObjectStore` trait. Production wires in
//! `S3ObjectStore`; tests use `MemoryObjectStore`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::extraction::ExtractionError;

#[cfg(test)]
pub mod memory;
pub mod s3;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Object s3://{bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("Access denied to s3://{bucket}/{key}")]
    Access { bucket: String, key: String },

    #[error("Storage backend failure on s3://{bucket}/{key}: {message}")]
    Backend {
        bucket: String,
        key: String,
        message: String,
    },
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a bucket listing. `next_token` is `None` on the last page.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub objects: Vec<ObjectSummary>,
    pub next_token: Option<String>,
}

/// The storage seam. Implement this to swap backends without touching the pipeline.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    /// Overwrites any existing object at `key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// Returns a single listing page. Callers loop on `next_token` until it is `None`.
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, StorageError>;
}

/// A fetched blob. Immutable once read.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub key: String,
    pub body: Bytes,
}

impl SourceDocument {
    /// Decodes the body as UTF-8 markdown text.
    pub fn text(&self) -> Result<&str, ExtractionError> {
        std::str::from_utf8(&self.body).map_err(|e| ExtractionError::InvalidText {
            key: self.key.clone(),
            reason: e.to_string(),
        })
    }
}

/// Fail-fast reads. No retries; every error goes straight to the caller.
#[derive(Clone)]
pub struct StorageReader {
    store: Arc<dyn ObjectStore>,
}

impl StorageReader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn read(&self, bucket: &str, key: &str) -> Result<SourceDocument, StorageError> {
        let body = self.store.get_object(bucket, key).await?;
        debug!("Read {} bytes from s3://{}/{}", body.len(), bucket, key);
        Ok(SourceDocument {
            key: key.to_string(),
            body,
        })
    }

    pub async fn read_text(&self, bucket: &str, key: &str) -> Result<String, PipelineError> {
        let document = self.read(bucket, key).await?;
        Ok(document.text()?.to_string())
    }
}

#[derive(Clone)]
pub struct StorageWriter {
    store: Arc<dyn ObjectStore>,
}

impl StorageWriter {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Uploads a PDF, replacing whatever was stored at `key` before.
    pub async fn write(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let size = bytes.len();
        self.store
            .put_object(bucket, key, bytes, PDF_CONTENT_TYPE)
            .await?;
        info!("Uploaded {} bytes to s3://{}/{}", size, bucket, key);
        Ok(())
    }

    pub async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.store.delete_object(bucket, key).await?;
        info!("Removed s3://{}/{}", bucket, key);
        Ok(())
    }
}
