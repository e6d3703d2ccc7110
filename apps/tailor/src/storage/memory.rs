//! In-memory `ObjectStore` used by tests. Supports paged listings,
//! denied keys and injected write failures.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::{ListingPage, ObjectStore, ObjectSummary, StorageError};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: Option<String>,
    last_modified: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Inner {
    objects: BTreeMap<(String, String), StoredObject>,
    denied: HashSet<String>,
    failing_writes: HashSet<String>,
    failing_deletes: HashSet<String>,
    puts: Vec<(String, String)>,
    list_calls: usize,
}

pub struct MemoryObjectStore {
    inner: Mutex<Inner>,
    page_size: usize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    /// Listings return at most `page_size` objects per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            page_size: page_size.max(1),
        }
    }

    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        self.insert_modified(bucket, key, body, Some(Utc::now()));
    }

    pub fn insert_modified(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<Vec<u8>>,
        last_modified: Option<DateTime<Utc>>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: Bytes::from(body.into()),
                content_type: None,
                last_modified,
            },
        );
    }

    pub fn remove(&self, bucket: &str, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.objects.remove(&(bucket.to_string(), key.to_string()));
    }

    /// Reads of `key` fail with `StorageError::Access`.
    pub fn deny(&self, key: &str) {
        self.inner.lock().unwrap().denied.insert(key.to_string());
    }

    /// Writes to `key` fail with `StorageError::Backend`.
    pub fn fail_writes_to(&self, key: &str) {
        self.inner.lock().unwrap().failing_writes.insert(key.to_string());
    }

    pub fn fail_deletes_of(&self, key: &str) {
        self.inner.lock().unwrap().failing_deletes.insert(key.to_string());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.body.to_vec())
    }

    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .and_then(|o| o.content_type.clone())
    }

    /// Every successful put, in call order, as (bucket, key).
    pub fn puts(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().puts.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.inner.lock().unwrap().list_calls
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let inner = self.inner.lock().unwrap();
        if inner.denied.contains(key) {
            return Err(StorageError::Access {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        inner
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.body.clone())
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_writes.contains(key) {
            return Err(StorageError::Backend {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "injected write failure".to_string(),
            });
        }
        inner.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: Bytes::from(body),
                content_type: Some(content_type.to_string()),
                last_modified: Some(Utc::now()),
            },
        );
        inner.puts.push((bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_deletes.contains(key) {
            return Err(StorageError::Backend {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "injected delete failure".to_string(),
            });
        }
        inner.objects.remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.list_calls += 1;

        // Token is the offset into the filtered listing.
        let offset = match continuation_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| StorageError::Backend {
                bucket: bucket.to_string(),
                key: prefix.to_string(),
                message: format!("invalid continuation token '{token}'"),
            })?,
        };

        let matching: Vec<ObjectSummary> = inner
            .objects
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .map(|((_, k), o)| ObjectSummary {
                key: k.clone(),
                last_modified: o.last_modified,
            })
            .collect();

        let end = (offset + self.page_size).min(matching.len());
        let objects = matching.get(offset..end).unwrap_or_default().to_vec();
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(ListingPage {
            objects,
            next_token,
        })
    }
}
