//! Finds the job requirement PDFs uploaded today.
//!
//! `JobListing` walks the bucket listing one page at a time, following
//! continuation tokens until the backend reports the last page. It is lazy
//! (a page is fetched only when the buffered one is drained), finite, and can
//! be restarted from the first page.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::debug;

use crate::naming::{job_req_prefix, PDF_EXTENSION};
use crate::storage::{ObjectStore, ObjectSummary, StorageError};

enum ListingState {
    /// No page requested yet, or restarted.
    Start,
    /// More pages remain behind this token.
    More(String),
    Exhausted,
}

pub struct JobListing {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
    today: NaiveDate,
    buffered: VecDeque<String>,
    state: ListingState,
}

impl JobListing {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: &str, initials: &str, today: NaiveDate) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
            prefix: job_req_prefix(initials),
            today,
            buffered: VecDeque::new(),
            state: ListingState::Start,
        }
    }

    /// Next matching key, fetching listing pages on demand. `None` once every page is consumed.
    pub async fn next_key(&mut self) -> Result<Option<String>, StorageError> {
        loop {
            if let Some(key) = self.buffered.pop_front() {
                return Ok(Some(key));
            }

            let token = match &self.state {
                ListingState::Exhausted => return Ok(None),
                ListingState::Start => None,
                ListingState::More(token) => Some(token.clone()),
            };

            let page = self
                .store
                .list_objects_page(&self.bucket, &self.prefix, token.as_deref())
                .await?;

            debug!(
                "Listed {} objects under s3://{}/{} (more pages: {})",
                page.objects.len(),
                self.bucket,
                self.prefix,
                page.next_token.is_some()
            );

            self.buffered.extend(
                page.objects
                    .iter()
                    .filter(|o| is_todays_job(o, &self.prefix, self.today))
                    .map(|o| o.key.clone()),
            );

            self.state = match page.next_token {
                Some(next) => ListingState::More(next),
                None => ListingState::Exhausted,
            };
        }
    }

    /// Drains the listing.
    #[cfg(test)]
    pub async fn collect_all(&mut self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        while let Some(key) = self.next_key().await? {
            keys.push(key);
        }
        Ok(keys)
    }

    /// Rewinds to the first listing page.
    #[cfg(test)]
    pub fn restart(&mut self) {
        self.buffered.clear();
        self.state = ListingState::Start;
    }
}

/// Every key matching `{initials}_JobReq_*.pdf` last modified on `today`, as a lazy listing.
pub fn select_today(
    store: Arc<dyn ObjectStore>,
    bucket: &str,
    initials: &str,
    today: NaiveDate,
) -> JobListing {
    JobListing::new(store, bucket, initials, today)
}

/// The process-local calendar date.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Last-modified timestamps are UTC; they are compared in the process-local timezone.
fn is_todays_job(object: &ObjectSummary, prefix: &str, today: NaiveDate) -> bool {
    if !object.key.starts_with(prefix) || !object.key.ends_with(PDF_EXTENSION) {
        return false;
    }
    let Some(modified) = object.last_modified else {
        debug!("Skipping {}: listing has no last-modified time", object.key);
        return false;
    };
    let local_date = local_date_of(modified);
    debug!(
        "Candidate {}: modified {} UTC, local date {}, today {}",
        object.key, modified, local_date, today
    );
    local_date == today
}

fn local_date_of(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryObjectStore;
    use chrono::Duration;

    const BUCKET: &str = "refs";

    fn noon_today() -> DateTime<Utc> {
        let today = local_today();
        today
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_selects_only_todays_job_pdfs() {
        let store = Arc::new(MemoryObjectStore::new());
        let now = noon_today();
        store.insert_modified(BUCKET, "VECP_JobReq_Acme.pdf", "pdf", Some(now));
        store.insert_modified(BUCKET, "VECP_JobReq_Old.pdf", "pdf", Some(now - Duration::days(3)));
        store.insert_modified(BUCKET, "VECP_JobReq_Notes.md", "md", Some(now));
        store.insert_modified(BUCKET, "JD_JobReq_Other.pdf", "pdf", Some(now));
        store.insert_modified(BUCKET, "VECP_112025_Master.md", "md", Some(now));
        store.insert_modified(BUCKET, "VECP_JobReq_Undated.pdf", "pdf", None);

        let keys = select_today(store, BUCKET, "VECP", local_today())
            .collect_all()
            .await
            .unwrap();
        assert_eq!(keys, vec!["VECP_JobReq_Acme.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_no_key_is_dropped_across_pages() {
        let store = Arc::new(MemoryObjectStore::with_page_size(2));
        let now = noon_today();
        let expected: Vec<String> = (0..7).map(|i| format!("VECP_JobReq_Co{i}.pdf")).collect();
        for key in &expected {
            store.insert_modified(BUCKET, key, "pdf", Some(now));
        }

        let keys = select_today(store.clone(), BUCKET, "VECP", local_today())
            .collect_all()
            .await
            .unwrap();

        assert_eq!(keys, expected);
        assert_eq!(store.list_calls(), 4, "7 keys at 2 per page need 4 pages");
    }

    #[tokio::test]
    async fn test_listing_is_lazy_and_restartable() {
        let store = Arc::new(MemoryObjectStore::with_page_size(1));
        let now = noon_today();
        store.insert_modified(BUCKET, "VECP_JobReq_A.pdf", "pdf", Some(now));
        store.insert_modified(BUCKET, "VECP_JobReq_B.pdf", "pdf", Some(now));

        let mut listing = JobListing::new(store.clone(), BUCKET, "VECP", local_today());
        assert_eq!(listing.next_key().await.unwrap().as_deref(), Some("VECP_JobReq_A.pdf"));
        assert_eq!(store.list_calls(), 1);

        listing.restart();
        let all = listing.collect_all().await.unwrap();
        assert_eq!(all, vec!["VECP_JobReq_A.pdf", "VECP_JobReq_B.pdf"]);
        assert_eq!(listing.next_key().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_bucket_yields_nothing() {
        let store = Arc::new(MemoryObjectStore::new());
        let keys = select_today(store, BUCKET, "VECP", local_today())
            .collect_all()
            .await
            .unwrap();
        assert!(keys.is_empty());
    }
}
