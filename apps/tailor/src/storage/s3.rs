use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::{ListingPage, ObjectStore, ObjectSummary, StorageError};
use crate::config::Config;

/// `ObjectStore` backed by AWS S3 or any S3-compatible endpoint (MinIO).
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Constructs a store configured for MinIO (custom endpoint) or AWS (default chain).
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));

        if let (Some(key_id), Some(secret)) =
            (&config.aws_access_key_id, &config.aws_secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "tailor-static",
            ));
        }

        if let Some(endpoint) = &config.s3_endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if config.s3_endpoint.is_some() {
            // MinIO and most S3-compatible stores do not support virtual-hosted buckets.
            s3_config = s3_config.force_path_style(true);
        }

        Self::new(Client::from_conf(s3_config.build()))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(bucket, key, e))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: format!("failed to read object body: {e}"),
            })?;

        Ok(body.into_bytes())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| classify(bucket, key, e))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(bucket, key, e))?;
        Ok(())
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| classify(bucket, prefix, e))?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?.to_string();
                let last_modified = object
                    .last_modified()
                    .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()));
                Some(ObjectSummary { key, last_modified })
            })
            .collect();

        // Some S3-compatible stores return a token on the final page; trust is_truncated first.
        let next_token = match output.is_truncated() {
            Some(false) => None,
            _ => output.next_continuation_token().map(str::to_string),
        };

        Ok(ListingPage {
            objects,
            next_token,
        })
    }
}

/// Maps an SDK failure onto the storage taxonomy.
fn classify<E>(bucket: &str, key: &str, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.code().map(str::to_string);

    match (code.as_deref(), status) {
        (Some("NoSuchKey") | Some("NotFound") | Some("NoSuchBucket"), _) | (_, Some(404)) => {
            StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }
        }
        (Some("AccessDenied") | Some("Forbidden") | Some("InvalidAccessKeyId"), _)
        | (_, Some(403)) => StorageError::Access {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ => StorageError::Backend {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}
