//! # S3 Object Storage
//!
//! Uploads land at `<folder>/<unix-nanos><ext>` and are addressed by their
//! public virtual-hosted URL.

use crate::config::StorageConfig;
use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::Utc;
use gate_core::{FileUpload, ObjectStorage, StorageError, UploadedAsset};
use tracing::{info, instrument};

/// [`ObjectStorage`] backed by an S3 bucket
#[derive(Clone)]
pub struct S3ObjectStorage {
    client: Client,
    bucket: String,
    region: String,
}

impl S3ObjectStorage {
    pub fn new(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
        }
    }

    /// Build a client from the default AWS credential chain
    pub async fn from_config(config: &StorageConfig) -> Self {
        let sdk_config = aws_config::from_env()
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        Self::new(Client::new(&sdk_config), config)
    }

    pub fn public_url(&self, key: &str) -> String {
        object_url(&self.bucket, &self.region, key)
    }
}

/// Object key for an upload made at `nanos`
pub fn object_key(folder: &str, file: &FileUpload, nanos: i64) -> String {
    format!("{}/{}{}", folder, nanos, file.extension().unwrap_or_default())
}

pub fn object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    #[instrument(skip(self, file), fields(bucket = %self.bucket, size = file.bytes.len()))]
    async fn upload(&self, folder: &str, file: &FileUpload) -> Result<UploadedAsset, StorageError> {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let key = object_key(folder, file, nanos);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes.clone()));
        if let Some(content_type) = &file.content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|err| StorageError::Request(format!("put_object failed: {err}")))?;

        info!("Uploaded {} to s3://{}/{}", file.file_name, self.bucket, key);
        let url = self.public_url(&key);
        Ok(UploadedAsset { key, url })
    }
}
