//! S3-backed object storage for encrypted artifacts.
//!
//! Credentials and region come from the ambient AWS environment (environment
//! variables, profile, instance metadata); this code never reads them
//! directly.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{error, info};

use crate::contract::{ObjectStore, StageError};

/// [`ObjectStore`] over a single S3 bucket.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Build a store from ambient AWS configuration.
    pub async fn new_from_env(bucket: String) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::new(Client::new(&aws_config), bucket)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn bucket_exists(&self) -> Result<bool, StageError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StageError::Storage(format!(
                        "HeadBucket on '{}': {service_err}",
                        self.bucket
                    )))
                }
            }
        }
    }

    async fn put_object(&self, local_path: &Path, key: &str) -> Result<(), StageError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StageError::Upload {
                key: key.to_string(),
                reason: format!("open '{}' for upload: {e}", local_path.display()),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(key, bucket = %self.bucket, error = %e, "S3 PutObject failed");
                StageError::Upload {
                    key: key.to_string(),
                    reason: format!("S3 PutObject: {e}"),
                }
            })?;

        info!(key, bucket = %self.bucket, "object uploaded");
        Ok(())
    }
}
