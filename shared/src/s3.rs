use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use crate::error::StoreError;
use crate::types::StoredObject;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// GET/PUT/HEAD over an object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StoreError>;

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Any failure, transient or not, reads as "does not exist".
    async fn exists(&self, bucket: &str, key: &str) -> bool;
}

/// [`ObjectStore`] over the AWS S3 SDK
#[derive(Clone)]
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StoreError> {
        let result = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StoreError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    StoreError::Backend(format!("Failed to get object from S3: {}", e))
                }
            })?;

        let content_type = result
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let data = result
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to read S3 body: {}", e)))?
            .into_bytes();

        Ok(StoredObject { data, content_type })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to put object to S3: {}", e)))?;

        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> bool {
        self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .is_ok()
    }
}
