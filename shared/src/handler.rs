use std::sync::Arc;

use bytes::Bytes;

use crate::config::Config;
use crate::error::ImageKitError;
use crate::image_processing::ImageCodec;
use crate::key_parser;
use crate::optimizer::Optimizer;
use crate::s3::ObjectStore;
use crate::types::{ChangeNotification, ImageParams, TranscodeJob, Transcoded};

/// What happened to the cache on a direct request
#[derive(Debug)]
pub enum CacheOutcome {
    Hit,
    Stored,
    /// The write-back failed; the caller still gets the fresh bytes.
    WriteFailed(ImageKitError),
}

#[derive(Debug)]
pub struct DirectResponse {
    pub data: Bytes,
    pub content_type: String,
    pub cache: CacheOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Written,
    /// Output already present, nothing done
    Skipped,
}

/// Orchestrates parse → fetch → transcode → store.
pub struct ImageHandler {
    config: Config,
    store: Arc<dyn ObjectStore>,
    optimizer: Optimizer,
}

impl ImageHandler {
    pub fn new(config: Config, store: Arc<dyn ObjectStore>, codec: Arc<dyn ImageCodec>) -> Self {
        let optimizer = Optimizer::new(config.limits(), codec);
        Self {
            config,
            store,
            optimizer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn parse_key(&self, key: &str) -> Result<ImageParams, ImageKitError> {
        key_parser::parse_key(key, self.config.quality)
    }

    pub fn parse_query(&self, image_path: &str, query: &str) -> Result<ImageParams, ImageKitError> {
        key_parser::parse_query(image_path, query, self.config.quality)
    }

    /// Parse a request path as a key, then let query parameters override it.
    pub fn parse_request(&self, key: &str, query: &str) -> Result<ImageParams, ImageKitError> {
        let mut params = self.parse_key(key)?;
        key_parser::apply_query(&mut params, query)?;
        Ok(params)
    }

    /// Process a batch of change notifications, stopping at the first failure.
    ///
    /// Keys already under the cache bucket prefix are skipped. Returns how
    /// many records were transcoded and stored.
    pub async fn handle_events(&self, records: &[ChangeNotification]) -> Result<usize, ImageKitError> {
        let mut processed = 0;

        for record in records {
            let key = record.key.as_str();
            tracing::info!(bucket = %record.bucket, key = %key, "Processing S3 event");

            if key.starts_with(&self.config.cache_bucket) {
                tracing::info!(key = %key, "Key is already in cache bucket, skipping");
                continue;
            }

            let params = self.parse_key(key).inspect_err(|e| {
                tracing::error!(key = %key, error = %e, "Failed to parse S3 key");
            })?;

            let optimized = self
                .transcode_source(&self.config.source_bucket, &params)
                .await
                .inspect_err(|e| tracing::error!(key = %key, error = %e, "Failed to optimize image"))?;

            self.store_cached(key, optimized)
                .await
                .inspect_err(|e| tracing::error!(key = %key, error = %e, "Failed to cache image"))?;

            tracing::info!(key = %key, "Successfully optimized and cached image");
            processed += 1;
        }

        Ok(processed)
    }

    /// Serve `key` synchronously, reading the original from `bucket`.
    pub async fn handle_direct(&self, bucket: &str, key: &str) -> Result<DirectResponse, ImageKitError> {
        tracing::info!(bucket = %bucket, key = %key, "Processing direct request");
        let params = self.parse_key(key)?;
        self.handle_direct_params(bucket, key, &params).await
    }

    /// Same as [`Self::handle_direct`] with parameters parsed elsewhere,
    /// cached under `cache_key`.
    pub async fn handle_direct_params(
        &self,
        bucket: &str,
        cache_key: &str,
        params: &ImageParams,
    ) -> Result<DirectResponse, ImageKitError> {
        match self.store.get(&self.config.cache_bucket, cache_key).await {
            Ok(cached) => {
                tracing::info!(key = %cache_key, "Cache hit");
                return Ok(DirectResponse {
                    data: cached.data,
                    content_type: cached.content_type,
                    cache: CacheOutcome::Hit,
                });
            }
            Err(e) => tracing::debug!(key = %cache_key, error = %e, "Cache miss"),
        }

        let optimized = self.transcode_source(bucket, params).await?;
        let content_type = optimized.content_type.to_string();
        // Shares the buffer handed to the store
        let data = optimized.data.clone();

        let cache = match self.store_cached(cache_key, optimized).await {
            Ok(()) => CacheOutcome::Stored,
            Err(e) => {
                tracing::warn!(key = %cache_key, error = %e, "Failed to cache image, returning result anyway");
                CacheOutcome::WriteFailed(e)
            }
        };

        Ok(DirectResponse {
            data,
            content_type,
            cache,
        })
    }

    /// Run one queued job against its explicit source and destination.
    pub async fn process_job(&self, job: &TranscodeJob) -> Result<JobOutcome, ImageKitError> {
        if self.store.exists(&job.output_bucket, &job.output_key).await {
            tracing::info!(
                bucket = %job.output_bucket,
                key = %job.output_key,
                "Output already exists, skipping job"
            );
            return Ok(JobOutcome::Skipped);
        }

        let params = ImageParams {
            image_path: job.key.clone(),
            width: job.width,
            height: job.height,
            quality: self.config.quality,
            format: job.format.clone(),
        };

        let optimized = self.transcode_source(&job.bucket, &params).await?;

        self.store
            .put(&job.output_bucket, &job.output_key, optimized.data, optimized.content_type)
            .await
            .map_err(|source| ImageKitError::CacheWriteFailed {
                bucket: job.output_bucket.clone(),
                key: job.output_key.clone(),
                source,
            })?;

        tracing::info!(bucket = %job.output_bucket, key = %job.output_key, "Job output written");
        Ok(JobOutcome::Written)
    }

    async fn transcode_source(&self, bucket: &str, params: &ImageParams) -> Result<Transcoded, ImageKitError> {
        let source = self
            .store
            .get(bucket, &params.image_path)
            .await
            .map_err(|source| ImageKitError::SourceNotFound {
                bucket: bucket.to_string(),
                key: params.image_path.clone(),
                source,
            })?;

        self.optimizer.optimize(&source.data, params)
    }

    async fn store_cached(&self, key: &str, optimized: Transcoded) -> Result<(), ImageKitError> {
        let bucket = &self.config.cache_bucket;
        self.store
            .put(bucket, key, optimized.data, optimized.content_type)
            .await
            .map_err(|source| ImageKitError::CacheWriteFailed {
                bucket: bucket.clone(),
                key: key.to_string(),
                source,
            })
    }
}
