pub mod config;
pub mod dimensions;
pub mod error;
pub mod format;
pub mod handler;
pub mod image_processing;
pub mod key_parser;
pub mod optimizer;
pub mod s3;
pub mod types;

#[cfg(test)]
mod test_helpers;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use std::sync::Arc;

pub use config::Config;
pub use error::{ImageKitError, StoreError};
pub use handler::{CacheOutcome, DirectResponse, ImageHandler, JobOutcome};
pub use types::{ChangeNotification, ImageParams, TranscodeJob};

use image_processing::RustImageCodec;
use s3::S3Store;

/// Shared application state, built once per Lambda instance
pub struct AppState {
    pub handler: ImageHandler,
}

impl AppState {
    pub fn new(config: Config, s3_client: S3Client) -> Arc<Self> {
        let handler = ImageHandler::new(
            config,
            Arc::new(S3Store::new(s3_client)),
            Arc::new(RustImageCodec),
        );
        Arc::new(Self { handler })
    }

    /// Read [`Config`] from the environment and build the S3 client for its region.
    pub async fn from_env() -> Result<Arc<Self>, ImageKitError> {
        let config = Config::from_env()?;

        tracing::info!(
            "Initializing handler with config: SourceBucket={}, CacheBucket={}, Region={}",
            config.source_bucket,
            config.cache_bucket,
            config.region
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        Ok(Self::new(config, S3Client::new(&aws_config)))
    }

    pub fn config(&self) -> &Config {
        self.handler.config()
    }
}
