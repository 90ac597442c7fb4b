use thiserror::Error;

/// Boxed cause carried by codec failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the transcoding pipeline
#[derive(Debug, Error)]
pub enum ImageKitError {
    /// Missing or unusable process configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid key format: {0:?}")]
    KeyParse(String),

    #[error("source image not found: {bucket}/{key}")]
    SourceNotFound {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },

    #[error("optimization failed: {0}")]
    TranscodeFailed(#[source] BoxError),

    #[error("failed to store optimized image {bucket}/{key}")]
    CacheWriteFailed {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },
}

impl ImageKitError {
    pub fn transcode(cause: impl Into<BoxError>) -> Self {
        Self::TranscodeFailed(cause.into())
    }
}

/// Object store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("storage error: {0}")]
    Backend(String),
}
