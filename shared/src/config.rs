use crate::dimensions::DimensionLimits;
use crate::error::ImageKitError;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MAX_WIDTH: u32 = 2000;
pub const DEFAULT_MAX_HEIGHT: u32 = 2000;
pub const DEFAULT_QUALITY: u8 = 80;

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source_bucket: String,
    pub cache_bucket: String,
    pub region: String,
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required:
    /// - SOURCE_BUCKET
    /// - CACHE_BUCKET
    ///
    /// Optional: AWS_REGION, MAX_WIDTH, MAX_HEIGHT, QUALITY
    pub fn from_env() -> Result<Self, ImageKitError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Unparseable or out-of-range integers
    /// fall back to their default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ImageKitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let source_bucket = get("SOURCE_BUCKET").ok_or_else(|| {
            ImageKitError::Config("SOURCE_BUCKET environment variable is required".to_string())
        })?;
        let cache_bucket = get("CACHE_BUCKET").ok_or_else(|| {
            ImageKitError::Config("CACHE_BUCKET environment variable is required".to_string())
        })?;

        Ok(Self {
            source_bucket,
            cache_bucket,
            region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            max_width: int_or_default("MAX_WIDTH", get("MAX_WIDTH"), DEFAULT_MAX_WIDTH, |v| v > 0),
            max_height: int_or_default("MAX_HEIGHT", get("MAX_HEIGHT"), DEFAULT_MAX_HEIGHT, |v| v > 0),
            quality: int_or_default("QUALITY", get("QUALITY"), DEFAULT_QUALITY, |q| {
                (1..=100).contains(&q)
            }),
        })
    }

    pub fn limits(&self) -> DimensionLimits {
        DimensionLimits {
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }
}

fn int_or_default<T>(name: &str, raw: Option<String>, default: T, valid: impl Fn(T) -> bool) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if valid(value) => value,
        _ => {
            tracing::warn!(
                "Invalid integer value for {}: {}, using default: {}",
                name,
                raw,
                default
            );
            default
        }
    }
}
