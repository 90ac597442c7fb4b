use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ========== IMAGE PARAMS ==========
/// Transform parameters decoded from an object key.
///
/// `width`/`height` of 0 mean "unset".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageParams {
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    pub quality: u8, // 1-100
    pub format: String, // auto | original | codec name
}

impl ImageParams {
    /// Defaults used before any parameter token is applied.
    pub fn with_defaults(image_path: impl Into<String>, quality: u8) -> Self {
        Self {
            image_path: image_path.into(),
            width: 0,
            height: 0,
            quality,
            format: "auto".to_string(),
        }
    }

    /// Render back into the key grammar, e.g. `format=auto,width=200,quality=80/photo.jpg`.
    pub fn to_key(&self) -> String {
        let mut parts = vec![format!("format={}", self.format)];
        if self.width > 0 {
            parts.push(format!("width={}", self.width));
        }
        if self.height > 0 {
            parts.push(format!("height={}", self.height));
        }
        parts.push(format!("quality={}", self.quality));

        format!("{}/{}", parts.join(","), self.image_path)
    }
}

// ========== STORED OBJECT ==========
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Output of one transcode: encoded bytes plus their MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoded {
    pub data: Bytes,
    pub content_type: &'static str,
}

// ========== EVENTS ==========
/// One storage change notification, key already URL-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub bucket: String,
    pub key: String,
}

/// Queue message addressing a transcode by explicit bucket/key pairs
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub bucket: String,
    pub key: String,
    pub output_bucket: String,
    pub output_key: String,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub width: u32,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub height: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
}

fn is_unset(value: &u32) -> bool {
    *value == 0
}
