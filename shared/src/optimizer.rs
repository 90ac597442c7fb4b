use bytes::Bytes;
use std::sync::Arc;

use crate::dimensions::{resolve_dimensions, DimensionLimits};
use crate::error::ImageKitError;
use crate::format::resolve_format;
use crate::image_processing::{ImageCodec, TranscodeOptions};
use crate::types::{ImageParams, Transcoded};

/// Turns source bytes plus [`ImageParams`] into an encoded derivative
#[derive(Clone)]
pub struct Optimizer {
    limits: DimensionLimits,
    codec: Arc<dyn ImageCodec>,
}

impl Optimizer {
    pub fn new(limits: DimensionLimits, codec: Arc<dyn ImageCodec>) -> Self {
        Self { limits, codec }
    }

    pub fn optimize(&self, data: &[u8], params: &ImageParams) -> Result<Transcoded, ImageKitError> {
        let (orig_width, orig_height) = self.codec.dimensions(data)?;
        let (width, height) = resolve_dimensions(orig_width, orig_height, params, &self.limits)?;
        let (codec, content_type) = resolve_format(&params.format, data);

        tracing::debug!(
            orig_width,
            orig_height,
            width,
            height,
            codec = ?codec,
            quality = params.quality,
            "transcoding image"
        );

        let options = TranscodeOptions {
            width: width.max(1),
            height: height.max(1),
            quality: params.quality,
            codec,
        };
        let data = self.codec.transcode(data, &options)?;

        Ok(Transcoded {
            data: Bytes::from(data),
            content_type,
        })
    }
}
