use crate::error::ImageKitError;
use crate::format::Codec;
use image::codecs::webp::WebPEncoder;
use image::{imageops::FilterType, DynamicImage, ImageEncoder, ImageOutputFormat};
use std::io::Cursor;

/// Final transform handed to the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeOptions {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub codec: Codec,
}

/// Decode/resize/encode capability.
///
/// Resizing is always a fit: it may shrink, never crops, pads or enlarges.
pub trait ImageCodec: Send + Sync {
    /// Read the pixel size of encoded bytes
    fn dimensions(&self, data: &[u8]) -> Result<(u32, u32), ImageKitError>;

    fn transcode(&self, data: &[u8], options: &TranscodeOptions) -> Result<Vec<u8>, ImageKitError>;
}

/// [`ImageCodec`] backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct RustImageCodec;

impl ImageCodec for RustImageCodec {
    fn dimensions(&self, data: &[u8]) -> Result<(u32, u32), ImageKitError> {
        image::io::Reader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(ImageKitError::transcode)?
            .into_dimensions()
            .map_err(ImageKitError::transcode)
    }

    fn transcode(&self, data: &[u8], options: &TranscodeOptions) -> Result<Vec<u8>, ImageKitError> {
        let img = image::load_from_memory(data).map_err(ImageKitError::transcode)?;
        let resized = fit(img, options.width, options.height);
        encode(&resized, options.codec, options.quality)
    }
}

/// Fit inside `width` x `height` keeping the aspect ratio, never growing
/// past the source.
fn fit(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (src_w, src_h) = (img.width(), img.height());
    let (width, height) = (width.max(1), height.max(1));

    if width >= src_w && height >= src_h {
        return img;
    }

    img.resize(width.min(src_w), height.min(src_h), FilterType::Lanczos3)
}

fn encode(img: &DynamicImage, codec: Codec, quality: u8) -> Result<Vec<u8>, ImageKitError> {
    let mut buf = Cursor::new(Vec::new());

    match codec {
        Codec::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_to(&mut buf, ImageOutputFormat::Jpeg(quality))
            .map_err(ImageKitError::transcode)?,
        Codec::Png => img
            .write_to(&mut buf, ImageOutputFormat::Png)
            .map_err(ImageKitError::transcode)?,
        Codec::WebP => {
            // Lossless only, quality does not apply
            let rgba = img.to_rgba8();
            WebPEncoder::new_lossless(&mut buf)
                .write_image(rgba.as_raw(), rgba.width(), rgba.height(), image::ColorType::Rgba8)
                .map_err(ImageKitError::transcode)?
        }
        Codec::Gif => DynamicImage::ImageRgba8(img.to_rgba8())
            .write_to(&mut buf, ImageOutputFormat::Gif)
            .map_err(ImageKitError::transcode)?,
        Codec::Tiff => img
            .write_to(&mut buf, ImageOutputFormat::Tiff)
            .map_err(ImageKitError::transcode)?,
        Codec::Unknown => {
            return Err(ImageKitError::transcode("unsupported output codec"));
        }
    }

    Ok(buf.into_inner())
}
