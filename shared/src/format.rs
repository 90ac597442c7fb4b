use image::ImageFormat;

/// Output codecs this service can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Jpeg,
    Png,
    WebP,
    Gif,
    Tiff,
    /// Source bytes with no recognizable header
    Unknown,
}

impl Codec {
    /// Sniff the codec of encoded bytes from their magic header.
    pub fn detect(data: &[u8]) -> Self {
        match image::guess_format(data) {
            Ok(ImageFormat::Jpeg) => Self::Jpeg,
            Ok(ImageFormat::Png) => Self::Png,
            Ok(ImageFormat::WebP) => Self::WebP,
            Ok(ImageFormat::Gif) => Self::Gif,
            Ok(ImageFormat::Tiff) => Self::Tiff,
            _ => Self::Unknown,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Tiff => "image/tiff",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Map a requested format token to a codec and its content type.
///
/// `auto`, empty, and anything unrecognized become WebP. `original` keeps
/// whatever codec the source bytes are in.
pub fn resolve_format(token: &str, source: &[u8]) -> (Codec, &'static str) {
    let codec = match token.to_lowercase().as_str() {
        "jpeg" | "jpg" => Codec::Jpeg,
        "png" => Codec::Png,
        "webp" => Codec::WebP,
        "gif" => Codec::Gif,
        "tiff" => Codec::Tiff,
        "original" => Codec::detect(source),
        _ => Codec::WebP,
    };

    (codec, codec.content_type())
}
