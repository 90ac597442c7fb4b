//! Object key → [`ImageParams`].
//!
//! Keys look like `format=auto,width=200/photo.jpg`: everything before the
//! last `/` is a comma separated list of `name=value` tokens, the last
//! segment is the image file. Parsing is permissive: tokens that are not
//! exactly one `name=value` pair, unknown names, and unparseable numbers are
//! dropped without error.

use crate::error::ImageKitError;
use crate::types::ImageParams;

/// Parse a storage key into image path and transform parameters.
pub fn parse_key(key: &str, default_quality: u8) -> Result<ImageParams, ImageKitError> {
    let (param_str, image_path) = match key.rsplit_once('/') {
        Some((params, path)) => (Some(params), path),
        None => (None, key),
    };

    if image_path.is_empty() {
        return Err(ImageKitError::KeyParse(key.to_string()));
    }

    let mut params = ImageParams::with_defaults(image_path, default_quality);

    for token in param_str.into_iter().flat_map(|s| s.split(',')) {
        let mut pieces = token.split('=');
        let (Some(name), Some(value), None) = (pieces.next(), pieces.next(), pieces.next()) else {
            continue;
        };

        match name.trim() {
            "width" | "w" => set_dimension(&mut params.width, value),
            "height" | "h" => set_dimension(&mut params.height, value),
            "quality" | "q" => set_quality(&mut params.quality, value),
            "format" | "f" => params.format = value.trim().to_string(),
            _ => {}
        }
    }

    Ok(params)
}

/// Parse a URL query string (`w`, `h`, `q`, `format`) for the given image.
///
/// The first occurrence of each name wins. Undecodable pairs are a
/// [`ImageKitError::KeyParse`].
pub fn parse_query(
    image_path: &str,
    query: &str,
    default_quality: u8,
) -> Result<ImageParams, ImageKitError> {
    let mut params = ImageParams::with_defaults(image_path, default_quality);
    apply_query(&mut params, query)?;
    Ok(params)
}

/// Overlay query parameters onto already parsed `params`.
pub fn apply_query(params: &mut ImageParams, query: &str) -> Result<(), ImageKitError> {
    let mut seen: Vec<String> = Vec::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_name, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode_component(raw_name, query)?;
        let value = decode_component(raw_value, query)?;

        if seen.contains(&name) {
            continue;
        }
        seen.push(name.clone());

        if value.is_empty() {
            continue;
        }

        match name.as_str() {
            "w" => set_dimension(&mut params.width, &value),
            "h" => set_dimension(&mut params.height, &value),
            "q" => set_quality(&mut params.quality, &value),
            "format" => params.format = value,
            _ => {}
        }
    }

    Ok(())
}

fn decode_component(raw: &str, query: &str) -> Result<String, ImageKitError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|s| s.into_owned())
        .map_err(|_| ImageKitError::KeyParse(query.to_string()))
}

fn set_dimension(field: &mut u32, value: &str) {
    if let Ok(parsed) = value.trim().parse::<u32>() {
        *field = parsed;
    }
}

fn set_quality(field: &mut u8, value: &str) {
    match value.trim().parse::<u8>() {
        Ok(q) if (1..=100).contains(&q) => *field = q,
        _ => {}
    }
}
