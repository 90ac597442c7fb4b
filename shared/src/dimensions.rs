use crate::error::ImageKitError;
use crate::types::ImageParams;

/// Upper bounds applied after the requested size is worked out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionLimits {
    pub max_width: u32,
    pub max_height: u32,
}

/// Compute the output size for an image of `orig_width` x `orig_height`.
///
/// - nothing requested: original size
/// - one side requested: the other follows the source aspect ratio
/// - both requested: used as given, aspect ratio is NOT preserved
///
/// The result is then clamped to `limits`, width first, each clamp scaling
/// the other side proportionally. All divisions truncate.
pub fn resolve_dimensions(
    orig_width: u32,
    orig_height: u32,
    params: &ImageParams,
    limits: &DimensionLimits,
) -> Result<(u32, u32), ImageKitError> {
    if orig_width == 0 || orig_height == 0 {
        return Err(ImageKitError::InvalidImageDimensions {
            width: orig_width,
            height: orig_height,
        });
    }

    let (mut width, mut height) = match (params.width, params.height) {
        (0, 0) => (orig_width, orig_height),
        (w, 0) => (w, scale(orig_height, w, orig_width)),
        (0, h) => (scale(orig_width, h, orig_height), h),
        (w, h) => (w, h),
    };

    if width > limits.max_width {
        height = scale(height, limits.max_width, width);
        width = limits.max_width;
    }

    if height > limits.max_height {
        width = scale(width, limits.max_height, height);
        height = limits.max_height;
    }

    Ok((width, height))
}

/// `value * numerator / denominator` without intermediate overflow.
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(numerator) / u64::from(denominator);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: DimensionLimits = DimensionLimits {
        max_width: 2000,
        max_height: 2000,
    };

    fn params(width: u32, height: u32) -> ImageParams {
        ImageParams {
            width,
            height,
            ..ImageParams::with_defaults("img.jpg", 80)
        }
    }

    #[test]
    fn test_nothing_requested_keeps_original() {
        for (w, h) in [(1, 1), (640, 480), (1999, 3), (2000, 2000)] {
            assert_eq!(resolve_dimensions(w, h, &params(0, 0), &LIMITS).unwrap(), (w, h));
        }
    }

    #[test]
    fn test_width_only_preserves_aspect() {
        assert_eq!(resolve_dimensions(1920, 1080, &params(800, 0), &LIMITS).unwrap(), (800, 450));
        // 333 * 100 / 1000 = 33.3 → 33
        assert_eq!(resolve_dimensions(1000, 333, &params(100, 0), &LIMITS).unwrap(), (100, 33));
    }

    #[test]
    fn test_height_only_preserves_aspect() {
        // 1920 * 600 / 1080 = 1066.67 → 1066
        assert_eq!(resolve_dimensions(1920, 1080, &params(0, 600), &LIMITS).unwrap(), (1066, 600));
    }

    #[test]
    fn test_both_requested_used_verbatim() {
        assert_eq!(resolve_dimensions(1920, 1080, &params(300, 300), &LIMITS).unwrap(), (300, 300));
    }

    #[test]
    fn test_width_clamp_scales_height() {
        // 6000x4000 → 2000 x (4000 * 2000 / 6000)
        assert_eq!(resolve_dimensions(6000, 4000, &params(0, 0), &LIMITS).unwrap(), (2000, 1333));
    }

    #[test]
    fn test_height_clamp_after_width_clamp() {
        let limits = DimensionLimits {
            max_width: 1000,
            max_height: 300,
        };
        // 4000x2000 → width clamp 1000x500 → height clamp 600x300
        assert_eq!(resolve_dimensions(4000, 2000, &params(0, 0), &limits).unwrap(), (600, 300));
    }

    #[test]
    fn test_bounds_hold_for_any_request() {
        let limits = DimensionLimits {
            max_width: 640,
            max_height: 480,
        };
        let sources = [(1, 1), (10, 5000), (5000, 10), (4096, 4096), (641, 481)];
        let requests = [(0, 0), (100, 0), (0, 100), (9000, 0), (0, 9000), (9000, 9000), (700, 10)];

        for (ow, oh) in sources {
            for (rw, rh) in requests {
                let (w, h) = resolve_dimensions(ow, oh, &params(rw, rh), &limits).unwrap();
                assert!(w <= 640 && h <= 480, "{ow}x{oh} req {rw}x{rh} gave {w}x{h}");
            }
        }
    }

    #[test]
    fn test_zero_source_dimension_rejected() {
        for (w, h) in [(0, 100), (100, 0), (0, 0)] {
            let err = resolve_dimensions(w, h, &params(50, 0), &LIMITS).unwrap_err();
            assert!(matches!(
                err,
                ImageKitError::InvalidImageDimensions { width, height } if (width, height) == (w, h)
            ));
        }
    }
}
