//! Geometry Normalizer: scale-to-fill onto the target frame.

use reel_models::{FrameGeometry, FrameSize};

use crate::error::{MediaError, MediaResult};

/// Relative aspect difference treated as "already matching".
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// Plan the scale and crop that bring a `source` frame to `target`.
///
/// Sources within [`ASPECT_TOLERANCE`] of the target aspect are resized
/// directly. Everything else is scaled up until both axes cover the target,
/// then center-cropped to exactly the target size.
pub fn normalize(source: FrameSize, target: FrameSize) -> MediaResult<FrameGeometry> {
    let source_aspect = source
        .aspect()
        .ok_or_else(|| MediaError::invalid_media(format!("background has no usable dimensions ({source})")))?;
    let target_aspect = target
        .aspect()
        .ok_or_else(|| MediaError::invalid_media(format!("invalid target frame ({target})")))?;

    let (sw, sh) = (source.width as f64, source.height as f64);
    let (tw, th) = (target.width as f64, target.height as f64);

    if ((source_aspect - target_aspect) / target_aspect).abs() <= ASPECT_TOLERANCE {
        return Ok(FrameGeometry {
            source_width: source.width,
            source_height: source.height,
            target_width: target.width,
            target_height: target.height,
            scale_factor: tw / sw,
            scaled_width: target.width,
            scaled_height: target.height,
            crop_x: 0,
            crop_y: 0,
            cropped: false,
        });
    }

    let scale = (tw / sw).max(th / sh);
    // Round up so the scaled frame never falls a pixel short of the target
    let scaled_width = ceil_px(sw * scale).max(target.width);
    let scaled_height = ceil_px(sh * scale).max(target.height);

    Ok(FrameGeometry {
        source_width: source.width,
        source_height: source.height,
        target_width: target.width,
        target_height: target.height,
        scale_factor: scale,
        scaled_width,
        scaled_height,
        crop_x: (scaled_width - target.width) / 2,
        crop_y: (scaled_height - target.height) / 2,
        cropped: true,
    })
}

/// Round up to whole pixels, ignoring float noise on exact products.
fn ceil_px(value: f64) -> u32 {
    (value - 1e-6).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: FrameSize = FrameSize::PORTRAIT_HD;

    fn assert_target_aspect(geometry: &FrameGeometry) {
        let target = TARGET.aspect().unwrap();
        assert!(((geometry.output_aspect() - target) / target).abs() <= ASPECT_TOLERANCE);
    }

    #[test]
    fn test_matching_aspect_is_pure_resize() {
        let geometry = normalize(FrameSize::new(720, 1280), TARGET).unwrap();
        assert!(geometry.is_pure_resize());
        assert_eq!((geometry.crop_x, geometry.crop_y), (0, 0));
        assert!((geometry.scale_factor - 1.5).abs() < 1e-9);
        assert_target_aspect(&geometry);
    }

    #[test]
    fn test_near_matching_aspect_within_tolerance() {
        // 1088x1920 is 0.74% wider than 9:16
        let geometry = normalize(FrameSize::new(1088, 1920), TARGET).unwrap();
        assert!(geometry.is_pure_resize());
    }

    #[test]
    fn test_landscape_is_center_cropped() {
        let geometry = normalize(FrameSize::new(1920, 1080), TARGET).unwrap();
        assert!(geometry.cropped);
        assert_eq!(geometry.scaled_height, 1920);
        assert_eq!(geometry.scaled_width, 3414);
        assert_eq!(geometry.crop_x, 1167);
        assert_eq!(geometry.crop_y, 0);
        assert_eq!(geometry.filter(), "scale=3414:1920,crop=1080:1920:1167:0,setsar=1");
        assert_target_aspect(&geometry);
    }

    #[test]
    fn test_tall_source_is_cropped_vertically() {
        let geometry = normalize(FrameSize::new(1000, 3000), TARGET).unwrap();
        assert_eq!(geometry.scaled_width, 1080);
        assert_eq!(geometry.scaled_height, 3240);
        assert_eq!(geometry.crop_x, 0);
        assert_eq!(geometry.crop_y, 660);
    }

    #[test]
    fn test_square_source() {
        let geometry = normalize(FrameSize::new(1080, 1080), TARGET).unwrap();
        assert_eq!((geometry.scaled_width, geometry.scaled_height), (1920, 1920));
        assert_eq!(geometry.crop_x, 420);
        assert_target_aspect(&geometry);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = normalize(FrameSize::new(0, 1080), TARGET).unwrap_err();
        assert_eq!(err.code(), "invalid_media_error");
        assert!(normalize(FrameSize::new(1920, 1080), FrameSize::new(1080, 0)).is_err());
    }
}
