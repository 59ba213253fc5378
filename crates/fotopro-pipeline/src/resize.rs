//! Percentage resize with Lanczos3 resampling.
//!
//! Target dimensions are `floor(side * percent / 100)` on each axis.
//! Integer arithmetic keeps the truncation exact (no float rounding
//! surprises at e.g. 333 * 30%).
//!
//! Images with any transparency are resampled with premultiplied alpha,
//! so the color of a fully transparent pixel has no weight in the result.

use image::imageops::FilterType;
use image::{Rgba, Rgba32FImage};

use crate::adjust::StepError;
use crate::types::{Dimensions, RgbaImage};

/// Compute the output size for `percent` of `source`.
///
/// # Errors
///
/// Returns [`StepError::EmptyResult`] if either axis truncates to zero.
/// Returns [`StepError::DimensionOverflow`] if either axis exceeds
/// `u32::MAX`.
pub fn target_dimensions(source: Dimensions, percent: u32) -> Result<Dimensions, StepError> {
    let scale = |side: u32| -> Result<u32, StepError> {
        let scaled = u64::from(side) * u64::from(percent) / 100;
        u32::try_from(scaled).map_err(|_| StepError::DimensionOverflow { percent })
    };
    let target = Dimensions {
        width: scale(source.width)?,
        height: scale(source.height)?,
    };
    if target.width == 0 || target.height == 0 {
        return Err(StepError::EmptyResult {
            input: source,
            percent,
        });
    }
    Ok(target)
}

/// Resize `image` to `percent` of its size.
///
/// A `percent` of exactly 100 returns a copy without resampling.
///
/// # Errors
///
/// See [`target_dimensions`].
pub fn resize_percent(image: &RgbaImage, percent: u32) -> Result<RgbaImage, StepError> {
    let (width, height) = image.dimensions();
    let target = target_dimensions(Dimensions { width, height }, percent)?;
    if target.width == width && target.height == height {
        return Ok(image.clone());
    }
    if image.pixels().all(|p| p.0[3] == u8::MAX) {
        return Ok(image::imageops::resize(
            image,
            target.width,
            target.height,
            FilterType::Lanczos3,
        ));
    }
    Ok(resize_premultiplied(image, target))
}

/// Lanczos3 resize in premultiplied `f32` RGBA.
fn resize_premultiplied(image: &RgbaImage, target: Dimensions) -> RgbaImage {
    let (width, height) = image.dimensions();
    let premultiplied = Rgba32FImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0.map(|c| f32::from(c) / 255.0);
        Rgba([r * a, g * a, b * a, a])
    });
    let resized = image::imageops::resize(
        &premultiplied,
        target.width,
        target.height,
        FilterType::Lanczos3,
    );

    RgbaImage::from_fn(target.width, target.height, |x, y| {
        let [r, g, b, a] = resized.get_pixel(x, y).0;
        let alpha = unit_to_u8(a);
        if alpha == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        // Un-premultiply: channel = premultiplied / alpha.
        Rgba([unit_to_u8(r / a), unit_to_u8(g / a), unit_to_u8(b / a), alpha])
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn test_image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([128, 128, 128, 255]))
    }

    #[test]
    fn hundred_percent_keeps_dimensions() {
        assert_eq!(target_dimensions(dims(400, 300), 100).unwrap(), dims(400, 300));
        let img = test_image(7, 3);
        assert_eq!(resize_percent(&img, 100).unwrap(), img);
    }

    #[test]
    fn fifty_percent_halves_rounding_down() {
        assert_eq!(target_dimensions(dims(400, 300), 50).unwrap(), dims(200, 150));
        assert_eq!(target_dimensions(dims(401, 299), 50).unwrap(), dims(200, 149));
    }

    #[test]
    fn truncation_is_exact_for_awkward_percentages() {
        // 333 * 30 / 100 = 99.9 -> 99.
        assert_eq!(target_dimensions(dims(333, 10), 30).unwrap(), dims(99, 3));
        assert_eq!(target_dimensions(dims(10, 10), 155).unwrap(), dims(15, 15));
    }

    #[test]
    fn upscale_to_two_hundred_percent() {
        let out = resize_percent(&test_image(40, 30), 200).unwrap();
        assert_eq!(out.dimensions(), (80, 60));
    }

    #[test]
    fn downscale_produces_target_size() {
        let out = resize_percent(&test_image(400, 300), 50).unwrap();
        assert_eq!(out.dimensions(), (200, 150));
    }

    /// Opaque red on the left, fully transparent green on the right.
    fn red_beside_hidden_green() -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 255, 0, 0])
            }
        })
    }

    #[test]
    fn hidden_color_does_not_bleed_into_visible_pixels() {
        for percent in [50, 75, 150] {
            let out = resize_percent(&red_beside_hidden_green(), percent).unwrap();
            for (x, y, pixel) in out.enumerate_pixels() {
                if pixel.0[3] > 0 {
                    assert_eq!(pixel.0[1], 0, "green leaked at ({x}, {y}) for {percent}%");
                }
            }
        }
    }

    #[test]
    fn transparent_resize_keeps_opaque_region_color() {
        let out = resize_percent(&red_beside_hidden_green(), 50).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        assert!(out.get_pixel(0, 0).0[3] > 200);
        for pixel in out.pixels().filter(|p| p.0[3] > 0) {
            assert_eq!(&pixel.0[..3], &[255, 0, 0]);
        }
    }

    #[test]
    fn opaque_image_skips_premultiplication() {
        let img = RgbaImage::from_fn(12, 12, |x, y| {
            Rgba([u8::try_from(x * 20).unwrap(), u8::try_from(y * 20).unwrap(), 7, 255])
        });
        let expected = image::imageops::resize(&img, 6, 6, FilterType::Lanczos3);
        assert_eq!(resize_percent(&img, 50).unwrap(), expected);
    }

    #[test]
    fn collapsing_to_zero_is_an_error() {
        let err = target_dimensions(dims(5, 40), 10).unwrap_err();
        assert!(matches!(
            err,
            StepError::EmptyResult { input, percent: 10 } if input == dims(5, 40)
        ));
    }

    #[test]
    fn overflowing_target_is_an_error() {
        let err = target_dimensions(dims(u32::MAX, 1), 200).unwrap_err();
        assert!(matches!(err, StepError::DimensionOverflow { percent: 200 }));
    }
}
