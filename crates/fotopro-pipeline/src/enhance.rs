//! Brightness, contrast, sharpness and saturation enhancers.
//!
//! Each enhancer blends the image against a *degenerate* version of
//! itself:
//!
//! | Enhancer | Degenerate image |
//! |---|---|
//! | brightness | black |
//! | contrast | uniform gray at the mean luminance |
//! | sharpness | [`SMOOTH`](crate::kernel::SMOOTH)ed copy |
//! | saturation | per-pixel luminance (grayscale copy) |
//!
//! A factor of `0.0` yields the degenerate image, `1.0` the original,
//! and values above `1.0` extrapolate away from the degenerate image.
//! Alpha is carried through unchanged.

use image::Rgba;

use crate::kernel;
use crate::types::RgbaImage;

/// ITU-R 601 luminance with integer weights summing to `1 << 16`.
///
/// Gray inputs (`r == g == b`) map to themselves exactly.
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * 19_595 + u32::from(g) * 38_470 + u32::from(b) * 7_471;
    // Max is 255 * 65536 + 0x8000 >> 16 = 255, so the narrowing is lossless.
    u8::try_from((weighted + 0x8000) >> 16).unwrap_or(u8::MAX)
}

/// Blend one channel: `degenerate + factor * (original - degenerate)`,
/// saturated to `0..=255` and truncated.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_channel(degenerate: u8, original: u8, factor: f32) -> u8 {
    let base = f32::from(degenerate);
    let value = factor.mul_add(f32::from(original) - base, base);
    value.clamp(0.0, 255.0) as u8
}

/// Blend every pixel of `image` against the degenerate color produced by
/// `degenerate` for that pixel.
fn blend_with<F>(image: &RgbaImage, factor: f32, degenerate: F) -> RgbaImage
where
    F: Fn(u32, u32, &Rgba<u8>) -> [u8; 3],
{
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let d = degenerate(x, y, px);
        Rgba([
            blend_channel(d[0], px.0[0], factor),
            blend_channel(d[1], px.0[1], factor),
            blend_channel(d[2], px.0[2], factor),
            px.0[3],
        ])
    })
}

/// Scale brightness. `0.0` gives black.
#[must_use = "returns the adjusted image"]
pub fn brightness(image: &RgbaImage, factor: f32) -> RgbaImage {
    blend_with(image, factor, |_, _, _| [0, 0, 0])
}

/// Mean luminance of `image`, rounded half up. Empty images yield `0`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn mean_luma(image: &RgbaImage) -> u8 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0;
    }
    let sum: u64 = image
        .pixels()
        .map(|p| u64::from(luma(p.0[0], p.0[1], p.0[2])))
        .sum();
    (sum as f64 / count as f64 + 0.5) as u8
}

/// Scale contrast around the image's mean gray level. `0.0` gives a
/// uniform gray image.
#[must_use = "returns the adjusted image"]
pub fn contrast(image: &RgbaImage, factor: f32) -> RgbaImage {
    let mean = mean_luma(image);
    blend_with(image, factor, |_, _, _| [mean, mean, mean])
}

/// Scale sharpness. Below `1.0` moves toward a smoothed copy, above
/// `1.0` moves away from it.
#[must_use = "returns the adjusted image"]
pub fn sharpness(image: &RgbaImage, factor: f32) -> RgbaImage {
    let smoothed = kernel::convolve(image, &kernel::SMOOTH);
    blend_with(image, factor, |x, y, _| {
        let s = smoothed.get_pixel(x, y).0;
        [s[0], s[1], s[2]]
    })
}

/// Scale saturation. `0.0` gives grayscale.
#[must_use = "returns the adjusted image"]
pub fn saturation(image: &RgbaImage, factor: f32) -> RgbaImage {
    blend_with(image, factor, |_, _, px| {
        let l = luma(px.0[0], px.0[1], px.0[2]);
        [l, l, l]
    })
}
