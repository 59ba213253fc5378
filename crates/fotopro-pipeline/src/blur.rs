//! Gaussian blur.
//!
//! Wraps [`imageproc::filter::gaussian_blur_f32`], which works on one
//! channel at a time, so the RGBA image is split into planes, each plane
//! is blurred with the same kernel, and the planes are reassembled.
//! Alpha is blurred along with the color channels.

use image::GrayImage;

use crate::types::RgbaImage;

/// Smallest standard deviation actually handed to `imageproc`.
///
/// Below roughly 0.2 the kernel's neighbor weights underflow next to the
/// center weight and the blur is an identity. At 0.3 a neighbor weight is
/// about 0.004, enough to move any edge between adjacent 8-bit levels.
pub const MIN_SIGMA: f32 = 0.3;

/// Blur `image` with a Gaussian of standard deviation `radius` pixels.
///
/// Non-positive radii return the image unchanged, since `imageproc`'s
/// underlying function panics on `sigma <= 0.0`. Positive radii below
/// [`MIN_SIGMA`] are raised to it, so every positive radius softens a
/// non-uniform image.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &RgbaImage, radius: f32) -> RgbaImage {
    if radius <= 0.0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let sigma = radius.max(MIN_SIGMA);

    let (w, h) = image.dimensions();
    let planes: [GrayImage; 4] = std::array::from_fn(|c| {
        let plane = GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]));
        imageproc::filter::gaussian_blur_f32(&plane, sigma)
    });

    RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba(std::array::from_fn(|c| planes[c].get_pixel(x, y).0[0]))
    })
}
