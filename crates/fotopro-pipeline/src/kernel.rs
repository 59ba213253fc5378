//! Fixed 3x3 convolution kernels.
//!
//! Used by the sharpness enhancer (which blends against a
//! [`SMOOTH`]ed copy) and by the edge-enhancement step ([`EDGE_ENHANCE`]).
//!
//! Only the color channels are convolved; alpha is copied through. The
//! outermost ring of pixels has no full neighborhood and is copied from
//! the source unchanged, so images narrower or shorter than three pixels
//! come back untouched.

use crate::types::RgbaImage;

/// A 3x3 convolution kernel with its normalizing divisor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3x3 {
    /// Row-major weights, top-left first.
    pub weights: [f32; 9],
    /// Each weighted sum is divided by this before rounding.
    pub divisor: f32,
}

/// Mild smoothing: center weighted 5, neighbors 1.
pub const SMOOTH: Kernel3x3 = Kernel3x3 {
    weights: [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0],
    divisor: 13.0,
};

/// Edge enhancement: a Laplacian added back onto the image.
pub const EDGE_ENHANCE: Kernel3x3 = Kernel3x3 {
    weights: [-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0],
    divisor: 2.0,
};

/// Convolve the color channels of `image` with `kernel`.
#[must_use = "returns the filtered image"]
pub fn convolve(image: &RgbaImage, kernel: &Kernel3x3) -> RgbaImage {
    let (w, h) = image.dimensions();
    let mut out = image.clone();
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut sums = [0.0_f32; 3];
            for (row, dy) in kernel.weights.chunks_exact(3).zip(0u32..) {
                for (weight, dx) in row.iter().zip(0u32..) {
                    let p = image.get_pixel(x + dx - 1, y + dy - 1).0;
                    for (sum, &channel) in sums.iter_mut().zip(&p[..3]) {
                        *sum += weight * f32::from(channel);
                    }
                }
            }
            let px = out.get_pixel_mut(x, y);
            for (c, sum) in sums.into_iter().enumerate() {
                px.0[c] = clip8(sum / kernel.divisor);
            }
        }
    }
    out
}

/// Round half up and saturate to the `u8` range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clip8(value: f32) -> u8 {
    if value <= 0.0 {
        0
    } else if value >= 255.0 {
        255
    } else {
        (value + 0.5) as u8
    }
}
