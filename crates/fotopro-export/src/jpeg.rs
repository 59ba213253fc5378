//! JPEG encoding at a fixed quality.
//!
//! JPEG has no alpha channel, so images with alpha are flattened by
//! dropping it. Grayscale images stay single-channel.

use std::borrow::Cow;
use std::io::Cursor;

use fotopro_pipeline::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

use crate::ExportError;

/// JPEG quality used for every export.
pub const JPEG_QUALITY: u8 = 95;

/// Encode `image` as a JPEG at [`JPEG_QUALITY`].
///
/// # Errors
///
/// Returns [`ExportError::EmptyImage`] for a zero-sized image and
/// [`ExportError::Encode`] if the encoder fails.
pub fn to_jpeg(image: &DynamicImage) -> Result<Vec<u8>, ExportError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptyImage);
    }

    let flat = encodable(image);
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), JPEG_QUALITY);
    flat.write_with_encoder(encoder)?;

    log::debug!(
        "encoded {}x{} {:?} as JPEG: {} bytes",
        flat.width(),
        flat.height(),
        flat.color(),
        buf.len(),
    );
    Ok(buf)
}

/// Narrow `image` to a layout the JPEG encoder accepts (`L8` or `Rgb8`).
fn encodable(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}
