//! Upload filtering, image decoding and metadata.
//!
//! Accepts a file name plus raw bytes (JPEG, PNG or WebP) and produces a
//! decoded [`DynamicImage`] with the [`ImageInfo`] a UI shows next to it.
//!
//! Uploads are filtered by file extension only; there is no size cap.

use std::fmt;
use std::io::Cursor;

use image::{ColorType, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, DynamicImage, PipelineError};

/// File extensions accepted for upload (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "png", "jpeg", "webp"];

/// Container format of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
}

impl SourceFormat {
    const fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => f.write_str("JPEG"),
            Self::Png => f.write_str("PNG"),
            Self::WebP => f.write_str("WEBP"),
        }
    }
}

/// Pixel layout of a decoded image, named the way imaging tools
/// conventionally label modes (`L`, `RGB`, `RGBA`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// 8-bit grayscale.
    L,
    /// 8-bit grayscale with alpha.
    La,
    /// 8-bit RGB.
    Rgb,
    /// 8-bit RGB with alpha.
    Rgba,
    /// 16-bit grayscale.
    L16,
    /// 16-bit grayscale with alpha.
    La16,
    /// 16-bit RGB.
    Rgb16,
    /// 16-bit RGB with alpha.
    Rgba16,
    /// 32-bit float RGB.
    RgbF32,
    /// 32-bit float RGB with alpha.
    RgbaF32,
    /// Any layout not listed above.
    Other,
}

impl From<ColorType> for ColorMode {
    fn from(color: ColorType) -> Self {
        match color {
            ColorType::L8 => Self::L,
            ColorType::La8 => Self::La,
            ColorType::Rgb8 => Self::Rgb,
            ColorType::Rgba8 => Self::Rgba,
            ColorType::L16 => Self::L16,
            ColorType::La16 => Self::La16,
            ColorType::Rgb16 => Self::Rgb16,
            ColorType::Rgba16 => Self::Rgba16,
            ColorType::Rgb32F => Self::RgbF32,
            ColorType::Rgba32F => Self::RgbaF32,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::L => "L",
            Self::La => "LA",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
            Self::L16 => "I;16",
            Self::La16 => "LA;16",
            Self::Rgb16 => "RGB;16",
            Self::Rgba16 => "RGBA;16",
            Self::RgbF32 => "RGB;F",
            Self::RgbaF32 => "RGBA;F",
            Self::Other => "unknown",
        };
        f.write_str(name)
    }
}

/// Metadata shown alongside an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Detected container format (`None` if the bytes decoded but the
    /// format could not be named).
    pub format: Option<SourceFormat>,
    /// Decoded size in pixels.
    pub dimensions: Dimensions,
    /// Decoded pixel layout.
    pub color_mode: ColorMode,
}

impl ImageInfo {
    /// Build info for an image that did not come from an upload.
    #[must_use]
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            format: None,
            dimensions: Dimensions::of(image),
            color_mode: image.color().into(),
        }
    }
}

/// Check whether a file name has an allowed image extension.
#[must_use]
pub fn has_allowed_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|a| a.eq_ignore_ascii_case(ext))
    })
}

/// Decode raw image bytes, sniffing the format from the content.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the format is unrecognized
/// or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    let format = reader.format().and_then(SourceFormat::from_image_format);
    let image = reader.decode()?;

    let info = ImageInfo {
        format,
        ..ImageInfo::of(&image)
    };
    Ok((image, info))
}

/// Filter an upload by file name, then decode it.
///
/// # Errors
///
/// Returns [`PipelineError::UnsupportedFileType`] if `filename` does not
/// end in one of [`ALLOWED_EXTENSIONS`], otherwise any error from
/// [`decode`].
pub fn load_upload(filename: &str, bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), PipelineError> {
    if !has_allowed_extension(filename) {
        return Err(PipelineError::UnsupportedFileType(filename.to_string()));
    }
    decode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn allowed_extensions_are_case_insensitive() {
        assert!(has_allowed_extension("photo.jpg"));
        assert!(has_allowed_extension("photo.JPEG"));
        assert!(has_allowed_extension("scan.Png"));
        assert!(has_allowed_extension("web.webp"));
        assert!(has_allowed_extension("archive.tar.png"));
    }

    #[test]
    fn other_extensions_are_rejected() {
        assert!(!has_allowed_extension("anim.gif"));
        assert!(!has_allowed_extension("image.bmp"));
        assert!(!has_allowed_extension("png"));
        assert!(!has_allowed_extension(""));
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_return_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn upload_with_wrong_extension_is_rejected_before_decoding() {
        let result = load_upload("notes.txt", &[]);
        assert!(
            matches!(result, Err(PipelineError::UnsupportedFileType(ref name)) if name == "notes.txt")
        );
    }

    #[test]
    fn png_upload_reports_format_size_and_mode() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            17,
            31,
            image::Rgba([128, 64, 32, 255]),
        ));
        let bytes = encode(&img, ImageFormat::Png);

        let (decoded, info) = load_upload("sunset.png", &bytes).unwrap();
        assert_eq!(decoded.width(), 17);
        assert_eq!(decoded.height(), 31);
        assert_eq!(info.format, Some(SourceFormat::Png));
        assert_eq!(
            info.dimensions,
            Dimensions {
                width: 17,
                height: 31
            }
        );
        assert_eq!(info.color_mode, ColorMode::Rgba);
        assert_eq!(info.color_mode.to_string(), "RGBA");
    }

    #[test]
    fn jpeg_upload_decodes_as_rgb() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            8,
            8,
            image::Rgb([10, 200, 30]),
        ));
        let bytes = encode(&img, ImageFormat::Jpeg);

        let (_, info) = load_upload("holiday.JPG", &bytes).unwrap();
        assert_eq!(info.format, Some(SourceFormat::Jpeg));
        assert_eq!(info.color_mode, ColorMode::Rgb);
        assert_eq!(info.format.unwrap().to_string(), "JPEG");
    }

    #[test]
    fn format_comes_from_content_not_extension() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            4,
            4,
            image::Luma([90]),
        ));
        let bytes = encode(&img, ImageFormat::Png);

        let (_, info) = load_upload("mislabeled.jpg", &bytes).unwrap();
        assert_eq!(info.format, Some(SourceFormat::Png));
        assert_eq!(info.color_mode, ColorMode::L);
    }
}
