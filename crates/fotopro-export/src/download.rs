//! The file offered for download after processing.

use fotopro_pipeline::DynamicImage;

use crate::ExportError;
use crate::jpeg::to_jpeg;

/// MIME type of every export.
pub const MIME_TYPE: &str = "image/jpeg";

/// Prefix added to the uploaded file name.
pub const FILENAME_PREFIX: &str = "optimized_";

/// Everything a UI needs to offer the processed image as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Encoded JPEG bytes.
    pub bytes: Vec<u8>,
    /// Suggested file name.
    pub filename: String,
    /// Always [`MIME_TYPE`].
    pub mime_type: &'static str,
}

/// Download name for an upload called `original`.
///
/// The original extension is kept even though the content is JPEG, so
/// `photo.png` becomes `optimized_photo.png`.
#[must_use]
pub fn export_filename(original: &str) -> String {
    format!("{FILENAME_PREFIX}{original}")
}

/// Encode `image` and name it after `original_filename`.
///
/// # Errors
///
/// See [`to_jpeg`].
pub fn download(image: &DynamicImage, original_filename: &str) -> Result<Download, ExportError> {
    let bytes = to_jpeg(image)?;
    let filename = export_filename(original_filename);
    log::info!("prepared {filename} ({} bytes)", bytes.len());
    Ok(Download {
        bytes,
        filename,
        mime_type: MIME_TYPE,
    })
}
