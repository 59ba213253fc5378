//! fotopro-export: JPEG encoding and download naming (sans-IO).
//!
//! Turns a processed image into the bytes, file name and MIME type of
//! the download offered to the user. Browser interaction (building a
//! `Blob`, clicking a link) lives in `fotopro-web`.

pub mod download;
pub mod jpeg;

pub use download::{Download, FILENAME_PREFIX, MIME_TYPE, download, export_filename};
pub use jpeg::{JPEG_QUALITY, to_jpeg};

/// Errors from encoding an image for download.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The image has no pixels.
    #[error("cannot export an empty image")]
    EmptyImage,

    /// The JPEG encoder rejected the image.
    #[error("failed to encode JPEG: {0}")]
    Encode(#[from] image::ImageError),
}
