//! Per-user editing state: the uploaded image, the current adjustments,
//! and the latest result.
//!
//! A [`Session`] is owned by whatever drives the UI (the wasm binding,
//! the CLI) and is never shared, so it needs no locking.

use crate::decode::{self, ImageInfo};
use crate::diagnostics::{Clock, PipelineDiagnostics, SystemClock};
use crate::pipeline;
use crate::preset::Preset;
use crate::types::{Adjustments, DynamicImage, PipelineError};

#[derive(Debug, Clone)]
struct Upload {
    filename: String,
    image: DynamicImage,
    info: ImageInfo,
}

/// Editing state for one user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    upload: Option<Upload>,
    adjustments: Adjustments,
    processed: Option<DynamicImage>,
    last_failure: Option<String>,
}

impl Session {
    /// An empty session with neutral adjustments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current image with a new upload.
    ///
    /// The previous result and failure notice are cleared; adjustments
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnsupportedFileType`] for a file name
    /// without an accepted extension, [`PipelineError::EmptyInput`] for
    /// empty bytes, and [`PipelineError::ImageDecode`] if decoding fails.
    /// The session is unchanged on error.
    pub fn upload(&mut self, filename: &str, bytes: &[u8]) -> Result<&ImageInfo, PipelineError> {
        let (image, info) = decode::load_upload(filename, bytes)?;
        log::info!(
            "uploaded {filename}: {} {} {}",
            info.format.map_or_else(|| "?".to_string(), |f| f.to_string()),
            info.dimensions,
            info.color_mode,
        );
        self.processed = None;
        self.last_failure = None;
        let upload = self.upload.insert(Upload {
            filename: filename.to_string(),
            image,
            info,
        });
        Ok(&upload.info)
    }

    /// Current adjustments.
    #[must_use]
    pub const fn adjustments(&self) -> &Adjustments {
        &self.adjustments
    }

    /// Replace the adjustments.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidAdjustments`] if a value cannot be
    /// applied; the previous adjustments are kept.
    pub fn set_adjustments(&mut self, adjustments: Adjustments) -> Result<(), PipelineError> {
        adjustments.validate()?;
        self.adjustments = adjustments;
        Ok(())
    }

    /// Apply `preset` on top of the current adjustments.
    pub fn apply_preset(&mut self, preset: Preset) -> &Adjustments {
        preset.apply_to(&mut self.adjustments);
        log::info!("applied preset {preset}");
        &self.adjustments
    }

    /// Run the pipeline on the uploaded image with the current
    /// adjustments.
    ///
    /// If a step fails, the image from the steps before it becomes the
    /// result, the failure is kept as [`last_failure`](Self::last_failure)
    /// and the partial image is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoImage`] if nothing has been uploaded.
    pub fn process(&mut self) -> Result<&DynamicImage, PipelineError> {
        self.process_with_diagnostics(&SystemClock)
            .map(|(image, _)| image)
    }

    /// [`process`](Self::process), also returning the run's diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoImage`] if nothing has been uploaded.
    pub fn process_with_diagnostics<C: Clock>(
        &mut self,
        clock: &C,
    ) -> Result<(&DynamicImage, PipelineDiagnostics), PipelineError> {
        let upload = self.upload.as_ref().ok_or(PipelineError::NoImage)?;
        let (result, diagnostics) =
            pipeline::apply_with_diagnostics(&upload.image, &self.adjustments, clock);
        let image = match result {
            Ok(image) => {
                self.last_failure = None;
                image
            }
            Err(failure) => {
                let message = failure.to_string();
                log::info!("showing partial result for {}: {message}", upload.filename);
                self.last_failure = Some(message);
                failure.partial
            }
        };
        Ok((self.processed.insert(image), diagnostics))
    }

    /// The uploaded image, if any.
    #[must_use]
    pub fn original(&self) -> Option<&DynamicImage> {
        self.upload.as_ref().map(|u| &u.image)
    }

    /// The latest result, if [`process`](Self::process) has run since the
    /// last upload.
    #[must_use]
    pub const fn processed(&self) -> Option<&DynamicImage> {
        self.processed.as_ref()
    }

    /// Metadata of the uploaded image.
    #[must_use]
    pub fn info(&self) -> Option<&ImageInfo> {
        self.upload.as_ref().map(|u| &u.info)
    }

    /// File name of the uploaded image.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.upload.as_ref().map(|u| u.filename.as_str())
    }

    /// Message describing the failure of the latest run, if it failed.
    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use image::ImageFormat;

    use super::*;
    use crate::types::Dimensions;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([
                u8::try_from(x % 256).unwrap(),
                u8::try_from(y % 256).unwrap(),
                128,
            ])
        });
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn process_without_upload_is_an_error() {
        let mut session = Session::new();
        assert!(matches!(session.process(), Err(PipelineError::NoImage)));
    }

    #[test]
    fn upload_reports_info() {
        let mut session = Session::new();
        let info = *session.upload("photo.PNG", &png_bytes(40, 30)).unwrap();
        assert_eq!(info.dimensions, Dimensions { width: 40, height: 30 });
        assert_eq!(session.filename(), Some("photo.PNG"));
        assert!(session.processed().is_none());
    }

    #[test]
    fn rejected_upload_leaves_session_unchanged() {
        let mut session = Session::new();
        session.upload("a.png", &png_bytes(4, 4)).unwrap();
        let err = session.upload("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFileType(_)));
        assert_eq!(session.filename(), Some("a.png"));
    }

    #[test]
    fn neutral_processing_returns_the_original() {
        let mut session = Session::new();
        session.upload("a.png", &png_bytes(12, 9)).unwrap();
        let processed = session.process().unwrap().clone();
        assert_eq!(Some(&processed), session.original());
        assert!(session.last_failure().is_none());
    }

    #[test]
    fn failure_keeps_partial_result_and_notice() {
        let mut session = Session::new();
        session.upload("tiny.png", &png_bytes(5, 5)).unwrap();
        session
            .set_adjustments(Adjustments {
                brightness: 1.5,
                resize_percent: 10,
                ..Adjustments::default()
            })
            .unwrap();
        let processed = session.process().unwrap();
        assert_eq!(Dimensions::of(processed), Dimensions { width: 5, height: 5 });
        let notice = session.last_failure().unwrap();
        assert!(notice.starts_with("Resize failed"), "{notice}");

        session
            .set_adjustments(Adjustments {
                brightness: 1.5,
                ..Adjustments::default()
            })
            .unwrap();
        session.process().unwrap();
        assert!(session.last_failure().is_none());
    }

    #[test]
    fn invalid_adjustments_are_rejected() {
        let mut session = Session::new();
        let err = session
            .set_adjustments(Adjustments {
                saturation: f32::NAN,
                ..Adjustments::default()
            })
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidAdjustments(_)));
        assert!(session.adjustments().is_neutral());
    }

    #[test]
    fn new_upload_keeps_adjustments_and_clears_result() {
        let mut session = Session::new();
        session.apply_preset(Preset::Vibrant);
        session.upload("a.png", &png_bytes(6, 6)).unwrap();
        session.process().unwrap();
        session.upload("b.png", &png_bytes(8, 8)).unwrap();
        assert!(session.processed().is_none());
        assert_eq!(
            *session.adjustments(),
            Adjustments::default().with_preset(Preset::Vibrant)
        );
    }

    #[test]
    fn diagnostics_are_available_from_the_session() {
        let mut session = Session::new();
        session.upload("a.png", &png_bytes(20, 20)).unwrap();
        session.apply_preset(Preset::MaxSharpness);
        let (_, diag) = session.process_with_diagnostics(&SystemClock).unwrap();
        assert_eq!(diag.steps.len(), 3);
    }
}
