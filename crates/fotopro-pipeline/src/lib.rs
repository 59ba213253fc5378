//! fotopro-pipeline: Pure photo adjustment pipeline (sans-IO).
//!
//! Applies a fixed sequence of adjustments to a decoded image:
//! brightness -> contrast -> sharpness -> saturation -> blur ->
//! edge enhancement -> resize.
//!
//! Steps whose parameter is neutral are skipped, so default
//! [`Adjustments`] leave an image untouched. If a step fails, the result
//! of the steps before it is returned inside a [`ProcessingFailure`].
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and images. Encoding for download lives in
//! `fotopro-export`; browser interaction lives in `fotopro-web`.

pub mod adjust;
pub mod blur;
pub mod decode;
pub mod diagnostics;
pub mod enhance;
pub mod kernel;
pub mod pipeline;
pub mod preset;
pub mod resize;
pub mod session;
pub mod types;

pub use adjust::{Adjust, Step, StepError, StepKind};
pub use decode::{ColorMode, ImageInfo, SourceFormat, decode, has_allowed_extension, load_upload};
pub use diagnostics::{Clock, PipelineDiagnostics, SystemClock};
pub use pipeline::{ProcessingFailure, apply, apply_with_diagnostics, run_steps};
pub use preset::{Preset, UnknownPreset};
pub use session::Session;
pub use types::{
    Adjustments, ControlRange, Controls, Dimensions, DynamicImage, PipelineError, RgbaImage,
};
