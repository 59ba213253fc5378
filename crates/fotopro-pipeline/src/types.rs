//! Shared types for the fotopro adjustment pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `DynamicImage` so downstream crates can hold uploaded and
/// processed images without depending on `image` directly.
pub use image::DynamicImage;

/// Re-export `RgbaImage`, the working buffer every adjustment step
/// operates on.
pub use image::RgbaImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of a decoded image.
    #[must_use]
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Total pixel count (`width * height`).
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Range and granularity of a single UI control.
///
/// The pipeline itself accepts any value [`Adjustments::validate`] lets
/// through; these ranges describe what the interactive controls offer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlRange<T> {
    /// Smallest selectable value.
    pub min: T,
    /// Largest selectable value.
    pub max: T,
    /// Increment between selectable values.
    pub step: T,
    /// Initial (neutral) value.
    pub default: T,
}

/// All control ranges, serialized for UI layers that build their
/// sliders from data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub brightness: ControlRange<f32>,
    pub contrast: ControlRange<f32>,
    pub sharpness: ControlRange<f32>,
    pub saturation: ControlRange<f32>,
    pub blur_radius: ControlRange<f32>,
    pub resize_percent: ControlRange<u32>,
}

/// Requested adjustments (the parameter set fed to the pipeline).
///
/// Every field has a neutral value; a step whose field is neutral is
/// skipped entirely, so [`Adjustments::default`] leaves an image
/// bit-identical.
///
/// Deserialization fills missing fields with their neutral values, so a
/// UI may send only the controls it changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// Brightness scale factor. `1.0` is neutral, `0.0` is black.
    pub brightness: f32,

    /// Contrast scale factor around the mean gray level. `1.0` is neutral,
    /// `0.0` collapses the image to uniform gray.
    pub contrast: f32,

    /// Sharpness scale factor. Values below `1.0` soften, above `1.0`
    /// sharpen.
    pub sharpness: f32,

    /// Saturation scale factor. `0.0` is grayscale, `1.0` is neutral.
    pub saturation: f32,

    /// Gaussian blur standard deviation in pixels. `0.0` disables blur.
    pub blur_radius: f32,

    /// Whether to run the edge-enhancement convolution.
    pub enhance_edges: bool,

    /// Output size as a percentage of the input size. `100` is neutral.
    pub resize_percent: u32,
}

impl Adjustments {
    /// Neutral scale factor shared by brightness, contrast, sharpness
    /// and saturation.
    pub const NEUTRAL_FACTOR: f32 = 1.0;
    /// Neutral (disabled) blur radius.
    pub const NEUTRAL_BLUR_RADIUS: f32 = 0.0;
    /// Neutral resize percentage.
    pub const NEUTRAL_RESIZE_PERCENT: u32 = 100;

    /// Range offered for the brightness, contrast, sharpness and
    /// saturation controls.
    pub const FACTOR_RANGE: ControlRange<f32> = ControlRange {
        min: 0.0,
        max: 2.0,
        step: 0.1,
        default: Self::NEUTRAL_FACTOR,
    };

    /// Range offered for the blur control.
    pub const BLUR_RANGE: ControlRange<f32> = ControlRange {
        min: 0.0,
        max: 5.0,
        step: 0.1,
        default: Self::NEUTRAL_BLUR_RADIUS,
    };

    /// Range offered for the resize control.
    pub const RESIZE_RANGE: ControlRange<u32> = ControlRange {
        min: 10,
        max: 200,
        step: 5,
        default: Self::NEUTRAL_RESIZE_PERCENT,
    };

    /// All control ranges in one value.
    pub const CONTROLS: Controls = Controls {
        brightness: Self::FACTOR_RANGE,
        contrast: Self::FACTOR_RANGE,
        sharpness: Self::FACTOR_RANGE,
        saturation: Self::FACTOR_RANGE,
        blur_radius: Self::BLUR_RANGE,
        resize_percent: Self::RESIZE_RANGE,
    };

    /// Returns `true` if every field holds its neutral value.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Check that every field holds a value the pipeline can apply.
    ///
    /// This is looser than the control ranges: any finite, non-negative
    /// scale factor and blur radius is accepted, and any non-zero resize
    /// percentage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidAdjustments`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let factors = [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("sharpness", self.sharpness),
            ("saturation", self.saturation),
            ("blur_radius", self.blur_radius),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::InvalidAdjustments(format!(
                    "{name} must be a finite, non-negative number, got {value}"
                )));
            }
        }
        if self.resize_percent == 0 {
            return Err(PipelineError::InvalidAdjustments(
                "resize_percent must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Snap every field into its control range.
    ///
    /// Non-finite values fall back to the neutral value. Used for input
    /// coming straight from an untrusted UI.
    #[must_use]
    pub fn clamped(self) -> Self {
        let factor = |v: f32| clamp_finite(v, Self::FACTOR_RANGE);
        Self {
            brightness: factor(self.brightness),
            contrast: factor(self.contrast),
            sharpness: factor(self.sharpness),
            saturation: factor(self.saturation),
            blur_radius: clamp_finite(self.blur_radius, Self::BLUR_RANGE),
            enhance_edges: self.enhance_edges,
            resize_percent: self
                .resize_percent
                .clamp(Self::RESIZE_RANGE.min, Self::RESIZE_RANGE.max),
        }
    }
}

fn clamp_finite(value: f32, range: ControlRange<f32>) -> f32 {
    if value.is_finite() {
        value.clamp(range.min, range.max)
    } else {
        range.default
    }
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: Self::NEUTRAL_FACTOR,
            contrast: Self::NEUTRAL_FACTOR,
            sharpness: Self::NEUTRAL_FACTOR,
            saturation: Self::NEUTRAL_FACTOR,
            blur_radius: Self::NEUTRAL_BLUR_RADIUS,
            enhance_edges: false,
            resize_percent: Self::NEUTRAL_RESIZE_PERCENT,
        }
    }
}

/// Errors raised outside the adjustment steps: loading an upload,
/// validating input, or using a session before anything was uploaded.
///
/// Failures inside the steps are reported as
/// [`ProcessingFailure`](crate::ProcessingFailure) instead, because they
/// carry a partially processed image.
///
/// Uses a custom `Serialize` because `image::ImageError` does not
/// implement serde traits. The `ImageDecode` variant is serialized as its
/// `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The uploaded bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The upload's file name does not carry an accepted extension.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Failed to decode the uploaded image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// An adjustment value cannot be applied.
    #[error("invalid adjustments: {0}")]
    InvalidAdjustments(String),

    /// The session has no uploaded image yet.
    #[error("no image has been uploaded")]
    NoImage,
}

/// Serde-compatible proxy for `PipelineError`.
#[derive(Serialize)]
enum PipelineErrorProxy<'a> {
    EmptyInput,
    UnsupportedFileType(&'a str),
    ImageDecode(String),
    InvalidAdjustments(&'a str),
    NoImage,
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::UnsupportedFileType(name) => PipelineErrorProxy::UnsupportedFileType(name),
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
            Self::InvalidAdjustments(msg) => PipelineErrorProxy::InvalidAdjustments(msg),
            Self::NoImage => PipelineErrorProxy::NoImage,
        };
        proxy.serialize(serializer)
    }
}
