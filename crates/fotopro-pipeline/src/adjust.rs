//! Adjustment steps: the units the pipeline runs in order.
//!
//! This module defines the [`Adjust`] trait every step implements and the
//! built-in [`Step`] enum covering the seven adjustments. The pipeline
//! drives any slice of `&dyn Adjust`, so callers (and tests) can splice in
//! their own steps while the built-in order stays fixed in
//! [`Adjustments::steps`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Adjustments, Dimensions, RgbaImage};
use crate::{blur, enhance, kernel, resize};

/// Identifies which adjustment a step performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    Brightness,
    Contrast,
    Sharpness,
    Saturation,
    Blur,
    EnhanceEdges,
    Resize,
}

impl StepKind {
    /// All kinds, in pipeline order.
    pub const ALL: [Self; 7] = [
        Self::Brightness,
        Self::Contrast,
        Self::Sharpness,
        Self::Saturation,
        Self::Blur,
        Self::EnhanceEdges,
        Self::Resize,
    ];
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brightness => f.write_str("Brightness"),
            Self::Contrast => f.write_str("Contrast"),
            Self::Sharpness => f.write_str("Sharpness"),
            Self::Saturation => f.write_str("Saturation"),
            Self::Blur => f.write_str("Blur"),
            Self::EnhanceEdges => f.write_str("Enhance Edges"),
            Self::Resize => f.write_str("Resize"),
        }
    }
}

/// Why a single step could not be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StepError {
    /// A scale factor or radius was negative or not finite.
    #[error("invalid {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// Resizing would leave an axis with zero pixels.
    #[error("resizing {input} to {percent}% leaves no pixels")]
    EmptyResult {
        /// Dimensions before resizing.
        input: Dimensions,
        /// Requested percentage.
        percent: u32,
    },

    /// Resizing would exceed the maximum image dimension.
    #[error("resizing to {percent}% exceeds the maximum image dimension")]
    DimensionOverflow {
        /// Requested percentage.
        percent: u32,
    },

    /// The image data could not be processed.
    #[error("{0}")]
    Image(String),
}

/// A single image adjustment.
///
/// Input: the current RGBA working image. Output: a new image; the input
/// is never modified.
pub trait Adjust {
    /// Which adjustment this step performs.
    fn kind(&self) -> StepKind;

    /// Apply the adjustment.
    ///
    /// # Errors
    ///
    /// Returns a [`StepError`] if the step cannot be applied to `image`
    /// with its parameter.
    fn apply(&self, image: &RgbaImage) -> Result<RgbaImage, StepError>;

    /// Short parameter description for logs and diagnostics.
    fn describe(&self) -> String {
        self.kind().to_string()
    }
}

/// The built-in adjustments with their parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Brightness(f32),
    Contrast(f32),
    Sharpness(f32),
    Saturation(f32),
    /// Gaussian blur radius (standard deviation) in pixels.
    Blur(f32),
    EnhanceEdges,
    /// Output size as a percentage of the input.
    Resize(u32),
}

fn check_factor(name: &'static str, value: f32) -> Result<f32, StepError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(StepError::InvalidParameter { name, value })
    }
}

impl Adjust for Step {
    fn kind(&self) -> StepKind {
        match self {
            Self::Brightness(_) => StepKind::Brightness,
            Self::Contrast(_) => StepKind::Contrast,
            Self::Sharpness(_) => StepKind::Sharpness,
            Self::Saturation(_) => StepKind::Saturation,
            Self::Blur(_) => StepKind::Blur,
            Self::EnhanceEdges => StepKind::EnhanceEdges,
            Self::Resize(_) => StepKind::Resize,
        }
    }

    fn apply(&self, image: &RgbaImage) -> Result<RgbaImage, StepError> {
        match *self {
            Self::Brightness(f) => Ok(enhance::brightness(image, check_factor("brightness", f)?)),
            Self::Contrast(f) => Ok(enhance::contrast(image, check_factor("contrast", f)?)),
            Self::Sharpness(f) => Ok(enhance::sharpness(image, check_factor("sharpness", f)?)),
            Self::Saturation(f) => Ok(enhance::saturation(image, check_factor("saturation", f)?)),
            Self::Blur(r) => Ok(blur::gaussian_blur(image, check_factor("blur radius", r)?)),
            Self::EnhanceEdges => Ok(kernel::convolve(image, &kernel::EDGE_ENHANCE)),
            Self::Resize(pct) => resize::resize_percent(image, pct),
        }
    }

    fn describe(&self) -> String {
        match *self {
            Self::Brightness(f)
            | Self::Contrast(f)
            | Self::Sharpness(f)
            | Self::Saturation(f) => format!("{} x{f:.2}", self.kind()),
            Self::Blur(r) => format!("{} r={r:.2}", self.kind()),
            Self::EnhanceEdges => self.kind().to_string(),
            Self::Resize(pct) => format!("{} {pct}%", self.kind()),
        }
    }
}

impl Adjustments {
    /// The steps these adjustments enable, in pipeline order.
    ///
    /// Steps whose parameter holds its neutral value are omitted, so the
    /// neutral parameter set yields no steps at all.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(StepKind::ALL.len());
        if self.brightness != Self::NEUTRAL_FACTOR {
            steps.push(Step::Brightness(self.brightness));
        }
        if self.contrast != Self::NEUTRAL_FACTOR {
            steps.push(Step::Contrast(self.contrast));
        }
        if self.sharpness != Self::NEUTRAL_FACTOR {
            steps.push(Step::Sharpness(self.sharpness));
        }
        if self.saturation != Self::NEUTRAL_FACTOR {
            steps.push(Step::Saturation(self.saturation));
        }
        // Negative and NaN radii are kept so the step reports them.
        if self.blur_radius != Self::NEUTRAL_BLUR_RADIUS {
            steps.push(Step::Blur(self.blur_radius));
        }
        if self.enhance_edges {
            steps.push(Step::EnhanceEdges);
        }
        if self.resize_percent != Self::NEUTRAL_RESIZE_PERCENT {
            steps.push(Step::Resize(self.resize_percent));
        }
        steps
    }
}
