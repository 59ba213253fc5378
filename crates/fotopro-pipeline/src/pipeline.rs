//! The adjustment pipeline: run steps in order, stop at the first failure.
//!
//! ```rust
//! # use fotopro_pipeline::{Adjustments, DynamicImage, RgbaImage};
//! let image = DynamicImage::ImageRgba8(RgbaImage::new(40, 30));
//! let adjustments = Adjustments {
//!     brightness: 1.5,
//!     resize_percent: 50,
//!     ..Adjustments::default()
//! };
//! let out = fotopro_pipeline::apply(&image, &adjustments).unwrap();
//! assert_eq!((out.width(), out.height()), (20, 15));
//! ```
//!
//! Every step works on an RGBA working copy. The result is converted back
//! to the input's layout (gray stays gray, images without alpha come back
//! without alpha), except that deep formats are narrowed to 8 bits per
//! channel.
//!
//! When a step fails, the run stops and the image produced by the steps
//! before it is handed back inside the [`ProcessingFailure`], with exactly
//! one failure recorded in the diagnostics.

use std::fmt;

use image::ColorType;

use crate::adjust::{Adjust, StepError, StepKind};
use crate::diagnostics::{
    Clock, FailureDiagnostics, PipelineDiagnostics, StepDiagnostics, SystemClock,
};
use crate::types::{Adjustments, Dimensions, DynamicImage, RgbaImage};

/// A step failed partway through a run.
#[derive(thiserror::Error)]
#[error("{step} failed: {source}")]
pub struct ProcessingFailure {
    /// The step that failed.
    pub step: StepKind,
    /// Why it failed.
    #[source]
    pub source: StepError,
    /// The image after the last successful step, in the input's layout,
    /// or the input itself if the first step failed.
    pub partial: DynamicImage,
}

impl fmt::Debug for ProcessingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingFailure")
            .field("step", &self.step)
            .field("source", &self.source)
            .field("partial", &Dimensions::of(&self.partial))
            .finish()
    }
}

/// Apply `adjustments` to `image`.
///
/// Neutral adjustments return an identical copy of `image`.
///
/// # Errors
///
/// Returns a [`ProcessingFailure`] carrying the partially processed image
/// if any step fails.
pub fn apply(
    image: &DynamicImage,
    adjustments: &Adjustments,
) -> Result<DynamicImage, ProcessingFailure> {
    apply_with_diagnostics(image, adjustments, &SystemClock).0
}

/// Apply `adjustments` to `image`, collecting per-step diagnostics.
///
/// Diagnostics are returned whether or not the run succeeded.
pub fn apply_with_diagnostics<C: Clock>(
    image: &DynamicImage,
    adjustments: &Adjustments,
    clock: &C,
) -> (Result<DynamicImage, ProcessingFailure>, PipelineDiagnostics) {
    let steps = adjustments.steps();
    let steps: Vec<&dyn Adjust> = steps.iter().map(|s| s as &dyn Adjust).collect();
    run_steps(image, &steps, clock)
}

/// Run an arbitrary sequence of steps over `image`.
///
/// This is the engine behind [`apply`]; it accepts any [`Adjust`]
/// implementation, so callers can add steps of their own.
pub fn run_steps<C: Clock>(
    image: &DynamicImage,
    steps: &[&dyn Adjust],
    clock: &C,
) -> (Result<DynamicImage, ProcessingFailure>, PipelineDiagnostics) {
    let start = clock.now();
    let input = Dimensions::of(image);
    let mut diagnostics = PipelineDiagnostics {
        input,
        steps: Vec::with_capacity(steps.len()),
        failure: None,
        total_duration: std::time::Duration::ZERO,
    };

    if steps.is_empty() {
        log::debug!("no adjustments requested; passing {input} image through");
        diagnostics.total_duration = clock.elapsed(&start);
        return (Ok(image.clone()), diagnostics);
    }

    let color = image.color();
    let mut current: RgbaImage = image.to_rgba8();

    for step in steps {
        let step_start = clock.now();
        match step.apply(&current) {
            Ok(next) => {
                current = next;
                let (width, height) = current.dimensions();
                let duration = clock.elapsed(&step_start);
                let detail = step.describe();
                log::debug!("{detail}: {width}x{height} in {duration:?}");
                diagnostics.steps.push(StepDiagnostics {
                    step: step.kind(),
                    detail,
                    duration,
                    output: Dimensions { width, height },
                });
            }
            Err(source) => {
                let kind = step.kind();
                log::warn!("{kind} failed, keeping result of earlier steps: {source}");
                diagnostics.failure = Some(FailureDiagnostics {
                    step: kind,
                    message: source.to_string(),
                });
                diagnostics.total_duration = clock.elapsed(&start);
                // Nothing succeeded: hand back the input itself, not its
                // 8-bit working copy.
                let partial = if diagnostics.steps.is_empty() {
                    image.clone()
                } else {
                    restore_layout(color, current)
                };
                let failure = ProcessingFailure {
                    step: kind,
                    source,
                    partial,
                };
                return (Err(failure), diagnostics);
            }
        }
    }

    diagnostics.total_duration = clock.elapsed(&start);
    (Ok(restore_layout(color, current)), diagnostics)
}

/// Convert the RGBA working image back to the layout of the input.
fn restore_layout(color: ColorType, working: RgbaImage) -> DynamicImage {
    let working = DynamicImage::ImageRgba8(working);
    match color {
        ColorType::L8 | ColorType::L16 => DynamicImage::ImageLuma8(working.to_luma8()),
        ColorType::La8 | ColorType::La16 => DynamicImage::ImageLumaA8(working.to_luma_alpha8()),
        c if c.has_alpha() => working,
        _ => DynamicImage::ImageRgb8(working.to_rgb8()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::adjust::Step;
    use crate::enhance;

    /// Clock that advances one millisecond per reading.
    struct TickClock(Cell<u64>);

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.0.get();
            self.0.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    struct Failing;

    impl Adjust for Failing {
        fn kind(&self) -> StepKind {
            StepKind::Sharpness
        }

        fn apply(&self, _image: &RgbaImage) -> Result<RgbaImage, StepError> {
            Err(StepError::Image("simulated".to_string()))
        }
    }

    fn rgb_gradient(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([
                u8::try_from(x * 255 / w).unwrap(),
                u8::try_from(y * 255 / h).unwrap(),
                90,
            ])
        }))
    }

    fn mean_luma(image: &DynamicImage) -> u8 {
        enhance::mean_luma(&image.to_rgba8())
    }

    #[test]
    fn neutral_adjustments_return_identical_image() {
        let img = rgb_gradient(32, 24);
        let (out, diag) =
            apply_with_diagnostics(&img, &Adjustments::default(), &TickClock(Cell::new(0)));
        assert_eq!(out.unwrap(), img);
        assert!(diag.steps.is_empty());
        assert!(diag.failure.is_none());
    }

    #[test]
    fn brightness_and_resize_compose() {
        let img = rgb_gradient(400, 300);
        let adjustments = Adjustments {
            brightness: 1.5,
            resize_percent: 50,
            ..Adjustments::default()
        };
        let out = apply(&img, &adjustments).unwrap();
        assert_eq!((out.width(), out.height()), (200, 150));
        assert_eq!(out.color(), ColorType::Rgb8);
        assert!(mean_luma(&out) > mean_luma(&img));
    }

    #[test]
    fn grayscale_input_stays_grayscale() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_fn(10, 10, |x, _| {
            image::Luma([u8::try_from(x * 20).unwrap()])
        }));
        let adjustments = Adjustments {
            contrast: 1.4,
            ..Adjustments::default()
        };
        let out = apply(&img, &adjustments).unwrap();
        assert_eq!(out.color(), ColorType::L8);
    }

    #[test]
    fn alpha_input_keeps_alpha() {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, image::Rgba([10, 20, 30, 77])));
        let adjustments = Adjustments {
            saturation: 0.0,
            ..Adjustments::default()
        };
        let out = apply(&img, &adjustments).unwrap();
        assert_eq!(out.color(), ColorType::Rgba8);
        assert_eq!(out.to_rgba8().get_pixel(0, 0).0[3], 77);
    }

    #[test]
    fn failure_returns_previous_result_and_one_diagnostic() {
        let img = rgb_gradient(20, 10);
        let brighten = Step::Brightness(1.2);
        let shrink = Step::Resize(50);
        let only_brighten: [&dyn Adjust; 1] = [&brighten];
        let after_brighten = run_steps(&img, &only_brighten, &TickClock(Cell::new(0)))
            .0
            .unwrap();

        let steps: [&dyn Adjust; 3] = [&brighten, &Failing, &shrink];
        let (result, diag) = run_steps(&img, &steps, &TickClock(Cell::new(0)));
        let failure = result.unwrap_err();

        assert_eq!(failure.step, StepKind::Sharpness);
        assert_eq!(failure.partial, after_brighten);
        assert_eq!(diag.steps.len(), 1);
        assert_eq!(
            diag.failure,
            Some(FailureDiagnostics {
                step: StepKind::Sharpness,
                message: "simulated".to_string(),
            })
        );
        assert_eq!(failure.to_string(), "Sharpness failed: simulated");
    }

    #[test]
    fn failure_at_first_step_returns_input() {
        let img = rgb_gradient(8, 8);
        let steps: [&dyn Adjust; 1] = [&Failing];
        let (result, diag) = run_steps(&img, &steps, &TickClock(Cell::new(0)));
        assert_eq!(result.unwrap_err().partial, img);
        assert!(diag.steps.is_empty());
        assert!(diag.failure.is_some());
    }

    #[test]
    fn failure_at_first_step_returns_deep_input_unnarrowed() {
        let img = DynamicImage::ImageRgb16(image::ImageBuffer::from_fn(8, 8, |x, y| {
            image::Rgb([
                u16::try_from(x * 8191 + 3).unwrap(),
                u16::try_from(y * 8191 + 5).unwrap(),
                40_001,
            ])
        }));
        let steps: [&dyn Adjust; 1] = [&Failing];
        let (result, diag) = run_steps(&img, &steps, &TickClock(Cell::new(0)));
        let partial = result.unwrap_err().partial;
        assert_eq!(partial.color(), ColorType::Rgb16);
        assert_eq!(partial, img);
        assert_eq!(diag.failure.map(|f| f.step), Some(StepKind::Sharpness));
    }

    #[test]
    fn resize_collapsing_to_zero_fails_after_earlier_steps() {
        let img = rgb_gradient(5, 5);
        let adjustments = Adjustments {
            brightness: 0.5,
            resize_percent: 10,
            ..Adjustments::default()
        };
        let failure = apply(&img, &adjustments).unwrap_err();
        assert_eq!(failure.step, StepKind::Resize);
        assert_eq!(Dimensions::of(&failure.partial), Dimensions { width: 5, height: 5 });
        assert!(mean_luma(&failure.partial) < mean_luma(&img));
    }

    #[test]
    fn diagnostics_record_each_step() {
        let img = rgb_gradient(16, 16);
        let adjustments = Adjustments {
            sharpness: 1.8,
            enhance_edges: true,
            resize_percent: 200,
            ..Adjustments::default()
        };
        let (result, diag) = apply_with_diagnostics(&img, &adjustments, &TickClock(Cell::new(0)));
        assert!(result.is_ok());
        let kinds: Vec<_> = diag.steps.iter().map(|s| s.step).collect();
        assert_eq!(
            kinds,
            [StepKind::Sharpness, StepKind::EnhanceEdges, StepKind::Resize]
        );
        assert_eq!(diag.output(), Dimensions { width: 32, height: 32 });
        assert!(diag.steps.iter().all(|s| s.duration == Duration::from_millis(1)));
        assert!(diag.total_duration > Duration::ZERO);
    }

    #[test]
    fn blur_zero_matches_no_blur_and_half_pixel_changes_image() {
        let img = rgb_gradient(12, 12);
        let zero = Adjustments {
            blur_radius: 0.0,
            ..Adjustments::default()
        };
        assert_eq!(apply(&img, &zero).unwrap(), img);

        let mut edge = image::RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 0]));
        for y in 0..10 {
            for x in 5..10 {
                edge.put_pixel(x, y, image::Rgb([255, 255, 255]));
            }
        }
        let edge = DynamicImage::ImageRgb8(edge);
        let half = Adjustments {
            blur_radius: 0.5,
            ..Adjustments::default()
        };
        assert_ne!(apply(&edge, &half).unwrap(), edge);

        let smallest = Adjustments {
            blur_radius: Adjustments::BLUR_RANGE.step,
            ..Adjustments::default()
        };
        assert_ne!(apply(&edge, &smallest).unwrap(), edge);
    }
}
