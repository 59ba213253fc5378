//! Pipeline diagnostics: per-step timing and output sizes.
//!
//! Every call to [`apply_with_diagnostics`](crate::apply_with_diagnostics)
//! collects diagnostics alongside the result. Timestamps come from a
//! [`Clock`], so the pipeline itself never reads the system time; the
//! [`SystemClock`] implementation uses the `web-time` crate, which maps to
//! `performance.now()` on WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adjust::StepKind;
use crate::types::Dimensions;

/// Source of timestamps for diagnostics.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`web_time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = web_time::Instant;

    fn now(&self) -> Self::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &Self::Instant) -> Duration {
        since.elapsed()
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Dimensions of the image handed to the pipeline.
    pub input: Dimensions,
    /// One entry per step that completed, in execution order.
    pub steps: Vec<StepDiagnostics>,
    /// The step that failed, if any. Later steps were not attempted.
    pub failure: Option<FailureDiagnostics>,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for one completed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDiagnostics {
    /// Which step ran.
    pub step: StepKind,
    /// Parameter summary, e.g. `Brightness x1.50`.
    pub detail: String,
    /// Wall-clock duration of this step (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Dimensions after the step.
    pub output: Dimensions,
}

/// The single failure recorded for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDiagnostics {
    /// The step that failed.
    pub step: StepKind,
    /// The step's error, as displayed.
    pub message: String,
}

impl PipelineDiagnostics {
    /// Dimensions of the final image, or of the input if no step ran.
    #[must_use]
    pub fn output(&self) -> Dimensions {
        self.steps.last().map_or(self.input, |s| s.output)
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {} ({} pixels) -> {}",
            self.input,
            self.input.pixel_count(),
            self.output(),
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Step", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        if self.steps.is_empty() && self.failure.is_none() {
            lines.push("(no adjustments; image passed through)".to_string());
        }
        for diag in &self.steps {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "{:<16} {ms:>8.3}ms {pct:>9.1}%  {} -> {}",
                diag.step.to_string(),
                diag.detail,
                diag.output,
            ));
        }

        if let Some(failure) = &self.failure {
            lines.push(String::new());
            lines.push(format!("FAILED at {}: {}", failure.step, failure.message));
        }

        lines.join("\n")
    }
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn sample() -> PipelineDiagnostics {
        PipelineDiagnostics {
            input: dims(400, 300),
            steps: vec![
                StepDiagnostics {
                    step: StepKind::Brightness,
                    detail: "Brightness x1.50".to_string(),
                    duration: Duration::from_millis(4),
                    output: dims(400, 300),
                },
                StepDiagnostics {
                    step: StepKind::Resize,
                    detail: "Resize 50%".to_string(),
                    duration: Duration::from_millis(6),
                    output: dims(200, 150),
                },
            ],
            failure: None,
            total_duration: Duration::from_millis(10),
        }
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn output_falls_back_to_input() {
        let mut diag = sample();
        assert_eq!(diag.output(), dims(200, 150));
        diag.steps.clear();
        assert_eq!(diag.output(), dims(400, 300));
    }

    #[test]
    fn report_lists_steps_and_failure() {
        let mut diag = sample();
        diag.failure = Some(FailureDiagnostics {
            step: StepKind::Blur,
            message: "boom".to_string(),
        });
        let report = diag.report();
        assert!(report.contains("Pipeline Diagnostics Report"));
        assert!(report.contains("400x300 (120000 pixels) -> 200x150"));
        assert!(report.contains("Resize 50%"));
        assert!(report.contains("FAILED at Blur: boom"));
    }

    #[test]
    fn report_for_neutral_run() {
        let diag = PipelineDiagnostics {
            input: dims(3, 3),
            steps: Vec::new(),
            failure: None,
            total_duration: Duration::ZERO,
        };
        assert!(diag.report().contains("passed through"));
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!((json["total_duration"].as_f64().unwrap() - 0.01).abs() < 1e-9);
        assert_eq!(json["steps"][1]["step"], "Resize");
        let back: PipelineDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back.steps.len(), 2);
        assert_eq!(back.output(), dims(200, 150));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["total_duration"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<PipelineDiagnostics>(json).is_err());
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let start = clock.now();
        let a = clock.elapsed(&start);
        let b = clock.elapsed(&start);
        assert!(b >= a);
    }
}
