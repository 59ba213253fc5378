//! fotopro-bench: CLI tool for running the adjustment pipeline on a file.
//!
//! Loads an image the same way the browser UI does, applies adjustments
//! given as flags, a preset, or a JSON config, and prints per-step
//! diagnostics. Optionally writes the exported JPEG.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin fotopro-bench -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG=debug` for per-step log lines.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use fotopro_pipeline::{Adjustments, PipelineDiagnostics, Session, StepKind, SystemClock};

/// Photo adjustment pipeline runner for fotopro.
///
/// Runs the adjustment pipeline on a given image and prints per-step
/// timing and output sizes.
#[derive(Parser)]
#[command(name = "fotopro-bench", version)]
struct Cli {
    /// Path to the input image (JPG, JPEG, PNG, WebP).
    image_path: PathBuf,

    /// Brightness factor (1.0 is unchanged).
    #[arg(long, default_value_t = Adjustments::NEUTRAL_FACTOR)]
    brightness: f32,

    /// Contrast factor (1.0 is unchanged).
    #[arg(long, default_value_t = Adjustments::NEUTRAL_FACTOR)]
    contrast: f32,

    /// Sharpness factor (1.0 is unchanged).
    #[arg(long, default_value_t = Adjustments::NEUTRAL_FACTOR)]
    sharpness: f32,

    /// Saturation factor (1.0 is unchanged).
    #[arg(long, default_value_t = Adjustments::NEUTRAL_FACTOR)]
    saturation: f32,

    /// Gaussian blur radius in pixels (0 disables blur).
    #[arg(long, default_value_t = Adjustments::NEUTRAL_BLUR_RADIUS)]
    blur_radius: f32,

    /// Apply the edge-enhancement filter.
    #[arg(long)]
    enhance_edges: bool,

    /// Output size as a percentage of the input.
    #[arg(long, default_value_t = Adjustments::NEUTRAL_RESIZE_PERCENT, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    resize_percent: u32,

    /// Preset applied on top of the other adjustments.
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Full adjustments as a JSON string.
    ///
    /// When provided, the individual adjustment flags are ignored
    /// (`--preset` still applies on top).
    #[arg(long)]
    config_json: Option<String>,

    /// Directory to write `optimized_<file name>` into.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,
}

/// Preset selection.
#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    /// Brightness 1.1, contrast 1.3, saturation 1.4.
    Vibrant,
    /// Brightness 1.2, contrast 0.9, blur 0.8.
    Soft,
    /// Sharpness 1.8, contrast 1.2, edge enhancement.
    MaxSharpness,
}

impl From<PresetArg> for fotopro_pipeline::Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Vibrant => Self::Vibrant,
            PresetArg::Soft => Self::Soft,
            PresetArg::MaxSharpness => Self::MaxSharpness,
        }
    }
}

/// Build [`Adjustments`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual adjustment flags are ignored.
fn adjustments_from_cli(cli: &Cli) -> Result<Adjustments, String> {
    let adjustments = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        Adjustments {
            brightness: cli.brightness,
            contrast: cli.contrast,
            sharpness: cli.sharpness,
            saturation: cli.saturation,
            blur_radius: cli.blur_radius,
            enhance_edges: cli.enhance_edges,
            resize_percent: cli.resize_percent,
        }
    };
    Ok(match cli.preset {
        Some(preset) => adjustments.with_preset(preset.into()),
        None => adjustments,
    })
}

fn main() -> ExitCode {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let adjustments = match adjustments_from_cli(&cli) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    let filename = cli
        .image_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("image.jpg")
        .to_string();

    let mut session = Session::new();
    match session.upload(&filename, &image_bytes) {
        Ok(info) => eprintln!(
            "Image: {} ({} bytes, {} {} {})",
            cli.image_path.display(),
            image_bytes.len(),
            info.format.map_or_else(|| "?".to_string(), |f| f.to_string()),
            info.dimensions,
            info.color_mode,
        ),
        Err(e) => {
            eprintln!("Error loading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    }
    if let Err(e) = session.set_adjustments(adjustments) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    eprintln!("Adjustments: {adjustments:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let diagnostics = match session.process_with_diagnostics(&SystemClock) {
            Ok((_, diagnostics)) => diagnostics,
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        };

        if cli.json {
            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", diagnostics.report());
        }

        all_diagnostics.push(diagnostics);

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if let Some(notice) = session.last_failure() {
        eprintln!("Warning: {notice}; the partial result is kept");
    }

    if let Some(ref out_dir) = cli.out_dir
        && let Some(processed) = session.processed()
    {
        match fotopro_export::download(processed, &filename) {
            Ok(download) => {
                let path = out_dir.join(&download.filename);
                match std::fs::write(&path, &download.bytes) {
                    Ok(()) => eprintln!(
                        "JPEG written to {} ({} bytes)",
                        path.display(),
                        download.bytes.len(),
                    ),
                    Err(e) => {
                        eprintln!("Error writing {}: {e}", path.display());
                        return ExitCode::FAILURE;
                    }
                }
            }
            Err(e) => {
                eprintln!("Export error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| duration_ms(d.total_duration))
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<16} {:>12}", "Step", "Mean (ms)");
    println!("{}", "-".repeat(32));

    for kind in StepKind::ALL {
        let step_durations: Vec<f64> = all_diagnostics
            .iter()
            .flat_map(|d| &d.steps)
            .filter(|s| s.step == kind)
            .map(|s| duration_ms(s.duration))
            .collect();

        if step_durations.is_empty() {
            continue;
        }

        let step_mean = step_durations.iter().sum::<f64>() / step_durations.len() as f64;
        println!("{:<16} {step_mean:>10.3}ms", kind.to_string());
    }
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
