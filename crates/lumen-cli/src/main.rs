//! lumen-cli: command-line front end to the lumen processing backend.
//!
//! Loads an image file, builds an edit document from command-line
//! assignments, sends one render request, and writes the rendered
//! result. Useful for:
//!
//! - Scripting batch edits with the same controls as the web app
//! - Checking a backend deployment without a browser
//! - Inspecting the histogram of an edited image
//!
//! # Usage
//!
//! ```text
//! cargo run --bin lumen-cli -- [OPTIONS] <IMAGE>
//! cargo run --bin lumen-cli -- photo.jpg --set contrast=80 --enable edges --param edges.threshold1=40
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod edits;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use lumen_client::{BackendClient, BackendConfig, ClientError, DEFAULT_BACKEND_URL};
use lumen_edits::{
    ColorMode, EditDocument, EncodedImage, HistogramData, ImageError, SyncDriver, SyncOutcome,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::edits::{EditError, EditPlan, ParamSetting, Setting};

/// Apply lumen edits to an image through the processing backend.
///
/// Controls: contrast, brightness, saturation, hue, gamma (sliders,
/// 0-100); grayscale, minimum, maximum (filters); mean, median
/// (`kernel_size`) and edges (`threshold1`, `threshold2`) (filters with
/// parameters, 0-255).
#[derive(Parser)]
#[command(name = "lumen-cli", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, GIF, BMP, WebP).
    image: PathBuf,

    /// Set a slider, e.g. `contrast=80`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = edits::parse_setting)]
    sets: Vec<Setting>,

    /// Switch a filter on. Repeatable.
    #[arg(long, value_name = "NAME")]
    enable: Vec<String>,

    /// Switch a filter off. Repeatable.
    #[arg(long, value_name = "NAME")]
    disable: Vec<String>,

    /// Set a filter parameter, e.g. `edges.threshold1=40`. Repeatable.
    #[arg(long = "param", value_name = "NAME.PARAM=VALUE", value_parser = edits::parse_param)]
    params: Vec<ParamSetting>,

    /// Seed the edit document from a JSON file before other options apply.
    #[arg(long, value_name = "FILE")]
    edits: Option<PathBuf>,

    /// Where to write the result [default: `<stem>-edited.<ext>` next to the input].
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fetch and print the histogram of the result.
    #[arg(long)]
    histogram: bool,

    /// Base URL of the processing backend.
    #[arg(long, env = "LUMEN_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend: String,

    /// Print a JSON report instead of the human-readable summary.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid edit file {}: {source}", path.display())]
    EditFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("backend: {0}")]
    Backend(#[from] ClientError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Machine-readable summary printed with `--json`.
#[derive(Serialize)]
struct Report<'a> {
    output: &'a Path,
    mime: &'a str,
    edits: &'a EditDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    histogram: Option<&'a HistogramData>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let seed = cli.edits.as_deref().map(read_edit_file).transpose()?;
    let plan = EditPlan {
        seed,
        sets: cli.sets,
        params: cli.params,
        enable: cli.enable,
        disable: cli.disable,
    };
    let document = plan.build()?;

    let bytes = std::fs::read(&cli.image).map_err(|source| CliError::Read {
        path: cli.image.clone(),
        source,
    })?;
    let source = EncodedImage::from_bytes(&bytes)?;
    tracing::info!(path = %cli.image.display(), image = %source, "image loaded");

    let client = BackendClient::new(BackendConfig::new(cli.backend));
    let mut sync = SyncDriver::new();
    sync.load(source);

    if let Some(request) = sync.begin(&document) {
        tracing::info!(
            backend = %client.config().base_url,
            controls = document.len(),
            "rendering"
        );
        let result = client.render(&request).await;
        if let SyncOutcome::Failed(e) = sync.finish(request.ticket, result) {
            return Err(e.into());
        }
    }
    let Some(rendered) = sync.working().cloned() else {
        return Ok(());
    };

    let output = cli
        .output
        .unwrap_or_else(|| default_output(&cli.image, rendered.file_extension()));
    std::fs::write(&output, rendered.decode()?).map_err(|source| CliError::Write {
        path: output.clone(),
        source,
    })?;
    tracing::info!(path = %output.display(), "result written");

    let histogram = if cli.histogram {
        Some(client.histogram(&rendered).await?)
    } else {
        None
    };

    if cli.json {
        let report = Report {
            output: &output,
            mime: rendered.mime(),
            edits: &document,
            histogram: histogram.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&output, &rendered, &document, histogram.as_ref());
    }
    Ok(())
}

fn read_edit_file(path: &Path) -> Result<EditDocument, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::EditFile {
        path: path.to_owned(),
        source,
    })
}

/// `<stem>-edited.<ext>` in the input's directory.
fn default_output(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    input.with_file_name(format!("{stem}-edited.{extension}"))
}

/// Mean bucket index and the most populated bucket.
fn bucket_stats(buckets: &[f64]) -> (f64, u32) {
    let mut total = 0.0;
    let mut weighted = 0.0;
    let mut peak = (0, f64::NEG_INFINITY);
    for (index, &count) in (0u32..).zip(buckets) {
        total += count;
        weighted += f64::from(index) * count;
        if count > peak.1 {
            peak = (index, count);
        }
    }
    let mean = if total > 0.0 { weighted / total } else { 0.0 };
    (mean, peak.0)
}

fn print_summary(
    output: &Path,
    rendered: &EncodedImage,
    document: &EditDocument,
    histogram: Option<&HistogramData>,
) {
    println!(
        "Wrote {} ({}, {} control(s) applied)",
        output.display(),
        rendered.mime(),
        document.len()
    );
    for (name, state) in document.iter() {
        println!("  {name:<12} {}", serde_json::to_string(state).unwrap_or_default());
    }

    let Some(histogram) = histogram else {
        return;
    };
    let mode = match histogram.mode() {
        ColorMode::Grayscale => "grayscale",
        ColorMode::Color => "color",
    };
    println!();
    println!("Histogram: {mode}, {} pixels", histogram.pixel_count());
    for series in histogram.series() {
        let (mean, peak) = bucket_stats(series.buckets);
        println!("  {:<14} mean {mean:>6.1}  peak {peak:>3}", series.label);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_assignments() {
        let cli = Cli::try_parse_from([
            "lumen-cli",
            "photo.jpg",
            "--set",
            "contrast=80",
            "--set",
            "gamma=30",
            "--param",
            "edges.threshold1=40",
            "--enable",
            "edges",
            "--disable",
            "grayscale",
            "--histogram",
            "--backend",
            "http://render.test:9000",
        ])
        .unwrap();
        assert_eq!(cli.image, PathBuf::from("photo.jpg"));
        assert_eq!(cli.sets.len(), 2);
        assert_eq!(cli.sets[1].name, "gamma");
        assert_eq!(cli.params[0].param, "threshold1");
        assert_eq!(cli.enable, ["edges"]);
        assert_eq!(cli.disable, ["grayscale"]);
        assert!(cli.histogram);
        assert!(!cli.json);
        assert_eq!(cli.backend, "http://render.test:9000");
        assert!(cli.output.is_none());
    }

    #[test]
    fn malformed_assignment_is_a_usage_error() {
        assert!(Cli::try_parse_from(["lumen-cli", "photo.jpg", "--set", "contrast"]).is_err());
        assert!(Cli::try_parse_from(["lumen-cli", "photo.jpg", "--param", "edges=3"]).is_err());
    }

    #[test]
    fn image_is_required() {
        assert!(Cli::try_parse_from(["lumen-cli", "--histogram"]).is_err());
    }

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output(Path::new("shots/holiday.photo.jpg"), "png"),
            PathBuf::from("shots/holiday.photo-edited.png")
        );
        assert_eq!(
            default_output(Path::new("scan"), "jpg"),
            PathBuf::from("scan-edited.jpg")
        );
    }

    #[test]
    fn bucket_stats_finds_mean_and_peak() {
        let mut buckets = vec![0.0; 256];
        buckets[10] = 1.0;
        buckets[20] = 3.0;
        let (mean, peak) = bucket_stats(&buckets);
        assert!((mean - 17.5).abs() < f64::EPSILON);
        assert_eq!(peak, 20);
    }

    #[test]
    fn bucket_stats_of_empty_image() {
        assert_eq!(bucket_stats(&[0.0; 4]), (0.0, 0));
    }

    #[test]
    fn report_omits_missing_histogram() {
        let document = EditDocument::new();
        let report = Report {
            output: Path::new("out.png"),
            mime: "image/png",
            edits: &document,
            histogram: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"output": "out.png", "mime": "image/png", "edits": {}})
        );
    }
}
