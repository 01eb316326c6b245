use clap::{Parser, Subcommand};
use light_anchor::decoder::code::{is_constant, period, rotations};
use light_anchor::error::ToolError;
use light_anchor::tools::{
    FrameReport, Scenario, SimMarker, frame_paths, load_catalog, load_config, load_detections,
    load_scenario, replay, simulate,
};
use light_anchor::{CodeCatalog, Tracker, TrackerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "anchortool", version, about = "Light anchor tracking tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Track markers through a directory of frames with precomputed detections
    Replay {
        /// Directory of frame images, processed in file name order
        #[arg(long)]
        frames: PathBuf,
        /// JSON array with one array of quads per frame
        #[arg(long)]
        detections: PathBuf,
        /// Catalog file, one code per line
        #[arg(long)]
        catalog: PathBuf,
        /// Tracker configuration JSON (defaults plus LIGHT_ANCHOR_* env otherwise)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write per-frame reports as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render a synthetic blinking scene and track it
    Simulate {
        /// Scenario JSON; without it one static marker per catalog code is placed
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Catalog file; defaults to the scenario's marker codes
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Tracker configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the scenario's frame count
        #[arg(long)]
        frames: Option<usize>,
        /// Write per-frame reports as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a catalog and flag codes that cannot be told apart
    Catalog {
        #[arg(long)]
        catalog: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Replay {
            frames,
            detections,
            catalog,
            config,
            output,
        } => replay_cmd(&frames, &detections, &catalog, config.as_deref(), output.as_deref()),
        Command::Simulate {
            scenario,
            catalog,
            config,
            frames,
            output,
        } => simulate_cmd(
            scenario.as_deref(),
            catalog.as_deref(),
            config.as_deref(),
            frames,
            output.as_deref(),
        ),
        Command::Catalog { catalog } => catalog_cmd(&catalog),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("anchortool: {err}");
            ExitCode::FAILURE
        }
    }
}

fn tracker_config(path: Option<&Path>) -> Result<TrackerConfig, ToolError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = TrackerConfig::from_env();
            config.validate()?;
            Ok(config)
        }
    }
}

fn replay_cmd(
    frames_dir: &Path,
    detections: &Path,
    catalog: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), ToolError> {
    let config = tracker_config(config)?;
    let catalog = Arc::new(load_catalog(catalog)?);
    let frames = frame_paths(frames_dir)?;
    let detections = load_detections(detections)?;
    println!(
        "Replaying {} frames from {} against {} codes",
        frames.len(),
        frames_dir.display(),
        catalog.len()
    );

    let mut tracker = Tracker::new(config, catalog)?;
    let start = Instant::now();
    let reports = replay(&mut tracker, &frames, &detections)?;
    print_summary(&reports, start.elapsed().as_secs_f64());
    write_reports(output, &reports)
}

fn simulate_cmd(
    scenario: Option<&Path>,
    catalog: Option<&Path>,
    config: Option<&Path>,
    frames: Option<usize>,
    output: Option<&Path>,
) -> Result<(), ToolError> {
    let config = tracker_config(config)?;
    let catalog = match catalog {
        Some(path) => Some(load_catalog(path)?),
        None => None,
    };
    let mut scenario = match (scenario, &catalog) {
        (Some(path), _) => load_scenario(path)?,
        (None, Some(catalog)) => default_scenario(catalog),
        (None, None) => {
            return Err(ToolError::Invalid(
                "simulate needs --scenario or --catalog".to_string(),
            ));
        }
    };
    if let Some(frames) = frames {
        scenario.frames = frames;
    }
    let catalog = catalog
        .unwrap_or_else(|| CodeCatalog::from_codes(scenario.markers.iter().map(|m| m.code)));

    println!(
        "Simulating {} markers over {} frames ({}x{})",
        scenario.markers.len(),
        scenario.frames,
        scenario.width,
        scenario.height
    );
    let mut tracker = Tracker::new(config, Arc::new(catalog))?;
    let start = Instant::now();
    let reports = simulate(&mut tracker, &scenario)?;
    print_summary(&reports, start.elapsed().as_secs_f64());
    write_reports(output, &reports)
}

/// One static marker per catalog code, laid out on a grid.
fn default_scenario(catalog: &CodeCatalog) -> Scenario {
    const SPACING: f32 = 40.0;
    let cols = (catalog.len() as f32).sqrt().ceil().max(1.0) as usize;
    let rows = catalog.len().div_ceil(cols).max(1);
    let markers = catalog
        .codes()
        .iter()
        .enumerate()
        .map(|(i, &code)| SimMarker {
            code,
            x: SPACING * (i % cols) as f32 + SPACING / 2.0,
            y: SPACING * (i / cols) as f32 + SPACING / 2.0,
            ..Default::default()
        })
        .collect();
    Scenario {
        width: cols * SPACING as usize,
        height: rows * SPACING as usize,
        markers,
        ..Default::default()
    }
}

fn print_summary(reports: &[FrameReport], elapsed: f64) {
    let Some(last) = reports.last() else {
        println!("No frames processed");
        return;
    };
    let first_lock = reports
        .iter()
        .find(|r| !r.markers.is_empty())
        .map(|r| r.frame);
    let rejected: usize = reports.iter().map(|r| r.telemetry.rejected).sum();
    let lost: usize = reports.iter().map(|r| r.telemetry.lost).sum();

    println!("Frames: {}", reports.len());
    match first_lock {
        Some(frame) => println!("First lock: frame {frame}"),
        None => println!("First lock: none"),
    }
    println!("Rejected detections: {rejected}");
    println!("Locks lost: {lost}");
    println!(
        "Final frame: {} live, {} locked",
        last.telemetry.live, last.telemetry.locked
    );
    for marker in &last.markers {
        println!(
            "  id={:#04x} track={} center=({:.1}, {:.1}) missed={}",
            marker.id, marker.track_id, marker.center.x, marker.center.y, marker.missed_frames
        );
    }
    println!(
        "Time: {:.2} ms total, {:.3} ms/frame",
        elapsed * 1000.0,
        elapsed * 1000.0 / reports.len() as f64
    );
}

fn write_reports(output: Option<&Path>, reports: &[FrameReport]) -> Result<(), ToolError> {
    if let Some(path) = output {
        fs::write(path, serde_json::to_string_pretty(reports)?)?;
        println!("Reports written to {}", path.display());
    }
    Ok(())
}

fn catalog_cmd(path: &Path) -> Result<(), ToolError> {
    let catalog = load_catalog(path)?;
    println!("Catalog: {} ({} codes)", path.display(), catalog.len());
    for (i, &code) in catalog.codes().iter().enumerate() {
        let note = if is_constant(code) {
            "  (constant, never blinks)"
        } else {
            ""
        };
        println!(
            "  {:>3}: {:#04x} {:08b} period={}{}",
            i,
            code,
            code,
            period(code),
            note
        );
        let rotated: Vec<String> = rotations(code)
            .iter()
            .map(|r| format!("{:08b}", r))
            .collect();
        println!("       rotations: {}", rotated.join(" "));
    }
    let ambiguous = catalog.ambiguous_pairs();
    if ambiguous.is_empty() {
        println!("No rotation-equivalent codes");
    } else {
        println!("{} rotation-equivalent pairs:", ambiguous.len());
        for (a, b) in ambiguous {
            println!("  {:#04x} ~ {:#04x}", a, b);
        }
    }
    Ok(())
}
