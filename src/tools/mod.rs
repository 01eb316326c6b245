use crate::config::TrackerConfig;
use crate::decoder::CodeCatalog;
use crate::error::ToolError;
use crate::models::{GrayFrame, Point, Quad, TrackedMarker};
use crate::tracker::{AssociationPolicy, FrameTelemetry, Tracker};
use crate::utils::geometry::{clipped_bounds, point_in_quad};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Load an image from disk as 8-bit luma along with its dimensions.
pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize, usize), ToolError> {
    let luma = image::open(path)?.to_luma8();
    let (width, height) = luma.dimensions();
    Ok((luma.into_raw(), width as usize, height as usize))
}

/// Image files directly inside `dir`, sorted by file name.
pub fn frame_paths<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, ToolError> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if ext == "png" || ext == "jpg" || ext == "jpeg" || ext == "bmp" || ext == "pgm" {
                frames.push(path);
            }
        }
    }
    frames.sort();
    Ok(frames)
}

/// Per-frame detector output: a JSON array with one array of quads per frame.
pub fn load_detections<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<Quad>>, ToolError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Tracker configuration from a JSON file. Missing fields take defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TrackerConfig, ToolError> {
    let contents = fs::read_to_string(path)?;
    let config: TrackerConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Parse a code written as `0x..`, `0b..` or decimal.
pub fn parse_code(text: &str) -> Result<u8, ToolError> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u8::from_str_radix(&bin.replace('_', ""), 2)
    } else {
        text.parse::<u8>()
    };
    parsed.map_err(|err| ToolError::Invalid(format!("bad code {text:?}: {err}")))
}

/// Catalog file: one code per line, `#` starts a comment.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CodeCatalog, ToolError> {
    let contents = fs::read_to_string(path)?;
    parse_catalog(&contents)
}

fn parse_catalog(contents: &str) -> Result<CodeCatalog, ToolError> {
    let mut catalog = CodeCatalog::new();
    for line in contents.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let code = parse_code(line)?;
        if !catalog.insert(code) {
            tracing::warn!("duplicate catalog code {:#04x}", code);
        }
    }
    if catalog.is_empty() {
        return Err(ToolError::Invalid("catalog has no codes".to_string()));
    }
    Ok(catalog)
}

/// Brightness a marker blinking `code` shows on frame `frame`.
///
/// Bits are emitted most significant first, so eight consecutive frames
/// starting at a multiple of 8 spell `code` itself.
pub fn code_brightness(code: u8, frame: usize, on: u8, off: u8) -> u8 {
    if code & (0x80 >> (frame % 8)) != 0 { on } else { off }
}

/// Render a `width` x `height` luma frame with each quad filled at its level.
pub fn render_frame(width: usize, height: usize, quads: &[(Quad, u8)], background: u8) -> Vec<u8> {
    let mut gray = vec![background; width * height];
    for (quad, level) in quads {
        let Ok(corners) = <[Point; 4]>::try_from(quad.corners.as_slice()) else {
            continue;
        };
        let Some((x0, y0, x1, y1)) = clipped_bounds(&corners, width, height) else {
            continue;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                if point_in_quad(&Point::new(x as f32 + 0.5, y as f32 + 0.5), &corners) {
                    gray[y * width + x] = *level;
                }
            }
        }
    }
    gray
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if gray.is_empty() {
        0
    } else {
        (sum / gray.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Tracker output for one frame, as written by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    /// Frame number (starting at 1)
    pub frame: u64,
    /// Counters for the frame
    pub telemetry: FrameTelemetry,
    /// Locked markers after the frame
    pub markers: Vec<TrackedMarker>,
}

impl FrameReport {
    fn capture<P: AssociationPolicy>(tracker: &Tracker<P>, markers: Vec<TrackedMarker>) -> Self {
        let telemetry = *tracker.telemetry();
        Self {
            frame: telemetry.frame,
            telemetry,
            markers,
        }
    }
}

/// Run `tracker` over image files with precomputed detections.
pub fn replay<P: AssociationPolicy>(
    tracker: &mut Tracker<P>,
    frames: &[PathBuf],
    detections: &[Vec<Quad>],
) -> Result<Vec<FrameReport>, ToolError> {
    if frames.len() != detections.len() {
        return Err(ToolError::Invalid(format!(
            "{} frames but detections for {}",
            frames.len(),
            detections.len()
        )));
    }
    let mut reports = Vec::with_capacity(frames.len());
    for (path, quads) in frames.iter().zip(detections) {
        let (gray, width, height) = load_gray(path)?;
        let stats = grayscale_stats(&gray);
        tracing::debug!(
            frame = %path.display(),
            min = stats.min,
            max = stats.max,
            avg = stats.avg,
            "frame loaded"
        );
        let frame = GrayFrame::packed(&gray, width, height)?;
        let markers = tracker.step(&frame, quads);
        reports.push(FrameReport::capture(tracker, markers));
    }
    Ok(reports)
}

/// One synthetic blinking marker moving at constant velocity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimMarker {
    /// Code the marker blinks
    pub code: u8,
    /// Center at frame 0
    pub x: f32,
    /// Center at frame 0
    pub y: f32,
    /// Horizontal velocity in pixels per frame
    pub dx: f32,
    /// Vertical velocity in pixels per frame
    pub dy: f32,
    /// Half side length
    pub half: f32,
    /// Bit offset into the code at frame 0
    pub phase: usize,
    /// Frames on which the detector misses this marker
    pub dropped: Vec<usize>,
}

impl Default for SimMarker {
    fn default() -> Self {
        Self {
            code: 0,
            x: 0.0,
            y: 0.0,
            dx: 0.0,
            dy: 0.0,
            half: 8.0,
            phase: 0,
            dropped: Vec::new(),
        }
    }
}

impl SimMarker {
    /// Quad outline at `frame`
    pub fn quad_at(&self, frame: usize) -> Quad {
        let t = frame as f32;
        Quad::square(self.x + self.dx * t, self.y + self.dy * t, self.half)
    }

    /// Rendered brightness at `frame`
    pub fn level_at(&self, frame: usize, on: u8, off: u8) -> u8 {
        code_brightness(self.code, frame + self.phase, on, off)
    }
}

/// A synthetic sequence for exercising the tracker without a camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Frame width
    pub width: usize,
    /// Frame height
    pub height: usize,
    /// Number of frames
    pub frames: usize,
    /// Background level
    pub background: u8,
    /// Level of an emitted 1 bit
    pub on: u8,
    /// Level of an emitted 0 bit
    pub off: u8,
    /// Markers in the scene
    pub markers: Vec<SimMarker>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            width: 160,
            height: 120,
            frames: 48,
            background: 64,
            on: 230,
            off: 25,
            markers: Vec::new(),
        }
    }
}

impl Scenario {
    /// Rendered frame and detector output for `frame`.
    pub fn frame(&self, frame: usize) -> (Vec<u8>, Vec<Quad>) {
        let drawn: Vec<(Quad, u8)> = self
            .markers
            .iter()
            .map(|m| (m.quad_at(frame), m.level_at(frame, self.on, self.off)))
            .collect();
        let gray = render_frame(self.width, self.height, &drawn, self.background);
        let detections = self
            .markers
            .iter()
            .zip(drawn)
            .filter(|(m, _)| !m.dropped.contains(&frame))
            .map(|(_, (quad, _))| quad)
            .collect();
        (gray, detections)
    }
}

/// Scenario description from a JSON file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, ToolError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Render every frame of `scenario` and run `tracker` over it.
pub fn simulate<P: AssociationPolicy>(
    tracker: &mut Tracker<P>,
    scenario: &Scenario,
) -> Result<Vec<FrameReport>, ToolError> {
    let mut reports = Vec::with_capacity(scenario.frames);
    for index in 0..scenario.frames {
        let (gray, detections) = scenario.frame(index);
        let frame = GrayFrame::packed(&gray, scenario.width, scenario.height)?;
        let markers = tracker.step(&frame, &detections);
        reports.push(FrameReport::capture(tracker, markers));
    }
    Ok(reports)
}
