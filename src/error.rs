//! Error types.
//!
//! Configuration problems are rejected eagerly when a tracker is built.
//! Per-frame problems (a bad quad, an unreadable sample) only ever drop the
//! offending detection and are reported through [`QuadError`] in the logs.

use thiserror::Error;

/// Rejected tracker or catalog configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `ttl_frames` must allow at least one frame.
    #[error("ttl_frames must be positive")]
    ZeroTtl,

    /// The history must hold the newest sample plus at least one older one.
    #[error("brightness history capacity must be at least 2, got {0}")]
    HistoryTooSmall(usize),

    /// Association distances must be positive and finite.
    #[error("{name} must be a positive finite distance, got {value}")]
    InvalidDistance {
        /// Field name
        name: &'static str,
        /// Offending value
        value: f32,
    },

    /// Sampling inset must lie in `(0, 1]`.
    #[error("sample_inset must be in (0, 1], got {0}")]
    InvalidInset(f32),

    /// A tracker with nothing to acquire.
    #[error("code catalog is empty")]
    EmptyCatalog,
}

/// A detection that cannot be used as a quad this frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadError {
    /// Exactly four corners are required.
    #[error("expected 4 corners, got {0}")]
    CornerCount(usize),

    /// NaN or infinite coordinate.
    #[error("non-finite coordinate in detection")]
    NonFinite,

    /// The sampling region lies outside the frame.
    #[error("quad center ({x:.1}, {y:.1}) is outside the {width}x{height} frame")]
    OutsideFrame {
        /// Center x
        x: f32,
        /// Center y
        y: f32,
        /// Frame width
        width: usize,
        /// Frame height
        height: usize,
    },
}

/// Invalid grayscale buffer layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// Rows cannot overlap.
    #[error("stride ({stride}) cannot be less than width ({width})")]
    StrideTooSmall {
        /// Row stride
        stride: usize,
        /// Image width
        width: usize,
    },

    /// Fewer bytes than the layout requires.
    #[error("buffer size ({len}) is too small for {width}x{height} image with stride {stride} (required: {required})")]
    BufferTooSmall {
        /// Buffer length
        len: usize,
        /// Image width
        width: usize,
        /// Image height
        height: usize,
        /// Row stride
        stride: usize,
        /// Required length
        required: usize,
    },
}

/// Failures of the file-based tooling around the tracker.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image could not be decoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration rejected.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Grayscale buffer rejected.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Input that parses but makes no sense.
    #[error("invalid input: {0}")]
    Invalid(String),
}
