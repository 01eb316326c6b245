//! Light anchor - temporal decoding and tracking of blinking markers
//!
//! Each marker blinks a cyclic 8-bit code, one bit per video frame. An
//! external detector reports the markers as quadrilaterals without any
//! identity. This crate follows those quads across frames, samples their
//! brightness, binarizes each sample against the marker's own history and
//! locks onto a code from a shared catalog once eight consecutive bits
//! match a registered code.
//!
//! ```no_run
//! use light_anchor::{CodeCatalog, GrayFrame, Quad, Tracker, TrackerConfig};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(CodeCatalog::from_codes([0b1011_0010, 0b1100_1010]));
//! let mut tracker = Tracker::new(TrackerConfig::default(), catalog).unwrap();
//!
//! let pixels = vec![0u8; 640 * 480];
//! let frame = GrayFrame::packed(&pixels, 640, 480).unwrap();
//! let detections = [Quad::square(320.0, 240.0, 12.0)];
//! for marker in tracker.step(&frame, &detections) {
//!     println!("marker {:#04x} at {:?}", marker.id, marker.center);
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Tracker configuration
pub mod config;
/// Temporal code decoding (code arithmetic, catalog, lock state machine)
pub mod decoder;
/// Error types
pub mod error;
/// Core data structures (Point, Quad, GrayFrame, TrackedMarker)
pub mod models;
/// Parallel multi-stream tracking
pub mod streams;
/// File and synthetic-scene helpers for CLIs and tests
pub mod tools;
/// Candidate tracking and association
pub mod tracker;
/// Utility functions (grayscale, binarization, geometry, sampling)
pub mod utils;

pub use config::{LowContrastPolicy, TrackerConfig, TrackerConfigBuilder};
pub use decoder::{CodeCatalog, DecodeOutcome, DecodeState, TemporalDecoder};
pub use error::{ConfigError, FrameError, QuadError, ToolError};
pub use models::{GrayFrame, Point, Quad, QuadGeometry, TrackedMarker};
pub use streams::{StreamInput, StreamSet};
pub use tracker::{
    AssociationPolicy, Candidate, FirstFit, FrameTelemetry, GreedyNearest, Observation, Tracker,
};
