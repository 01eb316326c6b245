//! Adaptive per-candidate binarization of brightness samples into code bits.

use serde::{Deserialize, Serialize};

/// What to do with a frame whose bit cannot be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowContrastPolicy {
    /// Record the sample but leave the code and lock state untouched.
    #[default]
    Skip,
    /// Shift in the previous bit again and decode as usual.
    RepeatLast,
    /// Shift in an "off" bit and decode as usual.
    Off,
}

/// Midpoint threshold with a contrast floor and an optional dead band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitThreshold {
    /// Samples closer than this to the midpoint are undecided
    pub range_thres: u8,
    /// Minimum `max - min` over the history for any decision
    pub min_white_black_diff: u8,
}

impl BitThreshold {
    /// Create a threshold policy
    pub fn new(range_thres: u8, min_white_black_diff: u8) -> Self {
        Self {
            range_thres,
            min_white_black_diff,
        }
    }

    /// Classify `sample` against the history range `(max, min)`.
    ///
    /// Returns `Some(true)` for on, `Some(false)` for off and `None` when
    /// the window lacks contrast or the sample sits in the dead band.
    pub fn classify(&self, sample: u8, (max, min): (u8, u8)) -> Option<bool> {
        let contrast = max.saturating_sub(min);
        if contrast < self.min_white_black_diff {
            return None;
        }
        let midpoint = midpoint(max, min);
        if sample.abs_diff(midpoint) < self.range_thres {
            return None;
        }
        Some(sample > midpoint)
    }
}

/// Integer midpoint of a brightness range
#[inline]
pub fn midpoint(max: u8, min: u8) -> u8 {
    ((max as u16 + min as u16) / 2) as u8
}
