//! One tracked physical marker and its decode state.

use crate::config::LowContrastPolicy;
use crate::decoder::{DecodeOutcome, DecodeState, TemporalDecoder, push_bit};
use crate::models::{QuadGeometry, TrackedMarker};
use crate::utils::binarization::BitThreshold;
use crate::utils::history::BrightnessHistory;

/// Result of folding one brightness sample into a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleResult {
    /// The history had too little contrast for a reliable bit
    pub low_contrast: bool,
    /// Decoder step taken this frame, `None` when the frame was skipped
    pub outcome: Option<DecodeOutcome>,
}

/// Per-frame parameters shared by every candidate of a tracker.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SampleParams<'a> {
    pub threshold: BitThreshold,
    pub policy: LowContrastPolicy,
    pub decoder: &'a TemporalDecoder,
    pub ttl_frames: u32,
}

/// A tracked marker candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    track_id: u64,
    geometry: QuadGeometry,
    decode: DecodeState,
    history: BrightnessHistory,
    ttl: u32,
    missed_frames: u32,
}

impl Candidate {
    /// New searching candidate at `geometry` with a full ttl.
    pub fn new(track_id: u64, geometry: QuadGeometry, history_capacity: usize, ttl: u32) -> Self {
        Self {
            track_id,
            geometry,
            decode: DecodeState::default(),
            history: BrightnessHistory::new(history_capacity),
            ttl,
            missed_frames: 0,
        }
    }

    /// Stable track number
    pub fn track_id(&self) -> u64 {
        self.track_id
    }

    /// Geometry from the most recent association
    pub fn geometry(&self) -> &QuadGeometry {
        &self.geometry
    }

    /// Decode state
    pub fn decode_state(&self) -> &DecodeState {
        &self.decode
    }

    /// Brightness window
    pub fn history(&self) -> &BrightnessHistory {
        &self.history
    }

    /// Remaining frames before eviction
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Consecutive frames without an association
    pub fn missed_frames(&self) -> u32 {
        self.missed_frames
    }

    /// Locked onto a catalog code
    pub fn is_locked(&self) -> bool {
        self.decode.valid
    }

    /// Take this frame's detection and brightness sample.
    pub(crate) fn observe(
        &mut self,
        geometry: QuadGeometry,
        sample: u8,
        params: &SampleParams<'_>,
    ) -> SampleResult {
        self.geometry = geometry;
        self.ttl = params.ttl_frames;
        self.missed_frames = 0;
        self.history.push(sample);

        let stats = self.history.stats();
        let (bit, low_contrast) = match params.threshold.classify(sample, stats) {
            Some(bit) => (bit, false),
            None => match params.policy {
                LowContrastPolicy::Skip => {
                    tracing::trace!(
                        track = self.track_id,
                        sample,
                        max = stats.0,
                        min = stats.1,
                        "low contrast, frame skipped"
                    );
                    return SampleResult {
                        low_contrast: true,
                        outcome: None,
                    };
                }
                LowContrastPolicy::RepeatLast => (self.decode.code & 1 != 0, true),
                LowContrastPolicy::Off => (false, true),
            },
        };

        let observed = push_bit(self.decode.code, bit);
        let outcome = params.decoder.update(&mut self.decode, observed);
        tracing::trace!(
            track = self.track_id,
            sample,
            bit,
            code = observed,
            locked = self.decode.valid,
            "decoded"
        );
        SampleResult {
            low_contrast,
            outcome: Some(outcome),
        }
    }

    /// Age by one frame without a detection. Returns `false` when the ttl
    /// was already used up before this miss and the candidate should be
    /// dropped, so `ttl_frames` consecutive misses are tolerated.
    pub(crate) fn miss(&mut self) -> bool {
        let alive = self.ttl > 0;
        self.ttl = self.ttl.saturating_sub(1);
        self.missed_frames += 1;
        alive
    }

    pub(crate) fn clamp_ttl(&mut self, max: u32) {
        self.ttl = self.ttl.min(max);
    }

    /// Output view, only for locked candidates
    pub fn marker(&self) -> Option<TrackedMarker> {
        let id = self.decode.identity()?;
        Some(TrackedMarker {
            id,
            track_id: self.track_id,
            corners: self.geometry.corners,
            center: self.geometry.center,
            missed_frames: self.missed_frames,
        })
    }
}
