//! Candidate tracking across frames
//!
//! The tracker owns every live candidate. Each frame it associates the quad
//! detector's output with existing candidates, feeds each associated
//! candidate one brightness sample, ages the rest, and spawns candidates for
//! detections nobody claimed.

/// Detection-to-candidate assignment policies
pub mod association;
/// Per-marker decode and lifetime state
pub mod candidate;

pub use association::{AssociationPolicy, FirstFit, GreedyNearest, TrackGeometry};
pub use candidate::{Candidate, SampleResult};

use crate::config::TrackerConfig;
use crate::decoder::{CodeCatalog, DecodeOutcome, TemporalDecoder};
use crate::error::{ConfigError, QuadError};
use crate::models::{GrayFrame, Quad, QuadGeometry, TrackedMarker};
use crate::utils::binarization::BitThreshold;
use crate::utils::sampling::sample_brightness;
use candidate::SampleParams;
use serde::Serialize;
use std::sync::Arc;

/// A validated detection together with its brightness sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Quad geometry
    pub geometry: QuadGeometry,
    /// Brightness sampled inside the quad
    pub brightness: u8,
}

impl Observation {
    /// Validate `quad` and pair it with an externally measured brightness.
    pub fn new(quad: &Quad, brightness: u8) -> Result<Self, QuadError> {
        Ok(Self {
            geometry: QuadGeometry::try_from(quad)?,
            brightness,
        })
    }
}

/// Stage-level counters for the most recent frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameTelemetry {
    /// Frame number (starting at 1)
    pub frame: u64,
    /// Detections handed to the tracker
    pub detections: usize,
    /// Detections dropped as malformed or unsampleable
    pub rejected: usize,
    /// Detections associated with an existing candidate
    pub associated: usize,
    /// Candidates created this frame
    pub spawned: usize,
    /// Candidates evicted this frame
    pub evicted: usize,
    /// Searching candidates that acquired a code
    pub acquired: usize,
    /// Locked candidates that lost their code
    pub lost: usize,
    /// Samples without a reliable bit
    pub low_contrast: usize,
    /// Locked candidates after the frame
    pub locked: usize,
    /// Live candidates after the frame
    pub live: usize,
}

impl FrameTelemetry {
    fn record(&mut self, result: SampleResult) {
        if result.low_contrast {
            self.low_contrast += 1;
        }
        match result.outcome {
            Some(DecodeOutcome::Acquired(_)) => self.acquired += 1,
            Some(DecodeOutcome::Lost) => self.lost += 1,
            _ => {}
        }
    }
}

/// Multi-candidate tracker for one camera stream.
///
/// Not shared between threads while stepping: run one tracker per stream
/// (see [`crate::streams::StreamSet`]) and share only the catalog.
#[derive(Debug)]
pub struct Tracker<P = GreedyNearest> {
    config: TrackerConfig,
    decoder: TemporalDecoder,
    policy: P,
    candidates: Vec<Candidate>,
    next_track_id: u64,
    telemetry: FrameTelemetry,
}

impl Tracker<GreedyNearest> {
    /// Create a tracker with the default greedy nearest-first association.
    pub fn new(config: TrackerConfig, catalog: Arc<CodeCatalog>) -> Result<Self, ConfigError> {
        Self::with_policy(config, catalog, GreedyNearest)
    }
}

impl<P: AssociationPolicy> Tracker<P> {
    /// Create a tracker with a custom association policy.
    pub fn with_policy(
        config: TrackerConfig,
        catalog: Arc<CodeCatalog>,
        policy: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(Self {
            config,
            decoder: TemporalDecoder::new(catalog),
            policy,
            candidates: Vec::new(),
            next_track_id: 0,
            telemetry: FrameTelemetry::default(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Replace thresholds and ttl without dropping live candidates.
    ///
    /// A new history capacity applies to candidates spawned afterwards.
    /// Remaining ttls are clamped to the new `ttl_frames`.
    pub fn set_config(&mut self, config: TrackerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        for cand in &mut self.candidates {
            cand.clamp_ttl(config.ttl_frames);
        }
        Ok(())
    }

    /// Catalog shared with other trackers
    pub fn catalog(&self) -> &CodeCatalog {
        self.decoder.catalog()
    }

    /// Live candidates, oldest first
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Counters from the most recent step
    pub fn telemetry(&self) -> &FrameTelemetry {
        &self.telemetry
    }

    /// Drop every candidate.
    pub fn reset(&mut self) {
        self.candidates.clear();
    }

    /// Process one frame: sample each detection in `frame`, then track.
    ///
    /// Malformed detections and detections outside the frame are skipped
    /// and counted as rejected.
    pub fn step(&mut self, frame: &GrayFrame<'_>, detections: &[Quad]) -> Vec<TrackedMarker> {
        let inset = self.config.sample_inset;
        let mut rejected = 0;
        let observations: Vec<Observation> = detections
            .iter()
            .filter_map(|quad| {
                let sampled = QuadGeometry::try_from(quad).and_then(|geometry| {
                    let brightness = sample_brightness(frame, &geometry, inset)?;
                    Ok(Observation {
                        geometry,
                        brightness,
                    })
                });
                match sampled {
                    Ok(obs) => Some(obs),
                    Err(err) => {
                        tracing::warn!(%err, "detection rejected");
                        rejected += 1;
                        None
                    }
                }
            })
            .collect();

        let markers = self.step_observations(&observations);
        self.telemetry.detections += rejected;
        self.telemetry.rejected = rejected;
        markers
    }

    /// Process one frame of already-sampled observations.
    ///
    /// An empty slice is a valid frame in which every candidate ages.
    pub fn step_observations(&mut self, observations: &[Observation]) -> Vec<TrackedMarker> {
        let _span = tracing::info_span!("tracker_step", frame = self.telemetry.frame + 1).entered();
        let mut tel = FrameTelemetry {
            frame: self.telemetry.frame + 1,
            detections: observations.len(),
            ..Default::default()
        };

        let tracks: Vec<TrackGeometry> = self
            .candidates
            .iter()
            .map(|c| TrackGeometry {
                geometry: *c.geometry(),
                missed_frames: c.missed_frames(),
            })
            .collect();
        let detections: Vec<QuadGeometry> = observations.iter().map(|o| o.geometry).collect();
        let pairs = self.policy.associate(&tracks, &detections, &self.config);

        let params = SampleParams {
            threshold: BitThreshold::new(self.config.range_thres, self.config.min_white_black_diff),
            policy: self.config.low_contrast,
            decoder: &self.decoder,
            ttl_frames: self.config.ttl_frames,
        };

        let mut track_hit = vec![false; self.candidates.len()];
        let mut det_claimed = vec![false; observations.len()];
        for (ti, di) in pairs {
            if ti >= track_hit.len() || di >= det_claimed.len() {
                tracing::warn!(track = ti, detection = di, "policy returned an out-of-range pair");
                continue;
            }
            if track_hit[ti] || det_claimed[di] {
                tracing::warn!(track = ti, detection = di, "policy returned a duplicate pair");
                continue;
            }
            track_hit[ti] = true;
            det_claimed[di] = true;
            let obs = &observations[di];
            let cand = &mut self.candidates[ti];
            let result = cand.observe(obs.geometry, obs.brightness, &params);
            log_transition(cand.track_id(), result);
            tel.record(result);
            tel.associated += 1;
        }

        let mut hits = track_hit.into_iter();
        self.candidates.retain_mut(|cand| {
            if hits.next().unwrap_or(false) || cand.miss() {
                return true;
            }
            tracing::debug!(track = cand.track_id(), "candidate evicted");
            tel.evicted += 1;
            false
        });

        for (obs, _) in observations
            .iter()
            .zip(det_claimed)
            .filter(|(_, claimed)| !claimed)
        {
            let track_id = self.next_track_id;
            self.next_track_id += 1;
            let mut cand = Candidate::new(
                track_id,
                obs.geometry,
                self.config.history_capacity,
                self.config.ttl_frames,
            );
            tracing::debug!(
                track = track_id,
                x = obs.geometry.center.x,
                y = obs.geometry.center.y,
                "candidate spawned"
            );
            let result = cand.observe(obs.geometry, obs.brightness, &params);
            log_transition(track_id, result);
            tel.record(result);
            tel.spawned += 1;
            self.candidates.push(cand);
        }

        let markers: Vec<TrackedMarker> =
            self.candidates.iter().filter_map(Candidate::marker).collect();
        tel.locked = markers.len();
        tel.live = self.candidates.len();
        self.telemetry = tel;
        markers
    }
}

fn log_transition(track_id: u64, result: SampleResult) {
    match result.outcome {
        Some(DecodeOutcome::Acquired(code)) => {
            tracing::debug!(track = track_id, code, "code acquired");
        }
        Some(DecodeOutcome::Lost) => tracing::debug!(track = track_id, "lock lost"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    const CODE: u8 = 0b1011_0010;

    fn tracker(ttl: u32) -> Tracker {
        let config = TrackerConfig::builder()
            .ttl_frames(ttl)
            .min_white_black_diff(20)
            .build()
            .unwrap();
        Tracker::new(config, Arc::new(CodeCatalog::from_codes([CODE]))).unwrap()
    }

    fn obs(cx: f32, brightness: u8) -> Observation {
        Observation::new(&Quad::square(cx, 40.0, 8.0), brightness).unwrap()
    }

    fn code_brightness(code: u8, frame: usize) -> u8 {
        if code & (0x80 >> (frame % 8)) != 0 { 230 } else { 25 }
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = Tracker::new(TrackerConfig::default(), Arc::new(CodeCatalog::new())).unwrap_err();
        assert_eq!(err, ConfigError::EmptyCatalog);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = TrackerConfig::default();
        config.ttl_frames = 0;
        let catalog = Arc::new(CodeCatalog::from_codes([CODE]));
        assert_eq!(Tracker::new(config, catalog).unwrap_err(), ConfigError::ZeroTtl);
    }

    #[test]
    fn test_spawn_then_associate() {
        let mut t = tracker(4);
        t.step_observations(&[obs(40.0, 200)]);
        assert_eq!(t.telemetry().spawned, 1);
        t.step_observations(&[obs(43.0, 20)]);
        assert_eq!(t.telemetry().associated, 1);
        assert_eq!(t.telemetry().spawned, 0);
        assert_eq!(t.candidates().len(), 1);
        assert_eq!(t.candidates()[0].geometry().center, Point::new(43.0, 40.0));
    }

    #[test]
    fn test_far_detection_spawns_second_candidate() {
        let mut t = tracker(4);
        t.step_observations(&[obs(40.0, 200)]);
        t.step_observations(&[obs(140.0, 200)]);
        assert_eq!(t.candidates().len(), 2);
        assert_eq!(t.telemetry().spawned, 1);
        assert_eq!(t.candidates()[0].missed_frames(), 1);
    }

    #[test]
    fn test_ttl_eviction_timing() {
        let mut t = tracker(3);
        t.step_observations(&[obs(40.0, 200)]);
        for missed in 1..=3 {
            t.step_observations(&[]);
            assert_eq!(t.candidates().len(), 1, "after miss {missed}");
            assert_eq!(t.telemetry().evicted, 0);
        }
        t.step_observations(&[]);
        assert!(t.candidates().is_empty());
        assert_eq!(t.telemetry().evicted, 1);
    }

    #[test]
    fn test_single_frame_ttl_survives_one_miss() {
        let mut t = tracker(1);
        t.step_observations(&[obs(40.0, 200)]);
        t.step_observations(&[]);
        assert_eq!(t.candidates().len(), 1);
        assert_eq!(t.telemetry().live, 1);
        t.step_observations(&[obs(41.0, 30)]);
        assert_eq!(t.telemetry().associated, 1);
        t.step_observations(&[]);
        t.step_observations(&[]);
        assert!(t.candidates().is_empty());
    }

    struct OutOfRange;

    impl AssociationPolicy for OutOfRange {
        fn associate(
            &self,
            tracks: &[TrackGeometry],
            detections: &[QuadGeometry],
            _config: &TrackerConfig,
        ) -> Vec<(usize, usize)> {
            vec![(tracks.len(), 0), (0, detections.len() + 3)]
        }
    }

    #[test]
    fn test_out_of_range_pairs_are_ignored() {
        let catalog = Arc::new(CodeCatalog::from_codes([CODE]));
        let mut t = Tracker::with_policy(TrackerConfig::default(), catalog, OutOfRange).unwrap();
        t.step_observations(&[obs(40.0, 200)]);
        t.step_observations(&[obs(40.0, 30)]);
        let tel = *t.telemetry();
        assert_eq!(tel.associated, 0);
        assert_eq!(tel.spawned, 1);
        assert_eq!(t.candidates().len(), 2);
    }

    #[test]
    fn test_association_resets_ttl() {
        let mut t = tracker(2);
        t.step_observations(&[obs(40.0, 200)]);
        t.step_observations(&[]);
        assert_eq!(t.candidates()[0].ttl(), 1);
        t.step_observations(&[obs(41.0, 30)]);
        assert_eq!(t.candidates()[0].ttl(), 2);
        t.step_observations(&[]);
        assert_eq!(t.candidates().len(), 1);
    }

    #[test]
    fn test_blinking_marker_reported_once_locked() {
        let mut t = tracker(4);
        let mut first_lock = None;
        for frame in 0..24 {
            let markers = t.step_observations(&[obs(40.0, code_brightness(CODE, frame))]);
            if first_lock.is_none() && !markers.is_empty() {
                first_lock = Some(frame);
            }
            if first_lock.is_some() {
                assert_eq!(markers.len(), 1);
                assert_eq!(markers[0].id, CODE);
                assert_eq!(markers[0].missed_frames, 0);
            }
        }
        assert!(first_lock.is_some());
        assert_eq!(t.telemetry().locked, 1);
    }

    #[test]
    fn test_locked_marker_reported_while_missing() {
        let mut t = tracker(4);
        for frame in 0..24 {
            t.step_observations(&[obs(40.0, code_brightness(CODE, frame))]);
        }
        let markers = t.step_observations(&[]);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].missed_frames, 1);
    }

    #[test]
    fn test_set_config_keeps_candidates() {
        let mut t = tracker(8);
        t.step_observations(&[obs(40.0, 200)]);
        let config = TrackerConfig::builder().ttl_frames(2).build().unwrap();
        t.set_config(config).unwrap();
        assert_eq!(t.candidates().len(), 1);
        assert_eq!(t.candidates()[0].ttl(), 2);
        let mut bad = config;
        bad.history_capacity = 0;
        assert!(t.set_config(bad).is_err());
        assert_eq!(t.config().ttl_frames, 2);
    }

    #[test]
    fn test_step_rejects_bad_quads_and_keeps_rest() {
        let data = vec![200u8; 100 * 100];
        let frame = GrayFrame::packed(&data, 100, 100).unwrap();
        let bad = Quad {
            corners: vec![Point::new(0.0, 0.0); 3],
            center: Point::new(1.0, 1.0),
        };
        let outside = Quad::square(500.0, 500.0, 5.0);
        let good = Quad::square(50.0, 50.0, 5.0);

        let mut t = tracker(4);
        t.step(&frame, &[bad, outside, good]);
        let tel = *t.telemetry();
        assert_eq!(tel.rejected, 2);
        assert_eq!(tel.detections, 3);
        assert_eq!(tel.spawned, 1);
        assert_eq!(t.candidates().len(), 1);
    }

    #[test]
    fn test_first_fit_policy() {
        let catalog = Arc::new(CodeCatalog::from_codes([CODE]));
        let mut t = Tracker::with_policy(TrackerConfig::default(), catalog, FirstFit).unwrap();
        t.step_observations(&[obs(40.0, 200), obs(200.0, 200)]);
        t.step_observations(&[obs(201.0, 20), obs(41.0, 20)]);
        assert_eq!(t.candidates().len(), 2);
        assert_eq!(t.telemetry().associated, 2);
    }
}
