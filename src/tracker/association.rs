//! Frame-to-frame association of detections with existing candidates.

use crate::config::TrackerConfig;
use crate::models::QuadGeometry;
use crate::utils::geometry::shape_distance;

/// Last-known geometry of a live candidate as seen by an association policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    /// Geometry from the most recent association
    pub geometry: QuadGeometry,
    /// Consecutive frames without an association
    pub missed_frames: u32,
}

/// Matches this frame's detections to live candidates.
///
/// Returns `(track index, detection index)` pairs. Each track and each
/// detection may appear at most once.
pub trait AssociationPolicy {
    /// Assign detections to tracks.
    fn associate(
        &self,
        tracks: &[TrackGeometry],
        detections: &[QuadGeometry],
        config: &TrackerConfig,
    ) -> Vec<(usize, usize)>;
}

/// Cost of pairing `track` with `detection`, `None` if outside tolerance.
///
/// Center distance must stay within `thres_dist_center`; shape distance
/// within the shape tolerance widened by the track's missed frames.
pub fn pair_cost(
    track: &TrackGeometry,
    detection: &QuadGeometry,
    config: &TrackerConfig,
) -> Option<f32> {
    let center = track.geometry.center.distance(&detection.center);
    if center > config.thres_dist_center {
        return None;
    }
    let shape = shape_distance(
        &track.geometry.corners,
        &track.geometry.center,
        &detection.corners,
        &detection.center,
    );
    if shape > config.shape_tolerance(track.missed_frames) {
        return None;
    }
    Some(center + shape)
}

/// Global greedy assignment: cheapest feasible pair first.
///
/// Ties go to the older track, then the earlier detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyNearest;

impl AssociationPolicy for GreedyNearest {
    fn associate(
        &self,
        tracks: &[TrackGeometry],
        detections: &[QuadGeometry],
        config: &TrackerConfig,
    ) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(f32, usize, usize)> = Vec::new();
        for (ti, track) in tracks.iter().enumerate() {
            for (di, det) in detections.iter().enumerate() {
                if let Some(cost) = pair_cost(track, det, config) {
                    pairs.push((cost, ti, di));
                }
            }
        }
        pairs.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        });

        let mut track_used = vec![false; tracks.len()];
        let mut det_used = vec![false; detections.len()];
        let mut out = Vec::new();
        for (_, ti, di) in pairs {
            if track_used[ti] || det_used[di] {
                continue;
            }
            track_used[ti] = true;
            det_used[di] = true;
            out.push((ti, di));
        }
        out
    }
}

/// Tracks in age order each take their cheapest unclaimed detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl AssociationPolicy for FirstFit {
    fn associate(
        &self,
        tracks: &[TrackGeometry],
        detections: &[QuadGeometry],
        config: &TrackerConfig,
    ) -> Vec<(usize, usize)> {
        let mut det_used = vec![false; detections.len()];
        let mut out = Vec::new();
        for (ti, track) in tracks.iter().enumerate() {
            let best = detections
                .iter()
                .enumerate()
                .filter(|(di, _)| !det_used[*di])
                .filter_map(|(di, det)| pair_cost(track, det, config).map(|c| (c, di)))
                .min_by(|a, b| a.0.total_cmp(&b.0));
            if let Some((_, di)) = best {
                det_used[di] = true;
                out.push((ti, di));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quad;

    fn geom(cx: f32, cy: f32, half: f32) -> QuadGeometry {
        QuadGeometry::try_from(&Quad::square(cx, cy, half)).unwrap()
    }

    fn track(cx: f32, cy: f32, missed: u32) -> TrackGeometry {
        TrackGeometry {
            geometry: geom(cx, cy, 10.0),
            missed_frames: missed,
        }
    }

    #[test]
    fn test_center_gate() {
        let config = TrackerConfig::default();
        assert!(pair_cost(&track(0.0, 0.0, 0), &geom(20.0, 0.0, 10.0), &config).is_some());
        assert!(pair_cost(&track(0.0, 0.0, 0), &geom(30.0, 0.0, 10.0), &config).is_none());
    }

    #[test]
    fn test_shape_gate_widens_with_misses() {
        let config = TrackerConfig::builder()
            .thres_dist_shape(10.0)
            .thres_dist_shape_ttl(10.0)
            .build()
            .unwrap();
        // Half-size 10 -> 14: each corner moves 4*sqrt(2), about 22.6 in total.
        let grown = geom(0.0, 0.0, 14.0);
        assert!(pair_cost(&track(0.0, 0.0, 0), &grown, &config).is_none());
        assert!(pair_cost(&track(0.0, 0.0, 1), &grown, &config).is_none());
        assert!(pair_cost(&track(0.0, 0.0, 2), &grown, &config).is_some());
    }

    #[test]
    fn test_greedy_prefers_nearest_pair() {
        let config = TrackerConfig::default();
        // Track 0 sits between both detections; track 1 only reaches the right one.
        let tracks = [track(10.0, 0.0, 0), track(25.0, 0.0, 0)];
        let dets = [geom(0.0, 0.0, 10.0), geom(22.0, 0.0, 10.0)];
        let mut pairs = GreedyNearest.associate(&tracks, &dets, &config);
        pairs.sort();
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_one_detection_one_track() {
        let config = TrackerConfig::default();
        let tracks = [track(0.0, 0.0, 0), track(2.0, 0.0, 0)];
        let dets = [geom(1.5, 0.0, 10.0)];
        let pairs = GreedyNearest.associate(&tracks, &dets, &config);
        assert_eq!(pairs, vec![(1, 0)]);
    }

    #[test]
    fn test_first_fit_is_order_dependent() {
        let config = TrackerConfig::default();
        let tracks = [track(0.0, 0.0, 0), track(2.0, 0.0, 0)];
        let dets = [geom(1.5, 0.0, 10.0)];
        assert_eq!(FirstFit.associate(&tracks, &dets, &config), vec![(0, 0)]);
    }

    #[test]
    fn test_no_detections() {
        let config = TrackerConfig::default();
        let tracks = [track(0.0, 0.0, 0)];
        assert!(GreedyNearest.associate(&tracks, &[], &config).is_empty());
    }
}
