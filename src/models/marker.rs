use super::Point;
use serde::{Deserialize, Serialize};

/// A marker currently locked onto a catalog code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedMarker {
    /// Matched catalog code (the marker's identity)
    pub id: u8,
    /// Internal track number, stable for the life of the track
    pub track_id: u64,
    /// Corner points from the most recent association
    pub corners: [Point; 4],
    /// Center from the most recent association
    pub center: Point,
    /// Consecutive frames since the marker was last detected (0 = seen this frame)
    pub missed_frames: u32,
}
