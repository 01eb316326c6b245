use super::Point;
use crate::error::QuadError;
use serde::{Deserialize, Serialize};

/// One quadrilateral as reported by the external quad detector.
///
/// The detector carries no identity between frames. Corner winding is
/// arbitrary but must stay consistent for a given marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quad {
    /// Corner points in image coordinates (four expected)
    pub corners: Vec<Point>,
    /// Center point in image coordinates
    pub center: Point,
}

impl Quad {
    /// Create a quad from four corners and an explicit center
    pub fn new(corners: [Point; 4], center: Point) -> Self {
        Self {
            corners: corners.to_vec(),
            center,
        }
    }

    /// Create a quad whose center is the mean of its corners
    pub fn from_corners(corners: [Point; 4]) -> Self {
        let center = Point::new(
            corners.iter().map(|p| p.x).sum::<f32>() / 4.0,
            corners.iter().map(|p| p.y).sum::<f32>() / 4.0,
        );
        Self::new(corners, center)
    }

    /// Axis-aligned square of half-size `half` around `(cx, cy)`
    pub fn square(cx: f32, cy: f32, half: f32) -> Self {
        Self::new(
            [
                Point::new(cx - half, cy - half),
                Point::new(cx + half, cy - half),
                Point::new(cx + half, cy + half),
                Point::new(cx - half, cy + half),
            ],
            Point::new(cx, cy),
        )
    }
}

/// Validated quad geometry: exactly four finite corners and a finite center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadGeometry {
    /// Ordered corners
    pub corners: [Point; 4],
    /// Center point
    pub center: Point,
}

impl TryFrom<&Quad> for QuadGeometry {
    type Error = QuadError;

    fn try_from(quad: &Quad) -> Result<Self, Self::Error> {
        let corners: [Point; 4] = quad
            .corners
            .as_slice()
            .try_into()
            .map_err(|_| QuadError::CornerCount(quad.corners.len()))?;
        if !quad.center.is_finite() || corners.iter().any(|p| !p.is_finite()) {
            return Err(QuadError::NonFinite);
        }
        Ok(Self {
            corners,
            center: quad.center,
        })
    }
}
