/// Geometry helpers for quad association and sampling
use crate::models::Point;

/// Shape deviation between two quads, independent of translation.
///
/// Each corner is taken relative to its quad's center and the distances
/// between matching offsets are summed over all four corners.
pub fn shape_distance(a: &[Point; 4], a_center: &Point, b: &[Point; 4], b_center: &Point) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(pa, pb)| pa.relative_to(a_center).distance(&pb.relative_to(b_center)))
        .sum()
}

/// Z component of `(b - a) x (c - a)`
#[inline]
fn cross(a: &Point, b: &Point, c: &Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Point lies inside (or on the edge of) a convex quad of either winding.
pub fn point_in_quad(p: &Point, quad: &[Point; 4]) -> bool {
    let mut has_pos = false;
    let mut has_neg = false;
    for i in 0..4 {
        let c = cross(&quad[i], &quad[(i + 1) % 4], p);
        if c > 0.0 {
            has_pos = true;
        } else if c < 0.0 {
            has_neg = true;
        }
        if has_pos && has_neg {
            return false;
        }
    }
    true
}

/// Corners pulled toward `center`, keeping the fraction `keep` of each
/// corner's offset (1.0 = unchanged).
pub fn inset_corners(corners: &[Point; 4], center: &Point, keep: f32) -> [Point; 4] {
    corners.map(|p| center.lerp(&p, keep))
}

/// Integer pixel bounds `(x0, y0, x1, y1)` (inclusive) of `corners`,
/// clipped to a `width` x `height` frame. `None` when fully outside.
pub fn clipped_bounds(
    corners: &[Point; 4],
    width: usize,
    height: usize,
) -> Option<(usize, usize, usize, usize)> {
    if width == 0 || height == 0 {
        return None;
    }
    let min_x = corners.iter().fold(f32::INFINITY, |a, p| a.min(p.x));
    let max_x = corners.iter().fold(f32::NEG_INFINITY, |a, p| a.max(p.x));
    let min_y = corners.iter().fold(f32::INFINITY, |a, p| a.min(p.y));
    let max_y = corners.iter().fold(f32::NEG_INFINITY, |a, p| a.max(p.y));
    if max_x < 0.0 || max_y < 0.0 || min_x >= width as f32 || min_y >= height as f32 {
        return None;
    }
    let x0 = min_x.max(0.0).floor() as usize;
    let y0 = min_y.max(0.0).floor() as usize;
    let x1 = (max_x.ceil() as usize).min(width - 1);
    let y1 = (max_y.ceil() as usize).min(height - 1);
    Some((x0, y0, x1, y1))
}
