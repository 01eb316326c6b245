//! Brightness sampling inside a detected quad.

use super::geometry::{clipped_bounds, inset_corners, point_in_quad};
use crate::error::QuadError;
use crate::models::{GrayFrame, Point, QuadGeometry};

/// Mean brightness over the inner part of `quad`.
///
/// The quad is shrunk toward its center keeping the fraction `inset` of
/// each corner offset, and every pixel whose center falls inside the shrunk
/// quad is averaged. Tiny quads that cover no pixel center fall back to the
/// pixel under the quad center.
pub fn sample_brightness(
    frame: &GrayFrame<'_>,
    quad: &QuadGeometry,
    inset: f32,
) -> Result<u8, QuadError> {
    let outside = || QuadError::OutsideFrame {
        x: quad.center.x,
        y: quad.center.y,
        width: frame.width(),
        height: frame.height(),
    };
    if quad.center.x < 0.0 || quad.center.y < 0.0 {
        return Err(outside());
    }
    let (cx, cy) = (quad.center.x as usize, quad.center.y as usize);
    let center_px = frame.get(cx, cy).ok_or_else(outside)?;

    let inner = inset_corners(&quad.corners, &quad.center, inset);
    let Some((x0, y0, x1, y1)) = clipped_bounds(&inner, frame.width(), frame.height()) else {
        return Ok(center_px);
    };

    let mut sum = 0u64;
    let mut count = 0u64;
    for y in y0..=y1 {
        let row = frame.row(y);
        for (x, &px) in row.iter().enumerate().take(x1 + 1).skip(x0) {
            if point_in_quad(&Point::new(x as f32 + 0.5, y as f32 + 0.5), &inner) {
                sum += px as u64;
                count += 1;
            }
        }
    }

    if count == 0 {
        return Ok(center_px);
    }
    Ok((sum / count) as u8)
}
