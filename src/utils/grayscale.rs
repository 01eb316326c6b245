/// Grayscale conversion for incoming camera frames
///
/// Two conversions are provided:
/// - first-channel extraction from RGBA (what browser canvas capture feeds the
///   tracker; cheap and good enough for a blinking light)
/// - integer luma: Y = (76*R + 150*G + 29*B) >> 8

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Take the first channel of every RGBA pixel.
pub fn rgba_first_channel(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    rgba_first_channel_into(rgba, &mut gray);
    gray
}

/// Like [`rgba_first_channel`] but writes into a caller-owned buffer.
/// Converts `min(gray.len(), rgba.len() / 4)` pixels.
pub fn rgba_first_channel_into(rgba: &[u8], gray: &mut [u8]) {
    for (out, px) in gray.iter_mut().zip(rgba.chunks_exact(4)) {
        *out = px[0];
    }
}

/// Convert RGB image to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    rgb.chunks_exact(3)
        .take(width * height)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect()
}

/// Convert RGBA image to grayscale (ignores alpha channel)
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    rgba.chunks_exact(4)
        .take(width * height)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect()
}
