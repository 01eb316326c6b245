//! Cyclic 8-bit code arithmetic.

/// Width of a light-anchor code in bits (one bit per frame)
pub const CODE_BITS: u32 = 8;

/// Cyclic left rotation by one bit; the high bit wraps to the low bit.
#[inline]
pub fn rotate(code: u8) -> u8 {
    code.rotate_left(1)
}

/// Shift a freshly binarized bit into the low end of a rolling code,
/// discarding the oldest bit.
#[inline]
pub fn push_bit(code: u8, bit: bool) -> u8 {
    (code << 1) | bit as u8
}

/// All eight phases of `code`, starting with `code` itself.
pub fn rotations(code: u8) -> [u8; CODE_BITS as usize] {
    let mut out = [code; CODE_BITS as usize];
    for i in 1..out.len() {
        out[i] = rotate(out[i - 1]);
    }
    out
}

/// `a` equals some rotation of `b`
pub fn is_rotation_of(a: u8, b: u8) -> bool {
    rotations(b).contains(&a)
}

/// Number of rotations (1, 2, 4 or 8) before `code` repeats.
pub fn period(code: u8) -> u32 {
    let mut r = rotate(code);
    let mut n = 1;
    while r != code {
        r = rotate(r);
        n += 1;
    }
    n
}

/// Code has no 0/1 transition and so cannot be told apart from a steady light.
pub fn is_constant(code: u8) -> bool {
    code == 0x00 || code == 0xFF
}
