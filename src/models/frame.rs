//! Stride-aware grayscale frame view.

use crate::error::FrameError;

/// Borrowed 8-bit grayscale image with explicit stride.
#[derive(Debug, Clone, Copy)]
pub struct GrayFrame<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> GrayFrame<'a> {
    /// Create a view after checking that the buffer covers every row.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<Self, FrameError> {
        if stride < width {
            return Err(FrameError::StrideTooSmall { stride, width });
        }
        let required = if height > 0 {
            (height - 1) * stride + width
        } else {
            0
        };
        if data.len() < required {
            return Err(FrameError::BufferTooSmall {
                len: data.len(),
                width,
                height,
                stride,
                required,
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Tightly packed view (`stride == width`)
    pub fn packed(data: &'a [u8], width: usize, height: usize) -> Result<Self, FrameError> {
        Self::new(data, width, height, width)
    }

    /// Frame width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at (x, y), `None` outside the frame
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.stride + x])
    }

    /// One row of pixels
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }
}
