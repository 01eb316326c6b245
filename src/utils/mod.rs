//! Utility functions for temporal marker decoding
//!
//! This module provides helpers for the tracker:
//! - Grayscale conversion (RGBA/RGB to a single channel)
//! - Brightness sampling inside a quad
//! - Brightness history windows and bit binarization
//! - Geometry (shape distance, point-in-quad)

pub mod binarization;
pub mod geometry;
pub mod grayscale;
pub mod history;
pub mod sampling;
