pub mod frame;
pub mod marker;
pub mod point;
pub mod quad;

pub use frame::GrayFrame;
pub use marker::TrackedMarker;
pub use point::Point;
pub use quad::{Quad, QuadGeometry};
