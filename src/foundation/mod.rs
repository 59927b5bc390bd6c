//! Shared primitives: errors, quads and boxes, homographies, and random draws.

pub mod core;
pub mod error;
pub mod math;
pub mod random;

pub use self::core::{Affine, Bbox, Point, Quad, Raster, Rgba8, Vec2};
pub use self::error::{SynthError, SynthResult};
pub use self::math::Homography;
pub use self::random::SynthRng;
