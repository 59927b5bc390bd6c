//! Quad-tracked image layers and group views over them.

pub mod group;
pub mod layer;
pub mod placement;
pub mod text;

pub use group::Group;
pub use layer::Layer;
pub use placement::Placement;
pub use text::{CharShaper, FontdueRasterizer, RenderedText, TextRasterizer, TextShaper, TextStyle};
