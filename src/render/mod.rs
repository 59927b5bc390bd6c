//! Compositing kernel: perspective warp, blend modes, the visibility check, and pixel filters.

pub mod composite;
pub mod filters;
pub mod raster;
pub mod visibility;
pub mod warp;

pub use composite::{BlendMode, blend, blend_at, blend_pixel, erase_at};
pub use visibility::{blend_with_visibility, check_visibility};
pub use warp::{erase_image, paste_image, warp};
