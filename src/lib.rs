//! SynthTIGER generates labelled text images for OCR training.
//!
//! The crate is built from three pieces:
//!
//! - Quad-tracked [`Layer`]s and [`Group`] views whose geometry changes through homographies and
//!   is only rasterized on `output`/`merge`
//! - Randomized [`Component`]s whose resolved metas replay a result exactly
//! - A deterministic [`generator`] that derives every task's randomness from one top-level seed
//!
//! [`DefaultTemplate`] wires the standard single-line pipeline together; [`MultilineTemplate`]
//! flows many texts into a wrapped paragraph.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod components;
pub mod foundation;
pub mod generator;
pub mod layers;
pub mod render;
pub mod template;

pub use crate::components::{Component, ComponentData, Selector, Sequence, Switch};
pub use crate::foundation::core::{Bbox, Point, Quad, Raster, Rgba8, Vec2};
pub use crate::foundation::error::{SynthError, SynthResult};
pub use crate::foundation::math::Homography;
pub use crate::foundation::random::{SynthRng, rng_from_seed};
pub use crate::generator::{
    GeneratorOpts, GeneratorStats, RetryPolicy, Task, TaskResult, generate_batch, run_generator,
};
pub use crate::layers::{Group, Layer, Placement};
pub use crate::render::BlendMode;
pub use crate::template::{
    DefaultTemplate, DefaultTemplateConfig, MultilineTemplate, MultilineTemplateConfig, Sample,
    Template, TemplateMeta,
};
