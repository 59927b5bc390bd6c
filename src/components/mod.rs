//! Randomized components.
//!
//! Every component follows the same contract ([`Component`]): `sample` draws a serializable meta,
//! `apply_meta` replays it onto layers, and `data` turns it into a value such as a colour or a
//! string. Combinators ([`Switch`], [`Selector`], [`Sequence`]) nest metas so a whole pipeline can be
//! recorded as one JSON document.

pub mod color;
pub mod component;
pub mod corpus;
pub mod font;
pub mod image_effect;
pub mod layout;
pub mod resource;
pub mod text_effect;
pub mod texture;
pub mod transform;
pub mod wrapper;

pub use color::{ColorMap, ColorMapConfig, Gray, Opacity, Rgb, RgbMeta};
pub use component::{Component, ComponentData};
pub use corpus::{Corpus, CorpusConfig, TextCase};
pub use font::{FontMeta, FontSet, FontSetConfig};
pub use image_effect::{ImageEffect, ImageEffectMeta, ImageEffectPartial};
pub use layout::{CurveLayout, FlowLayout, Layout, LayoutMeta, LayoutPartial};
pub use resource::ResourceSet;
pub use text_effect::{Style, StyleMeta, StylePartial, TextSprinkle};
pub use texture::{Texture, TextureConfig};
pub use transform::{Transform, TransformMeta, TransformPartial};
pub use wrapper::{
    Selector, SelectorMeta, SelectorPartial, Sequence, SequenceMeta, SequencePartial, Switch,
    SwitchMeta, SwitchPartial,
};
