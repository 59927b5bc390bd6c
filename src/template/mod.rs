//! Templates turn a task's random generator into one labelled sample.

pub mod default;
pub mod multiline;

pub use default::{
    DefaultTemplate, DefaultTemplateConfig, LayoutConfig, MidgroundMeta, PostprocessConfig,
    StyleConfig, SwitchConfig, TemplateMeta, TextMeta, TransformConfig,
};
pub use multiline::{MultilineMeta, MultilineTemplate, MultilineTemplateConfig, ParagraphTextMeta};

use crate::foundation::core::Raster;
use crate::foundation::error::SynthResult;
use crate::foundation::random::SynthRng;

/// One generated image with its label and replay record.
#[derive(Clone, Debug)]
pub struct Sample<M = TemplateMeta> {
    /// Final pixels.
    pub image: Raster,
    /// Ground-truth text.
    pub label: String,
    /// JPEG quality to save with.
    pub quality: u8,
    /// Replay record.
    pub meta: M,
}

/// Partial that keeps every field of a recorded meta, or draws everything when there is none.
pub(crate) fn partial<M: Clone, P: Default + From<M>>(meta: Option<&M>) -> P {
    meta.cloned().map(P::from).unwrap_or_default()
}

/// A generation pipeline.
///
/// Every random draw comes from `rng`, so the same seed always yields the same output.
pub trait Template: Send + Sync {
    /// What one successful generation produces.
    type Output: Send;

    /// Produce one output.
    fn generate(&self, rng: &mut SynthRng) -> SynthResult<Self::Output>;
}
