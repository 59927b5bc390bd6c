//! Paragraph images: many corpus lines flowed into wrapped rows on a white page.
//!
//! Each text keeps its own font while one colour is shared by all of them. The label holds the
//! texts of a row joined by spaces, with rows separated by newlines.

use std::path::Path;

use anyhow::Context;

use crate::components::color::{Rgb, RgbMeta};
use crate::components::component::Component;
use crate::components::corpus::{Corpus, CorpusConfig, CorpusMeta};
use crate::components::font::{FontMeta, FontSet, FontSetConfig};
use crate::components::layout::{FlowAlign, FlowLayout, FlowLayoutMeta};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{SynthRng, rng_from_seed};
use crate::layers::{Group, Layer, Placement};
use crate::render::raster::pixel_extent;
use crate::template::{Sample, Template, partial};

/// JSON configuration of a [`MultilineTemplate`].
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultilineTemplateConfig {
    /// Texts per image.
    pub count: usize,
    /// JPEG quality.
    pub quality: u8,
    /// Text source.
    pub corpus: CorpusConfig,
    /// Fonts, drawn per text.
    pub font: FontSetConfig,
    /// Text colour shared by every text.
    pub color: Rgb,
    /// Placement of the texts.
    pub layout: FlowLayout,
}

impl Default for MultilineTemplateConfig {
    fn default() -> Self {
        Self {
            count: 100,
            quality: 95,
            corpus: CorpusConfig::default(),
            font: FontSetConfig::default(),
            color: Rgb {
                rgb: [(0, 128); 3],
                ..Rgb::default()
            },
            layout: FlowLayout {
                space: (5, 10),
                line_space: (10, 20),
                length: Some(1000.0),
                align: vec![FlowAlign::Start, FlowAlign::Justify],
                ..FlowLayout::default()
            },
        }
    }
}

impl MultilineTemplateConfig {
    /// Parse a JSON configuration file.
    pub fn from_path(path: &Path) -> SynthResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read template config {}", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// One text of a paragraph.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParagraphTextMeta {
    /// Sampled text.
    pub corpus: CorpusMeta,
    /// Font covering it.
    pub font: FontMeta,
}

/// Complete record of one [`MultilineTemplate`] sample.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MultilineMeta {
    /// Texts in flow order.
    pub texts: Vec<ParagraphTextMeta>,
    /// Shared text colour.
    pub color: RgbMeta,
    /// Placement.
    pub layout: FlowLayoutMeta,
}

/// Flows many texts into a wrapped paragraph.
#[derive(Clone, Debug)]
pub struct MultilineTemplate {
    count: usize,
    quality: u8,
    corpus: Corpus,
    font: FontSet,
    color: Rgb,
    layout: FlowLayout,
}

impl MultilineTemplate {
    /// Load every resource the configuration names.
    pub fn new(config: MultilineTemplateConfig) -> SynthResult<Self> {
        let corpus = Corpus::new(config.corpus.clone())?;
        let font = FontSet::new(config.font.clone())?;
        Self::from_parts(config, corpus, font)
    }

    /// Assemble from resources that are already loaded.
    pub fn from_parts(
        config: MultilineTemplateConfig,
        corpus: Corpus,
        font: FontSet,
    ) -> SynthResult<Self> {
        if config.count == 0 {
            return Err(SynthError::config("multiline count must be at least 1"));
        }
        if !(1..=100).contains(&config.quality) {
            return Err(SynthError::config(format!(
                "quality {} must lie in [1, 100]",
                config.quality
            )));
        }
        Ok(Self {
            count: config.count,
            quality: config.quality,
            corpus,
            font,
            color: config.color,
            layout: config.layout,
        })
    }

    /// Re-render a recorded sample.
    pub fn replay(&self, meta: &MultilineMeta) -> SynthResult<Sample<MultilineMeta>> {
        let mut rng = rng_from_seed(0);
        self.generate_with(&mut rng, Some(meta))
    }

    /// Generate a sample, taking every value `replay` records instead of drawing it.
    #[tracing::instrument(level = "debug", skip_all, fields(replay = replay.is_some()))]
    pub fn generate_with(
        &self,
        rng: &mut SynthRng,
        replay: Option<&MultilineMeta>,
    ) -> SynthResult<Sample<MultilineMeta>> {
        let count = replay.map_or(self.count, |r| r.texts.len());
        let recorded = |i: usize| replay.and_then(|r| r.texts.get(i));

        let mut corpora = Vec::with_capacity(count);
        for i in 0..count {
            let corpus = self
                .corpus
                .sample(rng, partial(recorded(i).map(|t| &t.corpus)))?;
            if corpus.text.is_empty() {
                return Err(SynthError::unrenderable("sampled text is empty"));
            }
            corpora.push(corpus);
        }
        let mut fonts = Vec::with_capacity(count);
        for (i, corpus) in corpora.iter().enumerate() {
            let font = self.font.sample_for_text(
                rng,
                &corpus.text,
                partial(recorded(i).map(|t| &t.font)),
            )?;
            fonts.push(font);
        }
        let color = self.color.sample(rng, partial(replay.map(|r| &r.color)))?;

        let mut layers = Vec::with_capacity(count + 1);
        for (corpus, font) in corpora.iter().zip(&fonts) {
            let rendered = self
                .font
                .render_units(font, std::slice::from_ref(&corpus.text), color.color())?;
            layers.extend(rendered);
        }
        let layout = self
            .layout
            .apply(rng, &mut layers, partial(replay.map(|r| &r.layout)))?;
        let label = layout
            .lines(&layers)
            .iter()
            .map(|line| {
                line.iter()
                    .map(|&i| corpora[i].text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let bbox = Group::new(&mut layers).bbox();
        let mut page = Layer::rect(
            pixel_extent(bbox.width),
            pixel_extent(bbox.height),
            Rgba8::new(255, 255, 255, 255),
        );
        page.set_topleft(bbox.topleft());
        layers.push(page);
        let image = Group::new(&mut layers).output(Some(bbox));

        tracing::debug!(
            texts = count,
            lines = label.lines().count(),
            width = image.width(),
            height = image.height(),
            "paragraph generated"
        );
        Ok(Sample {
            image,
            label,
            quality: self.quality,
            meta: MultilineMeta {
                texts: corpora
                    .into_iter()
                    .zip(fonts)
                    .map(|(corpus, font)| ParagraphTextMeta { corpus, font })
                    .collect(),
                color,
                layout,
            },
        })
    }
}

impl Template for MultilineTemplate {
    type Output = Sample<MultilineMeta>;

    fn generate(&self, rng: &mut SynthRng) -> SynthResult<Sample<MultilineMeta>> {
        self.generate_with(rng, None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/multiline.rs"]
mod tests;
