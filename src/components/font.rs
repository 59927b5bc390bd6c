//! Font selection: weighted font files filtered by glyph coverage.

use std::path::PathBuf;
use std::sync::Arc;

use crate::components::component::{Component, component_meta};
use crate::components::resource::ResourceSet;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{SynthRng, chance, int_inclusive};
use crate::layers::Layer;
use crate::layers::text::{FontdueRasterizer, TextRasterizer, TextStyle, text_layer};

const FONT_EXTS: &[&str] = &["ttf", "otf"];

/// Configuration of a [`FontSet`].
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontSetConfig {
    /// Font files or directories.
    pub paths: Vec<PathBuf>,
    /// Per-path weights; uniform when absent.
    pub weights: Option<Vec<f64>>,
    /// Inclusive pixel size range.
    pub size: (i64, i64),
    /// Probability of bold rendering.
    pub bold: f64,
    /// Stack glyphs vertically.
    pub vertical: bool,
}

impl Default for FontSetConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            weights: None,
            size: (16, 48),
            bold: 0.0,
            vertical: false,
        }
    }
}

component_meta! {
    /// Resolved [`FontSet`] draw.
    pub struct FontMeta / FontPartial {
        /// Font key understood by the rasterizer.
        pub path: String,
        /// Pixel size.
        pub size: u32,
        /// Bold rendering.
        pub bold: bool,
        /// Vertical stacking.
        pub vertical: bool,
    }
}

impl FontMeta {
    /// Rendering style for this font in `color`.
    pub fn style(&self, color: Rgba8) -> TextStyle {
        TextStyle {
            size: self.size as f32,
            bold: self.bold,
            vertical: self.vertical,
            color,
        }
    }
}

/// Weighted font groups and the rasterizer that renders them.
#[derive(Clone, Debug)]
pub struct FontSet {
    config: FontSetConfig,
    resources: ResourceSet,
    rasterizer: Arc<dyn TextRasterizer>,
}

impl FontSet {
    /// Discover and parse every font file.
    pub fn new(config: FontSetConfig) -> SynthResult<Self> {
        let resources = ResourceSet::scan(&config.paths, config.weights.as_deref(), FONT_EXTS)?;
        let files: Vec<&PathBuf> = resources.groups().iter().flatten().collect();
        let rasterizer = Arc::new(FontdueRasterizer::load(&files)?);
        Ok(Self {
            config,
            resources,
            rasterizer,
        })
    }

    /// Use an existing rasterizer; `groups` lists the font keys of each weighted group.
    pub fn with_rasterizer(
        config: FontSetConfig,
        groups: Vec<Vec<String>>,
        rasterizer: Arc<dyn TextRasterizer>,
    ) -> SynthResult<Self> {
        let roots = (0..groups.len())
            .map(|i| PathBuf::from(format!("group {i}")))
            .collect();
        let files = groups
            .into_iter()
            .map(|g| g.into_iter().map(PathBuf::from).collect())
            .collect();
        let resources = ResourceSet::from_groups(roots, files, config.weights.as_deref())?;
        Ok(Self {
            config,
            resources,
            rasterizer,
        })
    }

    /// The glyph rasterizer.
    pub fn rasterizer(&self) -> &dyn TextRasterizer {
        self.rasterizer.as_ref()
    }

    fn covers_all(&self, font: &str, text: &str) -> SynthResult<bool> {
        for ch in text.chars() {
            if !self.rasterizer.covers(font, ch)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn pick_font(&self, rng: &mut SynthRng, text: Option<&str>) -> SynthResult<String> {
        let Some(text) = text else {
            return Ok(self.resources.pick(rng)?.display().to_string());
        };
        let (_, files) = self.resources.pick_group(rng)?;
        let mut covering = Vec::new();
        for file in files {
            let key = file.display().to_string();
            if self.covers_all(&key, text)? {
                covering.push(key);
            }
        }
        if covering.is_empty() {
            return Err(SynthError::unrenderable(format!(
                "there is no font that can render text '{text}'"
            )));
        }
        let idx = int_inclusive(rng, (0, covering.len() as i64 - 1)) as usize;
        Ok(covering.swap_remove(idx))
    }

    /// Resolve `partial`, choosing a font that covers every character of `text`.
    pub fn sample_for_text(
        &self,
        rng: &mut SynthRng,
        text: &str,
        partial: FontPartial,
    ) -> SynthResult<FontMeta> {
        self.resolve(rng, Some(text), partial)
    }

    fn resolve(
        &self,
        rng: &mut SynthRng,
        text: Option<&str>,
        partial: FontPartial,
    ) -> SynthResult<FontMeta> {
        let path = match partial.path {
            Some(p) => p,
            None => self.pick_font(rng, text)?,
        };
        let size = match partial.size {
            Some(s) => s,
            None => int_inclusive(rng, self.config.size).max(1) as u32,
        };
        let bold = partial.bold.unwrap_or_else(|| chance(rng, self.config.bold));
        let vertical = partial.vertical.unwrap_or(self.config.vertical);
        Ok(FontMeta {
            path,
            size,
            bold,
            vertical,
        })
    }

    /// One layer per shaped unit, each placed relative to its own pen origin.
    pub fn render_units(
        &self,
        meta: &FontMeta,
        units: &[String],
        color: Rgba8,
    ) -> SynthResult<Vec<Layer>> {
        let style = meta.style(color);
        units
            .iter()
            .map(|unit| text_layer(self.rasterizer.as_ref(), &meta.path, unit, &style))
            .collect()
    }
}

impl Component for FontSet {
    type Meta = FontMeta;
    type Partial = FontPartial;

    fn sample(&self, rng: &mut SynthRng, partial: FontPartial) -> SynthResult<FontMeta> {
        self.resolve(rng, None, partial)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/font.rs"]
mod tests;
