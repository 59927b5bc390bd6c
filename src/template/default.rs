//! The standard single-line text image pipeline.
//!
//! Foreground text is drawn from a corpus, rendered glyph by glyph, laid out, decorated and
//! distorted, then composited over a coloured (optionally textured) background. An optional
//! midground line sits between the two with a hole cut where the foreground will land. The
//! recorded [`TemplateMeta`] replays a sample without drawing any randomness.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::components::color::{ColorMap, ColorMapConfig, ColorMapMeta, Gray, GrayMeta, fill_color};
use crate::components::component::Component;
use crate::components::corpus::{Corpus, CorpusConfig, CorpusMeta};
use crate::components::font::{FontMeta, FontSet, FontSetConfig};
use crate::components::image_effect::{
    AdditiveGaussianNoise, ElasticDistortion, ElasticDistortionMeta, GaussianBlur, ImageEffect,
    ImageEffectMeta, MedianBlur, Resample,
};
use crate::components::layout::{CurveLayout, FlowLayout, Layout, LayoutMeta};
use crate::components::text_effect::{Style, StyleMeta, TextBorder, TextExtrusion, TextShadow};
use crate::components::texture::{Texture, TextureConfig, TextureMeta};
use crate::components::transform::{
    Fit, Margin, MarginMeta, Rotate, Skew, Stretch, Transform, TransformMeta, Translate,
    TranslateMeta, Trapezoidate,
};
use crate::components::wrapper::{
    Selector, SelectorMeta, Sequence, SequenceMeta, Switch, SwitchMeta,
};
use crate::foundation::core::{Point, Quad, Raster, Rgba8};
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{SynthRng, chance, int_inclusive, rng_from_seed};
use crate::layers::{CharShaper, Group, Layer, Placement, TextShaper};
use crate::render::composite::BlendMode;
use crate::render::raster;
use crate::render::visibility::blend_with_visibility;
use crate::template::{Sample, Template, partial};

// ----------------------------
// Configuration
// ----------------------------

/// A component fired with probability `prob`.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwitchConfig<T> {
    /// Firing probability.
    pub prob: f64,
    /// The wrapped component's configuration.
    pub args: T,
}

impl<T: Default> Default for SwitchConfig<T> {
    fn default() -> Self {
        Self::new(1.0, T::default())
    }
}

impl<T> SwitchConfig<T> {
    /// Wrap `args` with a firing probability.
    pub fn new(prob: f64, args: T) -> Self {
        Self { prob, args }
    }
}

/// Weighted choice between flow and curve layouts.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Weights of `[flow, curve]`.
    pub weights: Option<Vec<f64>>,
    /// Flow layout parameters.
    pub flow: FlowLayout,
    /// Curve layout parameters.
    pub curve: CurveLayout,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            weights: Some(vec![4.0, 1.0]),
            flow: FlowLayout {
                space: (-2, 5),
                ..FlowLayout::default()
            },
            curve: CurveLayout {
                curve: (20, 40),
                space: (-2, 5),
                ..CurveLayout::default()
            },
        }
    }
}

/// Optional text decoration.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Probability of decorating.
    pub prob: f64,
    /// Weights of `[border, shadow, extrusion]`.
    pub weights: Option<Vec<f64>>,
    /// Outline parameters.
    pub border: TextBorder,
    /// Drop shadow parameters.
    pub shadow: TextShadow,
    /// Extrusion parameters.
    pub extrusion: TextExtrusion,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            prob: 0.25,
            weights: Some(vec![1.0, 2.0, 2.0]),
            border: TextBorder::default(),
            shadow: TextShadow::default(),
            extrusion: TextExtrusion::default(),
        }
    }
}

/// Optional geometric distortion.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Probability of distorting.
    pub prob: f64,
    /// Weights of `[stretch, trapezoidate, skew, rotate]`.
    pub weights: Option<Vec<f64>>,
    /// Stretch parameters.
    pub stretch: Stretch,
    /// Trapezoid parameters.
    pub trapezoidate: Trapezoidate,
    /// Skew parameters.
    pub skew: Skew,
    /// Rotation parameters.
    pub rotate: Rotate,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            prob: 0.25,
            weights: Some(vec![1.0, 2.0, 2.0, 1.0]),
            stretch: Stretch::default(),
            trapezoidate: Trapezoidate::default(),
            skew: Skew::default(),
            rotate: Rotate {
                angle: (-5.0, 5.0),
                ..Rotate::default()
            },
        }
    }
}

/// Post-processing filters, applied in this order.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostprocessConfig {
    /// Additive noise.
    pub noise: SwitchConfig<AdditiveGaussianNoise>,
    /// Gaussian blur.
    pub blur: SwitchConfig<GaussianBlur>,
    /// Down and up sampling.
    pub resample: SwitchConfig<Resample>,
    /// Median filter.
    pub median_blur: SwitchConfig<MedianBlur>,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            noise: SwitchConfig::new(
                1.0,
                AdditiveGaussianNoise {
                    scale: (4.0, 8.0),
                    per_channel: 0.0,
                },
            ),
            blur: SwitchConfig::new(0.5, GaussianBlur { sigma: (0, 2) }),
            resample: SwitchConfig::new(0.1, Resample { size: (0.4, 0.4) }),
            median_blur: SwitchConfig::new(1.0, MedianBlur { k: (1, 1) }),
        }
    }
}

/// JSON configuration of a [`DefaultTemplate`].
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultTemplateConfig {
    /// Lay text top to bottom.
    pub vertical: bool,
    /// Inclusive JPEG quality range.
    pub quality: (i64, i64),
    /// Reject blend modes that leave the text illegible.
    pub visibility_check: bool,
    /// Candidate blend modes.
    pub blend_modes: Vec<BlendMode>,
    /// Probability of a midground line.
    pub midground: f64,
    /// Midground displacement, as fractions of the foreground size.
    pub midground_offset: Translate,
    /// Dilation of the glyph hull mask cut out of the midground.
    pub foreground_mask_pad: u32,
    /// Text source.
    pub corpus: CorpusConfig,
    /// Fonts.
    pub font: FontSetConfig,
    /// Texture painted over text and background.
    pub texture: SwitchConfig<TextureConfig>,
    /// Foreground and background colours.
    pub colormap2: ColorMapConfig,
    /// Foreground, background and decoration colours.
    pub colormap3: ColorMapConfig,
    /// Midground text colour.
    pub color: Gray,
    /// Per-glyph elastic distortion.
    pub shape: SwitchConfig<ElasticDistortion>,
    /// Glyph placement.
    pub layout: LayoutConfig,
    /// Decoration.
    pub style: StyleConfig,
    /// Distortion.
    pub transform: TransformConfig,
    /// Transparent border around the text.
    pub margin: SwitchConfig<Margin>,
    /// Filters applied to the final image.
    pub postprocess: PostprocessConfig,
}

impl Default for DefaultTemplateConfig {
    fn default() -> Self {
        Self {
            vertical: false,
            quality: (50, 95),
            visibility_check: true,
            blend_modes: BlendMode::ALL.to_vec(),
            midground: 0.25,
            midground_offset: Translate {
                offset: [(-2.0, 2.0), (-0.5, 0.5)],
            },
            foreground_mask_pad: 5,
            corpus: CorpusConfig::default(),
            font: FontSetConfig {
                size: (50, 50),
                bold: 0.5,
                ..FontSetConfig::default()
            },
            texture: SwitchConfig::new(
                0.5,
                TextureConfig {
                    alpha: (0.0, 1.0),
                    crop: 1.0,
                    ..TextureConfig::default()
                },
            ),
            colormap2: ColorMapConfig::default(),
            colormap3: ColorMapConfig {
                k: 3,
                ..ColorMapConfig::default()
            },
            color: Gray {
                colorize: 1.0,
                ..Gray::default()
            },
            shape: SwitchConfig::new(
                1.0,
                ElasticDistortion {
                    alpha: (15.0, 30.0),
                    sigma: (4.0, 12.0),
                },
            ),
            layout: LayoutConfig::default(),
            style: StyleConfig::default(),
            transform: TransformConfig::default(),
            margin: SwitchConfig::new(
                1.0,
                Margin {
                    top: (0, 10),
                    bottom: (0, 10),
                    left: (0, 10),
                    right: (0, 10),
                },
            ),
            postprocess: PostprocessConfig::default(),
        }
    }
}

impl DefaultTemplateConfig {
    /// Parse a JSON configuration file.
    pub fn from_path(path: &Path) -> SynthResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read template config {}", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }
}

// ----------------------------
// Metas
// ----------------------------

/// Everything drawn while producing one text layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextMeta {
    /// Sampled text.
    pub corpus: CorpusMeta,
    /// Font covering the text.
    pub font: FontMeta,
    /// Per-glyph distortion.
    pub shape: SwitchMeta<ElasticDistortionMeta>,
    /// Glyph placement.
    pub layout: SelectorMeta<LayoutMeta>,
    /// Text texture.
    pub texture: SwitchMeta<TextureMeta>,
    /// Decoration.
    pub style: SwitchMeta<SelectorMeta<StyleMeta>>,
    /// Distortion.
    pub transform: SwitchMeta<SelectorMeta<TransformMeta>>,
    /// Border.
    pub margin: SwitchMeta<MarginMeta>,
}

/// The optional line behind the foreground.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MidgroundMeta {
    /// Text colour.
    pub color: GrayMeta,
    /// The text layer.
    pub text: TextMeta,
    /// Displacement relative to the foreground.
    pub offset: TranslateMeta,
    /// Mode used to blend it over the background.
    pub blend: BlendMode,
}

/// Complete record of one [`DefaultTemplate`] sample.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TemplateMeta {
    /// JPEG quality.
    pub quality: i64,
    /// Foreground, background and (when decorated) decoration colours.
    pub colors: ColorMapMeta,
    /// Foreground text.
    pub foreground: TextMeta,
    /// Background texture.
    pub background: SwitchMeta<TextureMeta>,
    /// Midground line, if any.
    pub midground: Option<MidgroundMeta>,
    /// Mode used to blend the foreground.
    pub blend: BlendMode,
    /// Post-processing filters.
    pub postprocess: SequenceMeta<SwitchMeta<ImageEffectMeta>>,
}

// ----------------------------
// Template
// ----------------------------

/// The standard text-line pipeline.
#[derive(Clone, Debug)]
pub struct DefaultTemplate {
    quality: (i64, i64),
    visibility_check: bool,
    blend_modes: Vec<BlendMode>,
    midground: f64,
    midground_offset: Translate,
    foreground_mask_pad: u32,
    corpus: Corpus,
    font: FontSet,
    shaper: Arc<dyn TextShaper>,
    texture: Switch<Texture>,
    colormap2: ColorMap,
    colormap3: ColorMap,
    color: Gray,
    shape: Switch<ElasticDistortion>,
    layout: Selector<Layout>,
    style: Switch<Selector<Style>>,
    transform: Switch<Selector<Transform>>,
    fit: Fit,
    margin: Switch<Margin>,
    postprocess: Sequence<Switch<ImageEffect>>,
}

impl DefaultTemplate {
    /// Load every resource the configuration names.
    pub fn new(config: DefaultTemplateConfig) -> SynthResult<Self> {
        let corpus = Corpus::new(config.corpus.clone())?;
        let mut font_config = config.font.clone();
        font_config.vertical = config.vertical;
        let font = FontSet::new(font_config)?;
        let colormap2 = ColorMap::load(config.colormap2.clone())?;
        let colormap3 = ColorMap::load(config.colormap3.clone())?;
        let texture = Texture::new(config.texture.args.clone())?;
        Self::from_parts(config, corpus, font, colormap2, colormap3, texture)
    }

    /// Assemble from resources that are already loaded.
    pub fn from_parts(
        config: DefaultTemplateConfig,
        corpus: Corpus,
        font: FontSet,
        colormap2: ColorMap,
        colormap3: ColorMap,
        texture: Texture,
    ) -> SynthResult<Self> {
        if config.quality.0 > config.quality.1 || config.quality.0 < 1 || config.quality.1 > 100 {
            return Err(SynthError::config(format!(
                "quality range {:?} must lie in [1, 100]",
                config.quality
            )));
        }
        if !(0.0..=1.0).contains(&config.midground) {
            return Err(SynthError::config(format!(
                "midground probability {} outside [0, 1]",
                config.midground
            )));
        }
        let vertical = config.vertical;
        let LayoutConfig {
            weights: layout_weights,
            mut flow,
            mut curve,
        } = config.layout;
        flow.vertical = vertical;
        curve.vertical = vertical;
        let layout = Selector::new(
            vec![Layout::Flow(flow), Layout::Curve(curve)],
            layout_weights.as_deref(),
        )?;

        let style = Switch::new(
            Selector::new(
                vec![
                    Style::Border(config.style.border),
                    Style::Shadow(config.style.shadow),
                    Style::Extrusion(config.style.extrusion),
                ],
                config.style.weights.as_deref(),
            )?,
            config.style.prob,
        )?;

        let transform = Switch::new(
            Selector::new(
                vec![
                    Transform::Stretch(config.transform.stretch),
                    Transform::Trapezoidate(config.transform.trapezoidate),
                    Transform::Skew(config.transform.skew),
                    Transform::Rotate(config.transform.rotate),
                ],
                config.transform.weights.as_deref(),
            )?,
            config.transform.prob,
        )?;

        let post = config.postprocess;
        let postprocess = Sequence::new(vec![
            Switch::new(
                ImageEffect::AdditiveGaussianNoise(post.noise.args),
                post.noise.prob,
            )?,
            Switch::new(ImageEffect::GaussianBlur(post.blur.args), post.blur.prob)?,
            Switch::new(ImageEffect::Resample(post.resample.args), post.resample.prob)?,
            Switch::new(
                ImageEffect::MedianBlur(post.median_blur.args),
                post.median_blur.prob,
            )?,
        ]);

        Ok(Self {
            quality: config.quality,
            visibility_check: config.visibility_check,
            blend_modes: config.blend_modes,
            midground: config.midground,
            midground_offset: config.midground_offset,
            foreground_mask_pad: config.foreground_mask_pad,
            corpus,
            font,
            shaper: Arc::new(CharShaper),
            texture: Switch::new(texture, config.texture.prob)?,
            colormap2,
            colormap3,
            color: config.color,
            shape: Switch::new(config.shape.args, config.shape.prob)?,
            layout,
            style,
            transform,
            fit: Fit::default(),
            margin: Switch::new(config.margin.args, config.margin.prob)?,
            postprocess,
        })
    }

    /// Replace the text segmentation.
    pub fn with_shaper(mut self, shaper: Arc<dyn TextShaper>) -> Self {
        self.shaper = shaper;
        self
    }

    /// Re-render a recorded sample.
    pub fn replay(&self, meta: &TemplateMeta) -> SynthResult<Sample> {
        let mut rng = rng_from_seed(0);
        self.generate_with(&mut rng, Some(meta))
    }

    /// Generate a sample, taking every value `replay` records instead of drawing it.
    #[tracing::instrument(level = "debug", skip_all, fields(replay = replay.is_some()))]
    pub fn generate_with(
        &self,
        rng: &mut SynthRng,
        replay: Option<&TemplateMeta>,
    ) -> SynthResult<Sample> {
        let quality = match replay {
            Some(r) => r.quality,
            None => int_inclusive(rng, self.quality),
        };
        let midground = match replay {
            Some(r) => r.midground.is_some(),
            None => chance(rng, self.midground),
        };

        let fg_replay = replay.map(|r| &r.foreground);
        let mut fg_style = self.style.sample(rng, partial(fg_replay.map(|t| &t.style)))?;
        let colors = if fg_style.state {
            self.colormap3.sample(rng, partial(replay.map(|r| &r.colors)))?
        } else {
            self.colormap2.sample(rng, partial(replay.map(|r| &r.colors)))?
        };
        let needed = if fg_style.state { 3 } else { 2 };
        if colors.colors.len() < needed {
            return Err(SynthError::config(format!(
                "colormap drew {} colours, the template needs {needed}",
                colors.colors.len()
            )));
        }
        if let Some(selected) = fg_style.meta.as_mut() {
            selected.meta.set_color(colors.colors[2].clone());
        }

        let (fg_image, label, foreground, fg_glyphs) =
            self.render_text(rng, colors.colors[0].color(), fg_style, fg_replay)?;
        let (width, height) = fg_image.dimensions();

        let mut bg = vec![Layer::rect(width, height, colors.colors[1].color())];
        let background = self
            .texture
            .apply(rng, &mut bg, partial(replay.map(|r| &r.background)))?;
        let mut bg_image = bg[0].output(None);

        let midground = if midground {
            let mg_replay = replay.and_then(|r| r.midground.as_ref());
            let meta =
                self.render_midground(rng, &fg_image, &fg_glyphs, &mut bg_image, mg_replay)?;
            Some(meta)
        } else {
            None
        };

        let (image, blend) =
            self.blend(rng, &fg_image, &bg_image, replay.map(|r| r.blend))?;

        let mut out = vec![Layer::new(image)];
        let postprocess = self
            .postprocess
            .apply(rng, &mut out, partial(replay.map(|r| &r.postprocess)))?;
        let image = out[0].output(None);

        tracing::debug!(%label, width, height, ?blend, "sample generated");
        Ok(Sample {
            image,
            label,
            quality: quality.clamp(1, 100) as u8,
            meta: TemplateMeta {
                quality,
                colors,
                foreground,
                background,
                midground,
                blend,
                postprocess,
            },
        })
    }

    /// Render one text layer; also returns each glyph's quad in the pixel frame of the image.
    fn render_text(
        &self,
        rng: &mut SynthRng,
        color: Rgba8,
        style: SwitchMeta<SelectorMeta<StyleMeta>>,
        replay: Option<&TextMeta>,
    ) -> SynthResult<(Raster, String, TextMeta, Vec<Quad>)> {
        let corpus = self.corpus.sample(rng, partial(replay.map(|r| &r.corpus)))?;
        let units = self.shaper.segment(&corpus.text);
        if units.is_empty() {
            return Err(SynthError::unrenderable("sampled text is empty"));
        }
        let text = units.concat();
        let font = self
            .font
            .sample_for_text(rng, &text, partial(replay.map(|r| &r.font)))?;

        let mut glyphs = self.font.render_units(&font, &units, Rgba8::new(255, 255, 255, 255))?;
        let shape = self
            .shape
            .apply(rng, &mut glyphs, partial(replay.map(|r| &r.shape)))?;
        let layout = self
            .layout
            .apply(rng, &mut glyphs, partial(replay.map(|r| &r.layout)))?;

        let mut layers = vec![Group::new(&mut glyphs).merge()];
        fill_color(&mut layers, color);
        let texture = self
            .texture
            .apply(rng, &mut layers, partial(replay.map(|r| &r.texture)))?;
        self.style.apply_meta(&mut layers, &style)?;

        // Glyph outlines ride along with the text so the distortion moves them identically.
        layers.extend(
            glyphs
                .iter()
                .map(|g| Layer::with_quad(raster::transparent(1, 1), g.quad())),
        );
        let transform = self
            .transform
            .apply(rng, &mut layers, partial(replay.map(|r| &r.transform)))?;
        let outlines = layers.split_off(1);

        self.fit.apply(rng, &mut layers, Default::default())?;
        let margin = self
            .margin
            .apply(rng, &mut layers, partial(replay.map(|r| &r.margin)))?;

        let origin = layers[0].topleft().to_vec2();
        let glyph_quads: Vec<Quad> = outlines.iter().map(|l| l.quad().translate(-origin)).collect();
        let image = layers[0].output(None);
        let label = corpus.text.clone();
        Ok((
            image,
            label,
            TextMeta {
                corpus,
                font,
                shape,
                layout,
                texture,
                style,
                transform,
                margin,
            },
            glyph_quads,
        ))
    }

    fn render_midground(
        &self,
        rng: &mut SynthRng,
        fg_image: &Raster,
        fg_glyphs: &[Quad],
        bg_image: &mut Raster,
        replay: Option<&MidgroundMeta>,
    ) -> SynthResult<MidgroundMeta> {
        let color = self.color.sample(rng, partial(replay.map(|r| &r.color)))?;
        let text_replay = replay.map(|r| &r.text);
        let style = self
            .style
            .sample(rng, partial(text_replay.map(|t| &t.style)))?;
        let (mg_image, _, text, _) = self.render_text(rng, color.color(), style, text_replay)?;

        let (width, height) = fg_image.dimensions();
        let mask = Layer::new(glyph_mask(width, height, fg_glyphs, self.foreground_mask_pad));
        let mut layers = vec![Layer::new(mg_image)];
        layers[0].set_bbox(mask.bbox());
        let offset = self
            .midground_offset
            .apply(rng, &mut layers, partial(replay.map(|r| &r.offset)))?;
        let erased = layers[0].erase(&mask).output(Some(mask.bbox()));

        let (blended, blend) = self.blend(rng, &erased, bg_image, replay.map(|r| r.blend))?;
        *bg_image = blended;
        Ok(MidgroundMeta {
            color,
            text,
            offset,
            blend,
        })
    }

    fn blend(
        &self,
        rng: &mut SynthRng,
        src: &Raster,
        dst: &Raster,
        replay: Option<BlendMode>,
    ) -> SynthResult<(Raster, BlendMode)> {
        match replay {
            Some(mode) => blend_with_visibility(src, dst, &[mode], false, rng),
            None => blend_with_visibility(src, dst, &self.blend_modes, self.visibility_check, rng),
        }
    }
}

/// Mask over the hull of every pair of neighbouring glyphs, dilated by `pad`.
///
/// Glyphs are ordered by the sum of their top-left coordinates; a lone glyph covers its own hull.
fn glyph_mask(width: u32, height: u32, glyphs: &[Quad], pad: u32) -> Raster {
    let key = |q: &Quad| {
        let b = q.bbox();
        b.left() + b.top()
    };
    let mut ordered: Vec<&Quad> = glyphs.iter().collect();
    ordered.sort_by(|a, b| key(a).total_cmp(&key(b)));

    let mut mask = raster::transparent(width, height);
    if let [only] = ordered.as_slice() {
        raster::fill_convex(&mut mask, only.points(), 255.0);
    }
    for pair in ordered.windows(2) {
        let points: Vec<Point> = pair.iter().flat_map(|q| q.points().iter().copied()).collect();
        raster::fill_convex(&mut mask, &points, 255.0);
    }
    raster::dilate(&mask, pad)
}

impl Template for DefaultTemplate {
    type Output = Sample;

    fn generate(&self, rng: &mut SynthRng) -> SynthResult<Sample> {
        self.generate_with(rng, None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/default.rs"]
mod tests;
