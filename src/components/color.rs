//! Colour sources: fixed-distribution colours, colormap clusters, and opacity.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use rand::seq::SliceRandom;

use crate::components::component::{Component, ComponentData, component_meta};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{Categorical, SynthRng, chance, int_inclusive, normal, uniform};
use crate::layers::Layer;
use crate::render::composite::{BlendMode, blend_pixel};

/// Recolour every layer, keeping each layer's alpha.
pub fn fill_color(layers: &mut [Layer], color: Rgba8) {
    let c = color.to_f32();
    for layer in layers {
        for px in layer.image_mut().pixels_mut() {
            px.0 = blend_pixel(px.0, c, BlendMode::Normal, true);
        }
    }
}

/// An rgb triple whose luma is `gray`; with `colorize` the triple is drawn uniformly among all
/// such triples, otherwise it is plain gray.
pub fn gray_to_rgb(rng: &mut SynthRng, gray: u8, colorize: bool) -> [u8; 3] {
    if !colorize {
        return [gray; 3];
    }
    loop {
        let r = int_inclusive(rng, (0, 255)) as f64;
        let g = int_inclusive(rng, (0, 255)) as f64;
        let b = ((f64::from(gray) - 0.299 * r - 0.587 * g) / 0.114).round();
        if (0.0..=255.0).contains(&b) {
            return [r as u8, g as u8, b as u8];
        }
    }
}

fn channel(rng: &mut SynthRng, range: (i64, i64)) -> u8 {
    int_inclusive(rng, range).clamp(0, 255) as u8
}

component_meta! {
    /// Resolved [`Rgb`] colour.
    pub struct RgbMeta / RgbPartial {
        /// Colour channels.
        pub rgb: [u8; 3],
        /// Opacity in `[0, 1]`.
        pub alpha: f64,
    }
}

impl RgbMeta {
    /// As an 8-bit colour.
    pub fn color(&self) -> Rgba8 {
        Rgba8::from_rgb_alpha(self.rgb, self.alpha)
    }
}

/// Colour drawn channel by channel.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rgb {
    /// Inclusive range per channel.
    pub rgb: [(i64, i64); 3],
    /// Opacity range.
    pub alpha: (f64, f64),
}

impl Default for Rgb {
    fn default() -> Self {
        Self {
            rgb: [(0, 255); 3],
            alpha: (1.0, 1.0),
        }
    }
}

impl Component for Rgb {
    type Meta = RgbMeta;
    type Partial = RgbPartial;

    fn sample(&self, rng: &mut SynthRng, partial: RgbPartial) -> SynthResult<RgbMeta> {
        let rgb = match partial.rgb {
            Some(v) => v,
            None => [
                channel(rng, self.rgb[0]),
                channel(rng, self.rgb[1]),
                channel(rng, self.rgb[2]),
            ],
        };
        let alpha = partial.alpha.unwrap_or_else(|| uniform(rng, self.alpha));
        Ok(RgbMeta { rgb, alpha })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &RgbMeta) -> SynthResult<()> {
        fill_color(layers, meta.color());
        Ok(())
    }

    fn data(&self, meta: &RgbMeta) -> SynthResult<ComponentData> {
        Ok(ComponentData::Color(meta.color()))
    }
}

component_meta! {
    /// Resolved [`Gray`] colour.
    pub struct GrayMeta / GrayPartial {
        /// Luma.
        pub gray: u8,
        /// Opacity in `[0, 1]`.
        pub alpha: f64,
        /// Whether a coloured triple with the same luma was drawn.
        pub colorize: bool,
        /// Colour channels.
        pub rgb: [u8; 3],
    }
}

impl GrayMeta {
    /// As an 8-bit colour.
    pub fn color(&self) -> Rgba8 {
        Rgba8::from_rgb_alpha(self.rgb, self.alpha)
    }
}

/// Colour drawn by luma, optionally colourized.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Gray {
    /// Inclusive luma range.
    pub gray: (i64, i64),
    /// Opacity range.
    pub alpha: (f64, f64),
    /// Probability of colourizing.
    pub colorize: f64,
}

impl Default for Gray {
    fn default() -> Self {
        Self {
            gray: (0, 255),
            alpha: (1.0, 1.0),
            colorize: 0.0,
        }
    }
}

impl Component for Gray {
    type Meta = GrayMeta;
    type Partial = GrayPartial;

    fn sample(&self, rng: &mut SynthRng, partial: GrayPartial) -> SynthResult<GrayMeta> {
        let gray = match partial.gray {
            Some(g) => g,
            None => channel(rng, self.gray),
        };
        let alpha = partial.alpha.unwrap_or_else(|| uniform(rng, self.alpha));
        let colorize = partial.colorize.unwrap_or_else(|| chance(rng, self.colorize));
        let rgb = partial
            .rgb
            .unwrap_or_else(|| gray_to_rgb(rng, gray, colorize));
        Ok(GrayMeta {
            gray,
            alpha,
            colorize,
            rgb,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &GrayMeta) -> SynthResult<()> {
        fill_color(layers, meta.color());
        Ok(())
    }

    fn data(&self, meta: &GrayMeta) -> SynthResult<ComponentData> {
        Ok(ComponentData::Color(meta.color()))
    }
}

component_meta! {
    /// Resolved [`Opacity`].
    pub struct OpacityMeta / OpacityPartial {
        /// Alpha multiplier.
        pub opacity: f64,
    }
}

/// Multiplies layer alpha.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Opacity {
    /// Multiplier range.
    pub opacity: (f64, f64),
}

impl Default for Opacity {
    fn default() -> Self {
        Self { opacity: (0.0, 1.0) }
    }
}

impl Component for Opacity {
    type Meta = OpacityMeta;
    type Partial = OpacityPartial;

    fn sample(&self, rng: &mut SynthRng, partial: OpacityPartial) -> SynthResult<OpacityMeta> {
        let opacity = partial.opacity.unwrap_or_else(|| uniform(rng, self.opacity));
        Ok(OpacityMeta { opacity })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &OpacityMeta) -> SynthResult<()> {
        let k = meta.opacity.clamp(0.0, 1.0) as f32;
        for layer in layers {
            for px in layer.image_mut().pixels_mut() {
                px.0[3] *= k;
            }
        }
        Ok(())
    }
}

/// One colour cluster: centre channels and standard deviation.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// One value for gray maps, three for rgb maps.
    pub center: Vec<f64>,
    /// Spread of the normal draw around `center`.
    pub std: f64,
}

/// Whether cluster centres are luma or rgb.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMapMode {
    /// One-channel centres converted with [`gray_to_rgb`].
    #[default]
    Gray,
    /// Three-channel centres.
    Rgb,
}

/// Configuration of a [`ColorMap`].
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorMapConfig {
    /// Colormap files, one cluster row per line.
    pub paths: Vec<PathBuf>,
    /// Per-file weights; uniform when absent.
    pub weights: Option<Vec<f64>>,
    /// Default number of colours per draw.
    pub k: usize,
    /// Opacity range per colour.
    pub alpha: (f64, f64),
    /// Colourize probability for gray maps.
    pub colorize: f64,
    /// Centre interpretation.
    pub mode: ColorMapMode,
}

impl Default for ColorMapConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            weights: None,
            k: 2,
            alpha: (1.0, 1.0),
            colorize: 0.0,
            mode: ColorMapMode::Gray,
        }
    }
}

component_meta! {
    /// Resolved [`ColorMap`] draw.
    pub struct ColorMapMeta / ColorMapPartial {
        /// Number of colours.
        pub k: usize,
        /// The colours, shuffled.
        pub colors: Vec<RgbMeta>,
    }
}

type ClusterTable = BTreeMap<usize, Vec<Vec<Cluster>>>;

/// Draws `k` mutually coherent colours from clustered colormap rows.
#[derive(Clone, Debug)]
pub struct ColorMap {
    config: ColorMapConfig,
    tables: Vec<ClusterTable>,
    choice: Option<Categorical>,
}

/// Parse one colormap document: each line holds clusters as `center std` pairs, where a centre is
/// comma separated.
pub fn parse_colormap(text: &str) -> SynthResult<Vec<Vec<Cluster>>> {
    let mut rows = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() % 2 != 0 {
            return Err(SynthError::config(format!(
                "colormap line {} has an unpaired value",
                n + 1
            )));
        }
        let row = tokens
            .chunks_exact(2)
            .map(|pair| {
                let center = pair[0]
                    .split(',')
                    .map(str::parse::<f64>)
                    .collect::<Result<Vec<_>, _>>();
                match (center, pair[1].parse::<f64>()) {
                    (Ok(center), Ok(std)) => Ok(Cluster { center, std }),
                    _ => Err(SynthError::config(format!(
                        "colormap line {} is malformed",
                        n + 1
                    ))),
                }
            })
            .collect::<SynthResult<Vec<_>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

impl ColorMap {
    /// Read every colormap file.
    pub fn load(config: ColorMapConfig) -> SynthResult<Self> {
        let docs = config
            .paths
            .iter()
            .map(|p| {
                std::fs::read_to_string(p)
                    .with_context(|| format!("read colormap {}", p.display()))
                    .map_err(|e| SynthError::config(format!("{e:#}")))
                    .and_then(|text| parse_colormap(&text))
            })
            .collect::<SynthResult<Vec<_>>>()?;
        Self::from_rows(config, docs)
    }

    /// Build from already parsed rows, one entry per configured path.
    pub fn from_rows(config: ColorMapConfig, docs: Vec<Vec<Vec<Cluster>>>) -> SynthResult<Self> {
        let choice = if docs.is_empty() {
            None
        } else {
            Some(Categorical::new(docs.len(), config.weights.as_deref())?)
        };
        let tables = docs
            .into_iter()
            .map(|rows| {
                let mut table = ClusterTable::new();
                for row in rows {
                    table.entry(row.len()).or_default().push(row);
                }
                table
            })
            .collect();
        Ok(Self {
            config,
            tables,
            choice,
        })
    }

    fn draw(&self, rng: &mut SynthRng, k: usize) -> SynthResult<Vec<RgbMeta>> {
        let choice = self
            .choice
            .as_ref()
            .ok_or_else(|| SynthError::config("colormap has no sources"))?;
        let key = choice.sample(rng);
        let rows = self
            .tables
            .get(key)
            .and_then(|t| t.get(&k))
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| {
                SynthError::config(format!("colormap source {key} has no rows with {k} colours"))
            })?;
        let row = &rows[int_inclusive(rng, (0, rows.len() as i64 - 1)) as usize];
        let mut colors = Vec::with_capacity(k);
        for cluster in row {
            let drawn: Vec<f64> = cluster
                .center
                .iter()
                .map(|c| normal(rng, *c, cluster.std).round().clamp(0.0, 255.0))
                .collect();
            let rgb = match (self.config.mode, drawn.as_slice()) {
                (ColorMapMode::Rgb, [r, g, b, ..]) => [*r as u8, *g as u8, *b as u8],
                (ColorMapMode::Gray, [g, ..]) => {
                    let colorize = chance(rng, self.config.colorize);
                    gray_to_rgb(rng, *g as u8, colorize)
                }
                _ => {
                    return Err(SynthError::config(
                        "colormap centre has too few channels for its mode",
                    ));
                }
            };
            let alpha = uniform(rng, self.config.alpha);
            colors.push(RgbMeta { rgb, alpha });
        }
        colors.shuffle(rng);
        Ok(colors)
    }
}

impl Component for ColorMap {
    type Meta = ColorMapMeta;
    type Partial = ColorMapPartial;

    fn sample(&self, rng: &mut SynthRng, partial: ColorMapPartial) -> SynthResult<ColorMapMeta> {
        let k = match (partial.k, &partial.colors) {
            (Some(k), Some(c)) if k != c.len() => {
                return Err(SynthError::config(format!(
                    "colormap meta asks for {k} colours but lists {}",
                    c.len()
                )));
            }
            (Some(k), _) => k,
            (None, Some(c)) => c.len(),
            (None, None) => self.config.k,
        };
        let colors = match partial.colors {
            Some(c) => c,
            None => self.draw(rng, k)?,
        };
        Ok(ColorMapMeta { k, colors })
    }

    fn data(&self, meta: &ColorMapMeta) -> SynthResult<ComponentData> {
        Ok(ComponentData::Colors(
            meta.colors.iter().map(RgbMeta::color).collect(),
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/color.rs"]
mod tests;
