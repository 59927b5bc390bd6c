//! Decorations merged under text layers: outline, drop shadow, extrusion, and pixel sprinkle.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::components::Component;
use crate::components::color::{Rgb, RgbMeta, fill_color};
use crate::components::component::{component_meta, component_union};
use crate::foundation::core::Vec2;
use crate::foundation::error::SynthResult;
use crate::foundation::random::{SynthRng, chance, int_inclusive, seed64, uniform};
use crate::layers::placement::Placement;
use crate::layers::{Group, Layer};
use crate::render::{filters, raster};

/// Flatten `top` over `under` into one layer.
fn merge_over(top: &Layer, under: Layer) -> Layer {
    let mut pair = [top.clone(), under];
    Group::new(&mut pair).merge()
}

/// Unit vector for an angle in degrees measured counter-clockwise on screen.
fn direction(angle: f64) -> Vec2 {
    let r = angle.to_radians();
    Vec2::new(r.cos(), -r.sin())
}

fn effect_color(color: &RgbMeta, grayscale: bool) -> RgbMeta {
    if !grayscale {
        return color.clone();
    }
    let [r, g, b] = color.rgb.map(f32::from);
    let gray = raster::luma([r, g, b]).round().clamp(0.0, 255.0) as u8;
    RgbMeta {
        rgb: [gray; 3],
        alpha: color.alpha,
    }
}

/// Outline made by dilating the text alpha.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextBorder {
    /// Inclusive outline width range.
    pub size: (i64, i64),
    /// Outline colour.
    pub color: Rgb,
}

impl Default for TextBorder {
    fn default() -> Self {
        Self {
            size: (1, 5),
            color: Rgb::default(),
        }
    }
}

component_meta! {
    /// Resolved [`TextBorder`].
    pub struct TextBorderMeta / TextBorderPartial {
        /// Outline width.
        pub size: u32,
        /// Outline colour.
        pub color: RgbMeta,
    }
}

impl Component for TextBorder {
    type Meta = TextBorderMeta;
    type Partial = TextBorderPartial;

    fn sample(&self, rng: &mut SynthRng, partial: TextBorderPartial) -> SynthResult<TextBorderMeta> {
        let size = match partial.size {
            Some(s) => s,
            None => int_inclusive(rng, self.size).max(0) as u32,
        };
        let color = match partial.color {
            Some(c) => c,
            None => self.color.sample(rng, Default::default())?,
        };
        Ok(TextBorderMeta { size, color })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &TextBorderMeta) -> SynthResult<()> {
        let k = meta.size;
        for layer in layers.iter_mut() {
            let image = layer.output(None);
            let grown = raster::dilate(&raster::pad(&image, k, k, k, k), k);
            let mut border = Layer::new(grown);
            border.set_topleft(layer.topleft() - Vec2::new(f64::from(k), f64::from(k)));
            fill_color(std::slice::from_mut(&mut border), meta.color.color());
            *layer = merge_over(layer, border);
        }
        Ok(())
    }
}

/// Offset copy of the text in a flat colour.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextShadow {
    /// Inclusive offset distance range.
    pub distance: (i64, i64),
    /// Direction range in degrees.
    pub angle: (f64, f64),
    /// Inclusive range per channel.
    pub rgb: [(i64, i64); 3],
    /// Opacity range.
    pub alpha: (f64, f64),
    /// Probability of a gray shadow.
    pub grayscale: f64,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            distance: (1, 5),
            angle: (0.0, 360.0),
            rgb: [(0, 0); 3],
            alpha: (0.0, 0.5),
            grayscale: 0.0,
        }
    }
}

component_meta! {
    /// Resolved [`TextShadow`].
    pub struct TextShadowMeta / TextShadowPartial {
        /// Offset distance.
        pub distance: u32,
        /// Direction in degrees.
        pub angle: f64,
        /// Shadow colour.
        pub color: RgbMeta,
        /// Convert the colour to gray.
        pub grayscale: bool,
    }
}

impl Component for TextShadow {
    type Meta = TextShadowMeta;
    type Partial = TextShadowPartial;

    fn sample(&self, rng: &mut SynthRng, partial: TextShadowPartial) -> SynthResult<TextShadowMeta> {
        let distance = match partial.distance {
            Some(d) => d,
            None => int_inclusive(rng, self.distance).max(0) as u32,
        };
        let angle = partial.angle.unwrap_or_else(|| uniform(rng, self.angle));
        let color = match partial.color {
            Some(c) => c,
            None => Rgb {
                rgb: self.rgb,
                alpha: self.alpha,
            }
            .sample(rng, Default::default())?,
        };
        let grayscale = partial
            .grayscale
            .unwrap_or_else(|| chance(rng, self.grayscale));
        Ok(TextShadowMeta {
            distance,
            angle,
            color,
            grayscale,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &TextShadowMeta) -> SynthResult<()> {
        let offset = direction(meta.angle) * f64::from(meta.distance);
        let color = effect_color(&meta.color, meta.grayscale).color();
        for layer in layers.iter_mut() {
            let mut shadow = layer.clone();
            shadow.translate(offset);
            fill_color(std::slice::from_mut(&mut shadow), color);
            *layer = merge_over(layer, shadow);
        }
        Ok(())
    }
}

/// Stack of one-pixel offset copies forming a solid extrusion.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextExtrusion {
    /// Inclusive depth range.
    pub length: (i64, i64),
    /// Direction range in degrees.
    pub angle: (f64, f64),
    /// Inclusive range per channel.
    pub rgb: [(i64, i64); 3],
    /// Opacity range.
    pub alpha: (f64, f64),
    /// Probability of a gray extrusion.
    pub grayscale: f64,
}

impl Default for TextExtrusion {
    fn default() -> Self {
        Self {
            length: (5, 10),
            angle: (0.0, 360.0),
            rgb: [(0, 255); 3],
            alpha: (1.0, 1.0),
            grayscale: 0.0,
        }
    }
}

component_meta! {
    /// Resolved [`TextExtrusion`].
    pub struct TextExtrusionMeta / TextExtrusionPartial {
        /// Depth in pixels.
        pub length: u32,
        /// Direction in degrees.
        pub angle: f64,
        /// Extrusion colour.
        pub color: RgbMeta,
        /// Convert the colour to gray.
        pub grayscale: bool,
    }
}

impl Component for TextExtrusion {
    type Meta = TextExtrusionMeta;
    type Partial = TextExtrusionPartial;

    fn sample(
        &self,
        rng: &mut SynthRng,
        partial: TextExtrusionPartial,
    ) -> SynthResult<TextExtrusionMeta> {
        let length = match partial.length {
            Some(l) => l,
            None => int_inclusive(rng, self.length).max(0) as u32,
        };
        let angle = partial.angle.unwrap_or_else(|| uniform(rng, self.angle));
        let color = match partial.color {
            Some(c) => c,
            None => Rgb {
                rgb: self.rgb,
                alpha: self.alpha,
            }
            .sample(rng, Default::default())?,
        };
        let grayscale = partial
            .grayscale
            .unwrap_or_else(|| chance(rng, self.grayscale));
        Ok(TextExtrusionMeta {
            length,
            angle,
            color,
            grayscale,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &TextExtrusionMeta) -> SynthResult<()> {
        if meta.length == 0 {
            return Ok(());
        }
        let step = direction(meta.angle);
        let color = effect_color(&meta.color, meta.grayscale).color();
        for layer in layers.iter_mut() {
            let mut copies: Vec<Layer> = (1..=meta.length)
                .map(|i| {
                    let mut copy = layer.clone();
                    copy.translate(step * f64::from(i));
                    copy
                })
                .collect();
            let mut extrusion = Group::new(&mut copies).merge();
            fill_color(std::slice::from_mut(&mut extrusion), color);
            *layer = merge_over(layer, extrusion);
        }
        Ok(())
    }
}

/// Displaces a random subset of pixels by small offsets.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextSprinkle {
    /// Range of the fraction of pixels displaced.
    pub prob: (f64, f64),
    /// Displacement range in pixels, per axis.
    pub offset: (f64, f64),
    /// Probability of scaling displacement by pixel alpha.
    pub masking: f64,
}

impl Default for TextSprinkle {
    fn default() -> Self {
        Self {
            prob: (0.05, 0.2),
            offset: (-2.0, 2.0),
            masking: 0.5,
        }
    }
}

component_meta! {
    /// Resolved [`TextSprinkle`].
    pub struct TextSprinkleMeta / TextSprinklePartial {
        /// Fraction of pixels displaced.
        pub prob: f64,
        /// Displacement range.
        pub offset: (f64, f64),
        /// Scale displacement by alpha.
        pub masking: bool,
        /// Seed of the displacement field.
        pub seed: u64,
    }
}

impl Component for TextSprinkle {
    type Meta = TextSprinkleMeta;
    type Partial = TextSprinklePartial;

    fn sample(
        &self,
        rng: &mut SynthRng,
        partial: TextSprinklePartial,
    ) -> SynthResult<TextSprinkleMeta> {
        let prob = partial.prob.unwrap_or_else(|| uniform(rng, self.prob));
        let offset = partial.offset.unwrap_or(self.offset);
        let masking = partial.masking.unwrap_or_else(|| chance(rng, self.masking));
        let seed = partial.seed.unwrap_or_else(|| seed64(rng));
        Ok(TextSprinkleMeta {
            prob,
            offset,
            masking,
            seed,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &TextSprinkleMeta) -> SynthResult<()> {
        let mut field_rng = StdRng::seed_from_u64(meta.seed);
        for layer in layers.iter_mut() {
            let (w, h) = layer.image().dimensions();
            let n = (w as usize) * (h as usize);
            if n == 0 {
                continue;
            }
            let count = (n as f64 * meta.prob.clamp(0.0, 1.0)) as usize;
            let mut dx = vec![0.0f32; n];
            let mut dy = vec![0.0f32; n];
            for _ in 0..count {
                let i = int_inclusive(&mut field_rng, (0, n as i64 - 1)) as usize;
                dx[i] = uniform(&mut field_rng, meta.offset) as f32;
                dy[i] = uniform(&mut field_rng, meta.offset) as f32;
            }
            if meta.masking {
                for (i, px) in layer.image().pixels().enumerate() {
                    let a = px.0[3] / 255.0;
                    dx[i] *= a;
                    dy[i] *= a;
                }
            }
            let out = filters::remap(layer.image(), &dx, &dy);
            layer.set_image(out);
        }
        Ok(())
    }
}

component_union! {
    /// Text decorations picked by the default template.
    pub enum Style / StyleMeta / StylePartial {
        Border(TextBorder),
        Shadow(TextShadow),
        Extrusion(TextExtrusion),
    }
}

impl StyleMeta {
    /// Replace the decoration colour.
    pub fn set_color(&mut self, color: RgbMeta) {
        match self {
            StyleMeta::Border(m) => m.color = color,
            StyleMeta::Shadow(m) => m.color = color,
            StyleMeta::Extrusion(m) => m.color = color,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/text_effect.rs"]
mod tests;
