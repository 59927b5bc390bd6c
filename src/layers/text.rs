//! Font and shaping capabilities behind traits, with a `fontdue` rasterizer.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::Context;
use image::Rgba;

use crate::foundation::core::{Bbox, Raster, Rgba8};
use crate::foundation::error::{SynthError, SynthResult};
use crate::layers::layer::Layer;
use crate::render::raster;

/// How a run of text is drawn.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    /// Pixel size.
    pub size: f32,
    /// Thicken strokes by one pixel.
    pub bold: bool,
    /// Stack units top to bottom instead of left to right.
    pub vertical: bool,
    /// Fill colour.
    pub color: Rgba8,
}

/// Rendered pixels plus their box relative to the pen origin.
///
/// Horizontal text puts the origin on the baseline at the left edge; vertical text puts it on the
/// centre line at the top edge.
#[derive(Clone, Debug)]
pub struct RenderedText {
    /// Pixels in `color`, alpha from glyph coverage.
    pub image: Raster,
    /// Placement relative to the pen origin.
    pub bbox: Bbox,
}

/// Glyph rasterization capability.
pub trait TextRasterizer: Send + Sync + fmt::Debug {
    /// Return `true` when the font identified by `font` has a glyph for `ch`.
    fn covers(&self, font: &str, ch: char) -> SynthResult<bool>;

    /// Render `text` with `style`.
    fn render(&self, font: &str, text: &str, style: &TextStyle) -> SynthResult<RenderedText>;
}

/// Text segmentation capability: split text into independently rendered units.
pub trait TextShaper: Send + Sync + fmt::Debug {
    /// Ordered renderable units of `text`.
    fn segment(&self, text: &str) -> Vec<String>;
}

/// One unit per character, with combining marks, variation selectors and joiner sequences kept on
/// their base character.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharShaper;

const ZWJ: char = '\u{200D}';

fn attaches(ch: char) -> bool {
    matches!(
        ch,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FE20}'..='\u{FE2F}'
            | ZWJ
    )
}

impl TextShaper for CharShaper {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut units: Vec<String> = Vec::new();
        let mut join_next = false;
        for ch in text.chars() {
            match units.last_mut() {
                Some(last) if join_next || attaches(ch) => last.push(ch),
                _ => units.push(ch.to_string()),
            }
            join_next = ch == ZWJ;
        }
        units
    }
}

/// Build a layer for `text`, placed relative to the pen origin.
pub fn text_layer(
    rasterizer: &dyn TextRasterizer,
    font: &str,
    text: &str,
    style: &TextStyle,
) -> SynthResult<Layer> {
    let rendered = rasterizer.render(font, text, style)?;
    let mut layer = Layer::new(rendered.image);
    layer.set_bbox(rendered.bbox);
    Ok(layer)
}

/// [`TextRasterizer`] over fonts parsed with `fontdue`, keyed by path.
pub struct FontdueRasterizer {
    fonts: HashMap<String, fontdue::Font>,
}

impl fmt::Debug for FontdueRasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontdueRasterizer")
            .field("fonts", &self.fonts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FontdueRasterizer {
    /// Parse every font file; keys are the paths as given.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> SynthResult<Self> {
        let mut fonts = HashMap::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = std::fs::read(path)
                .with_context(|| format!("read font {}", path.display()))
                .map_err(|e| SynthError::config(format!("{e:#}")))?;
            let font = parse_font(&bytes, &path.display().to_string())?;
            fonts.insert(path.display().to_string(), font);
        }
        Ok(Self { fonts })
    }

    /// Register a font from memory under `key`.
    pub fn insert_bytes(&mut self, key: impl Into<String>, bytes: &[u8]) -> SynthResult<()> {
        let key = key.into();
        let font = parse_font(bytes, &key)?;
        self.fonts.insert(key, font);
        Ok(())
    }

    fn font(&self, key: &str) -> SynthResult<&fontdue::Font> {
        self.fonts
            .get(key)
            .ok_or_else(|| SynthError::config(format!("font '{key}' is not loaded")))
    }

    fn render_line(font: &fontdue::Font, text: &str, style: &TextStyle) -> SynthResult<RenderedText> {
        let px = style.size.max(1.0);
        let lm = font
            .horizontal_line_metrics(px)
            .ok_or_else(|| SynthError::unrenderable("font has no horizontal metrics"))?;
        let ascent = lm.ascent.ceil();
        let height = (ascent - lm.descent.floor()).max(1.0) as u32;

        let mut glyphs = Vec::new();
        let mut pen = 0.0f32;
        for ch in text.chars() {
            let (metrics, coverage) = font.rasterize(ch, px);
            glyphs.push((pen, metrics, coverage));
            pen += metrics.advance_width;
        }
        let (left, width) = ink_span(
            glyphs.iter().map(|(pen, m, _)| (*pen, m.xmin, m.width)),
            pen,
        );

        let [r, g, b, a] = style.color.to_f32();
        let mut image = Raster::from_pixel(width, height, Rgba([r, g, b, 0.0]));
        for (pen, m, coverage) in glyphs {
            let gx = (pen + m.xmin as f32).round() as i64 - left;
            let gy = ascent as i64 - (m.ymin as i64 + m.height as i64);
            for (i, cov) in coverage.iter().enumerate() {
                if *cov == 0 {
                    continue;
                }
                let x = gx + (i % m.width.max(1)) as i64;
                let y = gy + (i / m.width.max(1)) as i64;
                if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                    continue;
                }
                let dst = image.get_pixel_mut(x as u32, y as u32);
                dst.0[3] = dst.0[3].max(f32::from(*cov) / 255.0 * a);
            }
        }

        let mut bbox = Bbox::new(
            left as f64,
            -f64::from(ascent),
            f64::from(width),
            f64::from(height),
        );
        if style.bold {
            image = embolden(&image);
            bbox = Bbox::new(bbox.x - 1.0, bbox.y - 1.0, bbox.width + 2.0, bbox.height + 2.0);
        }
        Ok(RenderedText { image, bbox })
    }
}

/// Pixel span `(left, width)` relative to the pen origin that holds the full advance and the ink
/// of every glyph, including overhangs on either side.
fn ink_span(glyphs: impl IntoIterator<Item = (f32, i32, usize)>, advance: f32) -> (i64, u32) {
    let mut left = 0i64;
    let mut right = advance.ceil() as i64;
    for (pen, xmin, width) in glyphs {
        let gx = (pen + xmin as f32).round() as i64;
        left = left.min(gx);
        right = right.max(gx + width as i64);
    }
    (left, (right - left).max(1) as u32)
}

fn parse_font(bytes: &[u8], name: &str) -> SynthResult<fontdue::Font> {
    fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
        .map_err(|e| SynthError::config(format!("parse font {name}: {e}")))
}

fn embolden(image: &Raster) -> Raster {
    let padded = raster::pad(image, 1, 1, 1, 1);
    let mut grown = raster::dilate(&padded, 1);
    // Padding is transparent black; keep the fill colour everywhere.
    if let Some(fill) = image.pixels().next().map(|p| p.0) {
        for px in grown.pixels_mut() {
            px.0[..3].copy_from_slice(&fill[..3]);
        }
    }
    grown
}

impl TextRasterizer for FontdueRasterizer {
    fn covers(&self, font: &str, ch: char) -> SynthResult<bool> {
        Ok(ch.is_whitespace() || attaches(ch) || self.font(font)?.lookup_glyph_index(ch) != 0)
    }

    fn render(&self, font: &str, text: &str, style: &TextStyle) -> SynthResult<RenderedText> {
        let face = self.font(font)?;
        if !style.vertical {
            return Self::render_line(face, text, style);
        }

        let lines = text
            .chars()
            .map(|ch| Self::render_line(face, &ch.to_string(), style))
            .collect::<SynthResult<Vec<_>>>()?;
        let width = lines.iter().map(|l| l.image.width()).max().unwrap_or(1).max(1);
        let height: u32 = lines.iter().map(|l| l.image.height()).sum::<u32>().max(1);
        let [r, g, b, _] = style.color.to_f32();
        let mut image = Raster::from_pixel(width, height, Rgba([r, g, b, 0.0]));
        let mut y = 0;
        for line in &lines {
            let x = (width - line.image.width()) / 2;
            for (lx, ly, px) in line.image.enumerate_pixels() {
                image.put_pixel(x + lx, y + ly, *px);
            }
            y += line.image.height();
        }
        let bbox = Bbox::new(
            -f64::from(width) / 2.0,
            0.0,
            f64::from(width),
            f64::from(height),
        );
        Ok(RenderedText { image, bbox })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/text.rs"]
mod tests;
