//! Blend modes and raster compositing.

use crate::foundation::core::Raster;
use crate::foundation::error::{SynthError, SynthResult};

/// Blend modes available when compositing one raster over another.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Alpha-over.
    Normal,
    /// `s * d`
    Multiply,
    /// `s + d - s * d`
    Screen,
    /// Hard light with source and destination swapped.
    Overlay,
    /// Multiply or screen depending on the source.
    HardLight,
    /// W3C soft light.
    SoftLight,
    /// Colour dodge.
    Dodge,
    /// `d / s`
    Divide,
    /// `min(s + d, 1)`
    Addition,
    /// `|d - s|`
    Difference,
    /// `min(s, d)`
    DarkenOnly,
    /// `max(s, d)`
    LightenOnly,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [BlendMode; 12] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Dodge,
        BlendMode::Divide,
        BlendMode::Addition,
        BlendMode::Difference,
        BlendMode::DarkenOnly,
        BlendMode::LightenOnly,
    ];

    /// Combine normalized source and destination channels.
    fn channel(self, s: f32, d: f32) -> f32 {
        match self {
            BlendMode::Normal => s,
            BlendMode::Multiply => s * d,
            BlendMode::Screen => s + d - s * d,
            BlendMode::Overlay => hard_light(d, s),
            BlendMode::HardLight => hard_light(s, d),
            BlendMode::SoftLight => soft_light(s, d),
            BlendMode::Dodge => {
                if d <= 0.0 {
                    0.0
                } else if s >= 1.0 {
                    1.0
                } else {
                    (d / (1.0 - s)).min(1.0)
                }
            }
            BlendMode::Divide => {
                if s <= 0.0 {
                    if d > 0.0 { 1.0 } else { 0.0 }
                } else {
                    (d / s).min(1.0)
                }
            }
            BlendMode::Addition => (s + d).min(1.0),
            BlendMode::Difference => (d - s).abs(),
            BlendMode::DarkenOnly => s.min(d),
            BlendMode::LightenOnly => s.max(d),
        }
    }
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

fn soft_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        d - (1.0 - 2.0 * s) * d * (1.0 - d)
    } else {
        let g = if d <= 0.25 {
            ((16.0 * d - 12.0) * d + 4.0) * d
        } else {
            d.sqrt()
        };
        d + (2.0 * s - 1.0) * (g - d)
    }
}

/// Composite one straight-alpha pixel over another.
///
/// With `mask` set the destination alpha is kept, so the blend recolours the destination without
/// changing which pixels are visible.
pub fn blend_pixel(dst: [f32; 4], src: [f32; 4], mode: BlendMode, mask: bool) -> [f32; 4] {
    let sa = (src[3] / 255.0).clamp(0.0, 1.0);
    let da = (dst[3] / 255.0).clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    if da <= 0.0 {
        return if mask {
            [src[0], src[1], src[2], dst[3]]
        } else {
            src
        };
    }

    // Porter-Duff source-over with the blend applied to unpremultiplied channels:
    // out_a = sa + da * (1 - sa)
    // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0.0f32; 4];
    for c in 0..3 {
        let sc = (src[c] / 255.0).clamp(0.0, 1.0);
        let dc = (dst[c] / 255.0).clamp(0.0, 1.0);
        let b = mode.channel(sc, dc).clamp(0.0, 1.0);
        let out_p = sc * sa * (1.0 - da) + dc * da * (1.0 - sa) + b * sa * da;
        out[c] = (out_p / out_a * 255.0).clamp(0.0, 255.0);
    }
    out[3] = if mask { dst[3] } else { out_a * 255.0 };
    out
}

/// Composite `src` over `dst` with `src`'s top-left at `offset` in `dst` pixels; out-of-bounds
/// pixels are clipped.
pub fn blend_at(dst: &mut Raster, src: &Raster, offset: (i64, i64), mode: BlendMode, mask: bool) {
    for_overlap(dst, src, offset, |d, s| *d = blend_pixel(*d, s, mode, mask));
}

/// Subtract `src` alpha from `dst` alpha with `src` placed at `offset`.
pub fn erase_at(dst: &mut Raster, src: &Raster, offset: (i64, i64)) {
    for_overlap(dst, src, offset, |d, s| d[3] = (d[3] - s[3]).clamp(0.0, 255.0));
}

/// Composite equally sized rasters into a new raster.
pub fn blend(src: &Raster, dst: &Raster, mode: BlendMode, mask: bool) -> SynthResult<Raster> {
    if src.dimensions() != dst.dimensions() {
        return Err(SynthError::geometry(format!(
            "blend expects equal sizes, got {:?} over {:?}",
            src.dimensions(),
            dst.dimensions()
        )));
    }
    let mut out = dst.clone();
    blend_at(&mut out, src, (0, 0), mode, mask);
    Ok(out)
}

fn for_overlap(
    dst: &mut Raster,
    src: &Raster,
    (ox, oy): (i64, i64),
    mut f: impl FnMut(&mut [f32; 4], [f32; 4]),
) {
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));
    let x0 = ox.max(0);
    let y0 = oy.max(0);
    let x1 = (ox + sw).min(dw);
    let y1 = (oy + sh).min(dh);
    for y in y0..y1 {
        for x in x0..x1 {
            let s = src.get_pixel((x - ox) as u32, (y - oy) as u32).0;
            f(&mut dst.get_pixel_mut(x as u32, y as u32).0, s);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
