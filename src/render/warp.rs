//! Perspective warp of a raster onto a destination quad.
//!
//! Destination pixel `(x, y)` is sampled at its centre `(x + 0.5, y + 0.5)`, mapped back into the
//! source through the inverse homography, and read with bilinear filtering over premultiplied
//! values. Samples outside the source are transparent.

use std::borrow::Cow;

use image::Rgba;

use crate::foundation::core::{Bbox, Point, Quad, Raster};
use crate::foundation::math::Homography;
use crate::render::composite::{BlendMode, blend_at, erase_at};

/// Corner tolerance for treating a quad as an unwarped, integer-aligned copy of its source.
pub const RECT_EPS: f64 = 1e-6;

/// A source raster resampled into destination space, positioned at `offset`.
#[derive(Debug)]
pub struct Warped<'a> {
    /// Patch pixels.
    pub patch: Cow<'a, Raster>,
    /// Destination pixel of the patch's top-left corner.
    pub offset: (i64, i64),
}

/// Integer offset when `quad` is exactly `src`'s own rectangle translated by whole pixels.
pub fn rect_offset(src: &Raster, quad: &Quad) -> Option<(i64, i64)> {
    let origin = quad.0[0];
    let (ox, oy) = (origin.x.round(), origin.y.round());
    let expected = Bbox::new(ox, oy, f64::from(src.width()), f64::from(src.height())).to_quad();
    quad.approx_eq(&expected, RECT_EPS)
        .then_some((ox as i64, oy as i64))
}

/// Resample `src` onto `quad` within a `width`×`height` destination.
///
/// Returns `None` when nothing would be visible: empty source, empty destination, degenerate quad,
/// or a quad entirely outside the destination.
pub fn warp<'a>(src: &'a Raster, quad: &Quad, width: u32, height: u32) -> Option<Warped<'a>> {
    if src.width() == 0 || src.height() == 0 || width == 0 || height == 0 {
        return None;
    }
    if let Some(offset) = rect_offset(src, quad) {
        return Some(Warped {
            patch: Cow::Borrowed(src),
            offset,
        });
    }
    warp_general(src, quad, width, height)
}

/// Snap a sample coordinate within [`RECT_EPS`] of a pixel index onto it.
fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < RECT_EPS { r } else { v }
}

/// Inverse-mapped bilinear warp; reproduces the blit exactly for whole-pixel translations.
fn warp_general<'a>(src: &'a Raster, quad: &Quad, width: u32, height: u32) -> Option<Warped<'a>> {
    if quad.signed_area2().abs() < RECT_EPS || quad.0.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return None;
    }

    let bounds = quad.bbox();
    let x0 = bounds.left().floor().max(0.0) as i64;
    let y0 = bounds.top().floor().max(0.0) as i64;
    let x1 = (bounds.right().ceil() as i64).min(i64::from(width));
    let y1 = (bounds.bottom().ceil() as i64).min(i64::from(height));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let source = Quad::from_size(f64::from(src.width()), f64::from(src.height()));
    let inverse = Homography::from_quads(&source, quad).ok()?.inverse()?;

    let patch = Raster::from_fn((x1 - x0) as u32, (y1 - y0) as u32, |px, py| {
        let center = Point::new(
            (x0 + i64::from(px)) as f64 + 0.5,
            (y0 + i64::from(py)) as f64 + 0.5,
        );
        match inverse.apply(center) {
            Some(s) => Rgba(sample_bilinear(src, snap(s.x - 0.5), snap(s.y - 0.5))),
            None => Rgba([0.0; 4]),
        }
    });
    Some(Warped {
        patch: Cow::Owned(patch),
        offset: (x0, y0),
    })
}

/// Bilinear read at fractional pixel-index coordinates with a transparent border.
fn sample_bilinear(src: &Raster, fx: f64, fy: f64) -> [f32; 4] {
    let (w, h) = (i64::from(src.width()), i64::from(src.height()));
    if fx <= -1.0 || fy <= -1.0 || fx >= w as f64 || fy >= h as f64 {
        return [0.0; 4];
    }
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0) as f32;
    let ty = (fy - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = [0.0f32; 4];
    for (dx, dy, wgt) in [
        (0, 0, (1.0 - tx) * (1.0 - ty)),
        (1, 0, tx * (1.0 - ty)),
        (0, 1, (1.0 - tx) * ty),
        (1, 1, tx * ty),
    ] {
        let (x, y) = (x0 + dx, y0 + dy);
        if wgt <= 0.0 || x < 0 || y < 0 || x >= w || y >= h {
            continue;
        }
        let p = src.get_pixel(x as u32, y as u32).0;
        let a = p[3] * wgt;
        acc[0] += p[0] * a;
        acc[1] += p[1] * a;
        acc[2] += p[2] * a;
        acc[3] += a;
    }
    if acc[3] <= 0.0 {
        return [0.0; 4];
    }
    [acc[0] / acc[3], acc[1] / acc[3], acc[2] / acc[3], acc[3].min(255.0)]
}

/// Warp `src` onto `quad` (destination pixel coordinates) and composite it into `dst`.
pub fn paste_image(src: &Raster, dst: &mut Raster, quad: &Quad, mode: BlendMode) {
    let (w, h) = dst.dimensions();
    if let Some(warped) = warp(src, quad, w, h) {
        blend_at(dst, &warped.patch, warped.offset, mode, false);
    }
}

/// Warp `src` onto `quad` and subtract its alpha from `dst`.
pub fn erase_image(src: &Raster, dst: &mut Raster, quad: &Quad) {
    let (w, h) = dst.dimensions();
    if let Some(warped) = warp(src, quad, w, h) {
        erase_at(dst, &warped.patch, warped.offset);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/warp.rs"]
mod tests;
