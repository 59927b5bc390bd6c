//! Pixel-buffer helpers shared by layers, components, and filters.

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::foundation::core::{Point, Raster, Rgba8};

/// Tolerance when turning a floating extent into whole pixels.
pub(crate) const EXTENT_EPS: f64 = 1e-6;

/// Whole-pixel canvas extent for a floating box extent; zero for empty or non-finite input.
pub fn pixel_extent(v: f64) -> u32 {
    if v.is_finite() && v > EXTENT_EPS {
        (v - EXTENT_EPS).ceil().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Transparent raster.
pub fn transparent(width: u32, height: u32) -> Raster {
    Raster::new(width, height)
}

/// Raster filled with a single colour.
pub fn filled(width: u32, height: u32, color: Rgba8) -> Raster {
    Raster::from_pixel(width, height, Rgba(color.to_f32()))
}

/// Convert an 8-bit image.
pub fn from_rgba8(img: &RgbaImage) -> Raster {
    let (w, h) = img.dimensions();
    let data = img.as_raw().iter().map(|&v| f32::from(v)).collect();
    Raster::from_raw(w, h, data).unwrap_or_else(|| Raster::new(w, h))
}

/// Convert any decoded image; alpha becomes fully opaque when the source has none.
pub fn from_dynamic(img: &DynamicImage) -> Raster {
    from_rgba8(&img.to_rgba8())
}

/// Round and clamp into an 8-bit image.
pub fn to_rgba8(raster: &Raster) -> RgbaImage {
    let (w, h) = raster.dimensions();
    let data = raster
        .as_raw()
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    RgbaImage::from_raw(w, h, data).unwrap_or_else(|| RgbaImage::new(w, h))
}

/// Luma of an rgb triple (ITU-R 601 weights).
pub fn luma(rgb: [f32; 3]) -> f32 {
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}

/// Remove `top`/`right`/`bottom`/`left` pixels from the edges.
pub fn crop(raster: &Raster, top: u32, right: u32, bottom: u32, left: u32) -> Raster {
    let (w, h) = raster.dimensions();
    let nw = w.saturating_sub(left.saturating_add(right));
    let nh = h.saturating_sub(top.saturating_add(bottom));
    Raster::from_fn(nw, nh, |x, y| *raster.get_pixel(x + left, y + top))
}

/// Add transparent pixels around the edges.
pub fn pad(raster: &Raster, top: u32, right: u32, bottom: u32, left: u32) -> Raster {
    let (w, h) = raster.dimensions();
    let mut out = Raster::new(w + left + right, h + top + bottom);
    for (x, y, px) in raster.enumerate_pixels() {
        out.put_pixel(x + left, y + top, *px);
    }
    out
}

/// Pixel bounds `(x0, y0, x1, y1)` of the pixels with non-zero alpha, or `None` if all are clear.
pub fn alpha_bounds(raster: &Raster) -> Option<(u32, u32, u32, u32)> {
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
    let mut any = false;
    for (x, y, px) in raster.enumerate_pixels() {
        if px.0[3] > 0.0 {
            any = true;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x + 1);
            y1 = y1.max(y + 1);
        }
    }
    any.then_some((x0, y0, x1, y1))
}

/// Per-channel maximum over a `(2k+1)`-pixel square.
pub fn dilate(raster: &Raster, k: u32) -> Raster {
    morph(raster, k, f32::max, f32::NEG_INFINITY)
}

/// Per-channel minimum over a `(2k+1)`-pixel square.
pub fn erode(raster: &Raster, k: u32) -> Raster {
    morph(raster, k, f32::min, f32::INFINITY)
}

fn morph(raster: &Raster, k: u32, pick: fn(f32, f32) -> f32, init: f32) -> Raster {
    if k == 0 {
        return raster.clone();
    }
    let (w, h) = raster.dimensions();
    let k = k as i64;
    let pass = |src: &Raster, horizontal: bool| {
        Raster::from_fn(w, h, |x, y| {
            let mut acc = [init; 4];
            for d in -k..=k {
                let (sx, sy) = if horizontal {
                    (i64::from(x) + d, i64::from(y))
                } else {
                    (i64::from(x), i64::from(y) + d)
                };
                if sx < 0 || sy < 0 || sx >= i64::from(w) || sy >= i64::from(h) {
                    continue;
                }
                let p = src.get_pixel(sx as u32, sy as u32).0;
                for c in 0..4 {
                    acc[c] = pick(acc[c], p[c]);
                }
            }
            Rgba(acc)
        })
    };
    let tmp = pass(raster, true);
    pass(&tmp, false)
}

/// Convex hull of `points` with positive turns between edges and no collinear points.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.iter().copied().filter(|p| p.x.is_finite() && p.y.is_finite()).collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }
    let cross = |o: Point, a: Point, b: Point| (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x);
    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for pass in [pts.clone(), pts.into_iter().rev().collect()] {
        let start = hull.len();
        for p in pass {
            while hull.len() >= start + 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

/// Set the alpha of every pixel whose centre lies inside the convex hull of `points` to at least
/// `alpha`, painting white. Fewer than three distinct points paint nothing.
pub fn fill_convex(canvas: &mut Raster, points: &[Point], alpha: f32) {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return;
    }
    let (w, h) = canvas.dimensions();
    let x0 = hull.iter().map(|p| p.x).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
    let y0 = hull.iter().map(|p| p.y).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
    let x1 = (hull.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max).ceil().max(0.0) as u32).min(w);
    let y1 = (hull.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max).ceil().max(0.0) as u32).min(h);
    for y in y0..y1 {
        for x in x0..x1 {
            let c = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let inside = (0..hull.len()).all(|i| {
                let (a, b) = (hull[i], hull[(i + 1) % hull.len()]);
                (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x) >= 0.0
            });
            if inside {
                let p = canvas.get_pixel_mut(x, y);
                p.0 = [255.0, 255.0, 255.0, p.0[3].max(alpha)];
            }
        }
    }
}

/// Resize with the given filter; zero targets give an empty raster.
pub fn resize(raster: &Raster, width: u32, height: u32, filter: FilterType) -> Raster {
    if width == 0 || height == 0 || raster.width() == 0 || raster.height() == 0 {
        return Raster::new(width, height);
    }
    if raster.dimensions() == (width, height) {
        return raster.clone();
    }
    image::imageops::resize(raster, width, height, filter)
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
