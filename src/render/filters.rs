//! Pure pixel filters: `filter(raster, params) -> raster` with unchanged dimensions.
//!
//! Filters that need randomness take an explicit seed so a recorded meta replays them exactly.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageFormat, Rgba};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::foundation::core::Raster;
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{chance, normal, uniform};
use crate::render::composite::{BlendMode, blend_pixel};
use crate::render::raster::{luma, resize};

/// Interpolation used by [`resample`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear.
    Linear,
    /// Catmull-Rom cubic.
    Cubic,
    /// Lanczos with a window of 3.
    Lanczos,
}

impl Interpolation {
    /// Every interpolation.
    pub const ALL: [Interpolation; 4] = [
        Interpolation::Nearest,
        Interpolation::Linear,
        Interpolation::Cubic,
        Interpolation::Lanczos,
    ];

    fn filter_type(self) -> FilterType {
        match self {
            Interpolation::Nearest => FilterType::Nearest,
            Interpolation::Linear => FilterType::Triangle,
            Interpolation::Cubic => FilterType::CatmullRom,
            Interpolation::Lanczos => FilterType::Lanczos3,
        }
    }
}

fn map_rgb(raster: &Raster, f: impl Fn([f32; 3]) -> [f32; 3]) -> Raster {
    let mut out = raster.clone();
    for px in out.pixels_mut() {
        let rgb = f([px.0[0], px.0[1], px.0[2]]);
        for c in 0..3 {
            px.0[c] = rgb[c].clamp(0.0, 255.0);
        }
    }
    out
}

/// Add `beta` to every colour channel.
pub fn brightness(raster: &Raster, beta: f32) -> Raster {
    map_rgb(raster, |rgb| rgb.map(|c| c + beta))
}

/// Scale contrast around mid-gray: `alpha * c - 128 * (alpha - 1)`.
pub fn contrast(raster: &Raster, alpha: f32) -> Raster {
    map_rgb(raster, |rgb| rgb.map(|c| alpha * c - 128.0 * (alpha - 1.0)))
}

/// Replace colour with luma.
pub fn grayscale(raster: &Raster) -> Raster {
    map_rgb(raster, |rgb| [luma(rgb); 3])
}

/// Add zero-mean normal noise with standard deviation `scale` to the colour channels; one draw per
/// pixel unless `per_channel`.
pub fn additive_gaussian_noise(raster: &Raster, scale: f64, per_channel: bool, seed: u64) -> Raster {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = raster.clone();
    for px in out.pixels_mut() {
        let shared = normal(&mut rng, 0.0, scale) as f32;
        for c in 0..3 {
            let n = if per_channel {
                normal(&mut rng, 0.0, scale) as f32
            } else {
                shared
            };
            px.0[c] = (px.0[c] + n).clamp(0.0, 255.0);
        }
    }
    out
}

fn gaussian_kernel(sigma: f64) -> SynthResult<Vec<f32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(SynthError::config("blur sigma must be > 0"));
    }
    let r = (3.0 * sigma).ceil().max(1.0) as i32;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    Ok(weights.iter().map(|w| (w / sum) as f32).collect())
}

/// Separable convolution over premultiplied channels with clamp-to-edge borders.
fn convolve_separable(raster: &Raster, kh: &[f32], kv: &[f32]) -> Raster {
    let premul = Raster::from_fn(raster.width(), raster.height(), |x, y| {
        let p = raster.get_pixel(x, y).0;
        let a = p[3] / 255.0;
        Rgba([p[0] * a, p[1] * a, p[2] * a, p[3]])
    });
    let tmp = pass(&premul, kh, true);
    let out = pass(&tmp, kv, false);
    Raster::from_fn(out.width(), out.height(), |x, y| {
        let p = out.get_pixel(x, y).0;
        if p[3] <= 0.0 {
            return Rgba([0.0; 4]);
        }
        let inv = 255.0 / p[3];
        Rgba([
            (p[0] * inv).clamp(0.0, 255.0),
            (p[1] * inv).clamp(0.0, 255.0),
            (p[2] * inv).clamp(0.0, 255.0),
            p[3].clamp(0.0, 255.0),
        ])
    })
}

fn pass(src: &Raster, k: &[f32], horizontal: bool) -> Raster {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (i64::from(src.width()), i64::from(src.height()));
    Raster::from_fn(src.width(), src.height(), |x, y| {
        let mut acc = [0.0f32; 4];
        for (ki, &kw) in k.iter().enumerate() {
            let d = ki as i64 - radius;
            let (sx, sy) = if horizontal {
                ((i64::from(x) + d).clamp(0, w - 1), i64::from(y))
            } else {
                (i64::from(x), (i64::from(y) + d).clamp(0, h - 1))
            };
            let p = src.get_pixel(sx as u32, sy as u32).0;
            for c in 0..4 {
                acc[c] += kw * p[c];
            }
        }
        Rgba(acc)
    })
}

/// Gaussian blur with standard deviation `sigma`; `sigma <= 0` is the identity.
pub fn gaussian_blur(raster: &Raster, sigma: f64) -> SynthResult<Raster> {
    if sigma <= 0.0 || raster.width() == 0 || raster.height() == 0 {
        return Ok(raster.clone());
    }
    let k = gaussian_kernel(sigma)?;
    Ok(convolve_separable(raster, &k, &k))
}

/// Median over a `ksize`×`ksize` window per channel; `ksize` is forced odd.
pub fn median_blur(raster: &Raster, ksize: u32) -> Raster {
    let r = i64::from(ksize / 2);
    if r == 0 {
        return raster.clone();
    }
    let (w, h) = (i64::from(raster.width()), i64::from(raster.height()));
    let mut window: Vec<f32> = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
    Raster::from_fn(raster.width(), raster.height(), |x, y| {
        let mut out = [0.0f32; 4];
        for (c, o) in out.iter_mut().enumerate() {
            window.clear();
            for dy in -r..=r {
                for dx in -r..=r {
                    let sx = (i64::from(x) + dx).clamp(0, w - 1) as u32;
                    let sy = (i64::from(y) + dy).clamp(0, h - 1) as u32;
                    window.push(raster.get_pixel(sx, sy).0[c]);
                }
            }
            window.sort_by(f32::total_cmp);
            *o = window[window.len() / 2];
        }
        Rgba(out)
    })
}

/// Blur along a line of `k` pixels at `angle` degrees.
pub fn motion_blur(raster: &Raster, k: u32, angle: f64) -> Raster {
    let k = k.max(1) as i64;
    if k == 1 {
        return raster.clone();
    }
    let (sin, cos) = angle.to_radians().sin_cos();
    let half = (k - 1) as f64 / 2.0;
    let taps: Vec<(f64, f64)> = (0..k)
        .map(|i| {
            let t = i as f64 - half;
            (t * cos, t * sin)
        })
        .collect();
    let (w, h) = (raster.width(), raster.height());
    let premul = |x: i64, y: i64| {
        let x = x.clamp(0, i64::from(w) - 1) as u32;
        let y = y.clamp(0, i64::from(h) - 1) as u32;
        let p = raster.get_pixel(x, y).0;
        let a = p[3] / 255.0;
        [p[0] * a, p[1] * a, p[2] * a, p[3]]
    };
    Raster::from_fn(w, h, |x, y| {
        let mut acc = [0.0f32; 4];
        for &(dx, dy) in &taps {
            let p = premul(
                (f64::from(x) + dx).round() as i64,
                (f64::from(y) + dy).round() as i64,
            );
            for c in 0..4 {
                acc[c] += p[c] / k as f32;
            }
        }
        if acc[3] <= 0.0 {
            return Rgba([0.0; 4]);
        }
        let inv = 255.0 / acc[3];
        Rgba([acc[0] * inv, acc[1] * inv, acc[2] * inv, acc[3]].map(|v| v.clamp(0.0, 255.0)))
    })
}

/// Downscale by `factor` then restore the original size.
pub fn resample(raster: &Raster, factor: f64, down: Interpolation, up: Interpolation) -> Raster {
    let (w, h) = raster.dimensions();
    if w == 0 || h == 0 {
        return raster.clone();
    }
    let sw = ((f64::from(w) * factor).round() as u32).max(1);
    let sh = ((f64::from(h) * factor).round() as u32).max(1);
    let small = resize(raster, sw, sh, down.filter_type());
    resize(&small, w, h, up.filter_type())
}

/// Per-pixel min over a `(2k+1)` window on the colour channels.
pub fn erode(raster: &Raster, k: u32) -> Raster {
    let eroded = crate::render::raster::erode(raster, k);
    let mut out = raster.clone();
    for (o, e) in out.pixels_mut().zip(eroded.pixels()) {
        o.0[..3].copy_from_slice(&e.0[..3]);
    }
    out
}

/// Bilinear remap: output pixel `(x, y)` reads the source at `(x + dx, y + dy)`, clamped to the
/// image.
pub fn remap(raster: &Raster, dx: &[f32], dy: &[f32]) -> Raster {
    let (w, h) = raster.dimensions();
    let read = |x: i64, y: i64| {
        let x = x.clamp(0, i64::from(w) - 1) as u32;
        let y = y.clamp(0, i64::from(h) - 1) as u32;
        raster.get_pixel(x, y).0
    };
    Raster::from_fn(w, h, |x, y| {
        let i = (y * w + x) as usize;
        let sx = f64::from(x) + f64::from(dx[i]);
        let sy = f64::from(y) + f64::from(dy[i]);
        let (x0, y0) = (sx.floor(), sy.floor());
        let (tx, ty) = ((sx - x0) as f32, (sy - y0) as f32);
        let (x0, y0) = (x0 as i64, y0 as i64);
        let mut acc = [0.0f32; 4];
        for (ox, oy, wgt) in [
            (0, 0, (1.0 - tx) * (1.0 - ty)),
            (1, 0, tx * (1.0 - ty)),
            (0, 1, (1.0 - tx) * ty),
            (1, 1, tx * ty),
        ] {
            let p = read(x0 + ox, y0 + oy);
            for c in 0..4 {
                acc[c] += p[c] * wgt;
            }
        }
        Rgba(acc)
    })
}

/// Elastic distortion: uniform random displacement fields smoothed by a gaussian of `sigma` and
/// scaled by `alpha`.
pub fn elastic_distortion(raster: &Raster, alpha: f64, sigma: f64, seed: u64) -> SynthResult<Raster> {
    let (w, h) = raster.dimensions();
    if w == 0 || h == 0 {
        return Ok(raster.clone());
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut field = Raster::new(w, h);
    for px in field.pixels_mut() {
        px.0 = [
            uniform(&mut rng, (-1.0, 1.0)) as f32,
            uniform(&mut rng, (-1.0, 1.0)) as f32,
            0.0,
            0.0,
        ];
    }
    let field = if sigma > 0.0 {
        let k = gaussian_kernel(sigma)?;
        let tmp = pass(&field, &k, true);
        pass(&tmp, &k, false)
    } else {
        field
    };
    let dx: Vec<f32> = field.pixels().map(|p| p.0[0] * alpha as f32).collect();
    let dy: Vec<f32> = field.pixels().map(|p| p.0[1] * alpha as f32).collect();
    Ok(remap(raster, &dx, &dy))
}

/// Round-trip the colour channels through JPEG at `quality` (1..=100); alpha is kept.
pub fn jpeg_compression(raster: &Raster, quality: u8) -> SynthResult<Raster> {
    let (w, h) = raster.dimensions();
    if w == 0 || h == 0 {
        return Ok(raster.clone());
    }
    let rgb: Vec<u8> = raster
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode(&rgb, w, h, ExtendedColorType::Rgb8)
        .map_err(|e| SynthError::filter(format!("jpeg encode: {e}")))?;
    let decoded = image::load(Cursor::new(buf), ImageFormat::Jpeg)
        .map_err(|e| SynthError::filter(format!("jpeg decode: {e}")))?
        .to_rgb8();
    let mut out = raster.clone();
    for (o, d) in out.pixels_mut().zip(decoded.pixels()) {
        for c in 0..3 {
            o.0[c] = f32::from(d.0[c]);
        }
    }
    Ok(out)
}

/// Zero rectangular cells of a `grid`-sized lattice stretched over the image, each with
/// probability `p`.
///
/// Cells are drawn once for all colour channels, or independently per channel when `per_channel`.
/// With `only_alpha` the cells cut the alpha channel and colour is untouched.
pub fn coarse_dropout(
    raster: &Raster,
    p: f64,
    grid: (u32, u32),
    per_channel: bool,
    only_alpha: bool,
    seed: u64,
) -> Raster {
    let (w, h) = raster.dimensions();
    if w == 0 || h == 0 {
        return raster.clone();
    }
    let (gw, gh) = (grid.0.clamp(1, w), grid.1.clamp(1, h));
    let planes = if per_channel && !only_alpha { 3 } else { 1 };
    let mut rng = StdRng::seed_from_u64(seed);
    let drops: Vec<Vec<bool>> = (0..planes)
        .map(|_| (0..gw * gh).map(|_| chance(&mut rng, p)).collect())
        .collect();

    let mut out = raster.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let cx = (u64::from(x) * u64::from(gw) / u64::from(w)) as u32;
        let cy = (u64::from(y) * u64::from(gh) / u64::from(h)) as u32;
        let cell = (cy * gw + cx) as usize;
        if only_alpha {
            if drops[0][cell] {
                px.0[3] = 0.0;
            }
            continue;
        }
        for c in 0..3 {
            if drops[c.min(planes - 1)][cell] {
                px.0[c] = 0.0;
            }
        }
    }
    out
}

/// Pixels read from outside the image by [`rotate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// Transparent.
    #[default]
    Constant,
    /// The nearest edge pixel.
    Edge,
}

/// Rotate the content `angle` degrees clockwise about the image centre, keeping the canvas size.
pub fn rotate(raster: &Raster, angle: f64, border: BorderMode) -> Raster {
    let (w, h) = raster.dimensions();
    if w == 0 || h == 0 {
        return raster.clone();
    }
    let (sin, cos) = angle.to_radians().sin_cos();
    let (cx, cy) = (f64::from(w) / 2.0, f64::from(h) / 2.0);
    let read = |x: i64, y: i64| -> [f32; 4] {
        let inside = x >= 0 && y >= 0 && x < i64::from(w) && y < i64::from(h);
        match border {
            BorderMode::Constant if !inside => [0.0; 4],
            _ => {
                let x = x.clamp(0, i64::from(w) - 1) as u32;
                let y = y.clamp(0, i64::from(h) - 1) as u32;
                raster.get_pixel(x, y).0
            }
        }
    };
    Raster::from_fn(w, h, |x, y| {
        let (dx, dy) = (f64::from(x) + 0.5 - cx, f64::from(y) + 0.5 - cy);
        let sx = cos * dx + sin * dy + cx - 0.5;
        let sy = -sin * dx + cos * dy + cy - 0.5;
        let (x0, y0) = (sx.floor(), sy.floor());
        let (tx, ty) = ((sx - x0) as f32, (sy - y0) as f32);
        let (x0, y0) = (x0 as i64, y0 as i64);
        let mut acc = [0.0f32; 4];
        for (ox, oy, wgt) in [
            (0, 0, (1.0 - tx) * (1.0 - ty)),
            (1, 0, tx * (1.0 - ty)),
            (0, 1, (1.0 - tx) * ty),
            (1, 1, tx * ty),
        ] {
            let p = read(x0 + ox, y0 + oy);
            let a = p[3] * wgt;
            acc[0] += p[0] * a;
            acc[1] += p[1] * a;
            acc[2] += p[2] * a;
            acc[3] += a;
        }
        if acc[3] <= 0.0 {
            return Rgba([0.0; 4]);
        }
        Rgba([acc[0] / acc[3], acc[1] / acc[3], acc[2] / acc[3], acc[3]].map(|v| v.clamp(0.0, 255.0)))
    })
}

fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -2.0 * t * t + 4.0 * t - 1.0
    }
}

/// Shadow strength along one axis of a `size`-pixel band.
///
/// `stops` are the fractions `[ramp up start, full start, full end, ramp down end]`; the ramps are
/// eased quadratically.
pub fn shadow_profile(size: usize, stops: [f64; 4]) -> Vec<f32> {
    let mut values = vec![0.0f32; size];
    let n = size as i64;
    let at = |f: f64| (n as f64 * f) as i64;
    let mut ramp = |start: i64, end: i64, rising: bool| {
        let len = end - start;
        for i in start.max(0)..end.min(n) {
            let k = (i - start) as f64;
            let t = if len > 1 { k / (len - 1) as f64 } else { 0.0 };
            let t = if rising { t } else { 1.0 - t };
            values[i as usize] = ease_in_out_quad(t) as f32;
        }
    };
    ramp(at(stops[0]), at(stops[1]), true);
    ramp(at(stops[2]), at(stops[3]), false);
    for i in at(stops[1]).max(0)..at(stops[2]).min(n) {
        values[i as usize] = 1.0;
    }
    values
}

/// Darken the image with a black band of peak alpha `intensity`, shaped by [`shadow_profile`] and
/// turned `angle` degrees counter-clockwise.
///
/// The band is laid out on a square of the longer side, rotated with enough zoom to fill it, then
/// stretched back to the image size and blended over it.
pub fn shadow(raster: &Raster, intensity: f32, stops: [f64; 4], angle: f64) -> Raster {
    let (w, h) = raster.dimensions();
    if w == 0 || h == 0 {
        return raster.clone();
    }
    let size = w.max(h);
    let profile = shadow_profile(size as usize, stops);
    let (sin, cos) = angle.to_radians().sin_cos();
    let scale = sin.abs() + cos.abs();
    let (a, b) = (scale * cos, scale * sin);
    let norm = scale * scale;
    let c = f64::from(size) / 2.0;
    let last = f64::from(size - 1);

    let column = |s: f64| -> f32 {
        let s = s.clamp(0.0, last);
        let i = s.floor();
        let t = (s - i) as f32;
        let i = i as usize;
        let j = (i + 1).min(size as usize - 1);
        profile[i] * (1.0 - t) + profile[j] * t
    };

    let mut out = raster.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let u = (f64::from(x) + 0.5) * f64::from(size) / f64::from(w) - 0.5;
        let v = (f64::from(y) + 0.5) * f64::from(size) / f64::from(h) - 0.5;
        let (du, dv) = (u - c, v - c);
        let sx = (a * du - b * dv) / norm + c;
        let alpha = column(sx) * intensity;
        px.0 = blend_pixel(px.0, [0.0, 0.0, 0.0, alpha.clamp(0.0, 255.0)], BlendMode::Normal, false);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/filters.rs"]
mod tests;
