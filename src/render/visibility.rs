//! Legibility test for text composited over a background.

use rand::seq::SliceRandom;

use crate::foundation::core::Raster;
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::SynthRng;
use crate::render::composite::{BlendMode, blend};
use crate::render::raster::luma;

/// Flood-fill tolerance around the seed's gray level.
const FILL_RANGE: i16 = 16;
/// Largest accepted share of the border ring reachable from the text interior.
const MAX_LEAK: f64 = 0.1;

/// Return `true` when the text whose alpha is `mask` stays distinguishable inside `image`.
///
/// Flood fills start at every interior pixel (mask alpha > 127) and spread 4-connected through the
/// one-pixel dilation of the mask, accepting pixels within a fixed gray range of the seed. The
/// result passes when at most 10% of the ring outside the mask is reached.
pub fn check_visibility(image: &Raster, mask: &Raster) -> bool {
    if image.dimensions() != mask.dimensions() {
        return false;
    }
    let (w, h) = (image.width() as usize, image.height() as usize);
    let gray: Vec<i16> = image
        .pixels()
        .map(|p| luma([p.0[0], p.0[1], p.0[2]]).clamp(0.0, 255.0) as i16)
        .collect();
    let alpha: Vec<f32> = mask.pixels().map(|p| p.0[3]).collect();

    let inside = |i: usize| alpha[i] > 0.0;
    let mut bound = vec![false; w * h];
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            bound[i] = inside(i)
                || (x > 0 && inside(i - 1))
                || (x + 1 < w && inside(i + 1))
                || (y > 0 && inside(i - w))
                || (y + 1 < h && inside(i + w));
        }
    }
    let border: Vec<bool> = (0..w * h).map(|i| bound[i] && !inside(i)).collect();
    let total = border.iter().filter(|b| **b).count();
    if total == 0 {
        return false;
    }

    // Pixels outside the dilated mask are never entered.
    let mut visited: Vec<bool> = bound.iter().map(|b| !b).collect();
    let mut stack = Vec::new();
    for seed in 0..w * h {
        if alpha[seed] <= 127.0 || visited[seed] {
            continue;
        }
        let level = gray[seed];
        visited[seed] = true;
        stack.push(seed);
        while let Some(i) = stack.pop() {
            let (x, y) = (i % w, i / w);
            let mut visit = |j: usize| {
                if !visited[j] && (gray[j] - level).abs() <= FILL_RANGE {
                    visited[j] = true;
                    stack.push(j);
                }
            };
            if x > 0 {
                visit(i - 1);
            }
            if x + 1 < w {
                visit(i + 1);
            }
            if y > 0 {
                visit(i - w);
            }
            if y + 1 < h {
                visit(i + w);
            }
        }
    }

    let leaked = (0..w * h).filter(|&i| border[i] && visited[i]).count();
    leaked as f64 <= MAX_LEAK * total as f64
}

/// Blend `src` over `dst` trying `modes` in a random order until one passes
/// [`check_visibility`]; with `check` off the first mode of the permutation wins.
pub fn blend_with_visibility(
    src: &Raster,
    dst: &Raster,
    modes: &[BlendMode],
    check: bool,
    rng: &mut SynthRng,
) -> SynthResult<(Raster, BlendMode)> {
    if modes.is_empty() {
        return Err(SynthError::config("no blend modes configured"));
    }
    let mut order = modes.to_vec();
    order.shuffle(rng);
    for mode in order {
        let out = blend(src, dst, mode, false)?;
        if !check || check_visibility(&out, src) {
            return Ok((out, mode));
        }
        tracing::trace!(?mode, "blend mode failed visibility check");
    }
    Err(SynthError::VisibilityExhausted)
}

#[cfg(test)]
#[path = "../../tests/unit/render/visibility.rs"]
mod tests;
