//! Planar homographies.

use crate::foundation::core::{Affine, Point, Quad};
use crate::foundation::error::{SynthError, SynthResult};

const SINGULAR_EPS: f64 = 1e-12;

/// Planar projective transform stored as a row-major 3×3 matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography(pub [[f64; 3]; 3]);

impl Default for Homography {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Homography {
    /// The identity transform.
    pub const IDENTITY: Self = Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    /// Lift an affine map.
    pub fn from_affine(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self([[a, c, e], [b, d, f], [0.0, 0.0, 1.0]])
    }

    /// Solve the unique transform mapping each corner of `src` onto the matching corner of `dst`.
    ///
    /// Fails with [`SynthError::Geometry`] when three or more corners of either quad are collinear.
    pub fn from_quads(src: &Quad, dst: &Quad) -> SynthResult<Self> {
        // Unknowns h0..h7 with h8 = 1:
        //   u = (h0 x + h1 y + h2) / (h6 x + h7 y + 1)
        //   v = (h3 x + h4 y + h5) / (h6 x + h7 y + 1)
        let mut a = [[0.0f64; 9]; 8];
        for (i, (s, d)) in src.0.iter().zip(dst.0.iter()).enumerate() {
            let (x, y, u, v) = (s.x, s.y, d.x, d.y);
            a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u, u];
            a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v, v];
        }
        let h = solve8(a).ok_or_else(|| SynthError::geometry("quad correspondence is singular"))?;
        Ok(Self([[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]]))
    }

    /// Map a point, or `None` when it lands on the line at infinity.
    pub fn apply(&self, p: Point) -> Option<Point> {
        let m = &self.0;
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        if w.abs() < SINGULAR_EPS {
            return None;
        }
        Some(Point::new(
            (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w,
            (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w,
        ))
    }

    /// Map every corner of a quad.
    pub fn apply_quad(&self, quad: &Quad) -> SynthResult<Quad> {
        let mut out = [Point::ZERO; 4];
        for (o, p) in out.iter_mut().zip(quad.0.iter()) {
            *o = self
                .apply(*p)
                .ok_or_else(|| SynthError::geometry("quad corner mapped to infinity"))?;
        }
        Ok(Quad(out))
    }

    /// Inverse transform, or `None` for singular matrices.
    pub fn inverse(&self) -> Option<Self> {
        let m = &self.0;
        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        let c00 = cof(1, 2, 1, 2);
        let c01 = -cof(1, 2, 0, 2);
        let c02 = cof(1, 2, 0, 1);
        let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
        if det.abs() < SINGULAR_EPS || !det.is_finite() {
            return None;
        }
        let c10 = -cof(0, 2, 1, 2);
        let c11 = cof(0, 2, 0, 2);
        let c12 = -cof(0, 2, 0, 1);
        let c20 = cof(0, 1, 1, 2);
        let c21 = -cof(0, 1, 0, 2);
        let c22 = cof(0, 1, 0, 1);
        let inv = 1.0 / det;
        Some(Self([
            [c00 * inv, c10 * inv, c20 * inv],
            [c01 * inv, c11 * inv, c21 * inv],
            [c02 * inv, c12 * inv, c22 * inv],
        ]))
    }
}

/// Gaussian elimination with partial pivoting on an augmented 8×9 system.
fn solve8(mut a: [[f64; 9]; 8]) -> Option<[f64; 8]> {
    for col in 0..8 {
        let pivot = (col..8).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < SINGULAR_EPS {
            return None;
        }
        a.swap(col, pivot);
        for row in 0..8 {
            if row == col {
                continue;
            }
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..9 {
                a[row][k] -= factor * a[col][k];
            }
        }
    }
    let mut x = [0.0; 8];
    for (i, xi) in x.iter_mut().enumerate() {
        *xi = a[i][8] / a[i][i];
        if !xi.is_finite() {
            return None;
        }
    }
    Some(x)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
