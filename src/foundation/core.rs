//! Colours, boxes and quads.

pub use kurbo::{Affine, Point, Vec2};

/// Layer pixels: RGBA, straight alpha, every channel in `[0, 255]`.
pub type Raster = image::Rgba32FImage;

/// Straight-alpha 8-bit colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha (`255` = opaque).
    pub a: u8,
}

impl Rgba8 {
    /// Build a colour from channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a colour from an rgb triple and an alpha in `[0, 1]`.
    pub fn from_rgb_alpha(rgb: [u8; 3], alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(rgb[0], rgb[1], rgb[2], a)
    }

    /// Channels as raster values.
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r),
            f32::from(self.g),
            f32::from(self.b),
            f32::from(self.a),
        ]
    }
}

/// Axis-aligned box `[x, y, width, height]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bbox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Bbox {
    /// Build a box from its origin and extent.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A box at the origin.
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Left edge.
    pub fn left(self) -> f64 {
        self.x
    }

    /// Top edge.
    pub fn top(self) -> f64 {
        self.y
    }

    /// Right edge.
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// Top-left corner.
    pub fn topleft(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Extent as a vector.
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Return `true` when either extent is zero or negative.
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Axis-aligned rectangle quad covering this box.
    pub fn to_quad(self) -> Quad {
        Quad([
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ])
    }
}

/// Four corners: top-left, top-right, bottom-right, bottom-left in source order.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quad(pub [Point; 4]);

impl Default for Quad {
    fn default() -> Self {
        Self([Point::ZERO; 4])
    }
}

impl Quad {
    /// Rectangle quad for an image of `width`×`height` at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Bbox::from_size(width, height).to_quad()
    }

    /// The corners.
    pub fn points(&self) -> &[Point; 4] {
        &self.0
    }

    /// Tight axis-aligned bounding box.
    pub fn bbox(&self) -> Bbox {
        let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
        let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.0 {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Bbox::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Mean of the four corners.
    pub fn centroid(&self) -> Point {
        let sum = self
            .0
            .iter()
            .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
        (sum / 4.0).to_point()
    }

    /// Map every corner through `f`.
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Self {
        Self(self.0.map(f))
    }

    /// Translate every corner.
    pub fn translate(&self, delta: Vec2) -> Self {
        self.map(|p| p + delta)
    }

    /// Apply an affine map to every corner.
    pub fn transform(&self, affine: Affine) -> Self {
        self.map(|p| affine * p)
    }

    /// Union rectangle of several quads, or `None` when `quads` is empty.
    pub fn union<'a>(quads: impl IntoIterator<Item = &'a Quad>) -> Option<Quad> {
        let mut iter = quads.into_iter();
        let first = iter.next()?.bbox();
        let (mut x0, mut y0, mut x1, mut y1) =
            (first.left(), first.top(), first.right(), first.bottom());
        for q in iter {
            let b = q.bbox();
            x0 = x0.min(b.left());
            y0 = y0.min(b.top());
            x1 = x1.max(b.right());
            y1 = y1.max(b.bottom());
        }
        Some(Bbox::new(x0, y0, x1 - x0, y1 - y0).to_quad())
    }

    /// Return `true` when every corner is within `eps` of the other quad's.
    pub fn approx_eq(&self, other: &Quad, eps: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps)
    }

    /// Twice the signed area; zero for degenerate quads.
    pub fn signed_area2(&self) -> f64 {
        let p = &self.0;
        (0..4)
            .map(|i| {
                let (a, b) = (p[i], p[(i + 1) % 4]);
                a.x * b.y - b.x * a.y
            })
            .sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
