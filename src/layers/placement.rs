//! Box-derived accessors shared by layers and groups.

use crate::foundation::core::{Affine, Bbox, Point, Quad, Vec2};

/// Position accessors shared by [`Layer`](crate::layers::Layer) and
/// [`Group`](crate::layers::Group).
///
/// Edge and corner accessors read the bbox; `mid*` accessors mix the quad centroid with a bbox edge;
/// `center*` read the centroid. Every position setter translates the whole quad.
pub trait Placement {
    /// Current placement quad.
    fn quad(&self) -> Quad;

    /// Apply an affine map to the placement.
    fn transform_affine(&mut self, affine: Affine);

    /// Tight bounding box of [`Placement::quad`].
    fn bbox(&self) -> Bbox {
        self.quad().bbox()
    }

    /// Translate the placement.
    fn translate(&mut self, delta: Vec2) {
        if delta != Vec2::ZERO {
            self.transform_affine(Affine::translate(delta));
        }
    }

    /// Bbox extent.
    fn size(&self) -> Vec2 {
        self.bbox().size()
    }

    /// Bbox width.
    fn width(&self) -> f64 {
        self.bbox().width
    }

    /// Bbox height.
    fn height(&self) -> f64 {
        self.bbox().height
    }

    /// Scale about the bbox top-left so the bbox takes `size`; zero extents stay unscaled.
    fn set_size(&mut self, size: Vec2) {
        let b = self.bbox();
        let sx = if b.width > 0.0 { size.x / b.width } else { 1.0 };
        let sy = if b.height > 0.0 { size.y / b.height } else { 1.0 };
        let origin = b.topleft().to_vec2();
        self.transform_affine(
            Affine::translate(origin) * Affine::scale_non_uniform(sx, sy) * Affine::translate(-origin),
        );
    }

    /// Scale to a new bbox width.
    fn set_width(&mut self, width: f64) {
        let h = self.height();
        self.set_size(Vec2::new(width, h));
    }

    /// Scale to a new bbox height.
    fn set_height(&mut self, height: f64) {
        let w = self.width();
        self.set_size(Vec2::new(w, height));
    }

    /// Left edge.
    fn left(&self) -> f64 {
        self.bbox().left()
    }

    /// Right edge.
    fn right(&self) -> f64 {
        self.bbox().right()
    }

    /// Top edge.
    fn top(&self) -> f64 {
        self.bbox().top()
    }

    /// Bottom edge.
    fn bottom(&self) -> f64 {
        self.bbox().bottom()
    }

    /// Move so the left edge sits at `v`.
    fn set_left(&mut self, v: f64) {
        let d = v - self.left();
        self.translate(Vec2::new(d, 0.0));
    }

    /// Move so the right edge sits at `v`.
    fn set_right(&mut self, v: f64) {
        let d = v - self.right();
        self.translate(Vec2::new(d, 0.0));
    }

    /// Move so the top edge sits at `v`.
    fn set_top(&mut self, v: f64) {
        let d = v - self.top();
        self.translate(Vec2::new(0.0, d));
    }

    /// Move so the bottom edge sits at `v`.
    fn set_bottom(&mut self, v: f64) {
        let d = v - self.bottom();
        self.translate(Vec2::new(0.0, d));
    }

    /// Bbox top-left.
    fn topleft(&self) -> Point {
        let b = self.bbox();
        Point::new(b.left(), b.top())
    }

    /// Bbox top-right.
    fn topright(&self) -> Point {
        let b = self.bbox();
        Point::new(b.right(), b.top())
    }

    /// Bbox bottom-left.
    fn bottomleft(&self) -> Point {
        let b = self.bbox();
        Point::new(b.left(), b.bottom())
    }

    /// Bbox bottom-right.
    fn bottomright(&self) -> Point {
        let b = self.bbox();
        Point::new(b.right(), b.bottom())
    }

    /// Centroid x on the top edge.
    fn midtop(&self) -> Point {
        Point::new(self.centerx(), self.top())
    }

    /// Centroid x on the bottom edge.
    fn midbottom(&self) -> Point {
        Point::new(self.centerx(), self.bottom())
    }

    /// Centroid y on the left edge.
    fn midleft(&self) -> Point {
        Point::new(self.left(), self.centery())
    }

    /// Centroid y on the right edge.
    fn midright(&self) -> Point {
        Point::new(self.right(), self.centery())
    }

    /// Quad centroid.
    fn center(&self) -> Point {
        self.quad().centroid()
    }

    /// Centroid x.
    fn centerx(&self) -> f64 {
        self.center().x
    }

    /// Centroid y.
    fn centery(&self) -> f64 {
        self.center().y
    }

    /// Move so the bbox top-left sits at `p`.
    fn set_topleft(&mut self, p: Point) {
        let d = p - self.topleft();
        self.translate(d);
    }

    /// Move so the bbox top-right sits at `p`.
    fn set_topright(&mut self, p: Point) {
        let d = p - self.topright();
        self.translate(d);
    }

    /// Move so the bbox bottom-left sits at `p`.
    fn set_bottomleft(&mut self, p: Point) {
        let d = p - self.bottomleft();
        self.translate(d);
    }

    /// Move so the bbox bottom-right sits at `p`.
    fn set_bottomright(&mut self, p: Point) {
        let d = p - self.bottomright();
        self.translate(d);
    }

    /// Move so [`Placement::midtop`] sits at `p`.
    fn set_midtop(&mut self, p: Point) {
        let d = p - self.midtop();
        self.translate(d);
    }

    /// Move so [`Placement::midbottom`] sits at `p`.
    fn set_midbottom(&mut self, p: Point) {
        let d = p - self.midbottom();
        self.translate(d);
    }

    /// Move so [`Placement::midleft`] sits at `p`.
    fn set_midleft(&mut self, p: Point) {
        let d = p - self.midleft();
        self.translate(d);
    }

    /// Move so [`Placement::midright`] sits at `p`.
    fn set_midright(&mut self, p: Point) {
        let d = p - self.midright();
        self.translate(d);
    }

    /// Move so the centroid sits at `p`.
    fn set_center(&mut self, p: Point) {
        let d = p - self.center();
        self.translate(d);
    }

    /// Move so the centroid x is `v`.
    fn set_centerx(&mut self, v: f64) {
        let d = v - self.centerx();
        self.translate(Vec2::new(d, 0.0));
    }

    /// Move so the centroid y is `v`.
    fn set_centery(&mut self, v: f64) {
        let d = v - self.centery();
        self.translate(Vec2::new(0.0, d));
    }
}
