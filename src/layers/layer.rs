//! The quad-tracked image layer.

use image::{DynamicImage, RgbaImage};

use crate::foundation::core::{Affine, Bbox, Point, Quad, Raster, Rgba8};
use crate::layers::placement::Placement;
use crate::render::composite::BlendMode;
use crate::render::raster::{self, pixel_extent};
use crate::render::warp::{erase_image, paste_image};

/// An image fragment and the quad its four corners occupy in the shared coordinate space.
///
/// `bbox` is always derived from `quad`. Setting the bbox resets the quad to an axis-aligned
/// rectangle; setting the quad never loses information.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    image: Raster,
    quad: Quad,
}

impl Layer {
    /// Layer at the origin covering the image's own extent.
    pub fn new(image: Raster) -> Self {
        let quad = Quad::from_size(f64::from(image.width()), f64::from(image.height()));
        Self { image, quad }
    }

    /// Layer with an explicit placement.
    pub fn with_quad(image: Raster, quad: Quad) -> Self {
        Self { image, quad }
    }

    /// Layer whose quad is the image rectangle with its top-left at `topleft`.
    pub fn at(image: Raster, topleft: Point) -> Self {
        let mut layer = Self::new(image);
        layer.quad = layer.quad.translate(topleft.to_vec2());
        layer
    }

    /// Solid-colour layer.
    pub fn rect(width: u32, height: u32, color: Rgba8) -> Self {
        Self::new(raster::filled(width, height, color))
    }

    /// Layer from an 8-bit image.
    pub fn from_rgba8(img: &RgbaImage) -> Self {
        Self::new(raster::from_rgba8(img))
    }

    /// Layer from any decoded image; images without alpha become fully opaque.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        Self::new(raster::from_dynamic(img))
    }

    /// Pixels in source space.
    pub fn image(&self) -> &Raster {
        &self.image
    }

    /// Mutable pixels; the quad is left untouched.
    pub fn image_mut(&mut self) -> &mut Raster {
        &mut self.image
    }

    /// Replace the pixels, keeping the quad.
    pub fn set_image(&mut self, image: Raster) {
        self.image = image;
    }

    /// Split into pixels and quad.
    pub fn into_parts(self) -> (Raster, Quad) {
        (self.image, self.quad)
    }

    /// Replace the quad.
    pub fn set_quad(&mut self, quad: Quad) {
        self.quad = quad;
    }

    /// Reset the quad to the rectangle `bbox`, discarding any skew or perspective.
    pub fn set_bbox(&mut self, bbox: Bbox) {
        self.quad = bbox.to_quad();
    }

    /// Rasterize onto a transparent canvas covering `bbox` (default: the layer's own bbox).
    ///
    /// A zero or negative extent yields an empty raster.
    pub fn output(&self, bbox: Option<Bbox>) -> Raster {
        let bbox = bbox.unwrap_or_else(|| self.bbox());
        let mut canvas = raster::transparent(pixel_extent(bbox.width), pixel_extent(bbox.height));
        if canvas.width() > 0 && canvas.height() > 0 {
            let local = self.quad.translate(-bbox.topleft().to_vec2());
            paste_image(&self.image, &mut canvas, &local, BlendMode::Normal);
        }
        canvas
    }

    /// New layer over this layer's bbox with `other` composited on top.
    pub fn paste(&self, other: &Layer, mode: BlendMode) -> Layer {
        let topleft = self.topleft();
        let mut canvas = self.output(None);
        paste_image(
            &other.image,
            &mut canvas,
            &other.quad.translate(-topleft.to_vec2()),
            mode,
        );
        Layer::at(canvas, topleft)
    }

    /// New layer over this layer's bbox with `other`'s alpha cut out.
    pub fn erase(&self, other: &Layer) -> Layer {
        let topleft = self.topleft();
        let mut canvas = self.output(None);
        erase_image(
            &other.image,
            &mut canvas,
            &other.quad.translate(-topleft.to_vec2()),
        );
        Layer::at(canvas, topleft)
    }
}

impl Placement for Layer {
    fn quad(&self) -> Quad {
        self.quad
    }

    fn transform_affine(&mut self, affine: Affine) {
        self.quad = self.quad.transform(affine);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/layer.rs"]
mod tests;
