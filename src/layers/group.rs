//! Group views over layer arenas.

use crate::foundation::core::{Affine, Bbox, Quad, Raster};
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::math::Homography;
use crate::layers::layer::Layer;
use crate::layers::placement::Placement;
use crate::render::composite::BlendMode;
use crate::render::raster::{self, pixel_extent};
use crate::render::warp::paste_image;

/// An ordered view over layers held in a caller-owned slice.
///
/// The group borrows the slice mutably for its lifetime, so no other view can mutate the same
/// layers while it exists. Its quad is the axis-aligned union rectangle of the member quads.
#[derive(Debug)]
pub struct Group<'a> {
    layers: &'a mut [Layer],
    members: Vec<usize>,
}

impl<'a> Group<'a> {
    /// Group over every layer of the slice, in slice order.
    pub fn new(layers: &'a mut [Layer]) -> Self {
        let members = (0..layers.len()).collect();
        Self { layers, members }
    }

    /// Group over the given member indices, in the given order.
    pub fn with_members(
        layers: &'a mut [Layer],
        members: impl IntoIterator<Item = usize>,
    ) -> SynthResult<Self> {
        let members: Vec<usize> = members.into_iter().collect();
        if let Some(bad) = members.iter().find(|&&i| i >= layers.len()) {
            return Err(SynthError::config(format!(
                "group member {bad} out of range for {} layers",
                layers.len()
            )));
        }
        let mut seen = members.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != members.len() {
            return Err(SynthError::config("group members must be distinct"));
        }
        Ok(Self { layers, members })
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Return `true` when the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member indices into the underlying slice.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Members in group order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.members.iter().map(|&i| &self.layers[i])
    }

    /// Mutable member at group position `pos`.
    pub fn get_mut(&mut self, pos: usize) -> Option<&mut Layer> {
        let idx = *self.members.get(pos)?;
        self.layers.get_mut(idx)
    }

    /// Apply `f` to every member in group order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Layer)) {
        for &i in &self.members {
            f(&mut self.layers[i]);
        }
    }

    /// Map every member quad through a homography.
    pub fn transform(&mut self, h: &Homography) -> SynthResult<()> {
        let quads = self
            .iter()
            .map(|l| h.apply_quad(&l.quad()))
            .collect::<SynthResult<Vec<_>>>()?;
        for (&i, q) in self.members.iter().zip(quads) {
            self.layers[i].set_quad(q);
        }
        Ok(())
    }

    /// Move the group so its quad becomes `quad`, carrying every member along the same
    /// perspective transform. No-op for an empty group.
    pub fn set_quad(&mut self, quad: Quad) -> SynthResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        let h = Homography::from_quads(&self.quad(), &quad)?;
        self.transform(&h)
    }

    /// [`Group::set_quad`] with the rectangle of `bbox`.
    pub fn set_bbox(&mut self, bbox: Bbox) -> SynthResult<()> {
        self.set_quad(bbox.to_quad())
    }

    /// Rasterize onto a transparent canvas covering `bbox` (default: the group bbox).
    ///
    /// Members are painted last to first, so earlier members end up on top.
    pub fn output(&self, bbox: Option<Bbox>) -> Raster {
        let bbox = bbox.unwrap_or_else(|| self.bbox());
        let mut canvas = raster::transparent(pixel_extent(bbox.width), pixel_extent(bbox.height));
        if canvas.width() == 0 || canvas.height() == 0 {
            return canvas;
        }
        let origin = bbox.topleft().to_vec2();
        for &i in self.members.iter().rev() {
            let layer = &self.layers[i];
            paste_image(
                layer.image(),
                &mut canvas,
                &layer.quad().translate(-origin),
                BlendMode::Normal,
            );
        }
        canvas
    }

    /// Flatten into one new layer placed at the group's top-left.
    pub fn merge(&self) -> Layer {
        Layer::at(self.output(None), self.topleft())
    }

    /// Deep copies of the members in group order.
    pub fn to_layers(&self) -> Vec<Layer> {
        self.iter().cloned().collect()
    }
}

impl Placement for Group<'_> {
    fn quad(&self) -> Quad {
        let quads: Vec<Quad> = self.iter().map(Placement::quad).collect();
        Quad::union(&quads).unwrap_or_default()
    }

    fn transform_affine(&mut self, affine: Affine) {
        self.for_each_mut(|l| l.transform_affine(affine));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/group.rs"]
mod tests;
