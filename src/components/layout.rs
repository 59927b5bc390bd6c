//! Layouts that place per-unit text layers relative to each other.
//!
//! Both layouts read only layer sizes and order; nothing is rasterized.

use crate::components::component::{component_meta, component_union};
use crate::components::Component;
use crate::foundation::core::{Affine, Point};
use crate::foundation::error::SynthResult;
use crate::foundation::random::{SynthRng, chance, int_inclusive};
use crate::layers::Layer;
use crate::layers::placement::Placement;

/// Where a line sits inside the block along the flow axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAlign {
    /// Left (or top when vertical).
    Start,
    /// Centred.
    Middle,
    /// Right (or bottom when vertical).
    End,
    /// Spread units so every multi-unit line spans the block.
    Justify,
}

/// Where a unit sits inside its line across the flow axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineAlign {
    /// Top (or left when vertical).
    Start,
    /// Centred.
    Middle,
    /// Bottom (or right when vertical).
    End,
}

/// Configuration of a [`FlowLayout`].
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowLayout {
    /// Inclusive gap range between units.
    pub space: (i64, i64),
    /// Inclusive gap range between lines.
    pub line_space: (i64, i64),
    /// Wrap once a line would exceed this extent.
    pub length: Option<f64>,
    /// Candidate line alignments, drawn uniformly.
    pub align: Vec<FlowAlign>,
    /// Candidate unit alignments inside a line, drawn uniformly.
    pub line_align: Vec<LineAlign>,
    /// Probability of flowing right-to-left (bottom-to-top when vertical).
    pub reverse: f64,
    /// Flow top to bottom.
    pub vertical: bool,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self {
            space: (0, 0),
            line_space: (0, 0),
            length: None,
            align: vec![FlowAlign::Start],
            line_align: vec![LineAlign::Middle],
            reverse: 0.0,
            vertical: false,
        }
    }
}

component_meta! {
    /// Resolved [`FlowLayout`] parameters.
    pub struct FlowLayoutMeta / FlowLayoutPartial {
        /// Gap between units.
        pub space: i64,
        /// Gap between lines.
        pub line_space: i64,
        /// Wrap extent.
        pub length: Option<f64>,
        /// Line alignment.
        pub align: FlowAlign,
        /// Unit alignment inside a line.
        pub line_align: LineAlign,
        /// Flow backwards.
        pub reverse: bool,
        /// Flow top to bottom.
        pub vertical: bool,
    }
}

fn pick<T: Copy>(rng: &mut SynthRng, options: &[T], fallback: T) -> T {
    if options.is_empty() {
        return fallback;
    }
    options[int_inclusive(rng, (0, options.len() as i64 - 1)) as usize]
}

/// `(main, cross)` extents for the flow direction.
fn extents(layer: &Layer, vertical: bool) -> (f64, f64) {
    let (w, h) = (layer.width(), layer.height());
    if vertical { (h, w) } else { (w, h) }
}

/// Split unit indices into lines no longer than `length`; a unit longer than `length` gets its
/// own line.
fn wrap(mains: &[f64], space: f64, length: Option<f64>) -> Vec<Vec<usize>> {
    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut extent = 0.0;
    for (i, m) in mains.iter().enumerate() {
        let next = if current.is_empty() { *m } else { extent + space + m };
        if let Some(limit) = length
            && !current.is_empty()
            && next > limit
        {
            lines.push(std::mem::take(&mut current));
            extent = *m;
        } else {
            extent = next;
        }
        current.push(i);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

impl FlowLayoutMeta {
    /// Indices of `layers` on each line, in flow order.
    pub fn lines(&self, layers: &[Layer]) -> Vec<Vec<usize>> {
        let mains: Vec<f64> = layers.iter().map(|l| extents(l, self.vertical).0).collect();
        wrap(&mains, self.space as f64, self.length)
    }
}

impl Component for FlowLayout {
    type Meta = FlowLayoutMeta;
    type Partial = FlowLayoutPartial;

    fn sample(&self, rng: &mut SynthRng, partial: FlowLayoutPartial) -> SynthResult<FlowLayoutMeta> {
        let space = match partial.space {
            Some(v) => v,
            None => int_inclusive(rng, self.space),
        };
        let line_space = match partial.line_space {
            Some(v) => v,
            None => int_inclusive(rng, self.line_space),
        };
        let length = partial.length.unwrap_or(self.length);
        let align = match partial.align {
            Some(v) => v,
            None => pick(rng, &self.align, FlowAlign::Start),
        };
        let line_align = match partial.line_align {
            Some(v) => v,
            None => pick(rng, &self.line_align, LineAlign::Middle),
        };
        let reverse = partial.reverse.unwrap_or_else(|| chance(rng, self.reverse));
        let vertical = partial.vertical.unwrap_or(self.vertical);
        Ok(FlowLayoutMeta {
            space,
            line_space,
            length,
            align,
            line_align,
            reverse,
            vertical,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &FlowLayoutMeta) -> SynthResult<()> {
        let vertical = meta.vertical;
        let space = meta.space as f64;
        let sizes: Vec<(f64, f64)> = layers.iter().map(|l| extents(l, vertical)).collect();
        let mains: Vec<f64> = sizes.iter().map(|s| s.0).collect();
        let lines = meta.lines(layers);

        let line_extent = |line: &[usize]| {
            line.iter().map(|&i| mains[i]).sum::<f64>() + space * line.len().saturating_sub(1) as f64
        };
        let block = lines
            .iter()
            .map(|l| line_extent(l))
            .fold(0.0, f64::max);

        let mut cross_start = 0.0;
        for line in &lines {
            let extent = line_extent(line);
            let cross = line.iter().map(|&i| sizes[i].1).fold(0.0, f64::max);
            let residual = block - extent;
            let (offset, spread) = match meta.align {
                FlowAlign::Start => (0.0, 0.0),
                FlowAlign::Middle => (residual / 2.0, 0.0),
                FlowAlign::End => (residual, 0.0),
                FlowAlign::Justify if line.len() > 1 => (0.0, residual / (line.len() - 1) as f64),
                FlowAlign::Justify => (0.0, 0.0),
            };
            let mut main = offset;
            for (k, &i) in line.iter().enumerate() {
                let (m, c) = sizes[i];
                let along = main + spread * k as f64;
                let along = if meta.reverse { -(along + m) } else { along };
                let across = cross_start
                    + match meta.line_align {
                        LineAlign::Start => 0.0,
                        LineAlign::Middle => (cross - c) / 2.0,
                        LineAlign::End => cross - c,
                    };
                let topleft = if vertical {
                    Point::new(across, along)
                } else {
                    Point::new(along, across)
                };
                layers[i].set_topleft(topleft);
                main += m + space;
            }
            cross_start += cross + meta.line_space as f64;
        }
        Ok(())
    }
}

/// Configuration of a [`CurveLayout`].
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurveLayout {
    /// Inclusive range of the sagitta in pixels.
    pub curve: (i64, i64),
    /// Inclusive gap range between units.
    pub space: (i64, i64),
    /// Probability of bending toward negative cross-axis.
    pub convex: f64,
    /// Probability of leaving units unrotated.
    pub upward: f64,
    /// Lay units top to bottom.
    pub vertical: bool,
}

impl Default for CurveLayout {
    fn default() -> Self {
        Self {
            curve: (10, 20),
            space: (0, 0),
            convex: 0.5,
            upward: 0.5,
            vertical: false,
        }
    }
}

component_meta! {
    /// Resolved [`CurveLayout`] parameters.
    pub struct CurveLayoutMeta / CurveLayoutPartial {
        /// Sagitta at the outermost unit.
        pub curve: i64,
        /// Gap between units.
        pub space: i64,
        /// Bend direction.
        pub convex: bool,
        /// Skip tangent rotation.
        pub upward: bool,
        /// Lay units top to bottom.
        pub vertical: bool,
    }
}

impl Component for CurveLayout {
    type Meta = CurveLayoutMeta;
    type Partial = CurveLayoutPartial;

    fn sample(
        &self,
        rng: &mut SynthRng,
        partial: CurveLayoutPartial,
    ) -> SynthResult<CurveLayoutMeta> {
        let curve = match partial.curve {
            Some(v) => v,
            None => int_inclusive(rng, self.curve),
        };
        let space = match partial.space {
            Some(v) => v,
            None => int_inclusive(rng, self.space),
        };
        let convex = partial.convex.unwrap_or_else(|| chance(rng, self.convex));
        let upward = partial.upward.unwrap_or_else(|| chance(rng, self.upward));
        let vertical = partial.vertical.unwrap_or(self.vertical);
        Ok(CurveLayoutMeta {
            curve,
            space,
            convex,
            upward,
            vertical,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &CurveLayoutMeta) -> SynthResult<()> {
        if layers.is_empty() {
            return Ok(());
        }
        let orientation = if meta.convex { -1.0 } else { 1.0 };
        let space = meta.space as f64;
        let step_w = layers.iter().map(|l| l.width()).fold(0.0, f64::max) + space;
        let step_h = layers.iter().map(|l| l.height()).fold(0.0, f64::max) + space;
        let mid = (layers.len() - 1) as f64 / 2.0;
        let sagitta = meta.curve as f64 * orientation;

        for (idx, layer) in layers.iter_mut().enumerate() {
            let t = idx as f64 - mid;
            let (center, angle) = if meta.vertical {
                let half = step_h * mid;
                let a = if half > 0.0 { sagitta / (half * half) } else { 0.0 };
                let y = step_h * t;
                (Point::new(a * y * y, y), -(2.0 * a * y).atan())
            } else {
                let half = step_w * mid;
                let a = if half > 0.0 { sagitta / (half * half) } else { 0.0 };
                let x = step_w * t;
                (Point::new(x, a * x * x), (2.0 * a * x).atan())
            };
            layer.set_center(center);
            if !meta.upward && angle != 0.0 {
                layer.transform_affine(Affine::rotate_about(angle, center));
            }
        }
        Ok(())
    }
}

component_union! {
    /// Either layout, for use under a [`Selector`](crate::components::Selector).
    pub enum Layout / LayoutMeta / LayoutPartial {
        Flow(FlowLayout),
        Curve(CurveLayout),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/layout.rs"]
mod tests;
