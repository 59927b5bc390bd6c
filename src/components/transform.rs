//! Geometric transforms over layers: group-level warps and per-layer canvas edits.

use crate::components::Component;
use crate::components::component::{component_meta, component_union};
use crate::foundation::core::{Affine, Bbox, Point, Quad, Vec2};
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{Categorical, SynthRng, chance, int_inclusive, uniform};
use crate::layers::placement::Placement;
use crate::layers::{Group, Layer};
use crate::render::raster;

/// Repeat `values` cyclically into `N` entries; 1 to `N` entries are accepted.
fn tile<T: Copy, const N: usize>(values: &[T], what: &str) -> SynthResult<[T; N]> {
    if values.is_empty() || values.len() > N {
        return Err(SynthError::config(format!(
            "{what} must have 1 to {N} entries, got {}",
            values.len()
        )));
    }
    Ok(std::array::from_fn(|i| values[i % values.len()]))
}

fn uniform_each<const N: usize>(
    rng: &mut SynthRng,
    ranges: &[(f64, f64)],
    what: &str,
) -> SynthResult<[f64; N]> {
    let ranges: [(f64, f64); N] = tile(ranges, what)?;
    Ok(ranges.map(|r| uniform(rng, r)))
}

fn int_each<const N: usize>(
    rng: &mut SynthRng,
    ranges: &[(i64, i64)],
    what: &str,
) -> SynthResult<[i64; N]> {
    let ranges: [(i64, i64); N] = tile(ranges, what)?;
    Ok(ranges.map(|r| int_inclusive(rng, r)))
}

fn pick_axis(rng: &mut SynthRng, weights: &[f64]) -> SynthResult<u8> {
    Ok(Categorical::new(2, Some(weights))?.sample(rng) as u8)
}

/// Align values in `[-1, 1]` mapped to `[0, 1]`.
fn unit_aligns<const N: usize>(aligns: [f64; N]) -> [f64; N] {
    aligns.map(|a| (a.clamp(-1.0, 1.0) + 1.0) / 2.0)
}

/// Replace a layer's pixels and put its new bbox at `topleft`.
fn reset_layer(layer: &mut Layer, image: crate::foundation::core::Raster, topleft: Point) {
    let (w, h) = image.dimensions();
    layer.set_image(image);
    layer.set_bbox(Bbox::new(topleft.x, topleft.y, f64::from(w), f64::from(h)));
}

/// Corner offsets that move each side of the group quad.
///
/// Sides are indexed top, right, bottom, left; `values` shrink (positive) or grow (negative) a
/// side symmetrically and `aligns` slide it along its own direction.
fn side_offsets(values: [f64; 4], aligns: [f64; 4]) -> [Vec2; 4] {
    let a = std::array::from_fn::<f64, 4, _>(|i| aligns[i] * values[i].abs());
    [
        Vec2::new(values[0] + a[0], values[3] + a[3]),
        Vec2::new(-values[0] + a[0], values[1] + a[1]),
        Vec2::new(-values[2] + a[2], -values[1] + a[1]),
        Vec2::new(values[2] + a[2], -values[3] + a[3]),
    ]
}

fn offset_group(layers: &mut [Layer], offsets: [Vec2; 4]) -> SynthResult<()> {
    let mut group = Group::new(layers);
    if group.is_empty() {
        return Ok(());
    }
    let origin = group.quad();
    let target = Quad(std::array::from_fn(|i| origin.0[i] + offsets[i]));
    group.set_quad(target)
}

/// Side shrink amounts for `sizes` (top, right, bottom, left extents).
fn side_values(sizes: [f64; 4], pxs: Option<[f64; 4]>, percents: Option<[f64; 4]>) -> [f64; 4] {
    let new_sizes = match (pxs, percents) {
        (Some(p), _) => std::array::from_fn(|i| sizes[i] + p[i]),
        (None, Some(p)) => std::array::from_fn(|i| sizes[i] * p[i]),
        (None, None) => sizes,
    };
    std::array::from_fn(|i| (sizes[i] - new_sizes[i]) / 2.0)
}

// ----------------------------
// Align
// ----------------------------

/// Aligns every layer inside the union box of all layers.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Align {
    /// Horizontal and vertical align ranges in `[-1, 1]`; one entry applies to both.
    pub aligns: Vec<(f64, f64)>,
}

impl Default for Align {
    fn default() -> Self {
        Self {
            aligns: vec![(-1.0, 1.0), (-1.0, 1.0)],
        }
    }
}

component_meta! {
    /// Resolved [`Align`].
    pub struct AlignMeta / AlignPartial {
        /// `-1` start, `0` centre, `1` end, per axis.
        pub aligns: [f64; 2],
    }
}

impl Component for Align {
    type Meta = AlignMeta;
    type Partial = AlignPartial;

    fn sample(&self, rng: &mut SynthRng, partial: AlignPartial) -> SynthResult<AlignMeta> {
        let aligns = match partial.aligns {
            Some(a) => a,
            None => uniform_each(rng, &self.aligns, "aligns")?,
        };
        Ok(AlignMeta { aligns })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &AlignMeta) -> SynthResult<()> {
        let [ax, ay] = unit_aligns(meta.aligns);
        let group = Group::new(layers);
        let (topleft, size) = (group.topleft(), group.size());
        drop(group);
        for layer in layers.iter_mut() {
            let slack = size - layer.size();
            layer.set_topleft(topleft + Vec2::new(slack.x * ax, slack.y * ay));
        }
        Ok(())
    }
}

// ----------------------------
// Crop
// ----------------------------

/// Crops each layer's rendered pixels by a fixed or relative amount.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Crop {
    /// Horizontal and vertical pixel ranges.
    pub pxs: Option<Vec<(i64, i64)>>,
    /// Horizontal and vertical fraction ranges, used when `pxs` is absent.
    pub percents: Option<Vec<(f64, f64)>>,
    /// How the cropped amount splits between the two sides of each axis.
    pub aligns: Vec<(f64, f64)>,
}

impl Default for Crop {
    fn default() -> Self {
        Self {
            pxs: None,
            percents: None,
            aligns: vec![(-1.0, 1.0), (-1.0, 1.0)],
        }
    }
}

component_meta! {
    /// Resolved [`Crop`].
    pub struct CropMeta / CropPartial {
        /// Pixels removed per axis.
        pub pxs: Option<[i64; 2]>,
        /// Fraction removed per axis.
        pub percents: Option<[f64; 2]>,
        /// Split per axis: `-1` all from the end side, `1` all from the start side.
        pub aligns: [f64; 2],
    }
}

impl Component for Crop {
    type Meta = CropMeta;
    type Partial = CropPartial;

    fn sample(&self, rng: &mut SynthRng, partial: CropPartial) -> SynthResult<CropMeta> {
        let pxs = match (partial.pxs, &self.pxs) {
            (Some(v), _) => v,
            (None, Some(r)) => Some(int_each(rng, r, "pxs")?),
            (None, None) => None,
        };
        let percents = match (partial.percents, &self.percents) {
            (Some(v), _) => v,
            (None, Some(r)) => Some(uniform_each(rng, r, "percents")?),
            (None, None) => None,
        };
        let aligns = match partial.aligns {
            Some(a) => a,
            None => uniform_each(rng, &self.aligns, "aligns")?,
        };
        Ok(CropMeta {
            pxs,
            percents,
            aligns,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &CropMeta) -> SynthResult<()> {
        let [ax, ay] = unit_aligns(meta.aligns);
        for layer in layers {
            let image = layer.output(None);
            let (w, h) = (f64::from(image.width()), f64::from(image.height()));
            let (cx, cy) = match (meta.pxs, meta.percents) {
                (Some([x, y]), _) => (x as f64, y as f64),
                (None, Some([x, y])) => (x * w, y * h),
                (None, None) => (0.0, 0.0),
            };
            let cx = cx.clamp(0.0, (w - 1.0).max(0.0));
            let cy = cy.clamp(0.0, (h - 1.0).max(0.0));
            let left = (cx * ax).round();
            let top = (cy * ay).round();
            let right = cx.round() - left;
            let bottom = cy.round() - top;
            let cropped = raster::crop(&image, top as u32, right as u32, bottom as u32, left as u32);
            let topleft = layer.topleft() + Vec2::new(left, top);
            reset_layer(layer, cropped, topleft);
        }
        Ok(())
    }
}

// ----------------------------
// Fit
// ----------------------------

/// Trims each layer to the bounds of its visible pixels.
#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fit {}

component_meta! {
    /// [`Fit`] draws nothing.
    pub struct FitMeta / FitPartial {}
}

impl Component for Fit {
    type Meta = FitMeta;
    type Partial = FitPartial;

    fn sample(&self, _rng: &mut SynthRng, _partial: FitPartial) -> SynthResult<FitMeta> {
        Ok(FitMeta {})
    }

    fn apply_meta(&self, layers: &mut [Layer], _meta: &FitMeta) -> SynthResult<()> {
        for layer in layers {
            let image = layer.output(None);
            let (w, h) = image.dimensions();
            let (x0, y0, x1, y1) = raster::alpha_bounds(&image).unwrap_or((0, 0, w, h));
            let fitted = raster::crop(&image, y0, w - x1, h - y1, x0);
            let topleft = layer.topleft() + Vec2::new(f64::from(x0), f64::from(y0));
            reset_layer(layer, fitted, topleft);
        }
        Ok(())
    }
}

// ----------------------------
// Pad
// ----------------------------

/// Pads each layer's rendered pixels by a fixed or relative amount per side.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Pad {
    /// Pixel ranges for top, right, bottom, left; fewer entries repeat.
    pub pxs: Option<Vec<(i64, i64)>>,
    /// Fraction ranges of the layer height (top, bottom) or width (right, left).
    pub percents: Option<Vec<(f64, f64)>>,
}

component_meta! {
    /// Resolved [`Pad`].
    pub struct PadMeta / PadPartial {
        /// Pixels per side.
        pub pxs: Option<[i64; 4]>,
        /// Fractions per side.
        pub percents: Option<[f64; 4]>,
    }
}

impl Component for Pad {
    type Meta = PadMeta;
    type Partial = PadPartial;

    fn sample(&self, rng: &mut SynthRng, partial: PadPartial) -> SynthResult<PadMeta> {
        let pxs = match (partial.pxs, &self.pxs) {
            (Some(v), _) => v,
            (None, Some(r)) => Some(int_each(rng, r, "pxs")?),
            (None, None) => None,
        };
        let percents = match (partial.percents, &self.percents) {
            (Some(v), _) => v,
            (None, Some(r)) => Some(uniform_each(rng, r, "percents")?),
            (None, None) => None,
        };
        Ok(PadMeta { pxs, percents })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &PadMeta) -> SynthResult<()> {
        for layer in layers {
            let image = layer.output(None);
            let (w, h) = (f64::from(image.width()), f64::from(image.height()));
            let sides: [f64; 4] = match (meta.pxs, meta.percents) {
                (Some(p), _) => p.map(|v| v as f64),
                (None, Some(p)) => [p[0] * h, p[1] * w, p[2] * h, p[3] * w],
                (None, None) => [0.0; 4],
            };
            let [top, right, bottom, left] = sides.map(|v| v.round().max(0.0) as u32);
            let padded = raster::pad(&image, top, right, bottom, left);
            let topleft = layer.topleft() - Vec2::new(f64::from(left), f64::from(top));
            reset_layer(layer, padded, topleft);
        }
        Ok(())
    }
}

// ----------------------------
// Margin
// ----------------------------

/// Adds transparent margins around each layer.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Margin {
    /// Inclusive top range.
    pub top: (i64, i64),
    /// Inclusive bottom range.
    pub bottom: (i64, i64),
    /// Inclusive left range.
    pub left: (i64, i64),
    /// Inclusive right range.
    pub right: (i64, i64),
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: (0, 0),
            bottom: (0, 0),
            left: (0, 0),
            right: (0, 0),
        }
    }
}

component_meta! {
    /// Resolved [`Margin`].
    pub struct MarginMeta / MarginPartial {
        /// Top pixels.
        pub top: u32,
        /// Bottom pixels.
        pub bottom: u32,
        /// Left pixels.
        pub left: u32,
        /// Right pixels.
        pub right: u32,
    }
}

impl Component for Margin {
    type Meta = MarginMeta;
    type Partial = MarginPartial;

    fn sample(&self, rng: &mut SynthRng, partial: MarginPartial) -> SynthResult<MarginMeta> {
        let mut draw = |given: Option<u32>, range| match given {
            Some(v) => v,
            None => int_inclusive(rng, range).max(0) as u32,
        };
        Ok(MarginMeta {
            top: draw(partial.top, self.top),
            bottom: draw(partial.bottom, self.bottom),
            left: draw(partial.left, self.left),
            right: draw(partial.right, self.right),
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &MarginMeta) -> SynthResult<()> {
        for layer in layers {
            let image = layer.output(None);
            let padded = raster::pad(&image, meta.top, meta.right, meta.bottom, meta.left);
            let topleft =
                layer.topleft() - Vec2::new(f64::from(meta.left), f64::from(meta.top));
            reset_layer(layer, padded, topleft);
        }
        Ok(())
    }
}

// ----------------------------
// Perspective
// ----------------------------

/// Moves the sides of the group quad independently.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Perspective {
    /// Pixel ranges added to the top, right, bottom, left side lengths.
    pub pxs: Option<Vec<(i64, i64)>>,
    /// Ratio ranges for the side lengths, used when `pxs` is absent.
    pub percents: Option<Vec<(f64, f64)>>,
    /// Slide ranges per side in `[-1, 1]`.
    pub aligns: Vec<(f64, f64)>,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            pxs: None,
            percents: None,
            aligns: vec![(-1.0, 1.0)],
        }
    }
}

component_meta! {
    /// Resolved [`Perspective`].
    pub struct PerspectiveMeta / PerspectivePartial {
        /// Side length deltas.
        pub pxs: Option<[i64; 4]>,
        /// Side length ratios.
        pub percents: Option<[f64; 4]>,
        /// Side slides.
        pub aligns: [f64; 4],
    }
}

impl Component for Perspective {
    type Meta = PerspectiveMeta;
    type Partial = PerspectivePartial;

    fn sample(&self, rng: &mut SynthRng, partial: PerspectivePartial) -> SynthResult<PerspectiveMeta> {
        let pxs = match (partial.pxs, &self.pxs) {
            (Some(v), _) => v,
            (None, Some(r)) => Some(int_each(rng, r, "pxs")?),
            (None, None) => None,
        };
        let percents = match (partial.percents, &self.percents) {
            (Some(v), _) => v,
            (None, Some(r)) => Some(uniform_each(rng, r, "percents")?),
            (None, None) => None,
        };
        let aligns = match partial.aligns {
            Some(a) => a,
            None => uniform_each(rng, &self.aligns, "aligns")?,
        };
        Ok(PerspectiveMeta {
            pxs,
            percents,
            aligns,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &PerspectiveMeta) -> SynthResult<()> {
        let size = Group::new(layers).size();
        let sizes = [size.x, size.y, size.x, size.y];
        let values = side_values(sizes, meta.pxs.map(|p| p.map(|v| v as f64)), meta.percents);
        offset_group(layers, side_offsets(values, meta.aligns))
    }
}

// ----------------------------
// Trapezoidate
// ----------------------------

/// Shrinks or grows one side of the group quad.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Trapezoidate {
    /// Weights of the top, right, bottom, left sides.
    pub weights: Vec<f64>,
    /// Pixel range added to the side length.
    pub px: Option<(i64, i64)>,
    /// Ratio range for the side length, used when `px` is absent.
    pub percent: Option<(f64, f64)>,
    /// Slide range in `[-1, 1]`.
    pub align: (f64, f64),
}

impl Default for Trapezoidate {
    fn default() -> Self {
        Self {
            weights: vec![1.0; 4],
            px: None,
            percent: None,
            align: (-1.0, 1.0),
        }
    }
}

component_meta! {
    /// Resolved [`Trapezoidate`].
    pub struct TrapezoidateMeta / TrapezoidatePartial {
        /// Side index: top, right, bottom, left.
        pub side: u8,
        /// Side length delta.
        pub px: Option<i64>,
        /// Side length ratio.
        pub percent: Option<f64>,
        /// Side slide.
        pub align: f64,
    }
}

impl Component for Trapezoidate {
    type Meta = TrapezoidateMeta;
    type Partial = TrapezoidatePartial;

    fn sample(
        &self,
        rng: &mut SynthRng,
        partial: TrapezoidatePartial,
    ) -> SynthResult<TrapezoidateMeta> {
        let side = match partial.side {
            Some(s) => s,
            None => Categorical::new(4, Some(&self.weights))?.sample(rng) as u8,
        };
        let px = match partial.px {
            Some(v) => v,
            None => self.px.map(|r| int_inclusive(rng, r)),
        };
        let percent = match partial.percent {
            Some(v) => v,
            None => self.percent.map(|r| uniform(rng, r)),
        };
        let align = partial.align.unwrap_or_else(|| uniform(rng, self.align));
        Ok(TrapezoidateMeta {
            side,
            px,
            percent,
            align,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &TrapezoidateMeta) -> SynthResult<()> {
        let side = usize::from(meta.side);
        if side >= 4 {
            return Err(SynthError::config(format!("trapezoid side {side} out of range")));
        }
        let mut pxs = [0.0; 4];
        let mut percents = [1.0; 4];
        let mut aligns = [0.0; 4];
        aligns[side] = meta.align;
        if let Some(px) = meta.px {
            pxs[side] = px as f64;
        }
        if let Some(p) = meta.percent {
            percents[side] = p;
        }
        let size = Group::new(layers).size();
        let sizes = [size.x, size.y, size.x, size.y];
        let values = side_values(
            sizes,
            meta.px.map(|_| pxs),
            meta.percent.map(|_| percents),
        );
        offset_group(layers, side_offsets(values, aligns))
    }
}

// ----------------------------
// Rotate
// ----------------------------

/// Rotates all layers about the group centre.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rotate {
    /// Angle range in degrees.
    pub angle: (f64, f64),
    /// Probability of rotating counter-clockwise.
    pub ccw: f64,
}

impl Default for Rotate {
    fn default() -> Self {
        Self {
            angle: (-45.0, 45.0),
            ccw: 0.0,
        }
    }
}

component_meta! {
    /// Resolved [`Rotate`].
    pub struct RotateMeta / RotatePartial {
        /// Degrees.
        pub angle: f64,
        /// Counter-clockwise on screen.
        pub ccw: bool,
    }
}

impl Component for Rotate {
    type Meta = RotateMeta;
    type Partial = RotatePartial;

    fn sample(&self, rng: &mut SynthRng, partial: RotatePartial) -> SynthResult<RotateMeta> {
        let angle = partial.angle.unwrap_or_else(|| uniform(rng, self.angle));
        let ccw = partial.ccw.unwrap_or_else(|| chance(rng, self.ccw));
        Ok(RotateMeta { angle, ccw })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &RotateMeta) -> SynthResult<()> {
        let mut group = Group::new(layers);
        if group.is_empty() {
            return Ok(());
        }
        let signed = if meta.ccw { meta.angle } else { -meta.angle };
        // y points down, so a positive kurbo angle turns clockwise on screen.
        let rotation = Affine::rotate_about(-signed.to_radians(), group.center());
        group.transform_affine(rotation);
        Ok(())
    }
}

// ----------------------------
// Skew
// ----------------------------

/// Shears the group quad along one axis.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Skew {
    /// Weights of the horizontal and vertical axes.
    pub weights: Vec<f64>,
    /// Angle range in degrees.
    pub angle: (f64, f64),
    /// Probability of a counter-clockwise shear.
    pub ccw: f64,
}

impl Default for Skew {
    fn default() -> Self {
        Self {
            weights: vec![1.0, 1.0],
            angle: (-30.0, 30.0),
            ccw: 0.0,
        }
    }
}

component_meta! {
    /// Resolved [`Skew`].
    pub struct SkewMeta / SkewPartial {
        /// `0` horizontal, `1` vertical.
        pub axis: u8,
        /// Degrees.
        pub angle: f64,
        /// Counter-clockwise.
        pub ccw: bool,
    }
}

impl Component for Skew {
    type Meta = SkewMeta;
    type Partial = SkewPartial;

    fn sample(&self, rng: &mut SynthRng, partial: SkewPartial) -> SynthResult<SkewMeta> {
        let axis = match partial.axis {
            Some(a) => a,
            None => pick_axis(rng, &self.weights)?,
        };
        let angle = partial.angle.unwrap_or_else(|| uniform(rng, self.angle));
        let ccw = partial.ccw.unwrap_or_else(|| chance(rng, self.ccw));
        Ok(SkewMeta { axis, angle, ccw })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &SkewMeta) -> SynthResult<()> {
        let signed = if meta.ccw { meta.angle } else { -meta.angle };
        let tan = signed.to_radians().tan();
        let size = Group::new(layers).size();
        let (vx, vy) = match meta.axis {
            0 => (size.y * tan / 2.0, 0.0),
            1 => (0.0, size.x * tan / 2.0),
            other => return Err(SynthError::config(format!("skew axis {other} out of range"))),
        };
        offset_group(
            layers,
            [
                Vec2::new(vx, -vy),
                Vec2::new(vx, vy),
                Vec2::new(-vx, vy),
                Vec2::new(-vx, -vy),
            ],
        )
    }
}

// ----------------------------
// Stretch
// ----------------------------

/// Scales the group about its centre along one axis.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Stretch {
    /// Weights of the horizontal and vertical axes.
    pub weights: Vec<f64>,
    /// Scale range.
    pub scale: (f64, f64),
}

impl Default for Stretch {
    fn default() -> Self {
        Self {
            weights: vec![1.0, 1.0],
            scale: (0.5, 1.5),
        }
    }
}

component_meta! {
    /// Resolved [`Stretch`].
    pub struct StretchMeta / StretchPartial {
        /// `0` horizontal, `1` vertical.
        pub axis: u8,
        /// Scale factor.
        pub scale: f64,
    }
}

impl Component for Stretch {
    type Meta = StretchMeta;
    type Partial = StretchPartial;

    fn sample(&self, rng: &mut SynthRng, partial: StretchPartial) -> SynthResult<StretchMeta> {
        let axis = match partial.axis {
            Some(a) => a,
            None => pick_axis(rng, &self.weights)?,
        };
        let scale = partial.scale.unwrap_or_else(|| uniform(rng, self.scale));
        Ok(StretchMeta { axis, scale })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &StretchMeta) -> SynthResult<()> {
        let mut group = Group::new(layers);
        if group.is_empty() {
            return Ok(());
        }
        let (sx, sy) = match meta.axis {
            0 => (meta.scale, 1.0),
            1 => (1.0, meta.scale),
            other => {
                return Err(SynthError::config(format!("stretch axis {other} out of range")));
            }
        };
        let size = group.size();
        let size = Vec2::new(size.x * sx, size.y * sy);
        let topleft = group.center() - size / 2.0;
        group.set_bbox(Bbox::new(topleft.x, topleft.y, size.x, size.y))
    }
}

// ----------------------------
// Translate
// ----------------------------

/// Moves the group by a fraction of its own size.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Translate {
    /// Horizontal and vertical ranges, as fractions of the group size.
    pub offset: [(f64, f64); 2],
}

impl Default for Translate {
    fn default() -> Self {
        Self {
            offset: [(-1.0, 1.0), (-1.0, 1.0)],
        }
    }
}

component_meta! {
    /// Resolved [`Translate`].
    pub struct TranslateMeta / TranslatePartial {
        /// Fractions of the group size.
        pub offset: [f64; 2],
    }
}

impl Component for Translate {
    type Meta = TranslateMeta;
    type Partial = TranslatePartial;

    fn sample(&self, rng: &mut SynthRng, partial: TranslatePartial) -> SynthResult<TranslateMeta> {
        let offset = match partial.offset {
            Some(o) => o,
            None => [uniform(rng, self.offset[0]), uniform(rng, self.offset[1])],
        };
        Ok(TranslateMeta { offset })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &TranslateMeta) -> SynthResult<()> {
        let mut group = Group::new(layers);
        let size = group.size();
        group.translate(Vec2::new(size.x * meta.offset[0], size.y * meta.offset[1]));
        Ok(())
    }
}

component_union! {
    /// Geometric distortions picked by the default template.
    pub enum Transform / TransformMeta / TransformPartial {
        Stretch(Stretch),
        Trapezoidate(Trapezoidate),
        Skew(Skew),
        Rotate(Rotate),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/transform.rs"]
mod tests;
