//! Pixel filters as components. Each maps every layer's raster in place.

use crate::components::component::{Component, component_meta, component_union};
use crate::foundation::core::Raster;
use crate::foundation::error::SynthResult;
use crate::foundation::random::{SynthRng, chance, int_inclusive, seed64, uniform};
use crate::layers::Layer;
use crate::render::filters::{self, BorderMode, Interpolation};

fn map_layers(
    layers: &mut [Layer],
    f: impl Fn(&Raster) -> SynthResult<Raster>,
) -> SynthResult<()> {
    for layer in layers {
        let out = f(layer.image())?;
        layer.set_image(out);
    }
    Ok(())
}

fn draw_int(rng: &mut SynthRng, given: Option<i64>, range: (i64, i64)) -> i64 {
    given.unwrap_or_else(|| int_inclusive(rng, range))
}

/// Gaussian noise added to the colour channels.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdditiveGaussianNoise {
    /// Standard deviation range.
    pub scale: (f64, f64),
    /// Probability of independent noise per channel.
    pub per_channel: f64,
}

impl Default for AdditiveGaussianNoise {
    fn default() -> Self {
        Self {
            scale: (8.0, 32.0),
            per_channel: 0.5,
        }
    }
}

component_meta! {
    /// Resolved [`AdditiveGaussianNoise`].
    pub struct AdditiveGaussianNoiseMeta / AdditiveGaussianNoisePartial {
        /// Standard deviation.
        pub scale: f64,
        /// Independent noise per channel.
        pub per_channel: bool,
        /// Noise seed.
        pub seed: u64,
    }
}

impl Component for AdditiveGaussianNoise {
    type Meta = AdditiveGaussianNoiseMeta;
    type Partial = AdditiveGaussianNoisePartial;

    fn sample(
        &self,
        rng: &mut SynthRng,
        partial: AdditiveGaussianNoisePartial,
    ) -> SynthResult<AdditiveGaussianNoiseMeta> {
        let scale = partial.scale.unwrap_or_else(|| uniform(rng, self.scale));
        let per_channel = partial
            .per_channel
            .unwrap_or_else(|| chance(rng, self.per_channel));
        let seed = partial.seed.unwrap_or_else(|| seed64(rng));
        Ok(AdditiveGaussianNoiseMeta {
            scale,
            per_channel,
            seed,
        })
    }

    fn apply_meta(
        &self,
        layers: &mut [Layer],
        meta: &AdditiveGaussianNoiseMeta,
    ) -> SynthResult<()> {
        let mut seed = meta.seed;
        for layer in layers {
            let out =
                filters::additive_gaussian_noise(layer.image(), meta.scale, meta.per_channel, seed);
            layer.set_image(out);
            seed = seed.wrapping_add(1);
        }
        Ok(())
    }
}

/// Gaussian blur.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaussianBlur {
    /// Inclusive sigma range.
    pub sigma: (i64, i64),
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self { sigma: (1, 2) }
    }
}

component_meta! {
    /// Resolved [`GaussianBlur`].
    pub struct GaussianBlurMeta / GaussianBlurPartial {
        /// Sigma in pixels.
        pub sigma: i64,
    }
}

impl Component for GaussianBlur {
    type Meta = GaussianBlurMeta;
    type Partial = GaussianBlurPartial;

    fn sample(&self, rng: &mut SynthRng, partial: GaussianBlurPartial) -> SynthResult<GaussianBlurMeta> {
        Ok(GaussianBlurMeta {
            sigma: draw_int(rng, partial.sigma, self.sigma),
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &GaussianBlurMeta) -> SynthResult<()> {
        let sigma = meta.sigma as f64;
        map_layers(layers, |r| filters::gaussian_blur(r, sigma))
    }
}

/// Downscale and upscale again with random interpolations.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Resample {
    /// Intermediate scale range.
    pub size: (f64, f64),
}

impl Default for Resample {
    fn default() -> Self {
        Self { size: (0.3, 0.7) }
    }
}

component_meta! {
    /// Resolved [`Resample`].
    pub struct ResampleMeta / ResamplePartial {
        /// Intermediate scale.
        pub size: f64,
        /// Downscale interpolation.
        pub down: Interpolation,
        /// Upscale interpolation.
        pub up: Interpolation,
    }
}

fn pick_interpolation(rng: &mut SynthRng) -> Interpolation {
    let all = Interpolation::ALL;
    all[int_inclusive(rng, (0, all.len() as i64 - 1)) as usize]
}

impl Component for Resample {
    type Meta = ResampleMeta;
    type Partial = ResamplePartial;

    fn sample(&self, rng: &mut SynthRng, partial: ResamplePartial) -> SynthResult<ResampleMeta> {
        let size = partial.size.unwrap_or_else(|| uniform(rng, self.size));
        let down = partial.down.unwrap_or_else(|| pick_interpolation(rng));
        let up = partial.up.unwrap_or_else(|| pick_interpolation(rng));
        Ok(ResampleMeta { size, down, up })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &ResampleMeta) -> SynthResult<()> {
        map_layers(layers, |r| Ok(filters::resample(r, meta.size, meta.down, meta.up)))
    }
}

/// Median filter.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MedianBlur {
    /// Inclusive radius range; the window is `2k+1`.
    pub k: (i64, i64),
}

impl Default for MedianBlur {
    fn default() -> Self {
        Self { k: (1, 3) }
    }
}

component_meta! {
    /// Resolved [`MedianBlur`].
    pub struct MedianBlurMeta / MedianBlurPartial {
        /// Radius.
        pub k: i64,
    }
}

impl Component for MedianBlur {
    type Meta = MedianBlurMeta;
    type Partial = MedianBlurPartial;

    fn sample(&self, rng: &mut SynthRng, partial: MedianBlurPartial) -> SynthResult<MedianBlurMeta> {
        Ok(MedianBlurMeta {
            k: draw_int(rng, partial.k, self.k),
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &MedianBlurMeta) -> SynthResult<()> {
        let ksize = (meta.k.max(0) as u32) * 2 + 1;
        map_layers(layers, |r| Ok(filters::median_blur(r, ksize)))
    }
}

/// Smoothed random displacement.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElasticDistortion {
    /// Displacement scale range.
    pub alpha: (f64, f64),
    /// Smoothing sigma range.
    pub sigma: (f64, f64),
}

impl Default for ElasticDistortion {
    fn default() -> Self {
        Self {
            alpha: (10.0, 15.0),
            sigma: (3.0, 3.0),
        }
    }
}

component_meta! {
    /// Resolved [`ElasticDistortion`].
    pub struct ElasticDistortionMeta / ElasticDistortionPartial {
        /// Displacement scale.
        pub alpha: f64,
        /// Smoothing sigma.
        pub sigma: f64,
        /// Field seed.
        pub seed: u64,
    }
}

impl Component for ElasticDistortion {
    type Meta = ElasticDistortionMeta;
    type Partial = ElasticDistortionPartial;

    fn sample(
        &self,
        rng: &mut SynthRng,
        partial: ElasticDistortionPartial,
    ) -> SynthResult<ElasticDistortionMeta> {
        let alpha = partial.alpha.unwrap_or_else(|| uniform(rng, self.alpha));
        let sigma = partial.sigma.unwrap_or_else(|| uniform(rng, self.sigma));
        let seed = partial.seed.unwrap_or_else(|| seed64(rng));
        Ok(ElasticDistortionMeta { alpha, sigma, seed })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &ElasticDistortionMeta) -> SynthResult<()> {
        let mut seed = meta.seed;
        for layer in layers {
            let out = filters::elastic_distortion(layer.image(), meta.alpha, meta.sigma, seed)?;
            layer.set_image(out);
            seed = seed.wrapping_add(1);
        }
        Ok(())
    }
}

/// Brightness shift.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Brightness {
    /// Inclusive shift range.
    pub beta: (i64, i64),
}

impl Default for Brightness {
    fn default() -> Self {
        Self { beta: (-32, 32) }
    }
}

component_meta! {
    /// Resolved [`Brightness`].
    pub struct BrightnessMeta / BrightnessPartial {
        /// Shift added to each colour channel.
        pub beta: i64,
    }
}

impl Component for Brightness {
    type Meta = BrightnessMeta;
    type Partial = BrightnessPartial;

    fn sample(&self, rng: &mut SynthRng, partial: BrightnessPartial) -> SynthResult<BrightnessMeta> {
        Ok(BrightnessMeta {
            beta: draw_int(rng, partial.beta, self.beta),
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &BrightnessMeta) -> SynthResult<()> {
        map_layers(layers, |r| Ok(filters::brightness(r, meta.beta as f32)))
    }
}

/// Contrast scale around mid-gray.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Contrast {
    /// Scale range.
    pub alpha: (f64, f64),
}

impl Default for Contrast {
    fn default() -> Self {
        Self { alpha: (0.5, 1.5) }
    }
}

component_meta! {
    /// Resolved [`Contrast`].
    pub struct ContrastMeta / ContrastPartial {
        /// Scale.
        pub alpha: f64,
    }
}

impl Component for Contrast {
    type Meta = ContrastMeta;
    type Partial = ContrastPartial;

    fn sample(&self, rng: &mut SynthRng, partial: ContrastPartial) -> SynthResult<ContrastMeta> {
        Ok(ContrastMeta {
            alpha: partial.alpha.unwrap_or_else(|| uniform(rng, self.alpha)),
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &ContrastMeta) -> SynthResult<()> {
        map_layers(layers, |r| Ok(filters::contrast(r, meta.alpha as f32)))
    }
}

/// Drops colour.
#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grayscale {}

component_meta! {
    /// [`Grayscale`] draws nothing.
    pub struct GrayscaleMeta / GrayscalePartial {}
}

impl Component for Grayscale {
    type Meta = GrayscaleMeta;
    type Partial = GrayscalePartial;

    fn sample(&self, _rng: &mut SynthRng, _partial: GrayscalePartial) -> SynthResult<GrayscaleMeta> {
        Ok(GrayscaleMeta {})
    }

    fn apply_meta(&self, layers: &mut [Layer], _meta: &GrayscaleMeta) -> SynthResult<()> {
        map_layers(layers, |r| Ok(filters::grayscale(r)))
    }
}

/// Thins bright strokes with a minimum filter.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Erode {
    /// Inclusive radius range.
    pub k: (i64, i64),
}

impl Default for Erode {
    fn default() -> Self {
        Self { k: (1, 3) }
    }
}

component_meta! {
    /// Resolved [`Erode`].
    pub struct ErodeMeta / ErodePartial {
        /// Radius.
        pub k: i64,
    }
}

impl Component for Erode {
    type Meta = ErodeMeta;
    type Partial = ErodePartial;

    fn sample(&self, rng: &mut SynthRng, partial: ErodePartial) -> SynthResult<ErodeMeta> {
        Ok(ErodeMeta {
            k: draw_int(rng, partial.k, self.k),
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &ErodeMeta) -> SynthResult<()> {
        let k = meta.k.max(0) as u32;
        map_layers(layers, |r| Ok(filters::erode(r, k)))
    }
}

/// JPEG artefacts.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JpegCompression {
    /// Inclusive compression range; quality is `100 - compression`.
    pub compression: (i64, i64),
}

impl Default for JpegCompression {
    fn default() -> Self {
        Self { compression: (5, 30) }
    }
}

component_meta! {
    /// Resolved [`JpegCompression`].
    pub struct JpegCompressionMeta / JpegCompressionPartial {
        /// Compression strength.
        pub compression: i64,
    }
}

impl Component for JpegCompression {
    type Meta = JpegCompressionMeta;
    type Partial = JpegCompressionPartial;

    fn sample(
        &self,
        rng: &mut SynthRng,
        partial: JpegCompressionPartial,
    ) -> SynthResult<JpegCompressionMeta> {
        Ok(JpegCompressionMeta {
            compression: draw_int(rng, partial.compression, self.compression),
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &JpegCompressionMeta) -> SynthResult<()> {
        let quality = (100 - meta.compression).clamp(1, 100) as u8;
        map_layers(layers, |r| filters::jpeg_compression(r, quality))
    }
}

/// Linear motion blur.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionBlur {
    /// Inclusive kernel length range.
    pub k: (i64, i64),
    /// Direction range in degrees.
    pub angle: (f64, f64),
}

impl Default for MotionBlur {
    fn default() -> Self {
        Self {
            k: (3, 7),
            angle: (0.0, 360.0),
        }
    }
}

component_meta! {
    /// Resolved [`MotionBlur`].
    pub struct MotionBlurMeta / MotionBlurPartial {
        /// Kernel length.
        pub k: i64,
        /// Direction in degrees.
        pub angle: f64,
    }
}

impl Component for MotionBlur {
    type Meta = MotionBlurMeta;
    type Partial = MotionBlurPartial;

    fn sample(&self, rng: &mut SynthRng, partial: MotionBlurPartial) -> SynthResult<MotionBlurMeta> {
        let k = draw_int(rng, partial.k, self.k);
        let angle = partial.angle.unwrap_or_else(|| uniform(rng, self.angle));
        Ok(MotionBlurMeta { k, angle })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &MotionBlurMeta) -> SynthResult<()> {
        let k = meta.k.max(1) as u32;
        map_layers(layers, |r| Ok(filters::motion_blur(r, k, meta.angle)))
    }
}

/// Drops coarse rectangular cells to zero.
///
/// The cell lattice is `size_px` cells per side when given, otherwise `size_percent` of the image
/// size; with neither, every pixel is its own cell.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoarseDropout {
    /// Drop probability range per cell.
    pub p: (f64, f64),
    /// Inclusive range of lattice cells per side.
    pub size_px: Option<(i64, i64)>,
    /// Range of lattice resolution relative to the image size.
    pub size_percent: Option<(f64, f64)>,
    /// Probability of independent cells per colour channel.
    pub per_channel: f64,
    /// Probability of cutting the alpha channel instead of colour.
    pub only_alpha: f64,
}

impl Default for CoarseDropout {
    fn default() -> Self {
        Self {
            p: (0.05, 0.25),
            size_px: None,
            size_percent: None,
            per_channel: 0.5,
            only_alpha: 0.0,
        }
    }
}

component_meta! {
    /// Resolved [`CoarseDropout`].
    pub struct CoarseDropoutMeta / CoarseDropoutPartial {
        /// Drop probability per cell.
        pub p: f64,
        /// Lattice cells per side.
        pub size_px: Option<i64>,
        /// Lattice resolution relative to the image size.
        pub size_percent: Option<f64>,
        /// Independent cells per colour channel.
        pub per_channel: bool,
        /// Cut alpha instead of colour.
        pub only_alpha: bool,
        /// Cell seed.
        pub seed: u64,
    }
}

/// Minimum lattice side when derived from a percentage.
const MIN_DROPOUT_CELLS: u32 = 3;

fn dropout_grid(meta: &CoarseDropoutMeta, (w, h): (u32, u32)) -> (u32, u32) {
    if let Some(px) = meta.size_px {
        let n = px.max(1) as u32;
        return (n, n);
    }
    match meta.size_percent {
        Some(pct) => {
            let side = |v: u32| ((f64::from(v) * pct).round() as u32).max(MIN_DROPOUT_CELLS);
            (side(w), side(h))
        }
        None => (w, h),
    }
}

impl Component for CoarseDropout {
    type Meta = CoarseDropoutMeta;
    type Partial = CoarseDropoutPartial;

    fn sample(&self, rng: &mut SynthRng, partial: CoarseDropoutPartial) -> SynthResult<CoarseDropoutMeta> {
        let p = partial.p.unwrap_or_else(|| uniform(rng, self.p));
        let per_channel = partial
            .per_channel
            .unwrap_or_else(|| chance(rng, self.per_channel));
        let only_alpha = partial
            .only_alpha
            .unwrap_or_else(|| chance(rng, self.only_alpha));
        let size_px = match partial.size_px {
            Some(v) => v,
            None => self.size_px.map(|r| int_inclusive(rng, r)),
        };
        let size_percent = match partial.size_percent {
            Some(v) => v,
            None => self.size_percent.map(|r| uniform(rng, r)),
        };
        let seed = partial.seed.unwrap_or_else(|| seed64(rng));
        Ok(CoarseDropoutMeta {
            p,
            size_px,
            size_percent,
            per_channel,
            only_alpha,
            seed,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &CoarseDropoutMeta) -> SynthResult<()> {
        let mut seed = meta.seed;
        for layer in layers {
            let grid = dropout_grid(meta, layer.image().dimensions());
            let out = filters::coarse_dropout(
                layer.image(),
                meta.p,
                grid,
                meta.per_channel,
                meta.only_alpha,
                seed,
            );
            layer.set_image(out);
            seed = seed.wrapping_add(1);
        }
        Ok(())
    }
}

/// Rotates pixels inside each layer's canvas, leaving its geometry alone.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageRotate {
    /// Angle range in degrees, clockwise.
    pub angle: (f64, f64),
    /// Probability of turning counter-clockwise instead.
    pub ccw: f64,
    /// Fill for pixels rotated in from outside.
    pub mode: BorderMode,
}

impl Default for ImageRotate {
    fn default() -> Self {
        Self {
            angle: (-45.0, 45.0),
            ccw: 0.0,
            mode: BorderMode::Constant,
        }
    }
}

component_meta! {
    /// Resolved [`ImageRotate`].
    pub struct ImageRotateMeta / ImageRotatePartial {
        /// Angle in degrees.
        pub angle: f64,
        /// Counter-clockwise.
        pub ccw: bool,
        /// Border fill.
        pub mode: BorderMode,
    }
}

impl Component for ImageRotate {
    type Meta = ImageRotateMeta;
    type Partial = ImageRotatePartial;

    fn sample(&self, rng: &mut SynthRng, partial: ImageRotatePartial) -> SynthResult<ImageRotateMeta> {
        let angle = partial.angle.unwrap_or_else(|| uniform(rng, self.angle));
        let ccw = partial.ccw.unwrap_or_else(|| chance(rng, self.ccw));
        let mode = partial.mode.unwrap_or(self.mode);
        Ok(ImageRotateMeta { angle, ccw, mode })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &ImageRotateMeta) -> SynthResult<()> {
        let angle = if meta.ccw { -meta.angle } else { meta.angle };
        map_layers(layers, |r| Ok(filters::rotate(r, angle, meta.mode)))
    }
}

/// A soft dark band across the image.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Shadow {
    /// Inclusive peak alpha range.
    pub intensity: (i64, i64),
    /// Range of the band's share of the image.
    pub amount: (f64, f64),
    /// Range of the share of the band spent on eased edges.
    pub smoothing: (f64, f64),
    /// Probability of a band with two soft edges instead of one reaching the far side.
    pub bidirectional: f64,
    /// Range of the band's position; -1 and 1 push it to either side.
    pub align: (f64, f64),
    /// Direction range in degrees.
    pub angle: (f64, f64),
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            intensity: (0, 192),
            amount: (0.5, 1.0),
            smoothing: (0.0, 1.0),
            bidirectional: 0.5,
            align: (-1.0, 1.0),
            angle: (0.0, 360.0),
        }
    }
}

component_meta! {
    /// Resolved [`Shadow`].
    pub struct ShadowMeta / ShadowPartial {
        /// Peak alpha.
        pub intensity: i64,
        /// Band share.
        pub amount: f64,
        /// Eased share.
        pub smoothing: f64,
        /// Two soft edges.
        pub bidirectional: bool,
        /// Band position.
        pub align: f64,
        /// Direction in degrees.
        pub angle: f64,
    }
}

impl ShadowMeta {
    /// Profile stops `[ramp up start, full start, full end, ramp down end]` as image fractions.
    pub fn stops(&self) -> [f64; 4] {
        let (amount, smoothing) = (self.amount, self.smoothing);
        if self.bidirectional {
            let slack = (1.0 - amount) / 2.0;
            let start = slack + slack * self.align;
            let end = (1.0 + amount) / 2.0 + slack * self.align;
            let soft = amount / 2.0 * smoothing;
            [start - soft, start + soft, end - soft, end + soft]
        } else {
            let start = 1.0 - amount;
            let soft = amount.min(1.0 - amount) * smoothing;
            [start - soft, start + soft, 1.0, 1.0]
        }
    }
}

impl Component for Shadow {
    type Meta = ShadowMeta;
    type Partial = ShadowPartial;

    fn sample(&self, rng: &mut SynthRng, partial: ShadowPartial) -> SynthResult<ShadowMeta> {
        let intensity = draw_int(rng, partial.intensity, self.intensity);
        let amount = partial.amount.unwrap_or_else(|| uniform(rng, self.amount));
        let smoothing = partial
            .smoothing
            .unwrap_or_else(|| uniform(rng, self.smoothing));
        let bidirectional = partial
            .bidirectional
            .unwrap_or_else(|| chance(rng, self.bidirectional));
        let align = partial.align.unwrap_or_else(|| uniform(rng, self.align));
        let angle = partial.angle.unwrap_or_else(|| uniform(rng, self.angle));
        Ok(ShadowMeta {
            intensity,
            amount,
            smoothing,
            bidirectional,
            align,
            angle,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &ShadowMeta) -> SynthResult<()> {
        let stops = meta.stops();
        let intensity = meta.intensity.clamp(0, 255) as f32;
        map_layers(layers, |r| Ok(filters::shadow(r, intensity, stops, meta.angle)))
    }
}

component_union! {
    /// Any image effect, for configurable post-processing chains.
    pub enum ImageEffect / ImageEffectMeta / ImageEffectPartial {
        AdditiveGaussianNoise(AdditiveGaussianNoise),
        GaussianBlur(GaussianBlur),
        Resample(Resample),
        MedianBlur(MedianBlur),
        ElasticDistortion(ElasticDistortion),
        Brightness(Brightness),
        Contrast(Contrast),
        Grayscale(Grayscale),
        Erode(Erode),
        JpegCompression(JpegCompression),
        MotionBlur(MotionBlur),
        CoarseDropout(CoarseDropout),
        ImageRotate(ImageRotate),
        Shadow(Shadow),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/image_effect.rs"]
mod tests;
