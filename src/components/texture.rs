//! Image textures cropped, faded and painted over layers.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageDecoder, ImageReader, metadata::Orientation};

use crate::components::component::{Component, ComponentData, component_meta};
use crate::components::resource::ResourceSet;
use crate::foundation::core::Raster;
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{SynthRng, chance, int_inclusive, uniform};
use crate::layers::Layer;
use crate::render::composite::{BlendMode, blend_at};
use crate::render::raster;

const TEXTURE_EXTS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Configuration of a [`Texture`].
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextureConfig {
    /// Image files or directories.
    pub paths: Vec<PathBuf>,
    /// Per-path weights; uniform when absent.
    pub weights: Option<Vec<f64>>,
    /// Opacity range.
    pub alpha: (f64, f64),
    /// Probability of dropping colour.
    pub grayscale: f64,
    /// Probability of using a random sub-rectangle.
    pub crop: f64,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            weights: None,
            alpha: (1.0, 1.0),
            grayscale: 0.0,
            crop: 0.0,
        }
    }
}

component_meta! {
    /// Resolved [`Texture`] draw.
    pub struct TextureMeta / TexturePartial {
        /// Image file.
        pub path: PathBuf,
        /// Opacity multiplier.
        pub alpha: f64,
        /// Drop colour.
        pub grayscale: bool,
        /// Whether a sub-rectangle was drawn.
        pub crop: bool,
        /// Crop left.
        pub x: u32,
        /// Crop top.
        pub y: u32,
        /// Crop width.
        pub w: u32,
        /// Crop height.
        pub h: u32,
    }
}

/// Paints a (possibly cropped) image file over each layer, keeping layer alpha.
#[derive(Clone, Debug)]
pub struct Texture {
    config: TextureConfig,
    resources: ResourceSet,
}

impl Texture {
    /// Discover texture files.
    pub fn new(config: TextureConfig) -> SynthResult<Self> {
        let resources = ResourceSet::scan(&config.paths, config.weights.as_deref(), TEXTURE_EXTS)?;
        Ok(Self { config, resources })
    }

    /// Decode the cropped, faded texture a meta describes.
    pub fn load(&self, meta: &TextureMeta) -> SynthResult<Raster> {
        let image = read_oriented(&meta.path)?;
        let image = if meta.grayscale {
            DynamicImage::ImageLuma8(image.to_luma8())
        } else {
            image
        };
        let mut texture = raster::from_dynamic(&image);
        let (tw, th) = texture.dimensions();
        if meta.x.saturating_add(meta.w) > tw || meta.y.saturating_add(meta.h) > th {
            return Err(SynthError::config(format!(
                "texture crop {}x{}+{}+{} exceeds {}x{} image {}",
                meta.w,
                meta.h,
                meta.x,
                meta.y,
                tw,
                th,
                meta.path.display()
            )));
        }
        if (meta.x, meta.y, meta.w, meta.h) != (0, 0, tw, th) {
            texture = image::imageops::crop_imm(&texture, meta.x, meta.y, meta.w, meta.h).to_image();
        }
        let alpha = meta.alpha as f32;
        for px in texture.pixels_mut() {
            px.0[3] *= alpha;
        }
        Ok(texture)
    }
}

fn open_decoder(path: &Path) -> SynthResult<impl ImageDecoder> {
    ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| SynthError::config(format!("open texture {}: {e}", path.display())))?
        .into_decoder()
        .map_err(|e| SynthError::config(format!("decode texture {}: {e}", path.display())))
}

fn read_oriented(path: &Path) -> SynthResult<DynamicImage> {
    let mut decoder = open_decoder(path)?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| SynthError::config(format!("decode texture {}: {e}", path.display())))?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Displayed size of an image file, honouring its EXIF orientation.
fn oriented_size(path: &Path) -> SynthResult<(u32, u32)> {
    let mut decoder = open_decoder(path)?;
    let (w, h) = decoder.dimensions();
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    Ok(match orientation {
        Orientation::Rotate90
        | Orientation::Rotate270
        | Orientation::Rotate90FlipH
        | Orientation::Rotate270FlipH => (h, w),
        _ => (w, h),
    })
}

impl Component for Texture {
    type Meta = TextureMeta;
    type Partial = TexturePartial;

    fn sample(&self, rng: &mut SynthRng, partial: TexturePartial) -> SynthResult<TextureMeta> {
        let path = match partial.path {
            Some(p) => p,
            None => self.resources.pick(rng)?,
        };
        let alpha = partial.alpha.unwrap_or_else(|| uniform(rng, self.config.alpha));
        let grayscale = partial
            .grayscale
            .unwrap_or_else(|| chance(rng, self.config.grayscale));
        let crop = partial.crop.unwrap_or_else(|| chance(rng, self.config.crop));
        let (width, height) = oriented_size(&path)?;
        let span = |rng: &mut SynthRng, full: u32| {
            if crop {
                int_inclusive(rng, (1, i64::from(full).max(1))) as u32
            } else {
                full
            }
        };
        let w = match partial.w {
            Some(w) => w,
            None => span(rng, width),
        };
        let h = match partial.h {
            Some(h) => h,
            None => span(rng, height),
        };
        let offset = |rng: &mut SynthRng, full: u32, part: u32| {
            if crop {
                int_inclusive(rng, (0, i64::from(full.saturating_sub(part)))) as u32
            } else {
                0
            }
        };
        let x = match partial.x {
            Some(x) => x,
            None => offset(rng, width, w),
        };
        let y = match partial.y {
            Some(y) => y,
            None => offset(rng, height, h),
        };
        Ok(TextureMeta {
            path,
            alpha,
            grayscale,
            crop,
            x,
            y,
            w,
            h,
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &TextureMeta) -> SynthResult<()> {
        let texture = self.load(meta)?;
        for layer in layers {
            let (w, h) = layer.image().dimensions();
            if w == 0 || h == 0 {
                continue;
            }
            let fitted = raster::resize(&texture, w, h, image::imageops::FilterType::Triangle);
            blend_at(layer.image_mut(), &fitted, (0, 0), BlendMode::Normal, true);
        }
        Ok(())
    }

    fn data(&self, meta: &TextureMeta) -> SynthResult<ComponentData> {
        Ok(ComponentData::Texture(self.load(meta)?))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/texture.rs"]
mod tests;
