use super::*;
use crate::components::color::{Cluster, ColorMapMode};
use crate::foundation::core::Bbox;
use crate::layers::text::{RenderedText, TextRasterizer, TextStyle};

/// Every character is a solid square with a transparent rim.
#[derive(Debug)]
struct Blocks;

impl TextRasterizer for Blocks {
    fn covers(&self, _font: &str, ch: char) -> SynthResult<bool> {
        Ok(ch.is_ascii())
    }

    fn render(&self, _font: &str, text: &str, style: &TextStyle) -> SynthResult<RenderedText> {
        let size = style.size as u32;
        let n = text.chars().count() as u32;
        let rim = size / 5;
        let c = style.color.to_f32();
        let image = Raster::from_fn(n * size, size, |x, y| {
            let lx = x % size;
            if lx >= rim && lx < size - rim && y >= rim && y < size - rim {
                image::Rgba(c)
            } else {
                image::Rgba([0.0; 4])
            }
        });
        Ok(RenderedText {
            image,
            bbox: Bbox::new(0.0, -f64::from(size), f64::from(n * size), f64::from(size)),
        })
    }
}

fn black_white(k: usize) -> ColorMap {
    let values = [0.0, 255.0, 128.0];
    let row = (0..k)
        .map(|i| Cluster {
            center: vec![values[i]],
            std: 0.0,
        })
        .collect();
    ColorMap::from_rows(
        ColorMapConfig {
            k,
            mode: ColorMapMode::Gray,
            ..ColorMapConfig::default()
        },
        vec![vec![row]],
    )
    .unwrap()
}

fn config() -> DefaultTemplateConfig {
    DefaultTemplateConfig {
        quality: (70, 90),
        midground: 0.0,
        font: FontSetConfig {
            size: (20, 24),
            ..FontSetConfig::default()
        },
        texture: SwitchConfig::new(0.0, TextureConfig::default()),
        shape: SwitchConfig::new(
            0.5,
            ElasticDistortion {
                alpha: (2.0, 4.0),
                sigma: (2.0, 2.0),
            },
        ),
        ..DefaultTemplateConfig::default()
    }
}

fn template(config: DefaultTemplateConfig) -> DefaultTemplate {
    let corpus = Corpus::from_texts(
        config.corpus.clone(),
        vec![vec!["hello".into(), "OCR 42".into(), "tiger".into()]],
    )
    .unwrap();
    let font = FontSet::with_rasterizer(
        config.font.clone(),
        vec![vec!["block".into()]],
        Arc::new(Blocks),
    )
    .unwrap();
    let texture = Texture::new(config.texture.args.clone()).unwrap();
    DefaultTemplate::from_parts(config, corpus, font, black_white(2), black_white(3), texture)
        .unwrap()
}

#[test]
fn generates_labelled_sample() {
    let t = template(config());
    let mut rng = rng_from_seed(7);
    let sample = t.generate(&mut rng).unwrap();
    assert!(["hello", "OCR 42", "tiger"].contains(&sample.label.as_str()));
    assert!((70..=90).contains(&sample.quality));
    let (w, h) = sample.image.dimensions();
    assert!(w > 0 && h > 0);
    assert!(sample.image.pixels().all(|p| p.0[3] > 254.0));
    assert_eq!(sample.meta.foreground.corpus.text, sample.label);
}

#[test]
fn same_seed_same_sample() {
    let t = template(config());
    let a = t.generate(&mut rng_from_seed(11)).unwrap();
    let b = t.generate(&mut rng_from_seed(11)).unwrap();
    assert_eq!(a.image, b.image);
    assert_eq!(a.meta, b.meta);
}

#[test]
fn replay_reproduces_pixels_through_json() {
    let t = template(DefaultTemplateConfig {
        midground: 1.0,
        visibility_check: false,
        ..config()
    });
    for seed in 0..4 {
        let sample = t.generate(&mut rng_from_seed(seed)).unwrap();
        let json = serde_json::to_string(&sample.meta).unwrap();
        let meta: TemplateMeta = serde_json::from_str(&json).unwrap();
        let again = t.replay(&meta).unwrap();
        assert_eq!(again.image, sample.image);
        assert_eq!(again.label, sample.label);
        assert_eq!(again.meta, sample.meta);
    }
}

#[test]
fn style_takes_third_colour() {
    let mut cfg = config();
    cfg.style.prob = 1.0;
    let t = template(cfg);
    let sample = t.generate(&mut rng_from_seed(5)).unwrap();
    let colors = &sample.meta.colors.colors;
    assert_eq!(colors.len(), 3);
    let style = sample.meta.foreground.style.meta.as_ref().unwrap();
    let color = match &style.meta {
        StyleMeta::Border(m) => &m.color,
        StyleMeta::Shadow(m) => &m.color,
        StyleMeta::Extrusion(m) => &m.color,
    };
    assert_eq!(color, &colors[2]);
}

#[test]
fn midground_is_recorded_when_enabled() {
    let t = template(DefaultTemplateConfig {
        midground: 1.0,
        visibility_check: false,
        ..config()
    });
    let sample = t.generate(&mut rng_from_seed(2)).unwrap();
    assert!(sample.meta.midground.is_some());

    let t = template(DefaultTemplateConfig {
        midground: 0.0,
        ..config()
    });
    let sample = t.generate(&mut rng_from_seed(2)).unwrap();
    assert!(sample.meta.midground.is_none());
}

#[test]
fn uncovered_text_is_retryable() {
    let cfg = config();
    let corpus = Corpus::from_texts(cfg.corpus.clone(), vec![vec!["日本".into()]]).unwrap();
    let font =
        FontSet::with_rasterizer(cfg.font.clone(), vec![vec!["block".into()]], Arc::new(Blocks))
            .unwrap();
    let texture = Texture::new(TextureConfig::default()).unwrap();
    let t = DefaultTemplate::from_parts(cfg, corpus, font, black_white(2), black_white(3), texture)
        .unwrap();
    let err = t.generate(&mut rng_from_seed(0)).unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn invalid_quality_is_rejected() {
    let cfg = DefaultTemplateConfig {
        quality: (90, 50),
        ..config()
    };
    let corpus = Corpus::from_texts(cfg.corpus.clone(), vec![vec!["a".into()]]).unwrap();
    let font =
        FontSet::with_rasterizer(cfg.font.clone(), vec![vec!["block".into()]], Arc::new(Blocks))
            .unwrap();
    let texture = Texture::new(TextureConfig::default()).unwrap();
    let err = DefaultTemplate::from_parts(cfg, corpus, font, black_white(2), black_white(3), texture)
        .unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));
}

#[test]
fn config_parses_from_json() {
    let cfg: DefaultTemplateConfig = serde_json::from_str(
        r#"{
            "quality": [80, 80],
            "midground": 0.0,
            "texture": {"prob": 0.0},
            "style": {"prob": 1.0, "weights": [1, 0, 0]},
            "postprocess": {"noise": {"prob": 0.0, "args": {"scale": [1, 2]}}}
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.quality, (80, 80));
    assert_eq!(cfg.style.prob, 1.0);
    assert_eq!(cfg.postprocess.noise.args.scale, (1.0, 2.0));
    assert_eq!(cfg.postprocess.blur.prob, 0.5);
    assert!(serde_json::from_str::<DefaultTemplateConfig>(r#"{"bogus": 1}"#).is_err());
}

#[test]
fn margin_switch_off_leaves_text_unpadded() {
    let fixed = Margin {
        top: (3, 3),
        bottom: (3, 3),
        left: (3, 3),
        right: (3, 3),
    };
    let on = template(DefaultTemplateConfig {
        margin: SwitchConfig::new(1.0, fixed.clone()),
        ..config()
    });
    let off = template(DefaultTemplateConfig {
        margin: SwitchConfig::new(0.0, fixed),
        ..config()
    });
    let a = on.generate(&mut rng_from_seed(9)).unwrap();
    let b = off.generate(&mut rng_from_seed(9)).unwrap();
    assert!(a.meta.foreground.margin.state);
    assert!(!b.meta.foreground.margin.state);
    assert!(b.meta.foreground.margin.meta.is_none());
    let (aw, ah) = a.image.dimensions();
    let (bw, bh) = b.image.dimensions();
    assert_eq!((aw, ah), (bw + 6, bh + 6));
}

#[test]
fn glyph_mask_bridges_the_gap_between_spaced_glyphs() {
    let left = Bbox::new(0.0, 2.0, 6.0, 8.0).to_quad();
    let right = Bbox::new(30.0, 2.0, 6.0, 8.0).to_quad();
    let mask = Layer::new(glyph_mask(40, 12, &[right, left], 1));
    assert_eq!(mask.image().get_pixel(18, 6).0[3], 255.0);
    assert_eq!(mask.image().get_pixel(18, 1).0[3], 255.0);
    assert_eq!(mask.image().get_pixel(18, 0).0[3], 0.0);
    assert_eq!(mask.image().get_pixel(39, 6).0[3], 0.0);

    let midground = Layer::new(raster::filled(40, 12, Rgba8::new(90, 90, 90, 255)));
    let erased = midground.erase(&mask).output(Some(mask.bbox()));
    assert_eq!(erased.get_pixel(18, 6).0[3], 0.0);
    assert_eq!(erased.get_pixel(39, 6).0[3], 255.0);
}

#[test]
fn lone_glyph_mask_covers_its_own_quad() {
    let only = Bbox::new(2.0, 2.0, 4.0, 4.0).to_quad();
    let mask = glyph_mask(10, 10, &[only], 0);
    assert_eq!(mask.get_pixel(3, 3).0[3], 255.0);
    assert_eq!(mask.get_pixel(8, 8).0[3], 0.0);
    assert!(glyph_mask(10, 10, &[], 2).pixels().all(|p| p.0[3] == 0.0));
}

#[test]
fn glyph_quads_follow_the_text_into_image_space() {
    let mut cfg = config();
    cfg.shape.prob = 0.0;
    cfg.style.prob = 0.0;
    cfg.transform.prob = 0.0;
    cfg.layout.weights = Some(vec![1.0, 0.0]);
    cfg.layout.flow.space = (12, 12);
    let t = template(cfg);
    let mut rng = rng_from_seed(3);
    let style = t.style.sample(&mut rng, Default::default()).unwrap();
    let (image, label, _, glyphs) = t
        .render_text(&mut rng, Rgba8::new(0, 0, 0, 255), style, None)
        .unwrap();
    assert_eq!(glyphs.len(), label.chars().count());

    // The transparent glyph rim is cropped away, so quads may overhang by at most the rim.
    let (w, h) = image.dimensions();
    let rim = 24.0 / 5.0 + 1.0;
    for q in &glyphs {
        let b = q.bbox();
        assert!(b.left() >= -rim && b.right() <= f64::from(w) + rim);
        assert!(b.top() >= -rim && b.bottom() <= f64::from(h) + rim);
    }
    for pair in glyphs.windows(2) {
        assert!(pair[1].bbox().left() - pair[0].bbox().right() >= 11.5);
    }
}
