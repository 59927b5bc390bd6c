use super::*;
use crate::foundation::core::{Bbox, Raster};
use crate::foundation::random::rng_from_seed;
use crate::layers::placement::Placement;
use crate::layers::text::RenderedText;

/// "ascii" covers ASCII only; "wide" covers everything.
#[derive(Debug)]
struct Coverage;

impl TextRasterizer for Coverage {
    fn covers(&self, font: &str, ch: char) -> SynthResult<bool> {
        Ok(font == "wide" || ch.is_ascii())
    }

    fn render(&self, _font: &str, text: &str, style: &TextStyle) -> SynthResult<RenderedText> {
        let w = text.chars().count() as u32 * style.size as u32;
        Ok(RenderedText {
            image: Raster::new(w, style.size as u32),
            bbox: Bbox::new(0.0, -f64::from(style.size), f64::from(w), f64::from(style.size)),
        })
    }
}

fn fonts(groups: Vec<Vec<&str>>) -> FontSet {
    FontSet::with_rasterizer(
        FontSetConfig {
            size: (10, 10),
            ..FontSetConfig::default()
        },
        groups
            .into_iter()
            .map(|g| g.into_iter().map(String::from).collect())
            .collect(),
        Arc::new(Coverage),
    )
    .unwrap()
}

#[test]
fn picks_only_covering_fonts() {
    let set = fonts(vec![vec!["ascii", "wide"]]);
    let mut rng = rng_from_seed(3);
    for _ in 0..20 {
        let m = set
            .sample_for_text(&mut rng, "日本", FontPartial::default())
            .unwrap();
        assert_eq!(m.path, "wide");
        assert_eq!(m.size, 10);
        assert!(!m.bold);
    }
}

#[test]
fn uncovered_text_is_unrenderable() {
    let set = fonts(vec![vec!["ascii"]]);
    let mut rng = rng_from_seed(3);
    let err = set
        .sample_for_text(&mut rng, "日", FontPartial::default())
        .unwrap_err();
    assert!(matches!(err, SynthError::UnrenderableText(_)));
    assert!(err.is_retryable());
}

#[test]
fn empty_configuration_is_config_error() {
    let set = fonts(Vec::new());
    let mut rng = rng_from_seed(3);
    assert!(matches!(
        set.sample(&mut rng, FontPartial::default()),
        Err(SynthError::Config(_))
    ));
}

#[test]
fn missing_font_path_fails_at_construction() {
    let err = FontSet::new(FontSetConfig {
        paths: vec![PathBuf::from("/no/such/font.ttf")],
        ..FontSetConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));
}

#[test]
fn render_units_one_layer_each() {
    let set = fonts(vec![vec!["wide"]]);
    let meta = FontMeta {
        path: "wide".into(),
        size: 8,
        bold: false,
        vertical: false,
    };
    let layers = set
        .render_units(&meta, &["a".to_string(), "bc".to_string()], Rgba8::new(0, 0, 0, 255))
        .unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[1].width(), 16.0);
    assert_eq!(layers[0].top(), -8.0);
}
