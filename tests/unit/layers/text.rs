use super::*;
use crate::layers::placement::Placement;

#[derive(Debug)]
struct Blocks;

impl TextRasterizer for Blocks {
    fn covers(&self, _font: &str, ch: char) -> SynthResult<bool> {
        Ok(ch != '?')
    }

    fn render(&self, _font: &str, text: &str, style: &TextStyle) -> SynthResult<RenderedText> {
        let n = text.chars().count() as u32;
        let image = raster::filled(4 * n, 6, style.color);
        Ok(RenderedText {
            image,
            bbox: Bbox::new(0.0, -5.0, f64::from(4 * n), 6.0),
        })
    }
}

#[test]
fn char_shaper_splits_characters() {
    assert_eq!(CharShaper.segment("ab c"), vec!["a", "b", " ", "c"]);
}

#[test]
fn char_shaper_keeps_marks_and_joiners_on_base() {
    let units = CharShaper.segment("e\u{0301}x\u{200D}y!");
    assert_eq!(units, vec!["e\u{0301}", "x\u{200D}y", "!"]);
}

#[test]
fn text_layer_sits_on_the_baseline() {
    let style = TextStyle {
        size: 12.0,
        bold: false,
        vertical: false,
        color: Rgba8::new(0, 0, 0, 255),
    };
    let layer = text_layer(&Blocks, "any", "ab", &style).unwrap();
    assert_eq!(layer.bbox(), Bbox::new(0.0, -5.0, 8.0, 6.0));
}

#[test]
fn missing_font_is_a_configuration_error() {
    let r = FontdueRasterizer {
        fonts: HashMap::new(),
    };
    assert!(matches!(r.covers("nope.ttf", 'a'), Err(SynthError::Config(_))));
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut r = FontdueRasterizer {
        fonts: HashMap::new(),
    };
    assert!(r.insert_bytes("bad", b"not a font").is_err());
}

#[test]
fn embolden_grows_by_one_pixel_each_side() {
    let mut img = Raster::from_pixel(3, 3, Rgba([10.0, 20.0, 30.0, 0.0]));
    img.put_pixel(1, 1, Rgba([10.0, 20.0, 30.0, 255.0]));
    let bold = embolden(&img);
    assert_eq!(bold.dimensions(), (5, 5));
    assert_eq!(bold.pixels().filter(|p| p.0[3] > 0.0).count(), 9);
    assert!(bold.pixels().all(|p| p.0[0] == 10.0));
}

#[test]
fn ink_span_keeps_overhangs() {
    // Plain glyphs inside their advances.
    assert_eq!(ink_span([(0.0, 1, 8), (10.0, 1, 8)], 20.0), (0, 20));
    // Negative bearing on the first glyph, italic overhang past the last advance.
    assert_eq!(ink_span([(0.0, -3, 10), (10.0, 2, 14)], 20.0), (-3, 29));
    assert_eq!(ink_span(std::iter::empty(), 0.0), (0, 1));
}
