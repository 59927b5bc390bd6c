use super::*;
use crate::foundation::random::rng_from_seed;
use image::Rgba;

/// A 20×12 canvas with an opaque 8×4 bar in the middle.
fn bar_mask(rgb: [f32; 3]) -> Raster {
    Raster::from_fn(20, 12, |x, y| {
        if (6..14).contains(&x) && (4..8).contains(&y) {
            Rgba([rgb[0], rgb[1], rgb[2], 255.0])
        } else {
            Rgba([0.0; 4])
        }
    })
}

#[test]
fn same_colour_background_fails() {
    let text = bar_mask([90.0, 90.0, 90.0]);
    let bg = Raster::from_pixel(20, 12, Rgba([90.0, 90.0, 90.0, 255.0]));
    let out = blend(&text, &bg, BlendMode::Normal, false).unwrap();
    assert!(!check_visibility(&out, &text));
}

#[test]
fn contrasting_background_passes() {
    let text = bar_mask([255.0, 255.0, 255.0]);
    let bg = Raster::from_pixel(20, 12, Rgba([0.0, 0.0, 0.0, 255.0]));
    let out = blend(&text, &bg, BlendMode::Normal, false).unwrap();
    assert!(check_visibility(&out, &text));
}

#[test]
fn empty_mask_fails() {
    let img = Raster::from_pixel(4, 4, Rgba([0.0, 0.0, 0.0, 255.0]));
    assert!(!check_visibility(&img, &Raster::new(4, 4)));
}

#[test]
fn exhausted_modes_report_visibility_error() {
    let text = bar_mask([90.0, 90.0, 90.0]);
    let bg = Raster::from_pixel(20, 12, Rgba([90.0, 90.0, 90.0, 255.0]));
    let mut rng = rng_from_seed(5);
    let res = blend_with_visibility(
        &text,
        &bg,
        &[BlendMode::Normal, BlendMode::DarkenOnly, BlendMode::LightenOnly],
        true,
        &mut rng,
    );
    assert!(matches!(res, Err(SynthError::VisibilityExhausted)));
}

#[test]
fn unchecked_blend_takes_first_permuted_mode() {
    let text = bar_mask([90.0, 90.0, 90.0]);
    let bg = Raster::from_pixel(20, 12, Rgba([90.0, 90.0, 90.0, 255.0]));
    let mut rng = rng_from_seed(5);
    let (_, mode) =
        blend_with_visibility(&text, &bg, &[BlendMode::Multiply], false, &mut rng).unwrap();
    assert_eq!(mode, BlendMode::Multiply);
}
