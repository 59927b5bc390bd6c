use super::*;
use crate::foundation::core::Raster;
use crate::foundation::random::rng_from_seed;

fn white_square() -> Vec<Layer> {
    let mut image = Raster::new(2, 2);
    for px in image.pixels_mut() {
        px.0 = [255.0, 255.0, 255.0, 128.0];
    }
    vec![Layer::new(image)]
}

#[test]
fn rgb_fill_keeps_alpha() {
    let mut layers = white_square();
    let rgb = Rgb::default();
    let meta = RgbMeta {
        rgb: [10, 20, 30],
        alpha: 1.0,
    };
    rgb.apply_meta(&mut layers, &meta).unwrap();
    let px = layers[0].image().get_pixel(1, 1).0;
    assert!((px[0] - 10.0).abs() < 1e-3);
    assert!((px[1] - 20.0).abs() < 1e-3);
    assert!((px[2] - 30.0).abs() < 1e-3);
    assert!((px[3] - 128.0).abs() < 1e-3);
}

#[test]
fn rgb_sample_respects_ranges_and_partial() {
    let rgb = Rgb {
        rgb: [(5, 5), (0, 10), (250, 255)],
        alpha: (0.5, 0.5),
    };
    let mut rng = rng_from_seed(3);
    for _ in 0..50 {
        let m = rgb.sample(&mut rng, RgbPartial::default()).unwrap();
        assert_eq!(m.rgb[0], 5);
        assert!(m.rgb[1] <= 10);
        assert!(m.rgb[2] >= 250);
        assert_eq!(m.alpha, 0.5);
    }
    let forced = rgb
        .sample(
            &mut rng,
            RgbPartial {
                rgb: Some([1, 2, 3]),
                alpha: None,
            },
        )
        .unwrap();
    assert_eq!(forced.rgb, [1, 2, 3]);
}

#[test]
fn rgb_data_is_color() {
    let rgb = Rgb::default();
    let meta = RgbMeta {
        rgb: [1, 2, 3],
        alpha: 1.0,
    };
    let c = rgb.data(&meta).unwrap().as_color().unwrap();
    assert_eq!((c.r, c.g, c.b, c.a), (1, 2, 3, 255));
}

#[test]
fn colorized_gray_keeps_luma() {
    let mut rng = rng_from_seed(9);
    for gray in [0u8, 40, 128, 200, 255] {
        let [r, g, b] = gray_to_rgb(&mut rng, gray, true);
        let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
        assert!((luma - f64::from(gray)).abs() < 0.06);
    }
    assert_eq!(gray_to_rgb(&mut rng, 77, false), [77, 77, 77]);
}

#[test]
fn gray_without_colorize_is_neutral() {
    let gray = Gray {
        gray: (100, 100),
        ..Gray::default()
    };
    let mut rng = rng_from_seed(1);
    let m = gray.sample(&mut rng, GrayPartial::default()).unwrap();
    assert_eq!(m.gray, 100);
    assert!(!m.colorize);
    assert_eq!(m.rgb, [100, 100, 100]);
    assert_eq!(m.alpha, 1.0);
}

#[test]
fn opacity_scales_alpha() {
    let mut layers = white_square();
    Opacity::default()
        .apply_meta(&mut layers, &OpacityMeta { opacity: 0.5 })
        .unwrap();
    assert!((layers[0].image().get_pixel(0, 0).0[3] - 64.0).abs() < 1e-3);
}

#[test]
fn opacity_has_no_data() {
    let d = Opacity::default().data(&OpacityMeta { opacity: 0.3 }).unwrap();
    assert!(matches!(d, ComponentData::Unsupported));
}

#[test]
fn parse_colormap_rows() {
    let rows = parse_colormap("10 2 200 3\n\n1,2,3 0.5 4,5,6 1 7,8,9 0\n").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[1][2].center, vec![7.0, 8.0, 9.0]);
    assert_eq!(rows[1][0].std, 0.5);
}

#[test]
fn parse_colormap_rejects_garbage() {
    assert!(parse_colormap("10 2 200").is_err());
    assert!(parse_colormap("x 2").is_err());
}

fn gray_map(k: usize) -> ColorMap {
    let rows = parse_colormap("0 0 255 0\n50 0 100 0 150 0\n").unwrap();
    ColorMap::from_rows(
        ColorMapConfig {
            k,
            ..ColorMapConfig::default()
        },
        vec![rows],
    )
    .unwrap()
}

#[test]
fn colormap_draws_k_colors_from_matching_rows() {
    let mut rng = rng_from_seed(5);
    let map = gray_map(2);
    for _ in 0..20 {
        let m = map.sample(&mut rng, ColorMapPartial::default()).unwrap();
        assert_eq!(m.k, 2);
        let mut grays: Vec<u8> = m.colors.iter().map(|c| c.rgb[0]).collect();
        grays.sort_unstable();
        assert_eq!(grays, vec![0, 255]);
    }
    let m = map
        .sample(
            &mut rng,
            ColorMapPartial {
                k: Some(3),
                colors: None,
            },
        )
        .unwrap();
    assert_eq!(m.colors.len(), 3);
}

#[test]
fn colormap_missing_k_is_config_error() {
    let mut rng = rng_from_seed(5);
    let err = gray_map(4)
        .sample(&mut rng, ColorMapPartial::default())
        .unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));
}

#[test]
fn colormap_without_sources_fails_at_sample() {
    let map = ColorMap::from_rows(ColorMapConfig::default(), Vec::new()).unwrap();
    let mut rng = rng_from_seed(5);
    assert!(map.sample(&mut rng, ColorMapPartial::default()).is_err());
}

#[test]
fn colormap_replay_uses_given_colors() {
    let map = gray_map(2);
    let mut rng = rng_from_seed(5);
    let first = map.sample(&mut rng, ColorMapPartial::default()).unwrap();
    let again = map.sample(&mut rng, first.clone().into()).unwrap();
    assert_eq!(first, again);
    match map.data(&first).unwrap() {
        ComponentData::Colors(c) => assert_eq!(c.len(), 2),
        other => panic!("unexpected {other:?}"),
    }
}
