use super::*;

fn ramp(w: u32, h: u32) -> Raster {
    Raster::from_fn(w, h, |x, y| Rgba([(x * 20) as f32, (y * 30) as f32, 77.0, 255.0]))
}

#[test]
fn blur_of_constant_image_is_identity() {
    let src = Raster::from_pixel(6, 5, Rgba([10.0, 20.0, 30.0, 255.0]));
    let out = gaussian_blur(&src, 1.5).unwrap();
    for p in out.pixels() {
        assert!((p.0[0] - 10.0).abs() < 1e-3 && (p.0[2] - 30.0).abs() < 1e-3);
    }
}

#[test]
fn blur_spreads_a_single_dot() {
    let mut src = Raster::from_pixel(5, 5, Rgba([0.0, 0.0, 0.0, 255.0]));
    src.put_pixel(2, 2, Rgba([255.0, 255.0, 255.0, 255.0]));
    let out = gaussian_blur(&src, 1.0).unwrap();
    assert!(out.get_pixel(2, 2).0[0] < 255.0);
    assert!(out.get_pixel(1, 2).0[0] > 0.0);
}

#[test]
fn zero_sigma_blur_is_identity() {
    let src = ramp(4, 4);
    assert_eq!(gaussian_blur(&src, 0.0).unwrap(), src);
}

#[test]
fn median_removes_salt_noise() {
    let mut src = Raster::from_pixel(5, 5, Rgba([50.0, 50.0, 50.0, 255.0]));
    src.put_pixel(2, 2, Rgba([255.0, 255.0, 255.0, 255.0]));
    let out = median_blur(&src, 3);
    assert_eq!(out.get_pixel(2, 2).0, [50.0, 50.0, 50.0, 255.0]);
}

#[test]
fn noise_is_deterministic_per_seed_and_keeps_alpha() {
    let src = ramp(8, 8);
    let a = additive_gaussian_noise(&src, 10.0, true, 42);
    let b = additive_gaussian_noise(&src, 10.0, true, 42);
    let c = additive_gaussian_noise(&src, 10.0, true, 43);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.pixels().all(|p| p.0[3] == 255.0));
}

#[test]
fn contrast_and_brightness_clamp() {
    let src = Raster::from_pixel(1, 1, Rgba([250.0, 128.0, 0.0, 255.0]));
    assert_eq!(brightness(&src, 10.0).get_pixel(0, 0).0, [255.0, 138.0, 10.0, 255.0]);
    assert_eq!(contrast(&src, 2.0).get_pixel(0, 0).0, [255.0, 128.0, 0.0, 255.0]);
}

#[test]
fn grayscale_equalizes_channels() {
    let out = grayscale(&ramp(3, 3));
    assert!(out.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
}

#[test]
fn resample_and_jpeg_keep_dimensions() {
    let src = ramp(9, 7);
    let r = resample(&src, 0.4, Interpolation::Nearest, Interpolation::Cubic);
    assert_eq!(r.dimensions(), (9, 7));
    let j = jpeg_compression(&src, 20).unwrap();
    assert_eq!(j.dimensions(), (9, 7));
    assert!(j.pixels().all(|p| p.0[3] == 255.0));
}

#[test]
fn zero_displacement_remap_is_identity() {
    let src = ramp(4, 3);
    let zeros = vec![0.0; 12];
    assert_eq!(remap(&src, &zeros, &zeros), src);
}

#[test]
fn elastic_distortion_replays_from_seed() {
    let src = ramp(10, 10);
    let a = elastic_distortion(&src, 5.0, 2.0, 9).unwrap();
    let b = elastic_distortion(&src, 5.0, 2.0, 9).unwrap();
    assert_eq!(a, b);
}

#[test]
fn motion_blur_of_constant_image_is_identity() {
    let src = Raster::from_pixel(6, 6, Rgba([40.0, 80.0, 120.0, 255.0]));
    let out = motion_blur(&src, 5, 30.0);
    for p in out.pixels() {
        assert!((p.0[1] - 80.0).abs() < 1e-3);
    }
}

#[test]
fn dropout_cells_are_whole_blocks() {
    let src = Raster::from_pixel(8, 8, Rgba([100.0, 100.0, 100.0, 255.0]));
    let out = coarse_dropout(&src, 0.5, (2, 2), false, false, 17);
    for (x, y, p) in out.enumerate_pixels() {
        let corner = out.get_pixel((x / 4) * 4, (y / 4) * 4);
        assert_eq!(p.0, corner.0);
        assert!(p.0 == [0.0, 0.0, 0.0, 255.0] || p.0 == [100.0, 100.0, 100.0, 255.0]);
    }
    assert_eq!(coarse_dropout(&src, 0.0, (2, 2), true, false, 3), src);
}

#[test]
fn half_turn_rotation_flips_both_axes() {
    let src = ramp(4, 3);
    let out = rotate(&src, 180.0, BorderMode::Constant);
    for (x, y, p) in out.enumerate_pixels() {
        let q = src.get_pixel(3 - x, 2 - y).0;
        for c in 0..4 {
            assert!((p.0[c] - q[c]).abs() < 1e-3);
        }
    }
}

#[test]
fn constant_border_rotation_leaves_corners_empty() {
    let src = Raster::from_pixel(10, 10, Rgba([255.0, 255.0, 255.0, 255.0]));
    let out = rotate(&src, 45.0, BorderMode::Constant);
    assert_eq!(out.get_pixel(0, 0).0[3], 0.0);
    assert!(out.get_pixel(5, 5).0[3] > 254.99);
    let edge = rotate(&src, 45.0, BorderMode::Edge);
    assert!(edge.pixels().all(|p| p.0[3] > 254.99));
}

#[test]
fn shadow_profile_eases_into_a_plateau() {
    let v = shadow_profile(10, [0.0, 0.4, 0.6, 1.0]);
    assert_eq!(v.len(), 10);
    assert_eq!(v[0], 0.0);
    assert!(v[1] > 0.0 && v[1] < v[2] && v[2] < v[3]);
    assert_eq!(v[4], 1.0);
    assert_eq!(v[5], 1.0);
    assert!(v[6] > v[7] && v[7] > v[8]);
    assert_eq!(v[9], 0.0);
    assert!(shadow_profile(6, [-1.0, -1.0, -0.5, -0.5]).iter().all(|&x| x == 0.0));
}
