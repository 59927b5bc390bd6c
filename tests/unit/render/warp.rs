use super::*;

fn checker(w: u32, h: u32) -> Raster {
    Raster::from_fn(w, h, |x, y| {
        let v = if (x + y) % 2 == 0 { 255.0 } else { 0.0 };
        Rgba([v, 255.0 - v, 40.0, 255.0])
    })
}

#[test]
fn integer_translation_takes_the_blit_path() {
    let src = checker(4, 3);
    let quad = Quad::from_size(4.0, 3.0).translate(kurbo::Vec2::new(2.0, 1.0));
    let w = warp(&src, &quad, 10, 10).unwrap();
    assert!(matches!(w.patch, Cow::Borrowed(_)));
    assert_eq!(w.offset, (2, 1));
}

#[test]
fn near_integer_translation_within_tolerance_blits() {
    let src = checker(4, 3);
    let quad = Quad::from_size(4.0, 3.0).translate(kurbo::Vec2::new(2.0 + 1e-9, 1.0 - 1e-9));
    assert_eq!(rect_offset(&src, &quad), Some((2, 1)));
}

#[test]
fn general_path_matches_blit_for_pure_translation() {
    let src = checker(5, 4);
    let quad = Quad::from_size(5.0, 4.0).translate(kurbo::Vec2::new(3.0, 2.0));
    let slow = warp_general(&src, &quad, 12, 9).unwrap();
    assert!(matches!(slow.patch, Cow::Owned(_)));
    assert_eq!(slow.offset, (3, 2));
    assert_eq!(slow.patch.dimensions(), src.dimensions());
    assert_eq!(*slow.patch, src);

    let mut fast = Raster::new(12, 9);
    paste_image(&src, &mut fast, &quad, BlendMode::Normal);
    let mut general = Raster::new(12, 9);
    blend_at(&mut general, &slow.patch, slow.offset, BlendMode::Normal, false);
    assert_eq!(fast, general);
}

#[test]
fn scaling_up_covers_the_target_rect() {
    let src = Raster::from_pixel(2, 2, Rgba([10.0, 20.0, 30.0, 255.0]));
    let quad = Quad::from_size(6.0, 4.0);
    let mut dst = Raster::new(6, 4);
    paste_image(&src, &mut dst, &quad, BlendMode::Normal);
    assert!(dst.pixels().all(|p| p.0[3] > 0.0));
    assert!(dst.pixels().all(|p| (p.0[0] - 10.0).abs() < 1e-3));
}

#[test]
fn degenerate_or_offscreen_quads_draw_nothing() {
    let src = checker(2, 2);
    let flat = Quad([Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(2.0, 0.0), Point::new(0.0, 0.0)]);
    assert!(warp(&src, &flat, 4, 4).is_none());
    let far = Quad::from_size(2.5, 2.0).translate(kurbo::Vec2::new(100.0, 0.0));
    assert!(warp(&src, &far, 4, 4).is_none());
    assert!(warp(&src, &Quad::from_size(2.0, 2.0), 0, 4).is_none());
}
