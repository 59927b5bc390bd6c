use super::*;
use crate::foundation::core::{Point, Vec2};
use image::Rgba;

fn row_of_glyphs(n: usize) -> Vec<Layer> {
    (0..n)
        .map(|i| {
            let v = 40.0 * i as f32;
            let mut l = Layer::new(Raster::from_pixel(3, 5, Rgba([v, 255.0 - v, 9.0, 255.0])));
            l.set_topleft(Point::new(4.0 * i as f64, 0.0));
            l
        })
        .collect()
}

#[test]
fn group_quad_is_union_rectangle() {
    let mut layers = row_of_glyphs(3);
    let g = Group::new(&mut layers);
    assert_eq!(g.bbox(), Bbox::new(0.0, 0.0, 11.0, 5.0));
}

#[test]
fn setting_rect_quad_reads_back_exactly() {
    let mut layers = row_of_glyphs(4);
    let mut g = Group::new(&mut layers);
    let target = Bbox::new(10.0, -3.0, 30.0, 10.0).to_quad();
    g.set_quad(target).unwrap();
    assert!(g.quad().approx_eq(&target, 1e-9));
}

#[test]
fn members_keep_relative_positions_under_translation() {
    let mut layers = row_of_glyphs(3);
    let before: Vec<f64> = layers.iter().map(|l| l.left()).collect();
    let mut g = Group::new(&mut layers);
    g.set_bbox(Bbox::new(100.0, 50.0, 11.0, 5.0)).unwrap();
    let after: Vec<f64> = layers.iter().map(|l| l.left()).collect();
    for (b, a) in before.iter().zip(after.iter()) {
        assert!((a - b - 100.0).abs() < 1e-9);
    }
}

#[test]
fn perspective_target_maps_member_corners_coherently() {
    let mut layers = row_of_glyphs(3);
    let mut g = Group::new(&mut layers);
    let old = g.quad();
    let target = Quad([
        Point::new(0.0, 0.0),
        Point::new(20.0, 2.0),
        Point::new(18.0, 9.0),
        Point::new(1.0, 6.0),
    ]);
    let h = Homography::from_quads(&old, &target).unwrap();
    let expected: Vec<Quad> = g.iter().map(|l| h.apply_quad(&l.quad()).unwrap()).collect();
    g.set_quad(target).unwrap();
    for (l, e) in g.iter().zip(expected.iter()) {
        assert!(l.quad().approx_eq(e, 1e-9));
    }
    assert_eq!(g.bbox(), Quad::union(&expected).unwrap().bbox());
}

#[test]
fn invalid_members_are_rejected() {
    let mut layers = row_of_glyphs(2);
    assert!(Group::with_members(&mut layers, [0, 2]).is_err());
    assert!(Group::with_members(&mut layers, [1, 1]).is_err());
    assert_eq!(Group::with_members(&mut layers, [1]).unwrap().len(), 1);
}

#[test]
fn empty_group_is_inert() {
    let mut layers: Vec<Layer> = Vec::new();
    let mut g = Group::new(&mut layers);
    assert_eq!(g.quad(), Quad::default());
    g.set_quad(Bbox::new(1.0, 1.0, 2.0, 2.0).to_quad()).unwrap();
    assert_eq!(g.output(None).dimensions(), (0, 0));
}

#[test]
fn earlier_members_paint_on_top() {
    let mut layers = vec![
        Layer::new(Raster::from_pixel(2, 2, Rgba([255.0, 0.0, 0.0, 255.0]))),
        Layer::new(Raster::from_pixel(2, 2, Rgba([0.0, 0.0, 255.0, 255.0]))),
    ];
    let g = Group::new(&mut layers);
    assert_eq!(g.output(None).get_pixel(0, 0).0, [255.0, 0.0, 0.0, 255.0]);
}

#[test]
fn merge_places_flattened_layer_at_group_topleft() {
    let mut layers = row_of_glyphs(2);
    let mut g = Group::new(&mut layers);
    g.translate(Vec2::new(5.5, 2.0));
    let merged = g.merge();
    assert_eq!(merged.bbox(), Bbox::new(5.5, 2.0, 7.0, 5.0));
    assert_eq!(merged.image().dimensions(), (7, 5));
}
