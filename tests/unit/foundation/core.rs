use super::*;

#[test]
fn bbox_is_tight_around_rotated_quad() {
    let q = Quad([
        Point::new(5.0, 0.0),
        Point::new(10.0, 5.0),
        Point::new(5.0, 10.0),
        Point::new(0.0, 5.0),
    ]);
    assert_eq!(q.bbox(), Bbox::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(q.centroid(), Point::new(5.0, 5.0));
}

#[test]
fn bbox_quad_round_trips_for_rectangles() {
    let b = Bbox::new(-3.0, 4.5, 12.0, 7.0);
    assert_eq!(b.to_quad().bbox(), b);
}

#[test]
fn union_covers_all_inputs() {
    let a = Bbox::new(0.0, 0.0, 2.0, 2.0).to_quad();
    let b = Bbox::new(5.0, -1.0, 1.0, 1.0).to_quad();
    let u = Quad::union([&a, &b]).unwrap();
    assert_eq!(u.bbox(), Bbox::new(0.0, -1.0, 6.0, 3.0));
    assert!(Quad::union(std::iter::empty()).is_none());
}

#[test]
fn empty_boxes_are_detected() {
    assert!(Bbox::new(0.0, 0.0, 0.0, 3.0).is_empty());
    assert!(Bbox::new(0.0, 0.0, 3.0, -1.0).is_empty());
    assert!(!Bbox::new(0.0, 0.0, 0.5, 0.5).is_empty());
}

#[test]
fn degenerate_quad_has_zero_area() {
    let line = Quad([
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(0.0, 0.0),
    ]);
    assert_eq!(line.signed_area2(), 0.0);
    assert!(Quad::from_size(2.0, 3.0).signed_area2().abs() > 0.0);
}

#[test]
fn rgb_alpha_rounds_to_byte() {
    assert_eq!(Rgba8::from_rgb_alpha([1, 2, 3], 0.5).a, 128);
    assert_eq!(Rgba8::from_rgb_alpha([1, 2, 3], 2.0).a, 255);
}
