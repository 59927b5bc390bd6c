use super::*;
use crate::foundation::core::{Bbox, Raster};
use crate::foundation::random::rng_from_seed;

fn boxes(sizes: &[(u32, u32)]) -> Vec<Layer> {
    sizes
        .iter()
        .map(|&(w, h)| Layer::new(Raster::new(w, h)))
        .collect()
}

fn flow(meta: FlowLayoutPartial) -> FlowLayoutMeta {
    let mut rng = rng_from_seed(0);
    FlowLayout::default().sample(&mut rng, meta).unwrap()
}

#[test]
fn flow_places_units_left_to_right() {
    let mut layers = boxes(&[(10, 10), (4, 6), (8, 10)]);
    let meta = flow(FlowLayoutPartial {
        space: Some(2),
        ..Default::default()
    });
    FlowLayout::default().apply_meta(&mut layers, &meta).unwrap();
    assert_eq!(layers[0].bbox(), Bbox::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(layers[1].bbox(), Bbox::new(12.0, 2.0, 4.0, 6.0));
    assert_eq!(layers[2].left(), 18.0);
}

#[test]
fn flow_wraps_and_stacks_lines() {
    let mut layers = boxes(&[(10, 5), (10, 8), (10, 5)]);
    let meta = flow(FlowLayoutPartial {
        space: Some(0),
        line_space: Some(3),
        length: Some(Some(20.0)),
        line_align: Some(LineAlign::Start),
        ..Default::default()
    });
    FlowLayout::default().apply_meta(&mut layers, &meta).unwrap();
    assert_eq!(layers[1].left(), 10.0);
    assert_eq!(layers[2].topleft(), Point::new(0.0, 11.0));
}

#[test]
fn flow_alignments() {
    let base = FlowLayoutPartial {
        length: Some(Some(20.0)),
        line_align: Some(LineAlign::Start),
        ..Default::default()
    };
    let sizes = [(8, 4), (8, 4), (6, 4)];

    let mut end = boxes(&sizes);
    let meta = flow(FlowLayoutPartial {
        align: Some(FlowAlign::End),
        ..base.clone()
    });
    FlowLayout::default().apply_meta(&mut end, &meta).unwrap();
    assert_eq!(end[2].right(), 16.0);

    let mut mid = boxes(&sizes);
    let meta = flow(FlowLayoutPartial {
        align: Some(FlowAlign::Middle),
        ..base.clone()
    });
    FlowLayout::default().apply_meta(&mut mid, &meta).unwrap();
    assert_eq!(mid[2].left(), 5.0);

    let mut just = boxes(&[(4, 4), (4, 4), (4, 4), (20, 4)]);
    let meta = flow(FlowLayoutPartial {
        align: Some(FlowAlign::Justify),
        length: Some(Some(20.0)),
        ..base
    });
    FlowLayout::default().apply_meta(&mut just, &meta).unwrap();
    assert_eq!(just[0].left(), 0.0);
    assert_eq!(just[1].left(), 8.0);
    assert_eq!(just[2].right(), 20.0);
}

#[test]
fn flow_reverse_runs_right_to_left() {
    let mut layers = boxes(&[(10, 4), (6, 4)]);
    let meta = flow(FlowLayoutPartial {
        reverse: Some(true),
        ..Default::default()
    });
    FlowLayout::default().apply_meta(&mut layers, &meta).unwrap();
    assert_eq!(layers[0].right(), 0.0);
    assert_eq!(layers[1].right(), -10.0);
}

#[test]
fn flow_vertical_stacks_downward() {
    let mut layers = boxes(&[(6, 10), (4, 5)]);
    let meta = flow(FlowLayoutPartial {
        vertical: Some(true),
        space: Some(1),
        ..Default::default()
    });
    FlowLayout::default().apply_meta(&mut layers, &meta).unwrap();
    assert_eq!(layers[1].top(), 11.0);
    assert_eq!(layers[1].left(), 1.0);
}

#[test]
fn curve_upward_centres_on_parabola() {
    let mut layers = boxes(&[(10, 10), (10, 10), (10, 10)]);
    let meta = CurveLayoutMeta {
        curve: 5,
        space: 0,
        convex: false,
        upward: true,
        vertical: false,
    };
    CurveLayout::default().apply_meta(&mut layers, &meta).unwrap();
    assert_eq!(layers[1].center(), Point::new(0.0, 0.0));
    assert!((layers[0].center() - Point::new(-10.0, 5.0)).hypot() < 1e-9);
    assert!((layers[2].center() - Point::new(10.0, 5.0)).hypot() < 1e-9);
    assert_eq!(layers[0].width(), 10.0);
}

#[test]
fn curve_rotates_to_tangent() {
    let mut layers = boxes(&[(10, 10), (10, 10), (10, 10)]);
    let meta = CurveLayoutMeta {
        curve: 5,
        space: 0,
        convex: true,
        upward: false,
        vertical: false,
    };
    CurveLayout::default().apply_meta(&mut layers, &meta).unwrap();
    let q = layers[2].quad();
    let top_edge = q.points()[1] - q.points()[0];
    let a = -5.0 / 100.0;
    let slope = 2.0 * a * 10.0;
    assert!((top_edge.y / top_edge.x - slope).abs() < 1e-9);
    assert!((layers[2].center() - Point::new(10.0, -5.0)).hypot() < 1e-9);
    assert_eq!(layers[1].bbox(), Bbox::new(-5.0, -5.0, 10.0, 10.0));
}

#[test]
fn curve_single_unit_is_centred_and_straight() {
    let mut layers = boxes(&[(7, 3)]);
    let meta = CurveLayoutMeta {
        curve: 20,
        space: 4,
        convex: false,
        upward: false,
        vertical: true,
    };
    CurveLayout::default().apply_meta(&mut layers, &meta).unwrap();
    assert_eq!(layers[0].bbox(), Bbox::new(-3.5, -1.5, 7.0, 3.0));
}

#[test]
fn layout_union_samples_its_variant() {
    let mut rng = rng_from_seed(2);
    let layout = Layout::Curve(CurveLayout::default());
    let meta = layout.sample(&mut rng, LayoutPartial::Any).unwrap();
    assert!(matches!(meta, LayoutMeta::Curve(_)));
    let err = layout
        .sample(&mut rng, LayoutPartial::Flow(FlowLayoutPartial::default()))
        .unwrap_err();
    assert!(matches!(err, crate::foundation::error::SynthError::Config(_)));
}

#[test]
fn flow_lines_match_placement_rows() {
    let mut layers = boxes(&[(10, 4), (10, 4), (10, 4), (25, 4)]);
    let meta = FlowLayoutMeta {
        space: 2,
        line_space: 3,
        length: Some(24.0),
        align: FlowAlign::Start,
        line_align: LineAlign::Start,
        reverse: false,
        vertical: false,
    };
    let lines = meta.lines(&layers);
    assert_eq!(lines, vec![vec![0, 1], vec![2], vec![3]]);
    FlowLayout::default().apply_meta(&mut layers, &meta).unwrap();
    assert_eq!(layers[1].topleft(), Point::new(12.0, 0.0));
    assert_eq!(layers[2].topleft(), Point::new(0.0, 7.0));
    assert_eq!(layers[3].topleft(), Point::new(0.0, 14.0));
}
