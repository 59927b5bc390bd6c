use super::*;
use crate::components::component::component_meta;
use crate::foundation::random::{int_inclusive, rng_from_seed};

component_meta! {
    /// Test meta.
    pub struct DiceMeta / DicePartial {
        pub face: i64,
    }
}

#[derive(Clone, Debug)]
struct Dice(i64);

impl Component for Dice {
    type Meta = DiceMeta;
    type Partial = DicePartial;

    fn sample(&self, rng: &mut SynthRng, partial: DicePartial) -> SynthResult<DiceMeta> {
        Ok(DiceMeta {
            face: match partial.face {
                Some(f) => f,
                None => int_inclusive(rng, (1, self.0)),
            },
        })
    }

    fn apply_meta(&self, layers: &mut [Layer], meta: &DiceMeta) -> SynthResult<()> {
        for l in layers {
            l.image_mut().put_pixel(0, 0, image::Rgba([meta.face as f32; 4]));
        }
        Ok(())
    }
}

fn layers() -> Vec<Layer> {
    vec![Layer::new(crate::foundation::core::Raster::new(1, 1))]
}

#[test]
fn switch_off_has_no_child_meta() {
    let s = Switch::new(Dice(6), 0.0).unwrap();
    let mut rng = rng_from_seed(1);
    for _ in 0..20 {
        let m = s.sample(&mut rng, Default::default()).unwrap();
        assert!(!m.state);
        assert!(m.meta.is_none());
        assert!(matches!(s.data(&m).unwrap(), ComponentData::Empty));
    }
}

#[test]
fn forced_state_overrides_probability() {
    let s = Switch::new(Dice(6), 0.0).unwrap();
    let mut rng = rng_from_seed(1);
    let m = s
        .sample(
            &mut rng,
            SwitchPartial {
                state: Some(true),
                meta: None,
            },
        )
        .unwrap();
    assert!(m.state);
    assert!(m.meta.is_some());
}

#[test]
fn switch_rejects_bad_probability() {
    assert!(Switch::new(Dice(6), 1.5).is_err());
    assert!(Switch::new(Dice(6), f64::NAN).is_err());
}

#[test]
fn selector_index_is_in_range_with_child_meta() {
    let s = Selector::new(vec![Dice(2), Dice(4), Dice(8)], Some(&[1.0, 0.0, 3.0])).unwrap();
    let mut rng = rng_from_seed(2);
    for _ in 0..50 {
        let m = s.sample(&mut rng, Default::default()).unwrap();
        assert!(m.idx == 0 || m.idx == 2);
        assert!(m.meta.face >= 1);
    }
}

#[test]
fn selector_out_of_range_index_is_config_error() {
    let s = Selector::new(vec![Dice(2)], None).unwrap();
    let mut rng = rng_from_seed(2);
    let err = s
        .sample(
            &mut rng,
            SelectorPartial {
                idx: Some(3),
                meta: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));
}

#[test]
fn sequence_meta_matches_component_count() {
    let s = Sequence::new(vec![Dice(3), Dice(3), Dice(3)]);
    let mut rng = rng_from_seed(3);
    let partial = SequencePartial {
        metas: vec![DicePartial { face: Some(2) }],
    };
    let m = s.sample(&mut rng, partial).unwrap();
    assert_eq!(m.metas.len(), 3);
    assert_eq!(m.metas[0].face, 2);

    let too_many = SequencePartial {
        metas: vec![DicePartial::default(); 4],
    };
    assert!(s.sample(&mut rng, too_many).is_err());
}

#[test]
fn nested_replay_draws_nothing() {
    let tree = Sequence::new(vec![
        Switch::new(Selector::new(vec![Dice(6), Dice(20)], None).unwrap(), 0.5).unwrap(),
        Switch::new(Selector::new(vec![Dice(6), Dice(20)], None).unwrap(), 0.5).unwrap(),
    ]);
    let mut rng = rng_from_seed(4);
    let mut a = layers();
    let meta = tree.apply(&mut rng, &mut a, Default::default()).unwrap();

    let mut untouched = rng_from_seed(99);
    let before = untouched.clone();
    let mut b = layers();
    let replayed = tree.apply(&mut untouched, &mut b, meta.clone().into()).unwrap();
    assert_eq!(replayed, meta);
    assert_eq!(a, b);
    assert_eq!(
        crate::foundation::random::seed64(&mut untouched),
        crate::foundation::random::seed64(&mut before.clone())
    );
}

#[test]
fn meta_serializes_as_nested_records() {
    let meta = SwitchMeta {
        state: true,
        meta: Some(SelectorMeta {
            idx: 1,
            meta: DiceMeta { face: 3 },
        }),
    };
    let json = serde_json::to_value(&meta).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"state": true, "meta": {"idx": 1, "meta": {"face": 3}}})
    );
    let back: SwitchMeta<SelectorMeta<DiceMeta>> = serde_json::from_value(json).unwrap();
    assert_eq!(back, meta);
}
