use super::*;

#[test]
fn task_rng_is_a_pure_function_of_seed() {
    let mut a = rng_from_seed(0xDEAD_BEEF_u128 << 64 | 7);
    let mut b = rng_from_seed(0xDEAD_BEEF_u128 << 64 | 7);
    let xs: Vec<u64> = (0..8).map(|_| seed64(&mut a)).collect();
    let ys: Vec<u64> = (0..8).map(|_| seed64(&mut b)).collect();
    assert_eq!(xs, ys);
}

#[test]
fn empty_ranges_collapse_to_lower_bound() {
    let mut rng = rng_from_seed(1);
    assert_eq!(uniform(&mut rng, (3.0, 3.0)), 3.0);
    assert_eq!(int_inclusive(&mut rng, (5, 2)), 5);
}

#[test]
fn int_range_is_inclusive() {
    let mut rng = rng_from_seed(2);
    let draws: Vec<i64> = (0..200).map(|_| int_inclusive(&mut rng, (0, 1))).collect();
    assert!(draws.contains(&0));
    assert!(draws.contains(&1));
}

#[test]
fn categorical_rejects_bad_weights() {
    assert!(Categorical::new(0, None).is_err());
    assert!(Categorical::new(2, Some(&[1.0])).is_err());
    assert!(Categorical::new(2, Some(&[0.0, 0.0])).is_err());
    assert!(Categorical::new(2, Some(&[-1.0, 2.0])).is_err());
}

#[test]
fn categorical_normalizes_and_respects_zero_weight() {
    let c = Categorical::new(3, Some(&[2.0, 0.0, 2.0])).unwrap();
    assert_eq!(c.weights(), &[0.5, 0.0, 0.5]);
    let mut rng = rng_from_seed(3);
    assert!((0..100).all(|_| c.sample(&mut rng) != 1));
}
