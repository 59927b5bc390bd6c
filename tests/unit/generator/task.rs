use super::*;
use crate::foundation::error::SynthError;
use crate::foundation::random::SynthRng;

/// Fails with a retryable error whenever the first draw is even.
struct Flaky;

impl Template for Flaky {
    type Output = u64;

    fn generate(&self, rng: &mut SynthRng) -> SynthResult<u64> {
        let v: u64 = rng.random();
        if v % 2 == 0 {
            Err(SynthError::VisibilityExhausted)
        } else {
            Ok(v)
        }
    }
}

struct AlwaysFails(fn() -> SynthError);

impl Template for AlwaysFails {
    type Output = ();

    fn generate(&self, _rng: &mut SynthRng) -> SynthResult<()> {
        Err((self.0)())
    }
}

#[test]
fn seeds_depend_only_on_top_seed() {
    let a: Vec<Task> = TaskSeeds::new(Some(9)).take(5).collect();
    let b: Vec<Task> = TaskSeeds::new(Some(9)).take(5).collect();
    let c: Vec<Task> = TaskSeeds::new(Some(10)).take(5).collect();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(
        a.iter().map(|t| t.index).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );
}

#[test]
fn forever_retries_until_success() {
    for task in TaskSeeds::new(Some(1)).take(20) {
        let r = run_task(&Flaky, task, RetryPolicy::Forever).unwrap();
        assert_eq!(r.output.unwrap() % 2, 1);
        assert!(r.attempts >= 1);
        let again = run_task(&Flaky, task, RetryPolicy::Forever).unwrap();
        assert_eq!(again.output, r.output);
        assert_eq!(again.attempts, r.attempts);
    }
}

#[test]
fn never_and_limit_give_up() {
    let task = Task { index: 0, seed: 1 };
    let r = run_task(&AlwaysFails(|| SynthError::filter("x")), task, RetryPolicy::Never).unwrap();
    assert!(r.output.is_none());
    assert_eq!(r.attempts, 1);

    let r = run_task(
        &AlwaysFails(|| SynthError::unrenderable("x")),
        task,
        RetryPolicy::Limit(3),
    )
    .unwrap();
    assert!(r.output.is_none());
    assert_eq!(r.attempts, 4);
}

#[test]
fn configuration_errors_are_not_retried() {
    let task = Task { index: 0, seed: 1 };
    let err = run_task(
        &AlwaysFails(|| SynthError::config("bad")),
        task,
        RetryPolicy::Forever,
    )
    .unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));
}
