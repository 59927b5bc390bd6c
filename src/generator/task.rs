//! Task seeds and the per-task retry loop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::foundation::error::SynthResult;
use crate::foundation::random::rng_from_seed;
use crate::template::Template;

/// One unit of work: an index and the seed its generator starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Task {
    /// Position in the task stream.
    pub index: u64,
    /// Seed of the task's own random generator.
    pub seed: u128,
}

/// Endless stream of [`Task`]s.
///
/// Seeds are drawn in order from one generator, so task `i` always gets the same seed for the same
/// top-level seed no matter how many workers consume the stream.
#[derive(Clone, Debug)]
pub struct TaskSeeds {
    rng: StdRng,
    next: u64,
}

impl TaskSeeds {
    /// Seeded stream; `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self { rng, next: 0 }
    }
}

impl Iterator for TaskSeeds {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        let task = Task {
            index: self.next,
            seed: self.rng.random::<u128>(),
        };
        self.next += 1;
        Some(task)
    }
}

/// What to do when an attempt fails with a retryable error.
///
/// Configuration errors are never retried.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Keep drawing until an attempt succeeds.
    #[default]
    Forever,
    /// Give up after the first failure.
    Never,
    /// Allow up to this many retries.
    Limit(u32),
}

impl RetryPolicy {
    fn allows(self, failed_attempts: u32) -> bool {
        match self {
            RetryPolicy::Forever => true,
            RetryPolicy::Never => false,
            RetryPolicy::Limit(n) => failed_attempts <= n,
        }
    }
}

/// Outcome of one task.
#[derive(Clone, Debug)]
pub struct TaskResult<O> {
    /// The task that ran.
    pub task: Task,
    /// The output, or `None` when the retry policy gave up.
    pub output: Option<O>,
    /// Attempts made, including the successful one.
    pub attempts: u32,
}

/// Run `task` on `template`.
///
/// Every attempt draws from the task's own generator, so a retry continues the same random stream
/// and the whole outcome depends only on the task seed.
#[tracing::instrument(level = "debug", skip(template, task), fields(index = task.index))]
pub fn run_task<T: Template>(
    template: &T,
    task: Task,
    retry: RetryPolicy,
) -> SynthResult<TaskResult<T::Output>> {
    let mut rng = rng_from_seed(task.seed);
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match template.generate(&mut rng) {
            Ok(output) => {
                return Ok(TaskResult {
                    task,
                    output: Some(output),
                    attempts,
                });
            }
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) if retry.allows(attempts) => {
                tracing::debug!(attempts, error = %err, "attempt failed, retrying");
            }
            Err(err) => {
                tracing::warn!(attempts, error = %err, "task dropped");
                return Ok(TaskResult {
                    task,
                    output: None,
                    attempts,
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generator/task.rs"]
mod tests;
