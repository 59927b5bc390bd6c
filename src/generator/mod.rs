//! Deterministic task generation: per-task seeds, retries, and parallel execution.

pub mod scheduler;
pub mod task;

pub use scheduler::{GeneratorOpts, GeneratorStats, generate_batch, run_generator};
pub use task::{RetryPolicy, Task, TaskResult, TaskSeeds, run_task};
