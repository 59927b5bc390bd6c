//! Streaming and batch execution of task streams.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, mpsc};

use rayon::prelude::*;

use crate::foundation::error::{SynthError, SynthResult};
use crate::generator::task::{RetryPolicy, Task, TaskResult, TaskSeeds, run_task};
use crate::template::Template;

/// Options shared by [`run_generator`] and [`generate_batch`].
#[derive(Clone, Debug)]
pub struct GeneratorOpts {
    /// Number of tasks; `None` runs until the sink stops.
    pub count: Option<u64>,
    /// Worker threads; `0` generates on the calling thread.
    pub workers: usize,
    /// Top-level seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Failure handling per task.
    pub retry: RetryPolicy,
}

impl Default for GeneratorOpts {
    fn default() -> Self {
        Self {
            count: None,
            workers: 0,
            seed: None,
            retry: RetryPolicy::Forever,
        }
    }
}

/// Counters collected while generating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    /// Tasks that produced an output.
    pub produced: u64,
    /// Tasks dropped by the retry policy.
    pub failed: u64,
    /// Attempts over all tasks.
    pub attempts: u64,
}

impl GeneratorStats {
    fn record<O>(&mut self, result: &TaskResult<O>) {
        if result.output.is_some() {
            self.produced += 1;
        } else {
            self.failed += 1;
        }
        self.attempts += u64::from(result.attempts);
    }
}

type WorkerMsg<O> = SynthResult<TaskResult<O>>;

/// Generate tasks and hand each result to `sink` as it completes.
///
/// With `workers > 0` every worker builds its own template with `make` and pulls tasks from a
/// bounded queue; results arrive in completion order, and each result depends only on its task
/// seed. Both queues hold at most `workers` entries. `sink` may return [`ControlFlow::Break`] to
/// stop early; in-flight tasks are finished and discarded.
pub fn run_generator<T, F, S>(make: F, opts: &GeneratorOpts, mut sink: S) -> SynthResult<GeneratorStats>
where
    T: Template,
    F: Fn() -> SynthResult<T> + Sync,
    S: FnMut(TaskResult<T::Output>) -> SynthResult<ControlFlow<()>>,
{
    let mut seeds = TaskSeeds::new(opts.seed);
    let mut stats = GeneratorStats::default();
    tracing::info!(count = ?opts.count, workers = opts.workers, "generator started");

    if opts.workers == 0 {
        let template = make()?;
        let mut done = 0u64;
        while opts.count.is_none_or(|n| done < n) {
            let Some(task) = seeds.next() else { break };
            let result = run_task(&template, task, opts.retry)?;
            done += 1;
            stats.record(&result);
            if sink(result)?.is_break() {
                break;
            }
        }
        tracing::info!(?stats, "generator finished");
        return Ok(stats);
    }

    let depth = opts.workers;
    std::thread::scope(|scope| -> SynthResult<GeneratorStats> {
        let (task_tx, task_rx) = mpsc::sync_channel::<Task>(depth);
        let (result_tx, result_rx) = mpsc::sync_channel::<WorkerMsg<T::Output>>(depth);
        let task_rx = Arc::new(Mutex::new(task_rx));

        for worker in 0..opts.workers {
            let task_rx = Arc::clone(&task_rx);
            let result_tx = result_tx.clone();
            let make = &make;
            let retry = opts.retry;
            scope.spawn(move || {
                let template = match make() {
                    Ok(t) => t,
                    Err(err) => {
                        let _ = result_tx.send(Err(err));
                        return;
                    }
                };
                tracing::debug!(worker, "worker ready");
                loop {
                    let next = match task_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => return,
                    };
                    let Ok(task) = next else { return };
                    if result_tx.send(run_task(&template, task, retry)).is_err() {
                        return;
                    }
                }
            });
        }
        drop(result_tx);

        let mut sent = 0u64;
        let mut task_tx = Some(task_tx);
        let mut feed = |sent: &mut u64, task_tx: &mut Option<mpsc::SyncSender<Task>>| {
            if opts.count.is_some_and(|n| *sent >= n) {
                *task_tx = None;
                return;
            }
            let (Some(tx), Some(task)) = (task_tx.as_ref(), seeds.next()) else {
                return;
            };
            if tx.send(task).is_ok() {
                *sent += 1;
            }
        };
        for _ in 0..depth {
            feed(&mut sent, &mut task_tx);
        }

        let mut outcome = Ok(());
        let mut received = 0u64;
        while opts.count.is_none_or(|n| received < n) {
            let Ok(msg) = result_rx.recv() else {
                outcome = Err(SynthError::config("every generator worker exited"));
                break;
            };
            received += 1;
            let result = match msg {
                Ok(r) => r,
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            };
            feed(&mut sent, &mut task_tx);
            stats.record(&result);
            match sink(result) {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }

        // Closing the task queue stops the workers once they finish their current task.
        drop(task_tx);
        for _ in result_rx.iter() {}

        outcome?;
        tracing::info!(?stats, "generator finished");
        Ok(stats)
    })
}

/// Generate `opts.count` tasks on a rayon pool and return them ordered by task index.
///
/// Each pool thread builds one template with `make` and reuses it across its tasks.
pub fn generate_batch<T, F>(make: F, opts: &GeneratorOpts) -> SynthResult<Vec<TaskResult<T::Output>>>
where
    T: Template,
    F: Fn() -> SynthResult<T> + Sync + Send,
{
    let count = opts
        .count
        .ok_or_else(|| SynthError::config("batch generation needs a task count"))?;
    let tasks: Vec<Task> = TaskSeeds::new(opts.seed).take(count as usize).collect();
    let pool = build_thread_pool(opts.workers)?;
    let retry = opts.retry;
    let results = pool.install(|| {
        tasks
            .into_par_iter()
            .map_init(&make, |template, task| match template {
                Ok(t) => run_task(t, task, retry),
                Err(err) => Err(SynthError::config(format!("template construction failed: {err}"))),
            })
            .collect::<Vec<_>>()
    });
    results.into_iter().collect()
}

fn build_thread_pool(workers: usize) -> SynthResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if workers > 0 {
        builder = builder.num_threads(workers);
    }
    builder
        .build()
        .map_err(|e| SynthError::config(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/generator/scheduler.rs"]
mod tests;
