//! Bounded worker pool for filesystem jobs
//!
//! Copy fan-out is I/O bound, so a handful of scoped threads pulling from
//! a shared queue is enough. Scoped spawning lets jobs borrow from the
//! caller's stack, which keeps path lists and reporters free of `Arc`.

use std::sync::Mutex;
use std::thread;

/// Worker count used by the staging and mirroring commands.
pub const DEFAULT_WORKERS: usize = 8;

/// Runs `job` over every item using up to `workers` threads.
///
/// Returns once all items are processed. The worker count is clamped to
/// the item count so small batches do not spawn idle threads.
pub fn for_each_parallel<T, F>(items: Vec<T>, workers: usize, job: F)
where
    T: Send,
    F: Fn(T) + Sync,
{
    if items.is_empty() {
        return;
    }
    let workers = workers.clamp(1, items.len());
    let queue = Mutex::new(items.into_iter());
    let queue = &queue;
    let job = &job;
    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(move || loop {
                // The guard must drop before the job runs or the pool
                // would serialize on the queue lock.
                let item = { queue.lock().unwrap().next() };
                match item {
                    Some(item) => job(item),
                    None => break,
                }
            });
        }
    });
}
