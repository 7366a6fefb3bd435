//! Graph resolution stages.
//!
//! - [`CapabilityResolver`]: task names to the deduplicated capability set.
//! - [`IntrinsicResolver`]: capability ids to the adapters implementing them.
//!
//! Both stages resolve every item independently: a failed query is recorded
//! in that item's outcome and the remaining items are still resolved.

mod capability;
mod intrinsic;

pub use capability::{
    CapabilityResolution, CapabilityResolver, TaskCapabilities, TaskOutcome, DEFAULT_TAXONOMY,
};
pub use intrinsic::{
    CapabilityIntrinsics, IntrinsicOutcome, IntrinsicResolution, IntrinsicResolver,
};

use std::thread;

use crossbeam_channel::{bounded, unbounded};

/// How the items of one stage are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveStrategy {
    /// One item after another on the calling thread.
    #[default]
    Sequential,
    /// Items fanned out over up to `workers` scoped threads, merged in input
    /// order once every item has finished.
    Parallel {
        /// Maximum number of worker threads.
        workers: usize,
    },
}

impl ResolveStrategy {
    /// `Sequential` for 0 or 1 workers, `Parallel` otherwise.
    #[must_use]
    pub const fn from_workers(workers: usize) -> Self {
        if workers <= 1 {
            Self::Sequential
        } else {
            Self::Parallel { workers }
        }
    }
}

/// Applies `f` to every item and returns the outputs in input order.
///
/// Each call writes only its own output slot, so one item's failure (carried
/// inside `O`) cannot affect another's.
pub(crate) fn fan_out<I, O, F>(items: &[I], strategy: ResolveStrategy, f: F) -> Vec<O>
where
    I: Sync,
    O: Send,
    F: Fn(&I) -> O + Sync,
{
    let workers = match strategy {
        ResolveStrategy::Parallel { workers } if workers > 1 && items.len() > 1 => {
            workers.min(items.len())
        }
        _ => return items.iter().map(&f).collect(),
    };

    let (job_tx, job_rx) = bounded::<usize>(items.len());
    for idx in 0..items.len() {
        // Capacity equals the job count, so this never blocks.
        let _ = job_tx.send(idx);
    }
    drop(job_tx);

    let (out_tx, out_rx) = unbounded::<(usize, O)>();
    let f = &f;
    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let out_tx = out_tx.clone();
            scope.spawn(move || {
                while let Ok(idx) = job_rx.recv() {
                    let _ = out_tx.send((idx, f(&items[idx])));
                }
            });
        }
    });
    drop(out_tx);

    let mut results: Vec<(usize, O)> = out_rx.iter().collect();
    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, out)| out).collect()
}
