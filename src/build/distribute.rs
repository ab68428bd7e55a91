//! Round-robin distribution of compilation units across workers.

use std::num::NonZeroUsize;
use std::path::PathBuf;

/// How the orchestrator will run the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilePlan {
    /// One call compiles and links every unit, in source order.
    Single(Vec<PathBuf>),
    /// One compile-only process per bucket, never more buckets than units.
    Parallel(Vec<Vec<PathBuf>>),
}

impl CompilePlan {
    /// Workers beyond the unit count would only get empty buckets, so they are
    /// never allocated.
    pub fn new(units: &[PathBuf], workers: NonZeroUsize) -> Self {
        if workers.get() == 1 {
            return CompilePlan::Single(units.to_vec());
        }
        let buckets =
            NonZeroUsize::new(workers.get().min(units.len())).unwrap_or(NonZeroUsize::MIN);
        CompilePlan::Parallel(round_robin(units, buckets))
    }

    /// Buckets that actually have work.
    pub fn active_buckets(&self) -> Vec<&[PathBuf]> {
        match self {
            CompilePlan::Single(units) => vec![units.as_slice()],
            CompilePlan::Parallel(buckets) => buckets
                .iter()
                .filter(|b| !b.is_empty())
                .map(Vec::as_slice)
                .collect(),
        }
    }
}

/// Item `i` goes to bucket `i % buckets`, keeping relative order within a bucket.
pub fn round_robin<T: Clone>(items: &[T], buckets: NonZeroUsize) -> Vec<Vec<T>> {
    let mut out: Vec<Vec<T>> = vec![Vec::new(); buckets.get()];
    for (i, item) in items.iter().enumerate() {
        out[i % buckets.get()].push(item.clone());
    }
    out
}
