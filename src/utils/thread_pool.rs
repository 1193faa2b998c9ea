use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::thread;

/// Resolve a configured worker count, where `0` means "one per CPU"
#[must_use]
pub fn resolve_threads(configured: usize) -> usize {
    match configured {
        0 => thread::available_parallelism().map_or(1, NonZeroUsize::get),
        n => n,
    }
}

/// Build a dedicated pool of exactly `num_threads` scan workers
///
/// Each scan gets its own pool so the worker count from the roster file is
/// honored exactly instead of sharing rayon's global pool.
///
/// # Errors
///
/// Returns an error if the operating system refuses to spawn the threads
pub fn build_worker_pool(num_threads: usize) -> Result<ThreadPool, ThreadPoolBuildError> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads.max(1))
        .thread_name(|i| format!("roster-worker-{i}"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_means_available_parallelism() {
        assert!(resolve_threads(0) >= 1);
        assert_eq!(resolve_threads(3), 3);
    }

    #[test]
    fn test_pool_has_requested_size() {
        let pool = build_worker_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
        let name = pool.install(|| std::thread::current().name().map(str::to_owned));
        assert!(name.unwrap().starts_with("roster-worker-"));
    }
}
