use std::num::NonZeroUsize;

/// Returns the number of logical cores, or 1 if it cannot be determined.
pub(crate) fn available_parallelism() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}
