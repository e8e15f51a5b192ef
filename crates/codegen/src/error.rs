use std::io;

/// An error raised while writing assembly to its destination.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("couldn't write assembly: {0}")]
    Io(#[from] io::Error),
}

/// An error that stops [`compile`](crate::compile).
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error("couldn't start code generation threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Aborts compilation on a broken internal invariant.
///
/// The back end trusts its input tree completely; anything this fires on is a defect in an
/// earlier stage or in the back end itself, never a problem with the compiled program.
macro_rules! bug {
    ($($arg:tt)*) => {
        panic!("internal compiler error: {}", format_args!($($arg)*))
    };
}
