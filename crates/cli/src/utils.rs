//! Utility functions used by the talon CLI.

/// Initialize the tracing logger.
///
/// Events are filtered by `RUST_LOG` and written to standard error, which keeps standard output
/// free for the assembly.
#[must_use]
pub fn init_logger() -> impl Sized {
    #[cfg(not(feature = "tracing"))]
    {
        if std::env::var_os("RUST_LOG").is_some() {
            eprintln!(
                "warning: `RUST_LOG` is set, but \"tracing\" support was not enabled at compile time"
            );
        }
    }

    #[cfg(feature = "tracing")]
    if let Err(e) = try_init_logger() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(feature = "tracing")]
fn try_init_logger() -> Result<(), String> {
    use tracing_subscriber::prelude::*;

    tracing_subscriber::Registry::default()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| e.to_string())
}
