//! The `talonc` binary.

use std::process::ExitCode;
use talon_cli::{parse_args, run_compiler, utils};

// Used by the library.
use clap as _;
use serde_json as _;
use talon_ast as _;
use talon_codegen as _;
use talon_config as _;
use thiserror as _;
use tracing as _;
#[cfg(feature = "tracing")]
use tracing_subscriber as _;

fn main() -> ExitCode {
    talon_cli::panic_hook::install();
    let _guard = utils::init_logger();
    let opts = match parse_args(std::env::args_os()) {
        Ok(opts) => opts,
        Err(e) => e.exit(),
    };
    match run_compiler(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
