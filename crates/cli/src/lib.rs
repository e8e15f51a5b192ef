//! The talon compiler driver.
//!
//! Reads a resolved program serialized as JSON, runs the back end over it, and writes the
//! resulting assembly.
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::{
    fs,
    io::{self, BufWriter, Read},
    path::PathBuf,
};
use talon_ast::Program;
use talon_codegen::{CodeStream, CompileError, compile};
use talon_config::{DumpKind, Opts};

#[macro_use]
extern crate tracing;

pub mod panic_hook;
pub mod utils;

/// An error that stops the driver.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("couldn't read `{path}`: {source}")]
    Read { path: String, source: io::Error },
    #[error("couldn't decode the input program: {0}")]
    Json(#[from] serde_json::Error),
    #[error("couldn't create `{}`: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Parses command-line arguments, including the `-Z` flags.
pub fn parse_args<I, T>(itr: I) -> Result<Opts, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::Parser as _;

    let mut opts = Opts::try_parse_from(itr)?;
    opts.finish()?;
    Ok(opts)
}

/// Compiles the program named by `opts.input` and writes the assembly to `opts.out`, or to
/// standard output if none is given.
#[instrument(level = "debug", skip_all)]
pub fn run_compiler(opts: &Opts) -> Result<(), CliError> {
    let program = read_program(opts.input.as_deref().unwrap_or("-"))?;
    if matches!(opts.unstable.dump, Some(DumpKind::Program)) {
        eprintln!("{program:#?}");
    }

    let out: Box<dyn io::Write> = match &opts.out {
        Some(path) => {
            let file = fs::File::create(path)
                .map_err(|source| CliError::Create { path: path.clone(), source })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    let mut stream = CodeStream::new(out).annotate(opts.annotate);
    let layout = compile(&program, opts, &mut stream)?;

    if matches!(opts.unstable.dump, Some(DumpKind::Layout)) {
        eprintln!("{layout:#?}");
    }
    Ok(())
}

/// Reads and decodes a program from `path`, or from standard input if `path` is `-`.
pub fn read_program(path: &str) -> Result<Program, CliError> {
    let read_err = |source| CliError::Read { path: path.to_string(), source };
    let text = if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(read_err)?;
        text
    } else {
        fs::read_to_string(path).map_err(read_err)?
    };
    let program = serde_json::from_str::<Program>(&text)?;
    debug!(
        classes = program.classes.len(),
        methods = program.methods.len(),
        "read program"
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use talon_config::CompilerStage;

    #[test]
    fn args() {
        let opts = parse_args(["talonc", "prog.json", "-o", "out.s", "-j2", "--annotate"]).unwrap();
        assert_eq!(opts.input.as_deref(), Some("prog.json"));
        assert_eq!(opts.out, Some(PathBuf::from("out.s")));
        assert_eq!(opts.threads().get(), 2);
        assert!(opts.annotate);

        let opts =
            parse_args(["talonc", "-", "--stop-after", "layout", "-Zdump=layout", "-Zsequential"])
                .unwrap();
        assert_eq!(opts.stop_after, Some(CompilerStage::Layout));
        assert_eq!(opts.unstable.dump, Some(DumpKind::Layout));
        assert!(opts.unstable.sequential);

        assert!(parse_args(["talonc", "x.json", "-Zno-such-flag"]).is_err());
    }

    #[test]
    fn missing_input() {
        let err = read_program("/nonexistent/talon/program.json").unwrap_err();
        assert!(matches!(err, CliError::Read { .. }), "{err:?}");
        assert!(err.to_string().starts_with("couldn't read `/nonexistent/talon/program.json`"));
    }
}
