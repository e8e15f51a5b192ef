//! talon CLI arguments.

use crate::{CompilerStage, DumpKind, Threads};
use std::{num::NonZeroUsize, path::PathBuf};

#[cfg(feature = "clap")]
use clap::{Parser, ValueHint};

/// Back end for a small object-oriented language: lays out classes and emits stack-machine MIPS
/// assembly.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "clap", derive(Parser))]
#[cfg_attr(feature = "clap", command(name = "talonc", version, arg_required_else_help = true))]
#[allow(clippy::manual_non_exhaustive)]
pub struct Opts {
    /// The resolved program to compile, as JSON.
    ///
    /// `-` specifies standard input.
    #[cfg_attr(feature = "clap", arg(value_hint = ValueHint::FilePath))]
    pub input: Option<String>,
    /// File to write the assembly to. Defaults to standard output.
    #[cfg_attr(feature = "clap", arg(long, short = 'o', value_hint = ValueHint::FilePath))]
    pub out: Option<PathBuf>,

    /// Number of threads to use for code generation. Zero specifies the number of logical cores.
    #[cfg_attr(feature = "clap", arg(long, short = 'j', visible_alias = "jobs", default_value_t))]
    pub threads: Threads,
    /// Stop execution after the given compiler stage.
    #[cfg_attr(feature = "clap", arg(long, value_enum))]
    pub stop_after: Option<CompilerStage>,

    /// Annotate every emitted instruction with the source span of the node that produced it.
    #[cfg_attr(feature = "clap", arg(help_heading = "Display options", long))]
    pub annotate: bool,

    /// Unstable flags. WARNING: these are completely unstable, and may change at any time.
    ///
    /// See `-Zhelp` for more details.
    #[doc(hidden)]
    #[cfg_attr(feature = "clap", arg(id = "unstable-features", value_name = "FLAG", short = 'Z'))]
    pub _unstable: Vec<String>,

    /// Parsed unstable flags.
    #[cfg_attr(feature = "clap", arg(skip))]
    pub unstable: UnstableOpts,

    // Allows `Opts { x: y, ..Default::default() }`.
    #[doc(hidden)]
    #[cfg_attr(feature = "clap", arg(skip))]
    pub _non_exhaustive: (),
}

impl Opts {
    /// Returns the number of threads to use.
    #[inline]
    pub fn threads(&self) -> NonZeroUsize {
        self.threads.0
    }

    /// Returns `true` if code generation should run.
    #[inline]
    pub fn run_codegen(&self) -> bool {
        self.stop_after.is_none_or(|stage| stage >= CompilerStage::Codegen)
    }

    /// Finishes argument parsing.
    ///
    /// This currently only parses the `-Z` arguments into the `unstable` field.
    #[cfg(feature = "clap")]
    pub fn finish(&mut self) -> Result<(), clap::Error> {
        if !self._unstable.is_empty() {
            let hack = self._unstable.iter().map(|s| format!("--{s}"));
            self.unstable =
                UnstableOpts::try_parse_from(std::iter::once(String::new()).chain(hack))?;
        }
        Ok(())
    }
}

/// Internal options.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "clap", derive(Parser))]
#[cfg_attr(feature = "clap", clap(
    disable_help_flag = true,
    before_help = concat!(
        "List of all unstable flags.\n",
        "WARNING: these are completely unstable, and may change at any time!\n",
        "   NOTE: the following flags should be passed on the command-line using `-Z`, not `--`",
    ),
    help_template = "{before-help}{all-args}"
))]
#[allow(clippy::manual_non_exhaustive)]
pub struct UnstableOpts {
    /// Print additional information about the compiler's internal state to stderr.
    ///
    /// Valid kinds are `program` and `layout`.
    #[cfg_attr(feature = "clap", arg(long, value_enum, value_name = "KIND"))]
    pub dump: Option<DumpKind>,

    /// Generate code on the calling thread only, regardless of `--threads`.
    #[cfg_attr(feature = "clap", arg(long))]
    pub sequential: bool,

    /// Print help.
    #[cfg_attr(feature = "clap", arg(long, action = clap::ArgAction::Help))]
    pub help: (),

    // Allows `UnstableOpts { x: y, ..Default::default() }`.
    #[doc(hidden)]
    #[cfg_attr(feature = "clap", arg(skip))]
    pub _non_exhaustive: (),

    #[cfg(test)]
    #[cfg_attr(feature = "clap", arg(long))]
    pub test_bool: bool,
    #[cfg(test)]
    #[cfg_attr(feature = "clap", arg(long))]
    pub test_value: Option<usize>,
}
