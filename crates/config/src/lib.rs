//! talon compiler configuration.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use std::num::NonZeroUsize;

#[macro_use]
mod macros;

mod opts;
pub use opts::{Opts, UnstableOpts};

mod utils;

str_enum! {
    /// Compiler stage.
    #[derive(strum::EnumIs)]
    #[strum(serialize_all = "lowercase")]
    pub enum CompilerStage {
        /// Class and method layout was computed and the class records were emitted.
        #[strum(serialize = "layout")]
        Layout,
        /// Code was generated for every method and the top-level statement.
        #[strum(serialize = "codegen")]
        Codegen,
    }
}

str_enum! {
    /// What kind of internal state to dump to stderr.
    #[derive(strum::EnumIs)]
    #[strum(serialize_all = "kebab-case")]
    pub enum DumpKind {
        /// Print the input program.
        Program,
        /// Print the computed layout tables.
        Layout,
    }
}

/// Wrapper to implement a custom `Default` value for the number of threads.
#[derive(Clone, Copy)]
pub struct Threads(pub NonZeroUsize);

impl From<Threads> for NonZeroUsize {
    fn from(threads: Threads) -> Self {
        threads.0
    }
}

impl From<NonZeroUsize> for Threads {
    fn from(n: NonZeroUsize) -> Self {
        Self(n)
    }
}

impl Default for Threads {
    fn default() -> Self {
        Self(utils::available_parallelism())
    }
}

impl std::str::FromStr for Threads {
    type Err = <NonZeroUsize as std::str::FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<usize>()
            .map(|n| Self(NonZeroUsize::new(n).unwrap_or_else(utils::available_parallelism)))
    }
}

impl std::fmt::Display for Threads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for Threads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn string_enum() {
        for value in CompilerStage::iter() {
            let s = value.to_str();
            assert_eq!(value.to_string(), s);
            assert_eq!(value, s.parse().unwrap());
        }
        for value in DumpKind::iter() {
            assert_eq!(value, value.to_str().parse().unwrap());
        }
        assert_eq!(CompilerStage::Layout.to_str(), "layout");
        assert!(CompilerStage::Layout < CompilerStage::Codegen);
        assert!("parsing".parse::<CompilerStage>().is_err());
    }

    #[test]
    fn threads() {
        assert_eq!("3".parse::<Threads>().unwrap().0.get(), 3);
        assert_eq!("0".parse::<Threads>().unwrap().0, utils::available_parallelism());
        assert!("-1".parse::<Threads>().is_err());
    }
}
