//! Resolved syntax tree for the talon back end.
//!
//! The tree is stored in flat arenas owned by a [`Program`]; nodes refer to each other by typed
//! index. By the time a [`Program`] reaches the back end every name is resolved and every
//! expression carries its static [`Ty`].

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
pub mod index;
pub use index::{Idx, IndexSlice, IndexVec};

mod builder;
pub use builder::ProgramBuilder;

mod node;
pub use node::*;

mod program;
pub use program::Program;

mod span;
pub use span::{BytePos, Span};

mod ty;
pub use ty::{Ty, WORD_SIZE, words_on_stack_frame};
