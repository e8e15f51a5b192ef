//! Back end of the talon compiler.
//!
//! Takes a resolved [`Program`](talon_ast::Program) and produces stack-machine MIPS assembly in
//! two passes:
//!
//! 1. [`Layout::compute`] assigns object, frame and v-table offsets and emits the `.data`
//!    section: one record per class plus the string literals.
//! 2. [`Codegen`] emits the `.text` section: the entry point and every method.
//!
//! [`compile`] runs both.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(test, allow(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

#[macro_use]
mod error;
pub use error::{CompileError, EmitError};

pub mod asm;

mod emit;
pub use emit::{CodeBuffer, CodeSink, CodeStream};

mod frame;
pub use frame::Frame;

pub mod layout;
pub use layout::{ClassLayout, Layout, MethodLayout};

mod codegen;
pub use codegen::Codegen;

mod driver;
pub use driver::compile;
