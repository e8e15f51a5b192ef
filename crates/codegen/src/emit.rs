//! Assembly sinks.
//!
//! Both passes write through [`CodeSink`], a line-oriented buffer of `(span, instruction)` pairs
//! that is flushed once the pass is done.

use crate::{EmitError, asm::Inst};
use std::{fmt, io};
use talon_ast::Span;

/// Receives emitted instructions in program order.
pub trait CodeSink {
    /// Appends one line, attributed to the node at `span`.
    fn emit(&mut self, span: Span, inst: Inst);

    /// Writes out everything emitted so far.
    fn flush(&mut self) -> Result<(), EmitError>;
}

impl<S: CodeSink + ?Sized> CodeSink for &mut S {
    #[inline]
    fn emit(&mut self, span: Span, inst: Inst) {
        (**self).emit(span, inst)
    }

    #[inline]
    fn flush(&mut self) -> Result<(), EmitError> {
        (**self).flush()
    }
}

/// An in-memory sink.
///
/// Flushing is a no-op: the lines stay available until taken with [`into_lines`] or appended to
/// another sink with [`drain_into`].
///
/// [`into_lines`]: Self::into_lines
/// [`drain_into`]: Self::drain_into
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    lines: Vec<(Span, Inst)>,
}

impl CodeBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the buffered lines.
    pub fn lines(&self) -> &[(Span, Inst)] {
        &self.lines
    }

    /// Returns an iterator over the buffered instructions, without spans.
    pub fn insts(&self) -> impl DoubleEndedIterator<Item = &Inst> + ExactSizeIterator + Clone {
        self.lines.iter().map(|(_, inst)| inst)
    }

    /// Consumes the buffer, returning its lines.
    pub fn into_lines(self) -> Vec<(Span, Inst)> {
        self.lines
    }

    /// Re-emits every buffered line into `sink`, leaving `self` empty.
    pub fn drain_into(&mut self, sink: &mut (impl CodeSink + ?Sized)) {
        for (span, inst) in self.lines.drain(..) {
            sink.emit(span, inst);
        }
    }

    /// Returns the number of buffered lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl CodeSink for CodeBuffer {
    #[inline]
    fn emit(&mut self, span: Span, inst: Inst) {
        self.lines.push((span, inst));
    }

    #[inline]
    fn flush(&mut self) -> Result<(), EmitError> {
        Ok(())
    }
}

impl fmt::Display for CodeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (span, inst) in &self.lines {
            writeln!(f, "{}", Line { span: *span, inst, annotate: false })?;
        }
        Ok(())
    }
}

/// A sink that renders assembly text to a writer when flushed.
pub struct CodeStream<W> {
    out: W,
    pending: Vec<(Span, Inst)>,
    annotate: bool,
}

impl<W: io::Write> CodeStream<W> {
    /// Creates a new stream writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, pending: Vec::new(), annotate: false }
    }

    /// Sets whether every line with a known origin is followed by a `# lo..hi` comment.
    pub fn annotate(mut self, yes: bool) -> Self {
        self.annotate = yes;
        self
    }

    /// Returns the number of lines emitted but not yet written.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Consumes the stream, returning the writer. Unflushed lines are discarded.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: io::Write> CodeSink for CodeStream<W> {
    #[inline]
    fn emit(&mut self, span: Span, inst: Inst) {
        self.pending.push((span, inst));
    }

    fn flush(&mut self) -> Result<(), EmitError> {
        trace!(lines = self.pending.len(), "flushing assembly");
        for (span, inst) in self.pending.drain(..) {
            writeln!(self.out, "{}", Line { span, inst: &inst, annotate: self.annotate })?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W> fmt::Debug for CodeStream<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeStream")
            .field("pending", &self.pending.len())
            .field("annotate", &self.annotate)
            .finish_non_exhaustive()
    }
}

/// One rendered line. Labels and section switches are flush-left, everything else is indented.
struct Line<'a> {
    span: Span,
    inst: &'a Inst,
    annotate: bool,
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.inst.is_flush_left() {
            f.write_str("\t")?;
        }
        write!(f, "{}", self.inst)?;
        if self.annotate && !self.span.is_dummy() {
            write!(f, "\t# {}", self.span)?;
        }
        Ok(())
    }
}
