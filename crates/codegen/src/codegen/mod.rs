//! The code generation pass.
//!
//! Walks statements and expressions, emitting a stack-machine instruction sequence for each node.
//! Every value lives on the operand stack: a reference takes one word, a scalar takes a tag word
//! (a copy of `$s5`) above its data word. The generator never allocates registers; it tracks the
//! stack height in a [`Frame`] instead, and every variable access is an offset from `$sp`
//! computed from that height.

use crate::{
    CodeSink, Frame, Layout,
    asm::{BranchOp, Inst, Label, Reg, RuntimeFn},
};
use talon_ast::{Program, Span, Ty, WORD_SIZE};

mod expr;
mod method;
mod stmt;

/// Generates code for the bodies of a program's statements, expressions and methods.
///
/// Requires the complete [`Layout`] of the program.
pub struct Codegen<'a, S: ?Sized> {
    program: &'a Program,
    layout: &'a Layout,
    sink: &'a mut S,
}

impl<'a, S: CodeSink + ?Sized> Codegen<'a, S> {
    /// Creates a new generator emitting into `sink`.
    pub fn new(program: &'a Program, layout: &'a Layout, sink: &'a mut S) -> Self {
        Self { program, layout, sink }
    }

    #[inline]
    fn emit(&mut self, span: Span, inst: Inst) {
        self.sink.emit(span, inst);
    }

    /// Pushes the scalar in `reg`: the marker tag word, then the data word below it.
    fn push_data(&mut self, f: &mut Frame, span: Span, reg: Reg) {
        self.emit(span, Inst::SubuImm(Reg::Sp, Reg::Sp, 2 * WORD_SIZE));
        self.emit(span, Inst::Sw(Reg::S5, WORD_SIZE, Reg::Sp));
        self.emit(span, Inst::Sw(reg, 0, Reg::Sp));
        f.push(2 * WORD_SIZE);
    }

    /// Pushes the reference in `reg`.
    fn push_ref(&mut self, f: &mut Frame, span: Span, reg: Reg) {
        self.emit(span, Inst::SubuImm(Reg::Sp, Reg::Sp, WORD_SIZE));
        self.emit(span, Inst::Sw(reg, 0, Reg::Sp));
        f.push(WORD_SIZE);
    }

    /// Pushes the value of type `ty` held in `reg`.
    fn push_value(&mut self, f: &mut Frame, span: Span, ty: &Ty, reg: Reg) {
        if ty.is_data() {
            self.push_data(f, span, reg);
        } else {
            self.push_ref(f, span, reg);
        }
    }

    /// Pops `bytes` off the stack, emitting nothing when there is nothing to pop.
    fn pop(&mut self, f: &mut Frame, span: Span, bytes: i32) {
        if bytes != 0 {
            self.emit(span, Inst::AdduImm(Reg::Sp, Reg::Sp, bytes));
            f.pop(bytes);
        }
    }

    /// Pops back down to a height observed earlier.
    fn pop_to(&mut self, f: &mut Frame, span: Span, height: i32) {
        let dropped = f.restore(height);
        if dropped != 0 {
            self.emit(span, Inst::AdduImm(Reg::Sp, Reg::Sp, dropped));
        }
    }

    /// Traps if `reg` holds `null`.
    fn null_check(&mut self, span: Span, reg: Reg) {
        self.emit(span, Inst::Branch(BranchOp::Beq, reg, Reg::Zero, RuntimeFn::NullPtrException.into()));
    }

    fn call_runtime(&mut self, span: Span, f: RuntimeFn) {
        self.emit(span, Inst::Jal(f.into()));
    }

    fn label(&mut self, span: Span, label: Label) {
        self.emit(span, Inst::Label(label));
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::{CodeBuffer, Codegen, Frame, Layout};
    use talon_ast::{ExprId, MethodId, Program, StmtId};

    fn with_codegen(program: &Program, f: impl FnOnce(&mut Codegen<'_, CodeBuffer>)) -> Vec<String> {
        let layout = Layout::compute(program, &mut CodeBuffer::new());
        let mut buf = CodeBuffer::new();
        f(&mut Codegen::new(program, &layout, &mut buf));
        buf.insts().map(ToString::to_string).collect()
    }

    /// Generates one expression at the current height of `frame`.
    pub(crate) fn expr(program: &Program, frame: &mut Frame, id: ExprId) -> Vec<String> {
        with_codegen(program, |cg| cg.gen_expr(frame, id))
    }

    /// Generates one statement at the current height of `frame`.
    pub(crate) fn stmt(program: &Program, frame: &mut Frame, id: StmtId) -> Vec<String> {
        with_codegen(program, |cg| cg.gen_stmt(frame, id))
    }

    /// Generates a whole method.
    pub(crate) fn method(program: &Program, id: MethodId) -> Vec<String> {
        with_codegen(program, |cg| cg.gen_method(id))
    }

    /// Generates the program entry point.
    pub(crate) fn entry(program: &Program) -> Vec<String> {
        with_codegen(program, |cg| cg.gen_entry())
    }
}
