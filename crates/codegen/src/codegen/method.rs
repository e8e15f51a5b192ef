use super::Codegen;
use crate::{
    CodeSink, Frame,
    asm::{Inst, Label, Reg, RuntimeFn, Section},
};
use talon_ast::{MethodId, Span, WORD_SIZE};

impl<S: CodeSink + ?Sized> Codegen<'_, S> {
    /// Generates a method of the compiled program.
    ///
    /// On entry the caller has pushed the receiver and then the arguments. The prologue saves the
    /// caller's `$s2` below them, loads the receiver into `$s2`, and parks the return address in
    /// the receiver's slot. The epilogue pops everything down to and including the receiver and,
    /// for non-void methods, leaves the result in its place.
    pub fn gen_method(&mut self, id: MethodId) {
        let program = self.program;
        let decl = program.method(id);
        if decl.origin.is_runtime() {
            bug!("runtime method `{}` has no body to generate", decl.name);
        }
        trace!(method = %decl.name, "generating method");

        let span = decl.span();
        let label = Label::method(program, id);
        let this = self.layout.method(id).this_ptr_offset;

        self.emit(span, Inst::Globl(label.clone()));
        self.label(span, label);
        self.emit(span, Inst::SubuImm(Reg::Sp, Reg::Sp, WORD_SIZE));
        self.emit(span, Inst::Sw(Reg::S2, 0, Reg::Sp));
        self.emit(span, Inst::Lw(Reg::S2, this, Reg::Sp));
        self.emit(span, Inst::Sw(Reg::Ra, this, Reg::Sp));

        let mut f = Frame::new();
        for &stmt in &decl.body {
            self.gen_stmt(&mut f, stmt);
        }

        let ret_bytes = decl.ret_ty.stack_bytes();
        let (span, h) = match decl.ret_expr {
            Some(ret) if !decl.is_void() => {
                self.gen_expr(&mut f, ret);
                (program.expr(ret).span, f.height())
            }
            None if decl.is_void() => (span, f.height()),
            _ => bug!(
                "`{}` returns `{}` but its return expression does not match",
                decl.name,
                decl.ret_ty
            ),
        };

        self.emit(span, Inst::Lw(Reg::Ra, this + h, Reg::Sp));
        self.emit(span, Inst::Lw(Reg::S2, h, Reg::Sp));
        if !decl.is_void() {
            self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
            if decl.ret_ty.is_data() {
                self.emit(span, Inst::Sw(Reg::T0, h + this - WORD_SIZE, Reg::Sp));
                self.emit(span, Inst::Sw(Reg::S5, h + this, Reg::Sp));
            } else {
                self.emit(span, Inst::Sw(Reg::T0, h + this, Reg::Sp));
            }
        }
        self.emit(span, Inst::AdduImm(Reg::Sp, Reg::Sp, h + WORD_SIZE + this - ret_bytes));
        self.emit(span, Inst::Jr(Reg::Ra));
    }

    /// Generates the program entry point: runtime initialization, the top-level statement, and
    /// the exit system call.
    pub fn gen_entry(&mut self) {
        let program = self.program;
        let span = program.main.map_or(Span::DUMMY, |main| program.stmt(main).span);

        self.emit(Span::DUMMY, Inst::Section(Section::Text));
        self.emit(span, Inst::Globl(Label::Main));
        self.label(span, Label::Main);
        self.call_runtime(span, RuntimeFn::VmInit);
        if let Some(main) = program.main {
            self.gen_scoped(&mut Frame::new(), main);
        }
        self.emit(span, Inst::Li(Reg::V0, 10));
        self.emit(span, Inst::Syscall);
    }
}
