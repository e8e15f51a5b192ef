use super::Codegen;
use crate::{
    CodeSink, Frame,
    asm::{ARRAY_LENGTH_OFFSET, BranchOp, Inst, Label, Reg},
};
use talon_ast::{ExprId, ExprKind, Span, StmtId, StmtKind, VarKind, WORD_SIZE};

impl<S: CodeSink + ?Sized> Codegen<'_, S> {
    /// Generates code for statement `id`.
    ///
    /// Statements leave the stack as they found it, except for a local variable declaration,
    /// which leaves the variable's value in place until the enclosing block ends.
    pub fn gen_stmt(&mut self, f: &mut Frame, id: StmtId) {
        let program = self.program;
        let stmt = program.stmt(id);
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                let height = f.height();
                for &stmt in stmts {
                    self.gen_stmt(f, stmt);
                }
                self.pop_to(f, span, height);
            }
            &StmtKind::LocalVar(var) => {
                let decl = program.var(var);
                let VarKind::Local { init } = decl.kind else {
                    bug!("`{}` is declared by a statement but is {:?}", decl.name, decl.kind);
                };
                self.gen_expr(f, init);
                f.declare_local(var);
            }
            &StmtKind::Call(call) => {
                self.gen_expr(f, call);
                self.pop(f, span, program.expr(call).ty.stack_bytes());
            }
            &StmtKind::Assign(lhs, rhs) => self.gen_assign(f, span, lhs, rhs),
            &StmtKind::If(cond, then, else_) => {
                let else_label = Label::IfElse(id.get());
                let done = Label::IfDone(id.get());
                self.gen_cond(f, span, cond);
                self.emit(span, Inst::Branch(BranchOp::Beq, Reg::T0, Reg::Zero, else_label.clone()));
                self.gen_scoped(f, then);
                self.emit(span, Inst::J(done.clone()));
                self.label(span, else_label);
                if let Some(else_) = else_ {
                    self.gen_scoped(f, else_);
                }
                self.label(span, done);
            }
            &StmtKind::While(cond, body) => {
                // The condition is tested at the bottom; entry jumps straight to it.
                let top = Label::WhileTop(id.get());
                let enter = Label::WhileEnter(id.get());
                f.enter_loop(id);
                self.emit(span, Inst::J(enter.clone()));
                self.label(span, top.clone());
                self.gen_scoped(f, body);
                self.label(span, enter);
                self.gen_cond(f, span, cond);
                self.emit(span, Inst::Branch(BranchOp::Bne, Reg::T0, Reg::Zero, top));
                self.label(span, Label::BreakTarget(id.get()));
            }
            &StmtKind::Break(target) => {
                // Discard everything pushed inside the loop. The code after the jump is
                // unreachable, so the frame keeps its height.
                let excess = f.height() - f.loop_exit(target);
                if excess != 0 {
                    self.emit(span, Inst::AdduImm(Reg::Sp, Reg::Sp, excess));
                }
                self.emit(span, Inst::J(Label::BreakTarget(target.get())));
            }
        }
    }

    /// Generates a statement whose locals go out of scope when it ends.
    pub(super) fn gen_scoped(&mut self, f: &mut Frame, id: StmtId) {
        let height = f.height();
        self.gen_stmt(f, id);
        self.pop_to(f, self.program.stmt(id).span, height);
    }

    /// Evaluates a condition and pops it, leaving its value in `$t0`.
    fn gen_cond(&mut self, f: &mut Frame, span: Span, cond: ExprId) {
        self.gen_expr(f, cond);
        self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
        self.pop(f, span, 2 * WORD_SIZE);
    }

    fn gen_assign(&mut self, f: &mut Frame, span: Span, lhs: ExprId, rhs: ExprId) {
        let program = self.program;
        let width = program.expr(rhs).ty.stack_bytes();
        match program.expr(lhs).kind {
            ExprKind::Ident(var) => {
                self.gen_expr(f, rhs);
                self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
                let (offset, base) = self.var_addr(f, var);
                self.emit(span, Inst::Sw(Reg::T0, offset, base));
                self.pop(f, span, width);
            }
            ExprKind::Field(object, field) => {
                self.gen_expr(f, object);
                self.gen_expr(f, rhs);
                self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
                self.emit(span, Inst::Lw(Reg::T1, width, Reg::Sp));
                self.null_check(span, Reg::T1);
                self.emit(span, Inst::Sw(Reg::T0, self.layout.var_offset(field), Reg::T1));
                self.pop(f, span, width + WORD_SIZE);
            }
            ExprKind::Index(array, index) => {
                self.gen_expr(f, array);
                self.gen_expr(f, index);
                self.gen_expr(f, rhs);
                self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
                self.emit(span, Inst::Lw(Reg::T1, width + 2 * WORD_SIZE, Reg::Sp));
                self.null_check(span, Reg::T1);
                self.emit(span, Inst::Lw(Reg::T2, width, Reg::Sp));
                self.emit(span, Inst::Lw(Reg::T3, ARRAY_LENGTH_OFFSET, Reg::T1));
                self.bounds_check(span, Reg::T2, Reg::T3);
                self.element_addr(span, Reg::T2, Reg::T1);
                self.emit(span, Inst::Sw(Reg::T0, 0, Reg::T2));
                self.pop(f, span, width + 3 * WORD_SIZE);
            }
            ref kind => bug!("cannot assign to {kind:?}"),
        }
    }
}
