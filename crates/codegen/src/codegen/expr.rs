use super::Codegen;
use crate::{
    CodeSink, Frame,
    asm::{ARRAY_LENGTH_OFFSET, AluOp, BranchOp, CLASS_PTR_OFFSET, Inst, Label, Reg, RuntimeFn},
};
use talon_ast::{BinOpKind, ExprId, ExprKind, MethodId, Span, Ty, VarId, VarKind, WORD_SIZE};

impl<S: CodeSink + ?Sized> Codegen<'_, S> {
    /// Generates code leaving the value of expression `id` on top of the stack.
    pub fn gen_expr(&mut self, f: &mut Frame, id: ExprId) {
        let program = self.program;
        let expr = program.expr(id);
        let span = expr.span;
        match &expr.kind {
            &ExprKind::Int(value) => {
                self.emit(span, Inst::Li(Reg::T0, value));
                self.push_data(f, span, Reg::T0);
            }
            &ExprKind::Bool(value) => {
                if value {
                    self.emit(span, Inst::Li(Reg::T0, 1));
                    self.push_data(f, span, Reg::T0);
                } else {
                    self.push_data(f, span, Reg::Zero);
                }
            }
            ExprKind::Null => self.push_ref(f, span, Reg::Zero),
            ExprKind::Str(_) => {
                self.emit(span, Inst::La(Reg::T0, Label::StrLit(id.get())));
                self.push_ref(f, span, Reg::T0);
            }
            ExprKind::This | ExprKind::Super => self.push_ref(f, span, Reg::S2),
            &ExprKind::Ident(var) => {
                let (offset, base) = self.var_addr(f, var);
                self.emit(span, Inst::Lw(Reg::T0, offset, base));
                self.push_value(f, span, &expr.ty, Reg::T0);
            }
            &ExprKind::Not(operand) => {
                self.gen_expr(f, operand);
                self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
                self.emit(span, Inst::XorImm(Reg::T0, Reg::T0, 1));
                self.emit(span, Inst::Sw(Reg::T0, 0, Reg::Sp));
            }
            &ExprKind::Binary(op, lhs, rhs) => self.gen_binary(f, id, op, lhs, rhs),
            &ExprKind::ArrayLength(array) => {
                self.gen_expr(f, array);
                self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
                self.null_check(span, Reg::T0);
                self.emit(span, Inst::Lw(Reg::T0, ARRAY_LENGTH_OFFSET, Reg::T0));
                self.retag_top(f, span);
            }
            &ExprKind::Index(array, index) => {
                self.gen_expr(f, array);
                self.gen_expr(f, index);
                self.emit(span, Inst::Lw(Reg::T0, 2 * WORD_SIZE, Reg::Sp));
                self.null_check(span, Reg::T0);
                self.emit(span, Inst::Lw(Reg::T1, ARRAY_LENGTH_OFFSET, Reg::T0));
                self.emit(span, Inst::Lw(Reg::T2, 0, Reg::Sp));
                self.bounds_check(span, Reg::T2, Reg::T1);
                self.element_addr(span, Reg::T2, Reg::T0);
                self.emit(span, Inst::Lw(Reg::T0, 0, Reg::T2));
                // Three words (array, index) become the element.
                if expr.ty.is_data() {
                    self.pop(f, span, WORD_SIZE);
                    self.emit(span, Inst::Sw(Reg::S5, WORD_SIZE, Reg::Sp));
                } else {
                    self.pop(f, span, 2 * WORD_SIZE);
                }
                self.emit(span, Inst::Sw(Reg::T0, 0, Reg::Sp));
            }
            &ExprKind::Field(object, field) => {
                self.gen_expr(f, object);
                self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
                self.null_check(span, Reg::T0);
                self.emit(span, Inst::Lw(Reg::T0, self.layout.var_offset(field), Reg::T0));
                if expr.ty.is_data() {
                    self.emit(span, Inst::SubuImm(Reg::Sp, Reg::Sp, WORD_SIZE));
                    f.push(WORD_SIZE);
                    self.emit(span, Inst::Sw(Reg::S5, WORD_SIZE, Reg::Sp));
                }
                self.emit(span, Inst::Sw(Reg::T0, 0, Reg::Sp));
            }
            ExprKind::InstanceOf(operand, ty) => {
                self.gen_expr(f, *operand);
                self.load_class_range(span, ty);
                self.call_runtime(span, RuntimeFn::InstanceOf);
                // The runtime leaves a bare word in place of the reference.
                self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
                self.retag_top(f, span);
            }
            ExprKind::Cast(ty, operand) => {
                self.gen_expr(f, *operand);
                if !program.is_subtype(&program.expr(*operand).ty, ty) {
                    self.load_class_range(span, ty);
                    self.call_runtime(span, RuntimeFn::CheckCast);
                }
            }
            &ExprKind::New(class) => {
                let cl = self.layout.class(class);
                // One extra scalar word for the object header.
                self.emit(span, Inst::Li(Reg::S6, cl.num_data as i32 + 1));
                self.emit(span, Inst::Li(Reg::S7, cl.num_obj as i32));
                self.call_runtime(span, RuntimeFn::NewObject);
                f.push(WORD_SIZE);
                self.store_class_ptr(span, Label::Class(program.class(class).name.clone()));
            }
            ExprKind::NewArray(elem, size) => {
                self.gen_expr(f, *size);
                self.emit(span, Inst::Lw(Reg::S7, 0, Reg::Sp));
                self.pop(f, span, 2 * WORD_SIZE);
                self.emit(span, Inst::Li(Reg::S6, if elem.is_data() { -1 } else { 1 }));
                self.call_runtime(span, RuntimeFn::NewObject);
                f.push(WORD_SIZE);
                let (record, _) = Label::class_range(program, &expr.ty);
                self.store_class_ptr(span, record);
            }
            ExprKind::Call(receiver, method, args) => {
                self.gen_call(f, span, *receiver, *method, args)
            }
        }
    }

    fn gen_binary(&mut self, f: &mut Frame, id: ExprId, op: BinOpKind, lhs: ExprId, rhs: ExprId) {
        let program = self.program;
        let span = program.expr(id).span;

        if op.is_short_circuit() {
            // The left operand stays as the result when it decides the outcome.
            let skip = Label::Skip(id.get());
            let branch = if op.is_and() { BranchOp::Beq } else { BranchOp::Bne };
            self.gen_expr(f, lhs);
            self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
            self.emit(span, Inst::Branch(branch, Reg::T0, Reg::Zero, skip.clone()));
            self.pop(f, span, 2 * WORD_SIZE);
            self.gen_expr(f, rhs);
            self.label(span, skip);
            return;
        }

        self.gen_expr(f, lhs);
        self.gen_expr(f, rhs);

        if op.is_eq() && program.expr(lhs).ty.is_object() {
            // Two references become one scalar of the same size.
            self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
            self.emit(span, Inst::Lw(Reg::T1, WORD_SIZE, Reg::Sp));
            self.emit(span, Inst::Alu(AluOp::Seq, Reg::T0, Reg::T1, Reg::T0));
            self.emit(span, Inst::Sw(Reg::S5, WORD_SIZE, Reg::Sp));
            self.emit(span, Inst::Sw(Reg::T0, 0, Reg::Sp));
            return;
        }

        if matches!(op, BinOpKind::Div | BinOpKind::Rem) {
            // The runtime pops both operands and pushes the result.
            let routine = if op.is_div() { RuntimeFn::Divide } else { RuntimeFn::Remainder };
            self.call_runtime(span, routine);
            f.pop(2 * WORD_SIZE);
            return;
        }

        self.emit(span, Inst::Lw(Reg::T0, 0, Reg::Sp));
        self.emit(span, Inst::Lw(Reg::T1, 2 * WORD_SIZE, Reg::Sp));
        match op {
            BinOpKind::Add => self.emit(span, Inst::Alu(AluOp::Addu, Reg::T0, Reg::T1, Reg::T0)),
            BinOpKind::Sub => self.emit(span, Inst::Alu(AluOp::Subu, Reg::T0, Reg::T1, Reg::T0)),
            BinOpKind::Mul => {
                self.emit(span, Inst::Mult(Reg::T1, Reg::T0));
                self.emit(span, Inst::Mflo(Reg::T0));
            }
            BinOpKind::Eq => self.emit(span, Inst::Alu(AluOp::Seq, Reg::T0, Reg::T1, Reg::T0)),
            BinOpKind::Lt => self.emit(span, Inst::Alu(AluOp::Slt, Reg::T0, Reg::T1, Reg::T0)),
            BinOpKind::Gt => self.emit(span, Inst::Alu(AluOp::Sgt, Reg::T0, Reg::T1, Reg::T0)),
            BinOpKind::Div | BinOpKind::Rem | BinOpKind::And | BinOpKind::Or => {
                bug!("`{op}` is not a simple arithmetic operator")
            }
        }
        self.pop(f, span, 2 * WORD_SIZE);
        self.emit(span, Inst::Sw(Reg::T0, 0, Reg::Sp));
    }

    fn gen_call(
        &mut self,
        f: &mut Frame,
        span: Span,
        receiver: ExprId,
        method: MethodId,
        args: &[ExprId],
    ) {
        let program = self.program;
        let decl = program.method(method);
        if args.len() != decl.formals.len() {
            bug!(
                "call to `{}` passes {} arguments, expected {}",
                decl.name,
                args.len(),
                decl.formals.len()
            );
        }

        let height = f.height();
        self.gen_expr(f, receiver);
        for &arg in args {
            self.gen_expr(f, arg);
        }

        if program.expr(receiver).kind.is_super() {
            self.emit(span, Inst::Jal(Label::method(program, method)));
        } else {
            let ml = self.layout.method(method);
            self.emit(span, Inst::Lw(Reg::T0, ml.this_ptr_offset - WORD_SIZE, Reg::Sp));
            self.null_check(span, Reg::T0);
            self.emit(span, Inst::Lw(Reg::T0, CLASS_PTR_OFFSET, Reg::T0));
            self.emit(span, Inst::Lw(Reg::T0, ml.vtable_offset(), Reg::T0));
            self.emit(span, Inst::Jalr(Reg::T0));
        }

        // The callee pops the receiver and arguments and leaves its result.
        f.restore(height);
        f.push(decl.ret_ty.stack_bytes());
    }

    /// Returns the address of variable `var` as `(offset, base)`.
    pub(super) fn var_addr(&self, f: &Frame, var: VarId) -> (i32, Reg) {
        match self.program.var(var).kind {
            VarKind::InstVar(_) => (self.layout.var_offset(var), Reg::S2),
            VarKind::Formal(_) => (f.height() + self.layout.var_offset(var), Reg::Sp),
            VarKind::Local { .. } => (f.height() + f.local_offset(var), Reg::Sp),
        }
    }

    /// Traps unless `0 <= index < length`. The unsigned compare covers negative indices.
    pub(super) fn bounds_check(&mut self, span: Span, index: Reg, length: Reg) {
        self.emit(
            span,
            Inst::Branch(BranchOp::Bgeu, index, length, RuntimeFn::ArrayIndexOutOfBounds.into()),
        );
    }

    /// Turns the index in `index` into the address of that element of `array`.
    pub(super) fn element_addr(&mut self, span: Span, index: Reg, array: Reg) {
        self.emit(span, Inst::Sll(index, index, 2));
        self.emit(span, Inst::Alu(AluOp::Addu, index, index, array));
    }

    /// Replaces the bare word on top of the stack, also held in `$t0`, with a tagged scalar.
    fn retag_top(&mut self, f: &mut Frame, span: Span) {
        self.emit(span, Inst::SubuImm(Reg::Sp, Reg::Sp, WORD_SIZE));
        f.push(WORD_SIZE);
        self.emit(span, Inst::Sw(Reg::S5, WORD_SIZE, Reg::Sp));
        self.emit(span, Inst::Sw(Reg::T0, 0, Reg::Sp));
    }

    fn load_class_range(&mut self, span: Span, ty: &Ty) {
        let (start, end) = Label::class_range(self.program, ty);
        self.emit(span, Inst::La(Reg::T0, start));
        self.emit(span, Inst::La(Reg::T1, end));
    }

    fn store_class_ptr(&mut self, span: Span, record: Label) {
        self.emit(span, Inst::La(Reg::T0, record));
        self.emit(span, Inst::Sw(Reg::T0, CLASS_PTR_OFFSET, Reg::S7));
    }
}

#[cfg(test)]
mod tests {
    use crate::{Frame, codegen::test_utils};
    use talon_ast::{BinOpKind, ClassId, ExprId, MethodId, Program, ProgramBuilder, Ty};

    fn generate(program: &Program, id: ExprId) -> (Vec<String>, i32) {
        let mut f = Frame::new();
        let code = test_utils::expr(program, &mut f, id);
        (code, f.height())
    }

    fn hierarchy() -> (ProgramBuilder, ClassId, ClassId) {
        let mut b = ProgramBuilder::new();
        let object = b.class("Object", None);
        let point = b.class("Point", Some(object));
        (b, object, point)
    }

    #[test]
    fn literals() {
        let (mut b, ..) = hierarchy();
        let i = b.int(7);
        let t = b.bool(true);
        let no = b.bool(false);
        let null = b.null();
        let p = b.finish();

        let (code, height) = generate(&p, i);
        assert_eq!(code, ["li $t0, 7", "subu $sp, $sp, 8", "sw $s5, 4($sp)", "sw $t0, ($sp)"]);
        assert_eq!(height, 8);
        assert_eq!(generate(&p, t).0[0], "li $t0, 1");
        assert_eq!(generate(&p, no).0, ["subu $sp, $sp, 8", "sw $s5, 4($sp)", "sw $zero, ($sp)"]);
        let (code, height) = generate(&p, null);
        assert_eq!(code, ["subu $sp, $sp, 4", "sw $zero, ($sp)"]);
        assert_eq!(height, 4);
    }

    #[test]
    fn string_literal_pushes_its_address() {
        let (mut b, ..) = hierarchy();
        let s = b.str("hi");
        let p = b.finish();
        let (code, height) = generate(&p, s);
        assert_eq!(code[0], format!("la $t0, strLit_{}", s.get()));
        assert_eq!(height, 4);
    }

    #[test]
    fn subtraction_keeps_operand_order() {
        let (mut b, ..) = hierarchy();
        let l = b.int(5);
        let r = b.int(3);
        let e = b.binary(BinOpKind::Sub, l, r);
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(
            code[8..],
            [
                "lw $t0, ($sp)",
                "lw $t1, 8($sp)",
                "subu $t0, $t1, $t0",
                "addu $sp, $sp, 8",
                "sw $t0, ($sp)",
            ]
        );
        assert_eq!(height, 8);
    }

    #[test]
    fn comparisons_and_products_keep_operand_order() {
        let (mut b, ..) = hierarchy();
        let mut ops = Vec::new();
        for op in [BinOpKind::Lt, BinOpKind::Gt, BinOpKind::Mul, BinOpKind::Eq] {
            let l = b.int(5);
            let r = b.int(3);
            ops.push(b.binary(op, l, r));
        }
        let p = b.finish();

        let (code, height) = generate(&p, ops[0]);
        assert_eq!(
            code[8..],
            [
                "lw $t0, ($sp)",
                "lw $t1, 8($sp)",
                "slt $t0, $t1, $t0",
                "addu $sp, $sp, 8",
                "sw $t0, ($sp)",
            ]
        );
        assert_eq!(height, 8);

        let (code, height) = generate(&p, ops[1]);
        assert_eq!(code[10], "sgt $t0, $t1, $t0");
        assert_eq!(height, 8);

        let (code, height) = generate(&p, ops[2]);
        assert_eq!(
            code[8..],
            [
                "lw $t0, ($sp)",
                "lw $t1, 8($sp)",
                "mult $t1, $t0",
                "mflo $t0",
                "addu $sp, $sp, 8",
                "sw $t0, ($sp)",
            ]
        );
        assert_eq!(height, 8);

        // Scalar equality compares the data words, two cells apart.
        let (code, height) = generate(&p, ops[3]);
        assert_eq!(code[8..11], ["lw $t0, ($sp)", "lw $t1, 8($sp)", "seq $t0, $t1, $t0"]);
        assert_eq!(height, 8);
    }

    #[test]
    fn not_flips_the_data_word() {
        let (mut b, ..) = hierarchy();
        let t = b.bool(true);
        let e = b.not(t);
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(code[4..], ["lw $t0, ($sp)", "xor $t0, $t0, 1", "sw $t0, ($sp)"]);
        assert_eq!(height, 8);
    }

    #[test]
    fn array_length_is_retagged() {
        let (mut b, ..) = hierarchy();
        let size = b.int(3);
        let array = b.new_array(Ty::Int, size);
        let e = b.length(array);
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(
            code[10..],
            [
                "lw $t0, ($sp)",
                "beq $t0, $zero, nullPtrException",
                "lw $t0, -4($t0)",
                "subu $sp, $sp, 4",
                "sw $s5, 4($sp)",
                "sw $t0, ($sp)",
            ]
        );
        assert_eq!(height, 8);
    }

    #[test]
    fn division_is_a_runtime_call() {
        let (mut b, ..) = hierarchy();
        let l = b.int(7);
        let r = b.int(2);
        let e = b.binary(BinOpKind::Rem, l, r);
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(code.last().unwrap(), "jal remainder");
        assert_eq!(height, 8);
    }

    #[test]
    fn reference_equality() {
        let (mut b, ..) = hierarchy();
        let l = b.null();
        let r = b.null();
        let e = b.binary(BinOpKind::Eq, l, r);
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(
            code[4..],
            [
                "lw $t0, ($sp)",
                "lw $t1, 4($sp)",
                "seq $t0, $t1, $t0",
                "sw $s5, 4($sp)",
                "sw $t0, ($sp)",
            ]
        );
        assert_eq!(height, 8);
    }

    #[test]
    fn short_circuit() {
        let (mut b, ..) = hierarchy();
        let l = b.bool(true);
        let r = b.bool(false);
        let and = b.binary(BinOpKind::And, l, r);
        let l2 = b.bool(false);
        let r2 = b.bool(true);
        let or = b.binary(BinOpKind::Or, l2, r2);
        let p = b.finish();

        let (code, height) = generate(&p, and);
        let skip = format!("skip_{}", and.get());
        assert_eq!(
            code[4..7],
            [
                "lw $t0, ($sp)".to_string(),
                format!("beq $t0, $zero, {skip}"),
                "addu $sp, $sp, 8".to_string(),
            ]
        );
        assert_eq!(code.last().unwrap(), &format!("{skip}:"));
        assert_eq!(height, 8);

        let (code, _) = generate(&p, or);
        assert_eq!(code[4], format!("bne $t0, $zero, skip_{}", or.get()));
    }

    #[test]
    fn index_checks_null_and_bounds() {
        let (mut b, ..) = hierarchy();
        let size = b.int(3);
        let array = b.new_array(Ty::Int, size);
        let i = b.int(1);
        let e = b.index(array, i);
        let p = b.finish();
        let (code, height) = generate(&p, e);
        let tail = code.iter().rev().take(11).rev().cloned().collect::<Vec<_>>();
        assert_eq!(
            tail,
            [
                "lw $t0, 8($sp)",
                "beq $t0, $zero, nullPtrException",
                "lw $t1, -4($t0)",
                "lw $t2, ($sp)",
                "bgeu $t2, $t1, arrayIndexOutOfBounds",
                "sll $t2, $t2, 2",
                "addu $t2, $t2, $t0",
                "lw $t0, ($t2)",
                "addu $sp, $sp, 4",
                "sw $s5, 4($sp)",
                "sw $t0, ($sp)",
            ]
        );
        assert_eq!(height, 8);
    }

    #[test]
    fn new_array_of_references() {
        let (mut b, object, _) = hierarchy();
        let size = b.int(4);
        let e = b.new_array(Ty::Class(object), size);
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(
            code[4..],
            [
                "lw $s7, ($sp)",
                "addu $sp, $sp, 8",
                "li $s6, 1",
                "jal newObject",
                "la $t0, CLASS__ObjectArray",
                "sw $t0, -12($s7)",
            ]
        );
        assert_eq!(height, 4);
    }

    #[test]
    fn new_object_sizes_both_regions() {
        let (mut b, _, point) = hierarchy();
        b.inst_var(point, "x", Ty::Int);
        b.inst_var(point, "y", Ty::Int);
        b.inst_var(point, "next", Ty::Class(point));
        let e = b.new_object(point);
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(
            code,
            ["li $s6, 3", "li $s7, 1", "jal newObject", "la $t0, CLASS_Point", "sw $t0, -12($s7)"]
        );
        assert_eq!(height, 4);
    }

    #[test]
    fn scalar_field_is_retagged() {
        let (mut b, _, point) = hierarchy();
        let x = b.inst_var(point, "x", Ty::Int);
        let obj = b.new_object(point);
        let e = b.field(obj, x);
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(
            code[5..],
            [
                "lw $t0, ($sp)",
                "beq $t0, $zero, nullPtrException",
                "lw $t0, -16($t0)",
                "subu $sp, $sp, 4",
                "sw $s5, 4($sp)",
                "sw $t0, ($sp)",
            ]
        );
        assert_eq!(height, 8);
    }

    #[test]
    fn casts_check_only_downcasts() {
        let (mut b, object, point) = hierarchy();
        let up_src = b.new_object(point);
        let up = b.cast(Ty::Class(object), up_src);
        let down_src = b.new_object(object);
        let down = b.cast(Ty::Class(point), down_src);
        let p = b.finish();

        assert_eq!(generate(&p, up).0.len(), 5);
        let (code, height) = generate(&p, down);
        assert_eq!(code[5..], ["la $t0, CLASS_Point", "la $t1, CLASS_END_Point", "jal checkCast"]);
        assert_eq!(height, 4);
    }

    #[test]
    fn instance_of_is_retagged() {
        let (mut b, ..) = hierarchy();
        let null = b.null();
        let e = b.instance_of(null, Ty::array(Ty::Int));
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(
            code[2..],
            [
                "la $t0, CLASS__DataArray",
                "la $t1, CLASS_END__DataArray",
                "jal instanceOf",
                "lw $t0, ($sp)",
                "subu $sp, $sp, 4",
                "sw $s5, 4($sp)",
                "sw $t0, ($sp)",
            ]
        );
        assert_eq!(height, 8);
    }

    #[test]
    fn instance_of_class_uses_its_range() {
        let (mut b, object, point) = hierarchy();
        let obj = b.new_object(point);
        let e = b.instance_of(obj, Ty::Class(object));
        let p = b.finish();
        let (code, height) = generate(&p, e);
        assert_eq!(
            code,
            [
                "li $s6, 1",
                "li $s7, 0",
                "jal newObject",
                "la $t0, CLASS_Point",
                "sw $t0, -12($s7)",
                "la $t0, CLASS_Object",
                "la $t1, CLASS_END_Object",
                "jal instanceOf",
                "lw $t0, ($sp)",
                "subu $sp, $sp, 4",
                "sw $s5, 4($sp)",
                "sw $t0, ($sp)",
            ]
        );
        assert_eq!(height, 8);
    }

    fn point_with_method() -> (ProgramBuilder, ClassId, MethodId) {
        let (mut b, _, point) = hierarchy();
        let m = b.method(point, "move", &[("dx", Ty::Int), ("to", Ty::Class(point))], Ty::Bool);
        (b, point, m)
    }

    #[test]
    fn virtual_call() {
        let (mut b, point, m) = point_with_method();
        let recv = b.new_object(point);
        let dx = b.int(1);
        let to = b.null();
        let call = b.call(recv, m, vec![dx, to]);
        let p = b.finish();
        let (code, height) = generate(&p, call);
        // this_ptr_offset is 16, so the receiver sits 12 bytes up, above the arguments.
        assert_eq!(
            code[code.len() - 5..],
            [
                "lw $t0, 12($sp)",
                "beq $t0, $zero, nullPtrException",
                "lw $t0, -12($t0)",
                "lw $t0, 4($t0)",
                "jalr $t0",
            ]
        );
        assert_eq!(height, 8);
    }

    #[test]
    fn super_call_is_static() {
        let (mut b, point, m) = point_with_method();
        let sub = b.class("Point3", Some(point));
        let recv = b.super_(sub);
        let dx = b.int(1);
        let to = b.null();
        let call = b.call(recv, m, vec![dx, to]);
        let p = b.finish();
        let (code, height) = generate(&p, call);
        assert_eq!(code[..2], ["subu $sp, $sp, 4", "sw $s2, ($sp)"]);
        assert_eq!(code.last().unwrap(), &format!("jal fcn_{}_move", m.get()));
        assert_eq!(height, 8);
    }

    #[test]
    #[should_panic = "passes 1 arguments, expected 2"]
    fn arity_mismatch_is_a_bug() {
        let (mut b, point, m) = point_with_method();
        let recv = b.new_object(point);
        let dx = b.int(1);
        let call = b.call(recv, m, vec![dx]);
        let p = b.finish();
        generate(&p, call);
    }

    #[test]
    fn formals_are_addressed_from_the_current_height() {
        let (mut b, _, m) = point_with_method();
        let dx = b.formal(m, 0);
        let to = b.formal(m, 1);
        let e_dx = b.ident(dx);
        let e_to = b.ident(to);
        let p = b.finish();

        // this_ptr_offset 16: `dx` data at 8, `to` at 4.
        let mut f = Frame::new();
        f.push(8);
        let code = test_utils::expr(&p, &mut f, e_dx);
        assert_eq!(code[0], "lw $t0, 16($sp)");
        let code = test_utils::expr(&p, &mut f, e_to);
        assert_eq!(code[0], "lw $t0, 20($sp)");
        assert_eq!(f.height(), 20);
    }
}
