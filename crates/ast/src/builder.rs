use crate::{
    BinOpKind, BytePos, ClassDecl, ClassId, Expr, ExprId, ExprKind, MethodDecl, MethodId,
    MethodOrigin, Program, Span, Stmt, StmtId, StmtKind, Ty, VarDecl, VarId, VarKind,
};

/// Incrementally builds a resolved [`Program`].
///
/// Front ends and tests use this instead of filling the arenas by hand: it keeps the redundant
/// links consistent (subclass lists, per-class method maps, overridden methods) and infers the
/// static type of every expression it creates.
///
/// Every node gets a distinct one-byte span in creation order, so generated code can be traced
/// back to the node that produced it even without source text.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
    pos: u32,
}

impl ProgramBuilder {
    /// Creates a builder for an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the program built so far.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Returns the program built so far, mutably.
    pub fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }

    /// Finishes building.
    pub fn finish(self) -> Program {
        self.program
    }

    fn next_span(&mut self) -> Span {
        let lo = self.pos;
        self.pos += 1;
        Span::new(BytePos(lo), BytePos(lo + 1))
    }

    // --- Declarations ---

    /// Declares a class. Subclasses must be declared after their superclass.
    pub fn class(&mut self, name: &str, super_class: Option<ClassId>) -> ClassId {
        let span = self.next_span();
        let id = self.program.classes.push(ClassDecl {
            name: name.to_string(),
            span,
            super_class: None,
            subclasses: Vec::new(),
            inst_vars: Vec::new(),
            methods: Default::default(),
        });
        if let Some(super_class) = super_class {
            self.set_super(id, super_class);
        }
        id
    }

    /// Makes `super_class` the direct superclass of `class`.
    ///
    /// # Panics
    ///
    /// Panics if `class` already has a superclass.
    pub fn set_super(&mut self, class: ClassId, super_class: ClassId) {
        let decl = &mut self.program.classes[class];
        assert!(decl.super_class.is_none(), "class `{}` already has a superclass", decl.name);
        decl.super_class = Some(super_class);
        self.program.classes[super_class].subclasses.push(class);
    }

    /// Declares the class string literals are instances of.
    pub fn string_class(&mut self, class: ClassId) {
        self.program.string_class = Some(class);
    }

    /// Declares an instance variable of `class`.
    pub fn inst_var(&mut self, class: ClassId, name: &str, ty: Ty) -> VarId {
        let id = self.var(name, ty, VarKind::InstVar(class));
        self.program.classes[class].inst_vars.push(id);
        id
    }

    /// Declares a method of `class` defined by the compiled program.
    ///
    /// The overridden method, if any, is resolved by name against the superclasses declared so
    /// far.
    pub fn method(
        &mut self,
        class: ClassId,
        name: &str,
        formals: &[(&str, Ty)],
        ret_ty: Ty,
    ) -> MethodId {
        let span = self.next_span();
        self.declare_method(class, name, formals, ret_ty, MethodOrigin::User(span))
    }

    /// Declares a method of `class` provided by the runtime library.
    pub fn runtime_method(
        &mut self,
        class: ClassId,
        name: &str,
        formals: &[(&str, Ty)],
        ret_ty: Ty,
    ) -> MethodId {
        self.declare_method(class, name, formals, ret_ty, MethodOrigin::Runtime)
    }

    fn declare_method(
        &mut self,
        class: ClassId,
        name: &str,
        formals: &[(&str, Ty)],
        ret_ty: Ty,
        origin: MethodOrigin,
    ) -> MethodId {
        let super_method =
            self.program.superclasses(class).find_map(|c| self.program.class(c).method(name));
        let id = self.program.methods.push(MethodDecl {
            name: name.to_string(),
            origin,
            class,
            formals: Vec::with_capacity(formals.len()),
            ret_ty,
            super_method,
            body: Vec::new(),
            ret_expr: None,
        });
        for (formal, ty) in formals {
            let var = self.var(formal, ty.clone(), VarKind::Formal(id));
            self.program.methods[id].formals.push(var);
        }
        let prev = self.program.classes[class].methods.insert(name.to_string(), id);
        assert!(prev.is_none(), "method `{name}` declared twice");
        id
    }

    /// Returns the `index`th formal parameter of `method`.
    pub fn formal(&self, method: MethodId, index: usize) -> VarId {
        self.program.method(method).formals[index]
    }

    /// Sets the body and, for non-void methods, the returned expression of `method`.
    pub fn set_body(&mut self, method: MethodId, body: Vec<StmtId>, ret_expr: Option<ExprId>) {
        let decl = &mut self.program.methods[method];
        assert!(decl.origin.is_user(), "runtime method `{}` cannot have a body", decl.name);
        assert_eq!(
            decl.is_void(),
            ret_expr.is_none(),
            "method `{}` must return a value iff it is non-void",
            decl.name
        );
        decl.body = body;
        decl.ret_expr = ret_expr;
    }

    /// Sets the top-level statement.
    pub fn main(&mut self, stmt: StmtId) {
        self.program.main = Some(stmt);
    }

    fn var(&mut self, name: &str, ty: Ty, kind: VarKind) -> VarId {
        let span = self.next_span();
        self.program.vars.push(VarDecl { name: name.to_string(), span, ty, kind })
    }

    // --- Expressions ---

    fn expr(&mut self, ty: Ty, kind: ExprKind) -> ExprId {
        let span = self.next_span();
        self.program.exprs.push(Expr { span, ty, kind })
    }

    fn ty_of(&self, expr: ExprId) -> &Ty {
        &self.program.expr(expr).ty
    }

    /// `42`
    pub fn int(&mut self, value: i32) -> ExprId {
        self.expr(Ty::Int, ExprKind::Int(value))
    }

    /// `true` / `false`
    pub fn bool(&mut self, value: bool) -> ExprId {
        self.expr(Ty::Bool, ExprKind::Bool(value))
    }

    /// A string literal. Typed as the string class, or the root class if none was declared.
    pub fn str(&mut self, value: &str) -> ExprId {
        let class = self.program.string_class.or_else(|| self.program.root_class());
        self.expr(class.map_or(Ty::Null, Ty::Class), ExprKind::Str(value.to_string()))
    }

    /// `null`
    pub fn null(&mut self) -> ExprId {
        self.expr(Ty::Null, ExprKind::Null)
    }

    /// `this`, inside a method of `class`.
    pub fn this(&mut self, class: ClassId) -> ExprId {
        self.expr(Ty::Class(class), ExprKind::This)
    }

    /// `super`, inside a method of `class`.
    pub fn super_(&mut self, class: ClassId) -> ExprId {
        let super_class = self.program.class(class).super_class.unwrap_or(class);
        self.expr(Ty::Class(super_class), ExprKind::Super)
    }

    /// A variable reference.
    pub fn ident(&mut self, var: VarId) -> ExprId {
        let ty = self.program.var(var).ty.clone();
        self.expr(ty, ExprKind::Ident(var))
    }

    /// `!e`
    pub fn not(&mut self, operand: ExprId) -> ExprId {
        self.expr(Ty::Bool, ExprKind::Not(operand))
    }

    /// `lhs <op> rhs`
    pub fn binary(&mut self, op: BinOpKind, lhs: ExprId, rhs: ExprId) -> ExprId {
        let ty = match op {
            BinOpKind::Add | BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Rem => {
                Ty::Int
            }
            BinOpKind::Eq | BinOpKind::Gt | BinOpKind::Lt | BinOpKind::And | BinOpKind::Or => {
                Ty::Bool
            }
        };
        self.expr(ty, ExprKind::Binary(op, lhs, rhs))
    }

    /// `array.length`
    pub fn length(&mut self, array: ExprId) -> ExprId {
        self.expr(Ty::Int, ExprKind::ArrayLength(array))
    }

    /// `array[index]`
    pub fn index(&mut self, array: ExprId, index: ExprId) -> ExprId {
        let ty = match self.ty_of(array).elem() {
            Some(elem) => elem.clone(),
            None => panic!("indexing non-array type `{}`", self.ty_of(array)),
        };
        self.expr(ty, ExprKind::Index(array, index))
    }

    /// `object.field`
    pub fn field(&mut self, object: ExprId, field: VarId) -> ExprId {
        let ty = self.program.var(field).ty.clone();
        self.expr(ty, ExprKind::Field(object, field))
    }

    /// `e instanceof T`
    pub fn instance_of(&mut self, operand: ExprId, ty: Ty) -> ExprId {
        self.expr(Ty::Bool, ExprKind::InstanceOf(operand, ty))
    }

    /// `(T) e`
    pub fn cast(&mut self, ty: Ty, operand: ExprId) -> ExprId {
        self.expr(ty.clone(), ExprKind::Cast(ty, operand))
    }

    /// `new C()`
    pub fn new_object(&mut self, class: ClassId) -> ExprId {
        self.expr(Ty::Class(class), ExprKind::New(class))
    }

    /// `new T[size]`
    pub fn new_array(&mut self, elem: Ty, size: ExprId) -> ExprId {
        self.expr(Ty::array(elem.clone()), ExprKind::NewArray(elem, size))
    }

    /// `receiver.method(args...)`
    pub fn call(&mut self, receiver: ExprId, method: MethodId, args: Vec<ExprId>) -> ExprId {
        let ty = self.program.method(method).ret_ty.clone();
        self.expr(ty, ExprKind::Call(receiver, method, args))
    }

    // --- Statements ---

    fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let span = self.next_span();
        self.program.stmts.push(Stmt { span, kind })
    }

    /// `{ stmts... }`
    pub fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Block(stmts))
    }

    /// `T name = init;`
    pub fn local(&mut self, name: &str, ty: Ty, init: ExprId) -> (StmtId, VarId) {
        let var = self.var(name, ty, VarKind::Local { init });
        (self.stmt(StmtKind::LocalVar(var)), var)
    }

    /// `call;`
    pub fn call_stmt(&mut self, call: ExprId) -> StmtId {
        assert!(self.program.expr(call).kind.is_call(), "call statement without a call");
        self.stmt(StmtKind::Call(call))
    }

    /// `lhs = rhs;`
    pub fn assign(&mut self, lhs: ExprId, rhs: ExprId) -> StmtId {
        self.stmt(StmtKind::Assign(lhs, rhs))
    }

    /// `if (cond) then else else_`
    pub fn if_(&mut self, cond: ExprId, then: StmtId, else_: Option<StmtId>) -> StmtId {
        self.stmt(StmtKind::If(cond, then, else_))
    }

    /// `while (cond) body`
    ///
    /// `body` receives the id of the loop being built so that it can create `break`s targeting
    /// it.
    pub fn while_(
        &mut self,
        cond: ExprId,
        body: impl FnOnce(&mut Self, StmtId) -> StmtId,
    ) -> StmtId {
        let id = self.stmt(StmtKind::Block(Vec::new()));
        let body = body(self, id);
        self.program.stmts[id].kind = StmtKind::While(cond, body);
        id
    }

    /// `break;` out of `target`.
    pub fn break_(&mut self, target: StmtId) -> StmtId {
        self.stmt(StmtKind::Break(target))
    }
}
