use crate::{Span, Ty};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIs;

newtype_index! {
    /// A [`ClassDecl`] ID.
    pub struct ClassId;

    /// A [`MethodDecl`] ID.
    pub struct MethodId;

    /// A [`VarDecl`] ID.
    pub struct VarId;

    /// A [`Stmt`] ID.
    pub struct StmtId;

    /// An [`Expr`] ID.
    pub struct ExprId;
}

/// A class declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub span: Span,
    /// The direct superclass. `None` only for the root of the hierarchy.
    pub super_class: Option<ClassId>,
    /// Direct subclasses, in declaration order.
    pub subclasses: Vec<ClassId>,
    /// Instance variables declared by this class, in declaration order. Inherited ones are not
    /// repeated here.
    pub inst_vars: Vec<VarId>,
    /// Methods declared by this class, keyed by name, in declaration order.
    pub methods: IndexMap<String, MethodId>,
}

impl ClassDecl {
    /// Returns the method this class itself declares under `name`.
    #[inline]
    pub fn method(&self, name: &str) -> Option<MethodId> {
        self.methods.get(name).copied()
    }
}

/// Where a method's implementation comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIs)]
pub enum MethodOrigin {
    /// Provided by the runtime support library. Has no source text and is linked under its bare
    /// `<name>_<class>` symbol.
    Runtime,
    /// Declared in the compiled program, at the given location.
    User(Span),
}

/// A method declaration.
///
/// Void and non-void methods differ only in `ret_ty`: a non-void user method always carries the
/// trailing `return` expression in `ret_expr`. Runtime methods have neither body nor `ret_expr`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub origin: MethodOrigin,
    /// The declaring class.
    pub class: ClassId,
    /// Formal parameters, in declaration order.
    pub formals: Vec<VarId>,
    /// The declared return type, [`Ty::Void`] for void methods.
    pub ret_ty: Ty,
    /// The nearest method this one overrides, if any.
    pub super_method: Option<MethodId>,
    pub body: Vec<StmtId>,
    /// The trailing `return` expression of a non-void method.
    pub ret_expr: Option<ExprId>,
}

impl MethodDecl {
    /// Returns `true` if the method produces no value.
    #[inline]
    pub fn is_void(&self) -> bool {
        self.ret_ty.is_void()
    }

    /// Returns the method's source location, or [`Span::DUMMY`] for runtime methods.
    #[inline]
    pub fn span(&self) -> Span {
        match self.origin {
            MethodOrigin::Runtime => Span::DUMMY,
            MethodOrigin::User(span) => span,
        }
    }
}

/// The kind of a variable declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIs)]
pub enum VarKind {
    /// An instance variable of the given class.
    InstVar(ClassId),
    /// A formal parameter of the given method.
    Formal(MethodId),
    /// A local variable declared by a statement, with its initializer.
    Local { init: ExprId },
}

/// A variable declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub span: Span,
    pub ty: Ty,
    pub kind: VarKind,
}

/// A statement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

/// A kind of statement.
#[derive(Clone, Debug, Serialize, Deserialize, EnumIs)]
pub enum StmtKind {
    /// A blocked scope: `{ ... }`.
    Block(Vec<StmtId>),

    /// A local variable declaration: `int x = 42;`.
    ///
    /// The initializer lives on the declaration, see [`VarKind::Local`].
    LocalVar(VarId),

    /// A method call whose result, if any, is discarded: `foo.bar(1);`.
    ///
    /// Always contains an [`ExprKind::Call`].
    Call(ExprId),

    /// An assignment: `lhs = rhs;`.
    ///
    /// The left-hand side is always an [`ExprKind::Ident`], [`ExprKind::Field`] or
    /// [`ExprKind::Index`].
    Assign(ExprId, ExprId),

    /// An `if` statement with an optional `else` branch.
    If(ExprId, StmtId, Option<StmtId>),

    /// A `while` loop: condition and body.
    While(ExprId, StmtId),

    /// A `break` out of the given (innermost enclosing) `while` statement.
    Break(StmtId),
}

/// An expression.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expr {
    pub span: Span,
    /// The resolved static type.
    pub ty: Ty,
    pub kind: ExprKind,
}

/// A kind of expression.
#[derive(Clone, Debug, Serialize, Deserialize, EnumIs)]
pub enum ExprKind {
    /// An integer literal.
    Int(i32),
    /// A string literal.
    Str(String),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
    /// `this`.
    This,
    /// `super`, only valid as the receiver of a call.
    Super,
    /// A reference to a local variable, formal parameter, or instance variable of `this`.
    Ident(VarId),
    /// `!e`.
    Not(ExprId),
    /// A binary operation.
    Binary(BinOpKind, ExprId, ExprId),
    /// `e.length`.
    ArrayLength(ExprId),
    /// `array[index]`.
    Index(ExprId, ExprId),
    /// `e.field`.
    Field(ExprId, VarId),
    /// `e instanceof T`.
    InstanceOf(ExprId, Ty),
    /// `(T) e`.
    Cast(Ty, ExprId),
    /// `new C()`.
    New(ClassId),
    /// `new T[size]`: element type and size.
    NewArray(Ty, ExprId),
    /// `receiver.method(args...)`, where `method` is the statically resolved target.
    Call(ExprId, MethodId, Vec<ExprId>),
}

/// A binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIs)]
pub enum BinOpKind {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `==`
    Eq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinOpKind {
    /// Returns the operator's source form.
    pub const fn to_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Returns `true` for `&&` and `||`, which do not always evaluate their right operand.
    #[inline]
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}
