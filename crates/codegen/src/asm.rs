//! Target description: registers, labels, and the instructions the back end emits.
//!
//! Everything here renders to the textual MIPS assembly accepted by SPIM-like assemblers. The
//! register assignment is fixed:
//!
//! | register | role |
//! |---|---|
//! | `$sp` | operand-stack pointer; the stack grows downward |
//! | `$s2` | receiver (`this`) of the executing method |
//! | `$s5` | non-pointer marker, stored as the tag word above every scalar |
//! | `$s6`, `$s7` | allocator arguments; `$s7` also receives the new object |
//! | `$t0`..`$t3` | scratch |

use derive_more::Display;
use std::fmt;
use talon_ast::{MethodId, MethodOrigin, Program, Ty};

/// Offset of the class-record pointer in an object or array header.
pub const CLASS_PTR_OFFSET: i32 = -12;

/// Offset of the element count in an array or string header.
pub const ARRAY_LENGTH_OFFSET: i32 = -4;

/// Offset of the first scalar instance variable. The 16 bytes above it hold the object header.
pub const FIRST_DATA_OFFSET: i32 = -16;

/// Offset of the first reference instance variable.
pub const FIRST_OBJ_OFFSET: i32 = 0;

/// Name of the synthetic class record shared by arrays of scalars and by strings.
pub const DATA_ARRAY_CLASS: &str = "_DataArray";

/// Name of the synthetic class record shared by arrays of references.
pub const OBJECT_ARRAY_CLASS: &str = "_ObjectArray";

/// A machine register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Reg {
    #[display("$zero")]
    Zero,
    #[display("$v0")]
    V0,
    #[display("$t0")]
    T0,
    #[display("$t1")]
    T1,
    #[display("$t2")]
    T2,
    #[display("$t3")]
    T3,
    #[display("$s2")]
    S2,
    #[display("$s5")]
    S5,
    #[display("$s6")]
    S6,
    #[display("$s7")]
    S7,
    #[display("$sp")]
    Sp,
    #[display("$ra")]
    Ra,
}

/// A routine of the runtime support library.
///
/// These are linked separately; only their calling contract matters to the back end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, strum::EnumIter)]
pub enum RuntimeFn {
    /// Initializes the runtime. Called once at program start.
    #[display("vm_init")]
    VmInit,
    /// Allocates a zeroed block. `$s6` holds the scalar-region size (or `-1`/`+1` for arrays of
    /// scalars/references), `$s7` the reference-region size (or element count). Returns the new
    /// object in `$s7`.
    #[display("newObject")]
    NewObject,
    /// Replaces the two integers on top of the stack with their quotient.
    #[display("divide")]
    Divide,
    /// Replaces the two integers on top of the stack with their remainder.
    #[display("remainder")]
    Remainder,
    /// Replaces the reference on top of the stack with `1` if its class record lies in
    /// `[$t0, $t1)`, else `0`.
    #[display("instanceOf")]
    InstanceOf,
    /// Like [`InstanceOf`](Self::InstanceOf) but leaves the reference in place and traps on
    /// failure. `null` always passes.
    #[display("checkCast")]
    CheckCast,
    /// Traps: null dereference.
    #[display("nullPtrException")]
    NullPtrException,
    /// Traps: array index out of bounds.
    #[display("arrayIndexOutOfBounds")]
    ArrayIndexOutOfBounds,
}

/// A code or data label.
///
/// Labels embed the arena index of the node that owns them, which makes them unique across the
/// whole program.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum Label {
    /// The program entry point.
    #[display("main")]
    Main,
    /// Start of a class record.
    #[display("CLASS_{_0}")]
    Class(String),
    /// End of a class record and of all its descendants' records.
    #[display("CLASS_END_{_0}")]
    ClassEnd(String),
    /// A method defined by the compiled program.
    #[display("fcn_{id}_{name}")]
    Method { id: u32, name: String },
    /// A method provided by the runtime library.
    #[display("{name}_{class}")]
    RuntimeMethod { name: String, class: String },
    /// A string literal's character data.
    #[display("strLit_{_0}")]
    StrLit(u32),
    /// The end of a short-circuiting `&&`/`||`.
    #[display("skip_{_0}")]
    Skip(u32),
    #[display("if_else_{_0}")]
    IfElse(u32),
    #[display("if_done_{_0}")]
    IfDone(u32),
    #[display("while_top_{_0}")]
    WhileTop(u32),
    #[display("while_enter_{_0}")]
    WhileEnter(u32),
    #[display("break_target_{_0}")]
    BreakTarget(u32),
    /// A runtime-library routine.
    #[display("{_0}")]
    Runtime(RuntimeFn),
}

impl Label {
    /// Returns the label a method's code is linked under: `<name>_<class>` for runtime methods,
    /// `fcn_<id>_<name>` for methods of the compiled program.
    pub fn method(program: &Program, id: MethodId) -> Self {
        let decl = program.method(id);
        match decl.origin {
            MethodOrigin::Runtime => Self::RuntimeMethod {
                name: decl.name.clone(),
                class: program.class(decl.class).name.clone(),
            },
            MethodOrigin::User(_) => Self::Method { id: id.get(), name: decl.name.clone() },
        }
    }

    /// Returns the start and end labels of the class-record range a value of type `ty` must
    /// point into.
    #[track_caller]
    pub fn class_range(program: &Program, ty: &Ty) -> (Self, Self) {
        let name = match ty {
            Ty::Class(class) => program.class(*class).name.clone(),
            Ty::Array(elem) if elem.is_data() => DATA_ARRAY_CLASS.to_string(),
            Ty::Array(_) => OBJECT_ARRAY_CLASS.to_string(),
            _ => bug!("`{ty}` has no class record"),
        };
        (Self::Class(name.clone()), Self::ClassEnd(name))
    }
}

impl From<RuntimeFn> for Label {
    fn from(f: RuntimeFn) -> Self {
        Self::Runtime(f)
    }
}

/// An assembler section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Section {
    #[display(".data")]
    Data,
    #[display(".text")]
    Text,
}

/// The value of a `.word` directive.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum Word {
    Int(i32),
    Label(Label),
}

/// A three-register ALU operation: `op rd, rs, rt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum AluOp {
    #[display("addu")]
    Addu,
    #[display("subu")]
    Subu,
    #[display("seq")]
    Seq,
    #[display("slt")]
    Slt,
    #[display("sgt")]
    Sgt,
}

/// A conditional branch: `op rs, rt, label`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum BranchOp {
    #[display("beq")]
    Beq,
    #[display("bne")]
    Bne,
    #[display("bgeu")]
    Bgeu,
}

/// A single line of assembly output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inst {
    /// `label:`
    Label(Label),
    /// `.data` / `.text`
    Section(Section),
    /// `.globl label`
    Globl(Label),
    /// `.word value`
    Word(Word),
    /// `.ascii "bytes"`
    Ascii(String),
    /// `.align n`
    Align(u32),
    /// `li rd, imm`
    Li(Reg, i32),
    /// `la rd, label`
    La(Reg, Label),
    /// `lw rt, offset(base)`
    Lw(Reg, i32, Reg),
    /// `sw rt, offset(base)`
    Sw(Reg, i32, Reg),
    /// `addu rd, rs, imm`
    AdduImm(Reg, Reg, i32),
    /// `subu rd, rs, imm`
    SubuImm(Reg, Reg, i32),
    /// `xor rd, rs, imm`
    XorImm(Reg, Reg, i32),
    /// `sll rd, rs, shamt`
    Sll(Reg, Reg, u32),
    /// `op rd, rs, rt`
    Alu(AluOp, Reg, Reg, Reg),
    /// `mult rs, rt`
    Mult(Reg, Reg),
    /// `mflo rd`
    Mflo(Reg),
    /// `op rs, rt, label`
    Branch(BranchOp, Reg, Reg, Label),
    /// `j label`
    J(Label),
    /// `jal label`
    Jal(Label),
    /// `jalr rs`
    Jalr(Reg),
    /// `jr rs`
    Jr(Reg),
    /// `syscall`
    Syscall,
}

impl Inst {
    /// Returns `true` for lines printed flush-left: labels and section switches.
    pub fn is_flush_left(&self) -> bool {
        matches!(self, Self::Label(_) | Self::Section(_))
    }
}

/// Formats `offset(base)`, omitting a zero offset.
struct Mem(i32, Reg);

impl fmt::Display for Mem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "({})", self.1),
            off => write!(f, "{off}({})", self.1),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(l) => write!(f, "{l}:"),
            Self::Section(s) => write!(f, "{s}"),
            Self::Globl(l) => write!(f, ".globl {l}"),
            Self::Word(w) => write!(f, ".word {w}"),
            Self::Ascii(s) => {
                f.write_str(".ascii \"")?;
                write_escaped(f, s)?;
                f.write_str("\"")
            }
            Self::Align(n) => write!(f, ".align {n}"),
            Self::Li(rd, imm) => write!(f, "li {rd}, {imm}"),
            Self::La(rd, l) => write!(f, "la {rd}, {l}"),
            Self::Lw(rt, off, base) => write!(f, "lw {rt}, {}", Mem(*off, *base)),
            Self::Sw(rt, off, base) => write!(f, "sw {rt}, {}", Mem(*off, *base)),
            Self::AdduImm(rd, rs, imm) => write!(f, "addu {rd}, {rs}, {imm}"),
            Self::SubuImm(rd, rs, imm) => write!(f, "subu {rd}, {rs}, {imm}"),
            Self::XorImm(rd, rs, imm) => write!(f, "xor {rd}, {rs}, {imm}"),
            Self::Sll(rd, rs, sh) => write!(f, "sll {rd}, {rs}, {sh}"),
            Self::Alu(op, rd, rs, rt) => write!(f, "{op} {rd}, {rs}, {rt}"),
            Self::Mult(rs, rt) => write!(f, "mult {rs}, {rt}"),
            Self::Mflo(rd) => write!(f, "mflo {rd}"),
            Self::Branch(op, rs, rt, l) => write!(f, "{op} {rs}, {rt}, {l}"),
            Self::J(l) => write!(f, "j {l}"),
            Self::Jal(l) => write!(f, "jal {l}"),
            Self::Jalr(rs) => write!(f, "jalr {rs}"),
            Self::Jr(rs) => write!(f, "jr {rs}"),
            Self::Syscall => f.write_str("syscall"),
        }
    }
}

/// Writes `s` with the escapes understood inside an `.ascii` directive. Bytes outside printable
/// ASCII are written as three-digit octal escapes.
fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    for &b in s.as_bytes() {
        match b {
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            b'\n' => f.write_str("\\n")?,
            b'\t' => f.write_str("\\t")?,
            b' '..=b'~' => write!(f, "{}", b as char)?,
            _ => write!(f, "\\{b:03o}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn label_names() {
        assert_eq!(Label::Class("Foo".into()).to_string(), "CLASS_Foo");
        assert_eq!(Label::ClassEnd(DATA_ARRAY_CLASS.into()).to_string(), "CLASS_END__DataArray");
        assert_eq!(Label::Method { id: 7, name: "run".into() }.to_string(), "fcn_7_run");
        let rt = Label::RuntimeMethod { name: "equals".into(), class: "Object".into() };
        assert_eq!(rt.to_string(), "equals_Object");
        assert_eq!(Label::WhileEnter(3).to_string(), "while_enter_3");
        assert_eq!(Label::from(RuntimeFn::NullPtrException).to_string(), "nullPtrException");
    }

    #[test]
    fn runtime_symbols() {
        let names = RuntimeFn::iter().map(|f| f.to_string()).collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "vm_init",
                "newObject",
                "divide",
                "remainder",
                "instanceOf",
                "checkCast",
                "nullPtrException",
                "arrayIndexOutOfBounds",
            ]
        );
    }

    #[test]
    fn instruction_text() {
        assert_eq!(Inst::Lw(Reg::T0, 0, Reg::Sp).to_string(), "lw $t0, ($sp)");
        assert_eq!(Inst::Sw(Reg::S5, 4, Reg::Sp).to_string(), "sw $s5, 4($sp)");
        assert_eq!(Inst::Lw(Reg::T1, -4, Reg::T0).to_string(), "lw $t1, -4($t0)");
        assert_eq!(Inst::SubuImm(Reg::Sp, Reg::Sp, 8).to_string(), "subu $sp, $sp, 8");
        assert_eq!(Inst::Alu(AluOp::Slt, Reg::T0, Reg::T1, Reg::T0).to_string(), "slt $t0, $t1, $t0");
        let branch = Inst::Branch(
            BranchOp::Bgeu,
            Reg::T2,
            Reg::T1,
            RuntimeFn::ArrayIndexOutOfBounds.into(),
        );
        assert_eq!(branch.to_string(), "bgeu $t2, $t1, arrayIndexOutOfBounds");
        assert_eq!(Inst::Word(Word::Int(0)).to_string(), ".word 0");
        assert_eq!(Inst::Label(Label::Main).to_string(), "main:");
        assert!(Inst::Label(Label::Main).is_flush_left());
        assert!(!Inst::Globl(Label::Main).is_flush_left());
    }

    #[test]
    fn ascii_escapes() {
        let inst = Inst::Ascii("say \"hi\"\n\\é".into());
        assert_eq!(inst.to_string(), r#".ascii "say \"hi\"\n\\\303\251""#);
    }
}
