//! The layout pass.
//!
//! Assigns every instance variable its offset in the object, every formal parameter its offset
//! in the callee frame, and every method its v-table slot, and emits the class records and string
//! literals that make up the `.data` section.
//!
//! Classes are visited in pre-order starting from the root. Each class starts from a copy of its
//! superclass's layout, so inherited offsets and slots never move and siblings never see each
//! other's overrides. Because a class's subclasses are emitted between its `CLASS_` and
//! `CLASS_END_` labels, `[CLASS_X, CLASS_END_X)` covers exactly the records of `X` and its
//! descendants, which is what the runtime's subtype range test relies on.

use crate::{
    CodeSink,
    asm::{
        DATA_ARRAY_CLASS, FIRST_DATA_OFFSET, FIRST_OBJ_OFFSET, Inst, Label, OBJECT_ARRAY_CLASS,
        Section, Word,
    },
};
use smallvec::SmallVec;
use std::fmt;
use talon_ast::{
    ClassId, Idx, IndexVec, MethodId, Program, Span, VarId, WORD_SIZE, words_on_stack_frame,
};

/// Layout facts of a class, including everything it inherits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassLayout {
    /// Number of scalar instance variables.
    pub num_data: u32,
    /// Number of reference instance variables.
    pub num_obj: u32,
    /// The method occupying each v-table slot, starting at slot 1. Slot 0 holds the superclass
    /// pointer.
    pub vtable: SmallVec<[MethodId; 8]>,
}

impl ClassLayout {
    fn root() -> Self {
        Self { num_data: 0, num_obj: 0, vtable: SmallVec::new() }
    }

    /// Returns the method in v-table slot `slot`.
    pub fn slot(&self, slot: u32) -> Option<MethodId> {
        (slot as usize).checked_sub(1).and_then(|i| self.vtable.get(i)).copied()
    }
}

/// Layout facts of a method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodLayout {
    /// V-table slot, shared with the method this one overrides.
    pub vtable_slot: u32,
    /// Frame offset of the receiver, later reused for the return address. It sits just above the
    /// formal parameters: `4 * (1 + words(formals))`.
    pub this_ptr_offset: i32,
}

impl MethodLayout {
    /// Returns the byte offset of this method's entry in a class record.
    pub fn vtable_offset(&self) -> i32 {
        self.vtable_slot as i32 * WORD_SIZE
    }
}

/// The result of the layout pass.
///
/// Every entry is written once by the pass and is read-only afterwards. Reading an entry the pass
/// never wrote is an internal error.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    classes: IndexVec<ClassId, Option<ClassLayout>>,
    methods: IndexVec<MethodId, Option<MethodLayout>>,
    /// Offsets of instance variables (from the object base) and formals (from the frame).
    vars: IndexVec<VarId, Option<i32>>,
}

impl Layout {
    /// Runs the layout pass over `program`, emitting its `.data` section into `sink`.
    #[instrument(name = "layout", level = "debug", skip_all)]
    pub fn compute(program: &Program, sink: &mut (impl CodeSink + ?Sized)) -> Self {
        let mut pass = LayoutPass {
            program,
            layout: Self {
                classes: empty(program.classes.len()),
                methods: empty(program.methods.len()),
                vars: empty(program.vars.len()),
            },
            sink,
        };
        pass.sink.emit(Span::DUMMY, Inst::Section(Section::Data));
        match program.root_class() {
            Some(root) => pass.visit_class(root, &ClassLayout::root()),
            // Array allocations and string literals still point at the array records.
            None => pass.emit_array_records(Span::DUMMY, None, &ClassLayout::root()),
        }
        pass.emit_string_literals();

        let layout = pass.layout;
        if let Some((id, _)) = layout.classes.iter_enumerated().find(|(_, c)| c.is_none()) {
            bug!("class `{}` is not a descendant of the root class", program.class(id).name);
        }
        debug!(classes = layout.classes.len(), methods = layout.methods.len(), "layout done");
        layout
    }

    /// Returns the layout of `class`.
    #[track_caller]
    pub fn class(&self, class: ClassId) -> &ClassLayout {
        match &self.classes[class] {
            Some(layout) => layout,
            None => bug!("class {class:?} has no layout"),
        }
    }

    /// Returns the layout of `method`.
    #[track_caller]
    pub fn method(&self, method: MethodId) -> &MethodLayout {
        match &self.methods[method] {
            Some(layout) => layout,
            None => bug!("method {method:?} has no layout"),
        }
    }

    /// Returns the offset of an instance variable or formal parameter.
    #[track_caller]
    pub fn var_offset(&self, var: VarId) -> i32 {
        match self.vars[var] {
            Some(offset) => offset,
            None => bug!("variable {var:?} has no offset"),
        }
    }
}

fn empty<I: Idx, T>(n: usize) -> IndexVec<I, Option<T>> {
    std::iter::repeat_with(|| None).take(n).collect()
}

#[track_caller]
fn set_once<I: Idx + fmt::Debug, T>(slots: &mut IndexVec<I, Option<T>>, id: I, value: T) {
    if slots[id].replace(value).is_some() {
        bug!("layout of {id:?} computed twice");
    }
}

struct LayoutPass<'a, S: ?Sized> {
    program: &'a Program,
    layout: Layout,
    sink: &'a mut S,
}

impl<S: CodeSink + ?Sized> LayoutPass<'_, S> {
    fn visit_class(&mut self, id: ClassId, inherited: &ClassLayout) {
        let program = self.program;
        let decl = program.class(id);
        let mut cl = inherited.clone();

        for &var in &decl.inst_vars {
            let ty = &program.var(var).ty;
            let offset = if ty.is_data() {
                cl.num_data += 1;
                FIRST_DATA_OFFSET - (cl.num_data as i32 - 1) * WORD_SIZE
            } else {
                cl.num_obj += 1;
                FIRST_OBJ_OFFSET + (cl.num_obj as i32 - 1) * WORD_SIZE
            };
            set_once(&mut self.layout.vars, var, offset);
        }

        for &method in decl.methods.values() {
            self.visit_method(id, method, &mut cl.vtable);
        }

        trace!(
            class = %decl.name,
            num_data = cl.num_data,
            num_obj = cl.num_obj,
            slots = cl.vtable.len(),
            "laid out class"
        );

        let span = decl.span;
        self.sink.emit(span, Inst::Label(Label::Class(decl.name.clone())));
        self.emit_record_body(span, decl.super_class, &cl);

        for &sub in &decl.subclasses {
            self.visit_class(sub, &cl);
        }
        if decl.super_class.is_none() {
            // Arrays are instances of the root class and share its dispatch table.
            self.emit_array_records(span, Some(id), &cl);
        }

        self.sink.emit(span, Inst::Label(Label::ClassEnd(decl.name.clone())));
        set_once(&mut self.layout.classes, id, cl);
    }

    fn visit_method(
        &mut self,
        class: ClassId,
        id: MethodId,
        vtable: &mut SmallVec<[MethodId; 8]>,
    ) {
        let program = self.program;
        let decl = program.method(id);

        let formal_words = words_on_stack_frame(decl.formals.iter().map(|&v| &program.var(v).ty));
        let this_ptr_offset = (1 + formal_words) * WORD_SIZE;
        let mut offset = this_ptr_offset;
        for &formal in &decl.formals {
            // A scalar formal is addressed by its data word, the lower of its two slots.
            offset -= program.var(formal).ty.stack_bytes();
            set_once(&mut self.layout.vars, formal, offset);
        }

        let vtable_slot = match decl.super_method {
            Some(overridden) => {
                let slot = self.layout.method(overridden).vtable_slot;
                match vtable.get_mut(slot as usize - 1) {
                    Some(entry) if *entry == overridden => *entry = id,
                    entry => bug!(
                        "`{}` overrides `{}`, but slot {slot} of `{}` holds {:?}",
                        decl.name,
                        program.method(overridden).name,
                        program.class(class).name,
                        entry.map(|m| &program.method(*m).name),
                    ),
                }
                slot
            }
            None => {
                let shadowed =
                    program.superclasses(class).find_map(|c| program.class(c).method(&decl.name));
                if let Some(shadowed) = shadowed {
                    bug!(
                        "`{}` in `{}` has no overridden method but `{}` declares one",
                        decl.name,
                        program.class(class).name,
                        program.class(program.method(shadowed).class).name,
                    );
                }
                vtable.push(id);
                vtable.len() as u32
            }
        };
        set_once(&mut self.layout.methods, id, MethodLayout { vtable_slot, this_ptr_offset });
    }

    /// Emits the superclass word and the dispatch table of a class record.
    fn emit_record_body(&mut self, span: Span, super_class: Option<ClassId>, cl: &ClassLayout) {
        let super_word = match super_class {
            Some(s) => Word::Label(Label::Class(self.program.class(s).name.clone())),
            None => Word::Int(0),
        };
        self.sink.emit(span, Inst::Word(super_word));
        for &method in &cl.vtable {
            self.sink.emit(span, Inst::Word(Word::Label(Label::method(self.program, method))));
        }
    }

    /// Emits the records of the synthetic array classes, as subclasses of `root` if there is one.
    fn emit_array_records(&mut self, span: Span, root: Option<ClassId>, cl: &ClassLayout) {
        for name in [DATA_ARRAY_CLASS, OBJECT_ARRAY_CLASS] {
            self.sink.emit(span, Inst::Label(Label::Class(name.to_string())));
            self.emit_record_body(span, root, cl);
            self.sink.emit(span, Inst::Label(Label::ClassEnd(name.to_string())));
        }
    }

    /// Emits every string literal as a static scalar array: header words for the class record,
    /// the size and the length, then the characters.
    fn emit_string_literals(&mut self) {
        let program = self.program;
        let class = match program.string_class {
            Some(class) => program.class(class).name.clone(),
            None => DATA_ARRAY_CLASS.to_string(),
        };
        for (id, value) in program.string_literals() {
            let span = program.expr(id).span;
            let len = value.len() as i32;
            let data_words = (len + WORD_SIZE - 1) / WORD_SIZE;
            self.sink.emit(span, Inst::Word(Word::Label(Label::Class(class.clone()))));
            self.sink.emit(span, Inst::Word(Word::Int(-data_words)));
            self.sink.emit(span, Inst::Word(Word::Int(len)));
            self.sink.emit(span, Inst::Label(Label::StrLit(id.get())));
            self.sink.emit(span, Inst::Ascii(value.to_string()));
            self.sink.emit(span, Inst::Align(2));
        }
    }
}
