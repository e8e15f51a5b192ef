use crate::{
    ClassDecl, ClassId, Expr, ExprId, ExprKind, IndexVec, MethodDecl, MethodId, Stmt, StmtId, Ty,
    VarDecl, VarId,
};
use serde::{Deserialize, Serialize};

/// A whole resolved program.
///
/// Every declaration, statement, and expression lives in one of the arenas below and is referred
/// to by its index, which doubles as the node's unique identifier. Links between nodes (superclass,
/// overridden method, variable references, `break` targets) are plain ids and are expected to be
/// fully resolved.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Program {
    /// All classes, including the root class and runtime-library classes.
    pub classes: IndexVec<ClassId, ClassDecl>,
    /// All methods.
    pub methods: IndexVec<MethodId, MethodDecl>,
    /// All instance variables, formal parameters and locals.
    pub vars: IndexVec<VarId, VarDecl>,
    /// All statements.
    pub stmts: IndexVec<StmtId, Stmt>,
    /// All expressions.
    pub exprs: IndexVec<ExprId, Expr>,
    /// The top-level statement executed by the program entry point.
    pub main: Option<StmtId>,
    /// The class string literals are instances of, if the program declares one.
    pub string_class: Option<ClassId>,
}

macro_rules! indexvec_methods {
    ($($singular:ident, $singular_ids:ident => $plural:ident, $id:ty => $type:ty;)*) => {
        $(
            #[doc = concat!("Returns the ", stringify!($singular), " associated with the given ID.")]
            #[inline]
            #[cfg_attr(debug_assertions, track_caller)]
            pub fn $singular(&self, id: $id) -> &$type {
                &self.$plural[id]
            }

            #[doc = concat!("Returns an iterator over all of the ", stringify!($singular), " IDs.")]
            #[inline]
            pub fn $singular_ids(&self) -> impl ExactSizeIterator<Item = $id> + Clone + use<> {
                self.$plural.indices()
            }
        )*
    };
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    indexvec_methods! {
        class, class_ids => classes, ClassId => ClassDecl;
        method, method_ids => methods, MethodId => MethodDecl;
        var, var_ids => vars, VarId => VarDecl;
        stmt, stmt_ids => stmts, StmtId => Stmt;
        expr, expr_ids => exprs, ExprId => Expr;
    }

    /// Returns the root of the class hierarchy, reached by following superclass links from the
    /// first declared class.
    pub fn root_class(&self) -> Option<ClassId> {
        let first = self.class_ids().next()?;
        Some(self.superclasses(first).last().unwrap_or(first))
    }

    /// Returns the strict ancestors of `id`, nearest first.
    pub fn superclasses(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::successors(self.class(id).super_class, move |&c| self.class(c).super_class)
    }

    /// Returns `true` if `sub` is `sup` or one of its descendants.
    pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        sub == sup || self.superclasses(sub).any(|c| c == sup)
    }

    /// Returns `true` if a value of type `sub` is statically known to be usable as `sup`.
    pub fn is_subtype(&self, sub: &Ty, sup: &Ty) -> bool {
        match (sub, sup) {
            _ if sub == sup => true,
            (Ty::Null, sup) => sup.is_object(),
            (Ty::Class(sub), Ty::Class(sup)) => self.is_subclass(*sub, *sup),
            // Arrays are instances of the root class.
            (Ty::Array(_), Ty::Class(sup)) => self.class(*sup).super_class.is_none(),
            _ => false,
        }
    }

    /// Returns `root` and all of its descendants in pre-order, children in declaration order.
    pub fn preorder(&self, root: ClassId) -> Vec<ClassId> {
        let mut order = Vec::with_capacity(self.classes.len());
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.class(id).subclasses.iter().rev().copied());
        }
        order
    }

    /// Returns the method `class` dispatches `name` to, searching the class and then its
    /// ancestors.
    pub fn lookup_method(&self, class: ClassId, name: &str) -> Option<MethodId> {
        std::iter::once(class).chain(self.superclasses(class)).find_map(|c| self.class(c).method(name))
    }

    /// Returns an iterator over all string literals and their expression ids, in arena order.
    pub fn string_literals(&self) -> impl Iterator<Item = (ExprId, &str)> + '_ {
        self.exprs.iter_enumerated().filter_map(|(id, expr)| match &expr.kind {
            ExprKind::Str(s) => Some((id, s.as_str())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{ProgramBuilder, Ty};

    #[test]
    fn hierarchy_queries() {
        let mut b = ProgramBuilder::new();
        let object = b.class("Object", None);
        let animal = b.class("Animal", Some(object));
        let dog = b.class("Dog", Some(animal));
        let cat = b.class("Cat", Some(animal));
        let p = b.finish();

        assert_eq!(p.root_class(), Some(object));
        assert_eq!(p.superclasses(dog).collect::<Vec<_>>(), [animal, object]);
        assert!(p.is_subclass(dog, object));
        assert!(p.is_subclass(dog, dog));
        assert!(!p.is_subclass(dog, cat));
        assert!(!p.is_subclass(animal, dog));
        assert_eq!(p.preorder(object), [object, animal, dog, cat]);
    }

    #[test]
    fn root_from_any_first_class() {
        let mut b = ProgramBuilder::new();
        let leaf = b.class("Leaf", None);
        let root = b.class("Root", None);
        b.set_super(leaf, root);
        let p = b.finish();
        assert_eq!(p.root_class(), Some(root));
        assert_eq!(p.preorder(root), [root, leaf]);
    }

    #[test]
    fn subtyping() {
        let mut b = ProgramBuilder::new();
        let object = b.class("Object", None);
        let a = b.class("A", Some(object));
        let c = b.class("C", Some(a));
        let p = b.finish();

        assert!(p.is_subtype(&Ty::Class(c), &Ty::Class(a)));
        assert!(!p.is_subtype(&Ty::Class(a), &Ty::Class(c)));
        assert!(p.is_subtype(&Ty::Null, &Ty::Class(c)));
        assert!(p.is_subtype(&Ty::Null, &Ty::array(Ty::Int)));
        assert!(!p.is_subtype(&Ty::Null, &Ty::Int));
        assert!(p.is_subtype(&Ty::array(Ty::Int), &Ty::Class(object)));
        assert!(!p.is_subtype(&Ty::array(Ty::Int), &Ty::Class(a)));
        assert!(!p.is_subtype(&Ty::array(Ty::Int), &Ty::array(Ty::Bool)));
    }

    #[test]
    fn method_lookup_walks_ancestors() {
        let mut b = ProgramBuilder::new();
        let object = b.class("Object", None);
        let a = b.class("A", Some(object));
        let c = b.class("C", Some(a));
        let f = b.method(a, "f", &[], Ty::Void);
        let g = b.method(c, "f", &[], Ty::Void);
        let p = b.finish();

        assert_eq!(p.lookup_method(c, "f"), Some(g));
        assert_eq!(p.lookup_method(a, "f"), Some(f));
        assert_eq!(p.lookup_method(object, "f"), None);
        assert_eq!(p.method(g).super_method, Some(f));
    }
}
