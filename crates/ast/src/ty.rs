use crate::ClassId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size in bytes of one operand-stack slot, object field, or array element.
pub const WORD_SIZE: i32 = 4;

/// A resolved static type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIs)]
pub enum Ty {
    /// `int`.
    Int,
    /// `boolean`.
    Bool,
    /// The return type of methods that produce no value.
    Void,
    /// The type of the `null` literal, assignable to every reference type.
    Null,
    /// A class type.
    Class(ClassId),
    /// An array of the given element type.
    Array(Box<Ty>),
}

impl Ty {
    /// Creates an array type with the given element type.
    pub fn array(elem: Self) -> Self {
        Self::Array(Box::new(elem))
    }

    /// Returns `true` for scalar ("data") values: integers and booleans.
    ///
    /// On the operand stack a scalar is a tag word above its data word; in an object or array it
    /// is a single word stored below the object base.
    #[inline]
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Int | Self::Bool)
    }

    /// Returns `true` for reference ("object") values: class instances, arrays, and `null`.
    #[inline]
    pub fn is_object(&self) -> bool {
        !self.is_data() && !self.is_void()
    }

    /// The number of operand-stack words a value of this type occupies.
    #[inline]
    pub fn words(&self) -> i32 {
        match self {
            Self::Void => 0,
            Self::Int | Self::Bool => 2,
            Self::Null | Self::Class(_) | Self::Array(_) => 1,
        }
    }

    /// The number of operand-stack bytes a value of this type occupies.
    #[inline]
    pub fn stack_bytes(&self) -> i32 {
        self.words() * WORD_SIZE
    }

    /// Returns the class of a class type.
    #[inline]
    pub fn as_class(&self) -> Option<ClassId> {
        match *self {
            Self::Class(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the element type of an array type.
    #[inline]
    pub fn elem(&self) -> Option<&Self> {
        match self {
            Self::Array(elem) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Bool => f.write_str("boolean"),
            Self::Void => f.write_str("void"),
            Self::Null => f.write_str("null"),
            Self::Class(id) => write!(f, "class#{id}"),
            Self::Array(elem) => write!(f, "{elem}[]"),
        }
    }
}

/// Total operand-stack words occupied by values of the given types, in order.
///
/// This is the footprint of a formal-parameter list on the callee's frame.
pub fn words_on_stack_frame<'a>(tys: impl IntoIterator<Item = &'a Ty>) -> i32 {
    tys.into_iter().map(Ty::words).sum()
}
