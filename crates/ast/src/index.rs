//! Index types.

pub use index_vec::{Idx, IndexSlice, IndexVec};

/// Declares `u32`-backed index newtypes that can key an [`IndexVec`].
///
/// The generated types serialize as plain integers so that a tree produced by another tool can be
/// read back with the same ids it was written with.
macro_rules! newtype_index {
    ($($(#[$attr:meta])* $vis:vis struct $name:ident;)*) => {$(
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        $vis struct $name(u32);

        impl $name {
            /// Creates a new index from the given value.
            #[inline]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Gets the underlying index value.
            #[inline]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl $crate::index::Idx for $name {
            #[inline]
            fn from_usize(value: usize) -> Self {
                assert!(value <= u32::MAX as usize, "index overflowed");
                Self(value as u32)
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl std::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    )*};
}
