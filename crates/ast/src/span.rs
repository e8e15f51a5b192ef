use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{cmp, fmt, ops::Range};

/// A byte offset into a source file.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BytePos(pub u32);

impl fmt::Debug for BytePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BytePos({})", self.0)
    }
}

impl BytePos {
    #[inline(always)]
    pub fn from_u32(n: u32) -> Self {
        Self(n)
    }

    #[inline(always)]
    pub fn to_u32(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

/// A source code location: a `lo..hi` byte range into the file the tree was parsed from.
///
/// Runtime-library declarations have no source text; they carry [`Span::DUMMY`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    // `lo` in the low half, `hi` in the high half.
    data: u64,
}

impl Default for Span {
    #[inline(always)]
    fn default() -> Self {
        Self::DUMMY
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({lo}..{hi})", lo = self.lo().0, hi = self.hi().0)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.lo().0, self.hi().0)
    }
}

impl PartialOrd for Span {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Span {
    #[inline]
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.lo().cmp(&other.lo()).then(self.hi().cmp(&other.hi()))
    }
}

impl Span {
    /// A dummy span.
    pub const DUMMY: Self = Self::new_(BytePos(0), BytePos(0));

    /// Creates a new span from two byte positions.
    #[inline]
    pub fn new(mut lo: BytePos, mut hi: BytePos) -> Self {
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        Self::new_(lo, hi)
    }

    #[inline(always)]
    const fn new_(lo: BytePos, hi: BytePos) -> Self {
        Self { data: (lo.0 as u64) | ((hi.0 as u64) << 32) }
    }

    /// Returns the span as a `Range<usize>`.
    #[inline]
    pub fn to_range(self) -> Range<usize> {
        self.lo().to_usize()..self.hi().to_usize()
    }

    /// Returns the span's start position.
    #[inline(always)]
    pub fn lo(self) -> BytePos {
        BytePos(self.data as u32)
    }

    /// Returns the span's end position.
    #[inline(always)]
    pub fn hi(self) -> BytePos {
        BytePos((self.data >> 32) as u32)
    }

    /// Returns `true` if this is a dummy span.
    #[inline]
    pub fn is_dummy(self) -> bool {
        self == Self::DUMMY
    }

    /// Returns a new span that spans both `self` and `end`.
    #[inline]
    pub fn to(self, end: Self) -> Self {
        if self.is_dummy() {
            return end;
        }
        if end.is_dummy() {
            return self;
        }
        Self::new(cmp::min(self.lo(), end.lo()), cmp::max(self.hi(), end.hi()))
    }
}

impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.lo().0, self.hi().0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Span {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (lo, hi) = <(u32, u32)>::deserialize(deserializer)?;
        Ok(Self::new(BytePos(lo), BytePos(hi)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_both_ends() {
        let span = Span::new(BytePos(40), BytePos(7));
        assert_eq!(span.lo(), BytePos(7));
        assert_eq!(span.hi(), BytePos(40));
        assert_eq!(span.to_range(), 7..40);
        assert!(!span.is_dummy());
        assert!(Span::default().is_dummy());
    }

    #[test]
    fn to_ignores_dummy() {
        let a = Span::new(BytePos(3), BytePos(5));
        let b = Span::new(BytePos(10), BytePos(12));
        assert_eq!(a.to(b), Span::new(BytePos(3), BytePos(12)));
        assert_eq!(Span::DUMMY.to(b), b);
        assert_eq!(a.to(Span::DUMMY), a);
    }

    #[test]
    fn serde_as_pair() {
        let span = Span::new(BytePos(1), BytePos(9));
        let json = serde_json::to_string(&span).unwrap();
        assert_eq!(json, "[1,9]");
        assert_eq!(serde_json::from_str::<Span>(&json).unwrap(), span);
    }
}
