use std::ops::{Index, Range};

/// A span of bytes within the source text of a template.
///
/// Tokens, tree nodes and errors all refer back to the source through a
/// `Region`, so a compiled template never copies its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub begin: usize,
    pub end: usize,
}

impl Region {
    #[inline]
    pub fn new(range: Range<usize>) -> Self {
        range.into()
    }

    /// An empty region sitting at the given offset.
    #[inline]
    pub fn at(offset: usize) -> Self {
        Self {
            begin: offset,
            end: offset,
        }
    }

    /// Return true if the two regions touch with nothing between them,
    /// in either order.
    pub fn is_neighbor(&self, other: Self) -> bool {
        self.end == other.begin || self.begin == other.end
    }

    /// The smallest region covering both.
    pub fn combine(self, other: Self) -> Self {
        Self {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }

    /// Borrow the text this region covers.
    ///
    /// # Panics
    ///
    /// Panics when the region does not fall on character boundaries
    /// within `source`.
    pub fn literal<'source>(&self, source: &'source str) -> &'source str {
        &source[*self]
    }
}

impl Index<Region> for str {
    type Output = str;

    fn index(&self, region: Region) -> &str {
        &self[region.begin..region.end]
    }
}

impl From<Range<usize>> for Region {
    fn from(range: Range<usize>) -> Self {
        Self {
            begin: range.start,
            end: range.end,
        }
    }
}
