use crate::{compile::Scope, region::Region};

/// The Abstract Syntax Tree.
#[derive(Debug, Clone)]
pub enum Tree {
    /// Raw text.
    Raw(Region),
    /// Render a scalar value.
    Output(Output),
    /// Render a scope once for each item in a sequence.
    Each(Each),
}

/// Represents a call to render the value at a path.
#[derive(Debug, Clone)]
pub struct Output {
    pub variable: Variable,
    /// Region spanning the whole tag, markers included.
    pub region: Region,
}

/// Represents a repetition block.
#[derive(Debug, Clone)]
pub struct Each {
    /// Path of the sequence.
    pub variable: Variable,
    /// Body rendered for each item.
    pub scope: Scope,
    /// Region spanning from the opening tag to the closing tag.
    pub region: Region,
}

/// Set of Key instances that can be used to locate data within the Store.
///
/// Always holds at least one Key.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub path: Vec<Key>,
}

impl Variable {
    /// Get a Region spanning the area from the first and last Key instances.
    pub fn get_region(&self) -> Region {
        let first = self.path.first().expect("variable path must not be empty");
        let last = self.path.last().expect("variable path must not be empty");

        first.region.combine(last.region)
    }

    /// Return the literal value of each Key.
    pub fn keys<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.path.iter().map(move |key| key.region.literal(source))
    }

    /// Return the dotted path as written in the source, such as `order.total`.
    pub fn to_path<'source>(&self, source: &'source str) -> &'source str {
        self.get_region().literal(source)
    }
}

/// Path segment in a larger identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub region: Region,
}

impl Key {
    /// Return true if the segment has no text, as in `order.` or `order..total`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.region.begin == self.region.end
    }
}

impl From<Region> for Key {
    fn from(region: Region) -> Self {
        Self { region }
    }
}
