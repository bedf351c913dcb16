use crate::{compile::tree::Variable, region::Region};

/// Describes the internal state of a `Parser`.
pub enum State {
    /// The `Parser` is collecting the body of an "each" block.
    Each {
        /// Path of the sequence being repeated over.
        variable: Variable,
        /// Region spanning the opening tag.
        region: Region,
    },
}
