/// Describes the internal state of a [`Lexer`][`super::Lexer`].
#[derive(Debug, PartialEq)]
pub enum CursorState {
    /// Indicates the [`Lexer`][`super::Lexer`] is not inside of a tag.
    Default,
    /// Indicates the [`Lexer`][`super::Lexer`] is inside of a tag, and
    /// expects the tag to be closed by an end marker.
    Inside,
}
