use crate::compile::{Keyword, Marker};
use std::fmt::{self, Display, Formatter};

/// What the Lexer found at a Region of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Text outside of any tag.
    Raw,
    /// Opening marker of a tag, trimmed or not.
    BeginExpression,
    /// Closing marker of a tag, trimmed or not.
    EndExpression,
    /// One segment of a path.
    Identifier,
    /// Skipped by the Lexer, never seen by the Parser.
    Whitespace,
    Period,
    /// Sigil that opens a block.
    Hash,
    /// Sigil that closes a block.
    Slash,
    Keyword(Keyword),
}

impl Token {
    /// Map a marker id reported by the Finder to its Token, paired with
    /// whether the marker trims the whitespace next to it.
    pub(crate) fn from_marker(id: usize) -> (Self, bool) {
        match Marker::from(id) {
            Marker::BeginExpression => (Self::BeginExpression, false),
            Marker::BeginExpressionTrim => (Self::BeginExpression, true),
            Marker::EndExpression => (Self::EndExpression, false),
            Marker::EndExpressionTrim => (Self::EndExpression, true),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Raw => "text",
            Token::BeginExpression => "the start of a tag",
            Token::EndExpression => "the end of a tag",
            Token::Identifier => "an identifier",
            Token::Whitespace => "whitespace",
            Token::Period => "`.`",
            Token::Hash => "`#`",
            Token::Slash => "`/`",
            Token::Keyword(keyword) => return write!(f, "keyword `{keyword}`"),
        };

        f.write_str(text)
    }
}
