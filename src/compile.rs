mod lex;
mod parse;
mod syntax;
mod template;

pub use crate::compile::{
    lex::token,
    parse::{scope::Scope, tree, Parser},
    syntax::{Builder, Marker},
    template::{Message, Template},
};

use crate::{log::Error, region::Region};
use morel::Finder;
use std::fmt::Display;

use self::token::Token;

type TokenResult = Result<Option<(Token, Region)>, Error>;
type TokenResultMust = Result<(Token, Region), Error>;

/// Compile a [`Template`] from the given text.
///
/// Provides a shortcut to quickly compile a `Template` with the default
/// markers and without creating an `Engine`. Malformed tags are kept as
/// raw text.
///
/// # Examples
///
/// ```
/// use missive::compile;
///
/// let template = compile("Order #{{ orderNumber }}");
/// assert!(template.is_ok())
/// ```
pub fn compile(text: &str) -> Result<Template, Error> {
    let finder = Finder::new(Builder::new().to_syntax());

    Parser::new(text, &finder).compile(None)
}

/// Keywords recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Keyword {
    /// Names a repetition block, opened with `#each` and closed with `/each`.
    Each,
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::Each => write!(f, "each"),
        }
    }
}
