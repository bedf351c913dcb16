use super::Error;
use crate::compile::token::Token;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_BLOCK: &str = "unexpected block";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const MISSING_VALUE: &str = "missing value";

/// Return an [`Error`] explaining that the end of source was not expected.
pub fn error_eof(source: &str) -> Error {
    let source_len = source.len();

    Error::build(UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help("expected additional tokens, did you close every tag?")
}

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation.
pub fn error_write() -> Error {
    Error::build("write failure")
        .with_help("failed to write result of render, are you low on memory?")
}

/// Return a string describing an unexpected [`Token`] where a keyword
/// was required.
pub fn expected_keyword(received: Token) -> String {
    format!("expected keyword `each`, found {received}")
}
