pub mod token;

mod state;

use self::{state::CursorState, token::Token};
use super::{Keyword, TokenResult};
use crate::{
    log::{Error, UNEXPECTED_TOKEN},
    region::Region,
};

use morel::Finder;

/// Provides methods to read a source string as [`Token`] instances.
pub struct Lexer<'source, 'syntax> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    pub cursor: usize,
    /// Compiled [`Finder`] instance used to search for markers
    /// in the source text.
    finder: &'syntax Finder,
    /// Tracks the [`Lexer`] state and determines the action taken
    /// when `.next` is called.
    state: CursorState,
    /// When true, the following [`Token`] read while in
    /// [`CursorState::Default`] state will be left trimmed.
    left_trim: bool,
    /// Temporary storage for the a [`Token`] that will be read
    /// on the following call to `.next`
    buffer: Option<(Token, Region)>,
    /// Whitespace removed from the raw text before the latest opening
    /// marker, empty unless that marker trims.
    trimmed: Region,
}

impl<'source, 'syntax> Lexer<'source, 'syntax> {
    /// Create a new [`Lexer`] from the given source and [`Finder`].
    #[inline]
    pub fn new(source: &'source str, finder: &'syntax Finder) -> Self {
        Self {
            finder,
            state: CursorState::Default,
            source,
            left_trim: false,
            cursor: 0,
            buffer: None,
            trimmed: Region::at(0),
        }
    }

    /// Return the next [`Token`] and [`Region`].
    ///
    /// Any instance of [`Token::Whitespace`] is ignored, as is raw text
    /// that was trimmed away entirely.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found.
    pub fn next(&mut self) -> TokenResult {
        loop {
            // Always prefer taking from the buffer when possible.
            if let Some(next) = self.buffer.take() {
                return Ok(Some(next));
            }
            if self.source[self.cursor..].is_empty() {
                return Ok(None);
            }

            let c = self.cursor;
            let result = match self.state {
                CursorState::Default => self.lex_default(c),
                CursorState::Inside => self.lex_tag(c),
            }?;

            return match result {
                Some((Token::Whitespace, _)) => continue,
                Some((Token::Raw, region)) if region.begin == region.end => continue,
                next => Ok(next),
            };
        }
    }

    /// Return the whitespace that a trimming opening marker removed from the
    /// raw text before it, as an empty Region when nothing was removed.
    ///
    /// Only meaningful until the next opening marker is read.
    #[inline]
    pub fn trimmed(&self) -> Region {
        self.trimmed
    }

    /// Abandon the current tag and continue reading raw text from the
    /// given position.
    pub fn reset(&mut self, cursor: usize) {
        self.state = CursorState::Default;
        self.cursor = cursor;
        self.left_trim = false;
        self.buffer = None;
    }

    /// Return the next [`Token`] and [`Region`] in [`CursorState::Inside`]
    /// configuration.
    ///
    /// Assumes the cursor is inside of a tag.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found.
    fn lex_tag(&mut self, from: usize) -> TokenResult {
        if let Some((id, end)) = self.finder.starts(self.source, from) {
            let (token, is_trimmed) = Token::from_marker(id);

            if token != Token::EndExpression {
                return Err(Error::build(UNEXPECTED_TOKEN)
                    .with_pointer(self.source, from..end)
                    .with_help("did you close the previous tag?"));
            }
            self.state = CursorState::Default;
            self.left_trim = is_trimmed;
            self.cursor = end;

            return Ok(Some((token, (from..end).into())));
        }

        let source = self.source;
        let mut iterator = source[from..].char_indices().map(|(d, c)| (from + d, c));
        let Some((index, char)) = iterator.next() else {
            return Ok(None);
        };

        let mut advance = |length: usize, data: Token| {
            self.cursor += length;

            Ok(Some((data, (from..from + length).into())))
        };

        match char {
            '.' => advance(1, Token::Period),
            '#' => advance(1, Token::Hash),
            '/' => advance(1, Token::Slash),
            c if c.is_whitespace() => Ok(Some(self.lex_whitespace(iterator, index))),
            c if is_ident_start(c) => Ok(Some(self.lex_ident_or_keyword(iterator, index))),
            _ => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.source, index..index + char.len_utf8())
                .with_help(
                    "expected one of `#`, `/`, `.` or an identifier such as `orderNumber`",
                )),
        }
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Whitespace`].
    fn lex_whitespace<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !char.is_whitespace() => {
                    self.cursor = index;

                    break (Token::Whitespace, (from..index).into());
                }
                Some((_, _)) => continue,
                None => {
                    self.cursor = self.source.len();

                    break (Token::Whitespace, (from..self.source.len()).into());
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] from the given iterator.
    ///
    /// The `Token` will be [`Token::Identifier`] or [`Token::Keyword`].
    fn lex_ident_or_keyword<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        let to = loop {
            match iter.next() {
                Some((index, char)) if !is_ident_continue(char) => break index,
                Some((_, _)) => continue,
                None => break self.source.len(),
            }
        };
        let token = match &self.source[from..to] {
            "each" => Token::Keyword(Keyword::Each),
            _ => Token::Identifier,
        };
        self.cursor = to;

        (token, (from..to).into())
    }

    /// Return the next [`Token`] and [`Region`] in [`CursorState::Default`]
    /// configuration.
    ///
    /// Assumes the cursor is outside of a tag. An end marker found here is
    /// returned as is, the parser decides what a stray end marker means.
    ///
    /// # Errors
    ///
    /// Does not currently fail, the signature matches [`Lexer::lex_tag`].
    fn lex_default(&mut self, from: usize) -> TokenResult {
        match self.finder.next(self.source, from) {
            Some((id, marker_begin, marker_end)) => {
                let (token, is_trimmed) = Token::from_marker(id);
                let right_trim = if token == Token::BeginExpression {
                    self.state = CursorState::Inside;
                    is_trimmed
                } else {
                    false
                };
                self.cursor = marker_end;

                if from == marker_begin {
                    self.left_trim = false;
                    if token == Token::BeginExpression {
                        self.trimmed = Region::at(marker_begin);
                    }

                    Ok(Some((token, (marker_begin..marker_end).into())))
                } else {
                    self.buffer = Some((token, (marker_begin..marker_end).into()));
                    let (raw, region) = self.trim_region(from, marker_begin, right_trim);
                    if token == Token::BeginExpression {
                        self.trimmed = Region::new(region.end..marker_begin);
                    }

                    Ok(Some((raw, region)))
                }
            }
            None => {
                let end = self.source.len();
                self.cursor = end;

                Ok(Some(self.trim_region(from, end, false)))
            }
        }
    }

    /// Return a [`Token::Raw`] over the given range, with whitespace removed
    /// according to the trim markers on either side.
    fn trim_region(
        &mut self,
        mut begin: usize,
        mut end: usize,
        right_trim: bool,
    ) -> (Token, Region) {
        if right_trim {
            end = begin + self.source[begin..end].trim_end().len();
        }
        if self.left_trim {
            self.left_trim = false;
            let s = &self.source[begin..end];
            begin = begin + s.len() - s.trim_start().len()
        }

        (Token::Raw, (begin..end).into())
    }
}

/// Return true if the given character may begin a path segment, meaning
/// '_', an ascii digit or an `xid_start`.
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_digit() || unicode_ident::is_xid_start(c)
}

/// Return true if the given character is a recognized continue identifier,
/// meaning an `xid_continue`.
fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(test)]
mod tests {
    use super::{state::CursorState, Lexer};
    use crate::{
        compile::{lex::Token, Keyword},
        log::Error,
        region::Region,
        Builder,
    };

    use morel::Finder;

    #[test]
    fn test_lex_default_no_match() {
        let expect = vec![(Token::Raw, 0..11)];

        helper_lex_next_auto("lorem ipsum", expect)
    }

    #[test]
    fn test_lex_output() {
        let expect = vec![
            (Token::Raw, 0..6),
            (Token::BeginExpression, 6..8),
            (Token::Identifier, 9..13),
            (Token::EndExpression, 14..16),
            (Token::Raw, 16..17),
        ];

        helper_lex_next_auto("Hello {{ name }}!", expect);
    }

    #[test]
    fn test_lex_trim() {
        let expect = vec![
            (Token::Raw, 0..5),
            (Token::BeginExpression, 6..9),
            (Token::Identifier, 10..14),
            (Token::EndExpression, 15..18),
            (Token::Raw, 20..21),
        ];

        helper_lex_next_auto("Hello {{~ name ~}}  !", expect);
    }

    #[test]
    fn test_lex_trim_everything() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Identifier, 2..3),
            (Token::EndExpression, 3..6),
            (Token::BeginExpression, 8..11),
            (Token::Identifier, 11..12),
            (Token::EndExpression, 12..14),
        ];

        helper_lex_next_auto("{{a~}} \n{{~b}}", expect);
    }

    #[test]
    fn test_lex_each() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Hash, 2..3),
            (Token::Keyword(Keyword::Each), 3..7),
            (Token::Identifier, 8..13),
            (Token::EndExpression, 13..15),
            (Token::BeginExpression, 15..17),
            (Token::Slash, 17..18),
            (Token::Keyword(Keyword::Each), 18..22),
            (Token::EndExpression, 22..24),
        ];

        helper_lex_next_auto("{{#each items}}{{/each}}", expect);
    }

    #[test]
    fn test_lex_path() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Identifier, 3..8),
            (Token::Period, 8..9),
            (Token::Identifier, 9..14),
            (Token::EndExpression, 15..17),
        ];

        helper_lex_next_auto("{{ order.total }}", expect);
    }

    #[test]
    fn test_lex_unicode_ident() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Identifier, 2..10),
            (Token::EndExpression, 10..12),
        ];

        helper_lex_next_auto("{{kaina_ū}}", expect);
    }

    #[test]
    fn test_lex_stray_end() {
        let expect = vec![
            (Token::Raw, 0..2),
            (Token::EndExpression, 2..4),
            (Token::Raw, 4..6),
        ];

        helper_lex_next_auto("a }} b", expect);
    }

    #[test]
    fn test_lex_state_change() -> Result<(), Error> {
        let finder = Finder::new(Builder::new().to_syntax());
        let mut lexer = Lexer::new("lorem {{", &finder);
        lexer.next()?;

        assert_eq!(lexer.state, CursorState::Inside);

        Ok(())
    }

    #[test]
    fn test_lex_reset() -> Result<(), Error> {
        let finder = Finder::new(Builder::new().to_syntax());
        let mut lexer = Lexer::new("{{> partial }}", &finder);

        assert_eq!(
            lexer.next()?,
            Some((Token::BeginExpression, Region::new(0..2)))
        );
        assert!(lexer.next().is_err());

        lexer.reset(2);
        assert_eq!(lexer.state, CursorState::Default);
        assert_eq!(lexer.next()?, Some((Token::Raw, Region::new(2..12))));
        assert_eq!(
            lexer.next()?,
            Some((Token::EndExpression, Region::new(12..14)))
        );
        assert_eq!(lexer.next()?, None);

        Ok(())
    }

    #[test]
    fn test_lex_trimmed_before_opening() -> Result<(), Error> {
        let finder = Finder::new(Builder::new().to_syntax());
        let mut lexer = Lexer::new("a   {{~ x }} b{{ y }}", &finder);

        assert_eq!(lexer.next()?, Some((Token::Raw, Region::new(0..1))));
        assert_eq!(
            lexer.next()?,
            Some((Token::BeginExpression, Region::new(4..7)))
        );
        assert_eq!(lexer.trimmed(), Region::new(1..4));

        while lexer.next()? != Some((Token::BeginExpression, Region::new(14..16))) {}
        assert_eq!(lexer.trimmed(), Region::at(14));

        Ok(())
    }

    #[test]
    fn test_error_multiple_opening_tags() {
        let expect = vec![
            (Token::Raw, 0..6),
            (Token::BeginExpression, 6..8),
            (Token::Identifier, 9..13),
        ];

        let finder = Finder::new(Builder::new().to_syntax());
        let mut lexer = Lexer::new("hello {{ name {{ }}", &finder);
        for (token, range) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, range.into()))))
        }

        assert!(lexer.next().is_err())
    }

    #[test]
    fn test_custom_markers() {
        let finder = Finder::new(Builder::new().with_expression("[[", "]]").to_syntax());
        let mut lexer = Lexer::new("{{ a }} [[ b ]]", &finder);

        assert_eq!(lexer.next(), Ok(Some((Token::Raw, (0..8).into()))));
        assert_eq!(
            lexer.next(),
            Ok(Some((Token::BeginExpression, (8..10).into())))
        );
    }

    /// Helper function which takes in a source string, creates a lexer on that
    /// string and iterates [expect.len()] amount of times and compares the result
    /// against [lexer.next()].
    fn helper_lex_next_auto<T>(source: &str, expect: Vec<(Token, T)>)
    where
        T: Into<Region>,
    {
        let finder = Finder::new(Builder::new().to_syntax());
        let mut lexer = Lexer::new(source, &finder);
        for (token, region) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, region.into()))))
        }

        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
    }
}
