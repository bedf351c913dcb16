//! Template parser.
//!
//! Utilizes a Lexer to receive instances of Region, which it uses to construct
//! a new Template containing the Abstract Syntax Tree.
//!
//! This template can be combined with some Store data to produce output.
pub mod scope;
pub mod tree;

mod fragment;
mod state;

use crate::{
    compile::{
        lex::{token::Token, Lexer},
        parse::{
            fragment::Fragment,
            state::State,
            tree::{Each, Key, Output, Tree, Variable},
        },
        Keyword, Scope, Template, TokenResult, TokenResultMust,
    },
    log::{
        error_eof, expected_keyword, Error, INVALID_SYNTAX, UNEXPECTED_BLOCK, UNEXPECTED_TOKEN,
    },
    region::Region,
};
use morel::Finder;
use tracing::debug;

pub struct Parser<'source, 'syntax> {
    /// Lexer used to pull from source as tokens instead of raw text.
    lexer: Lexer<'source, 'syntax>,
    /// Store peeked tokens.
    ///
    /// Double option is used to remember when the next token is None.
    buffer: Option<Option<(Token, Region)>>,
    /// When true, malformed tags are reported as an [`Error`] instead of
    /// being kept as raw text.
    strict: bool,
}

impl<'source, 'syntax> Parser<'source, 'syntax> {
    /// Create a new Parser from the given string.
    #[inline]
    pub fn new(source: &'source str, finder: &'syntax Finder) -> Self {
        Self {
            lexer: Lexer::new(source, finder),
            buffer: None,
            strict: false,
        }
    }

    /// Set strict mode.
    ///
    /// Returns the Parser, so additional methods may be chained.
    #[inline]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;

        self
    }

    /// Compile the template.
    ///
    /// Returns a new Template, which can be executed with some Store
    /// data to receive output.
    ///
    /// # Errors
    ///
    /// In strict mode, returns an [`Error`] describing the first malformed,
    /// stray or unclosed tag. Otherwise such tags are kept as raw text.
    pub fn compile(mut self, name: Option<&'source str>) -> Result<Template<'source>, Error> {
        let source = self.lexer.source;
        let scope = self.parse().map_err(|error| match name {
            Some(name) => error.with_name(name),
            None => error,
        })?;

        Ok(Template {
            name,
            scope,
            source,
        })
    }

    /// Parse the source into a single Scope.
    fn parse(&mut self) -> Result<Scope, Error> {
        let source = self.lexer.source;

        // Open "each" blocks, innermost last.
        let mut states: Vec<State> = vec![];

        // Contains the distinct Tree instances within a specific area of the source.
        //
        // The body of each open block gets its own Scope, which is folded into
        // an Each when the block closes.
        let mut scopes: Vec<Scope> = vec![Scope::new()];

        while let Some((token, region)) = self.next()? {
            let tree = match token {
                Token::Raw => Tree::Raw(region),
                Token::BeginExpression => match self.parse_fragment(region) {
                    Ok((Fragment::Output(variable), region)) => {
                        Tree::Output(Output { variable, region })
                    }
                    Ok((Fragment::Each(variable), region)) => {
                        states.push(State::Each { variable, region });
                        scopes.push(Scope::new());
                        continue;
                    }
                    Ok((Fragment::EndEach, end)) => match states.pop() {
                        Some(State::Each { variable, region }) => {
                            let scope = scopes.pop().expect("open block must own a scope");

                            Tree::Each(Each {
                                variable,
                                scope,
                                region: region.combine(end),
                            })
                        }
                        None if self.strict => {
                            return Err(Error::build(UNEXPECTED_BLOCK)
                                .with_pointer(source, end)
                                .with_help("there is no open `#each` block to close"));
                        }
                        None => {
                            debug!(begin = end.begin, "keeping stray closing tag as raw text");
                            Tree::Raw(end)
                        }
                    },
                    Err(error) if self.strict => return Err(error),
                    Err(error) => {
                        debug!(
                            begin = region.begin,
                            reason = error.get_reason(),
                            "keeping malformed tag as raw text"
                        );
                        Tree::Raw(self.recover(region))
                    }
                },
                Token::EndExpression if self.strict => {
                    return Err(Error::build(UNEXPECTED_TOKEN)
                        .with_pointer(source, region)
                        .with_help("found the end of a tag that was never opened"));
                }
                Token::EndExpression => Tree::Raw(region),
                token => {
                    return Err(Error::build(UNEXPECTED_TOKEN)
                        .with_pointer(source, region)
                        .with_help(format!("found {token} outside of a tag")));
                }
            };

            scopes
                .last_mut()
                .expect("parser should always have a scope")
                .data
                .push(tree);
        }

        // Any block still open was never closed. Keep its opening tag as raw
        // text and hoist its body into the enclosing scope.
        while let Some(State::Each { region, .. }) = states.pop() {
            if self.strict {
                return Err(Error::build(INVALID_SYNTAX)
                    .with_pointer(source, region)
                    .with_help("did you close the `#each` block with `/each`?"));
            }
            debug!(begin = region.begin, "keeping unclosed block as raw text");

            let body = scopes.pop().expect("open block must own a scope");
            let parent = scopes.last_mut().expect("parser should always have a scope");
            parent.data.push(Tree::Raw(region));
            parent.data.extend(body.data);
        }

        assert!(
            scopes.len() == 1,
            "parser should never have >1 scope after compilation"
        );

        Ok(scopes.remove(0))
    }

    /// Parse the contents of a tag, up to and including the end marker.
    ///
    /// Returns the [`Fragment`] and a [`Region`] spanning the whole tag.
    fn parse_fragment(&mut self, open: Region) -> Result<(Fragment, Region), Error> {
        // from
        // |
        // {{#each items}}
        //               |
        //               to
        let fragment = match self.next_any_must()? {
            (Token::Hash, sigil) => {
                self.parse_keyword(open, sigil)?;
                Fragment::Each(self.parse_variable()?)
            }
            (Token::Slash, sigil) => {
                self.parse_keyword(open, sigil)?;
                Fragment::EndEach
            }
            (token @ (Token::Identifier | Token::Keyword(_) | Token::Period), region) => {
                Fragment::Output(self.parse_path(token, region)?)
            }
            (token, region) => {
                return Err(Error::build(UNEXPECTED_TOKEN)
                    .with_pointer(self.lexer.source, region)
                    .with_help(format!(
                        "expected `#each`, `/each` or a path such as `order.total`, found {token}"
                    )));
            }
        };
        let (_, close) = self.next_must(Token::EndExpression)?;

        Ok((fragment, open.combine(close)))
    }

    /// Parse the keyword that follows a `#` or `/` sigil.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is not the `each` keyword, or
    /// whitespace separates the sigil from the opening marker or the keyword.
    fn parse_keyword(&mut self, open: Region, sigil: Region) -> Result<Keyword, Error> {
        let source = self.lexer.source;
        if !open.is_neighbor(sigil) {
            return Err(Error::build(INVALID_SYNTAX)
                .with_pointer(source, open.combine(sigil))
                .with_help(format!(
                    "try removing the whitespace before `{}`",
                    sigil.literal(source)
                )));
        }

        match self.next_any_must()? {
            (Token::Keyword(keyword), region) if sigil.is_neighbor(region) => Ok(keyword),
            (Token::Keyword(keyword), region) => Err(Error::build(INVALID_SYNTAX)
                .with_pointer(self.lexer.source, sigil.combine(region))
                .with_help(format!(
                    "try removing the whitespace before `{keyword}`"
                ))),
            (token, region) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(expected_keyword(token))),
        }
    }

    /// Parse a Variable, beginning with the next token.
    fn parse_variable(&mut self) -> Result<Variable, Error> {
        match self.next_any_must()? {
            (token @ (Token::Identifier | Token::Keyword(_) | Token::Period), region) => {
                self.parse_path(token, region)
            }
            (_, region) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help("expected a path such as `order.items`")),
        }
    }

    /// Parse a Variable whose first token, a segment or a period, has
    /// already been read.
    ///
    /// A path is written without whitespace. An empty segment, as in `order.`,
    /// `.order` or `order..total`, becomes an empty Key that never resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if whitespace separates a period from its neighbors,
    /// or in strict mode, if any segment is empty.
    fn parse_path(&mut self, token: Token, first: Region) -> Result<Variable, Error> {
        let source = self.lexer.source;
        let mut path = vec![];
        // Segment read since the last period.
        let mut segment = match token {
            Token::Period => {
                path.push(Key::from(Region::at(first.begin)));
                None
            }
            _ => Some(first),
        };
        let mut previous = first;

        while let Some((token, region)) = self.peek()? {
            match token {
                Token::Period => {}
                Token::Identifier | Token::Keyword(_) if segment.is_none() => {}
                _ => break,
            }

            // order.total <- valid
            // order . total <- invalid
            if !previous.is_neighbor(region) {
                return Err(Error::build(INVALID_SYNTAX)
                    .with_pointer(source, previous.combine(region))
                    .with_help("try removing the whitespace around `.`"));
            }
            self.next()?;

            if token == Token::Period {
                let key = segment.take().unwrap_or(Region::at(region.begin));
                path.push(Key::from(key));
            } else {
                segment = Some(region);
            }
            previous = region;
        }
        path.push(Key::from(segment.unwrap_or(Region::at(previous.end))));

        let variable = Variable { path };
        if variable.path.iter().any(Key::is_empty) {
            if self.strict {
                return Err(Error::build(INVALID_SYNTAX)
                    .with_pointer(source, variable.get_region())
                    .with_help("a path must not have an empty segment"));
            }
            debug!(
                path = variable.to_path(source),
                "path has an empty segment and will never resolve"
            );
        }

        Ok(variable)
    }

    /// Abandon a malformed tag that began with the given opening marker,
    /// and continue reading raw text right after the marker.
    ///
    /// Returns the Region to keep as raw text, which is the marker along
    /// with any whitespace the marker trimmed away.
    fn recover(&mut self, open: Region) -> Region {
        self.buffer = None;
        let kept = self.lexer.trimmed().combine(open);
        self.lexer.reset(open.end);

        kept
    }

    /// Peek the next token.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the underlying Lexer.
    fn peek(&mut self) -> TokenResult {
        if let o @ None = &mut self.buffer {
            *o = Some(self.lexer.next()?);
        }

        Ok(self.buffer.flatten())
    }

    /// Get the next token.
    ///
    /// Prefers to pull a token from the internal buffer first, but will pull from
    /// the lexer when the buffer is empty.
    fn next(&mut self) -> TokenResult {
        match self.buffer.take() {
            Some(t) => Ok(t),
            None => self.lexer.next(),
        }
    }

    /// Returns true if the given token matches the upcoming token.
    ///
    /// # Errors
    ///
    /// Propagates any errors reported by the underlying lexer.
    fn next_is(&mut self, expect: Token) -> Result<bool, Error> {
        Ok(self
            .peek()?
            .map(|(token, _)| token == expect)
            .unwrap_or(false))
    }

    /// Get the next token, and compare it to the given token.
    ///
    /// # Errors
    ///
    /// An error is returned if the next token does not match the given token,
    /// or when [next()] returns None.
    fn next_must(&mut self, expect: Token) -> TokenResultMust {
        match self.next()? {
            Some((token, region)) if token == expect => Ok((token, region)),
            Some((_, region)) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(format!("expected {expect}"))),
            None => Err(error_eof(self.lexer.source).with_help(format!("expected {expect}"))),
        }
    }

    /// Get the next token.
    ///
    /// Similar to "next()" but requires that a token is returned.
    ///
    /// # Errors
    ///
    /// An error is returned if no more tokens are left.
    fn next_any_must(&mut self) -> TokenResultMust {
        match self.next()? {
            Some((token, region)) => Ok((token, region)),
            None => Err(error_eof(self.lexer.source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::{
        compile::{lex::token::Token, tree::Tree, Scope},
        log::{INVALID_SYNTAX, UNEXPECTED_BLOCK, UNEXPECTED_EOF, UNEXPECTED_TOKEN},
        Builder,
    };
    use morel::Finder;

    fn finder() -> Finder {
        Finder::new(Builder::new().to_syntax())
    }

    /// Concatenate the literal text of every Raw tree in the scope.
    fn raw_text(scope: &Scope, source: &str) -> String {
        scope
            .data
            .iter()
            .map(|tree| match tree {
                Tree::Raw(region) => region.literal(source),
                _ => panic!("expected only raw trees, found {tree:?}"),
            })
            .collect()
    }

    #[test]
    fn test_parser_lexer_integration() {
        let finder = finder();
        let mut parser = Parser::new("hello", &finder);
        assert_eq!(parser.next(), Ok(Some((Token::Raw, (0..5).into()))));
        assert_eq!(parser.next(), Ok(None));
    }

    #[test]
    fn test_peek_multiple() {
        let finder = finder();
        let mut parser = Parser::new("{{ one two", &finder);
        assert!(parser.next().is_ok());
        assert_eq!(parser.peek(), Ok(Some((Token::Identifier, (3..6).into()))));
        assert_eq!(parser.peek(), Ok(Some((Token::Identifier, (3..6).into()))));
        assert_eq!(parser.next(), Ok(Some((Token::Identifier, (3..6).into()))));
        assert_eq!(parser.peek(), Ok(Some((Token::Identifier, (7..10).into()))));
    }

    #[test]
    fn test_parse_output() {
        let finder = finder();
        let text = "Hello {{ customer.name }}!";
        let template = Parser::new(text, &finder).compile(None).unwrap();

        assert_eq!(template.scope.data.len(), 3);
        match &template.scope.data[1] {
            Tree::Output(output) => {
                assert_eq!(output.variable.to_path(text), "customer.name");
                assert_eq!(output.region.literal(text), "{{ customer.name }}");
            }
            tree => panic!("expected output, found {tree:?}"),
        }
    }

    #[test]
    fn test_parse_nested_each() {
        let finder = finder();
        let text = "{{#each orders}}#{{number}}{{#each items}}{{name}}{{/each}}{{/each}}";
        let template = Parser::new(text, &finder).compile(None).unwrap();

        assert_eq!(template.scope.data.len(), 1);
        let outer = match &template.scope.data[0] {
            Tree::Each(each) => each,
            tree => panic!("expected each, found {tree:?}"),
        };
        assert_eq!(outer.variable.to_path(text), "orders");
        assert_eq!(outer.region.literal(text), text);
        assert_eq!(outer.scope.data.len(), 3);

        match &outer.scope.data[2] {
            Tree::Each(inner) => {
                assert_eq!(inner.variable.to_path(text), "items");
                assert!(matches!(inner.scope.data[..], [Tree::Output(_)]));
            }
            tree => panic!("expected each, found {tree:?}"),
        }
    }

    #[test]
    fn test_parse_each_as_path_segment() {
        let finder = finder();
        let text = "{{ each }}{{ totals.each }}";
        let template = Parser::new(text, &finder)
            .with_strict(true)
            .compile(None)
            .unwrap();

        assert!(matches!(
            template.scope.data[..],
            [Tree::Output(_), Tree::Output(_)]
        ));
    }

    #[test]
    fn test_lenient_malformed_tags() {
        let finder = finder();
        for text in [
            "{{ first name }}",
            "{{> partial }}",
            "{{{ html }}}",
            "{{}}",
            "{{ order . total }}",
            "{{# each items}}{{/each}}",
            "{{ #each items}}{{ /each }}",
            "{{#each items extra}}",
            "a   {{~ x y }} b",
            "a }} b",
            "{{ name",
        ] {
            let template = Parser::new(text, &finder).compile(None).unwrap();

            assert_eq!(raw_text(&template.scope, text), text);
        }
    }

    #[test]
    fn test_lenient_empty_segments() {
        let finder = finder();

        for (text, path) in [
            ("{{order.}}", "order."),
            ("{{.order}}", ".order"),
            ("{{ order..total }}", "order..total"),
            ("{{.}}", "."),
        ] {
            let template = Parser::new(text, &finder).compile(None).unwrap();

            match &template.scope.data[..] {
                [Tree::Output(output)] => {
                    assert_eq!(output.variable.to_path(text), path);
                    assert!(output.variable.path.iter().any(|key| key.is_empty()));
                }
                trees => panic!("unexpected trees {trees:?} for {text}"),
            }
        }
    }

    #[test]
    fn test_lenient_unclosed_each() {
        let finder = finder();
        let text = "a{{#each items}}{{ name }}";
        let template = Parser::new(text, &finder).compile(None).unwrap();

        match &template.scope.data[..] {
            [Tree::Raw(a), Tree::Raw(open), Tree::Output(output)] => {
                assert_eq!(a.literal(text), "a");
                assert_eq!(open.literal(text), "{{#each items}}");
                assert_eq!(output.variable.to_path(text), "name");
            }
            trees => panic!("unexpected trees {trees:?}"),
        }
    }

    #[test]
    fn test_lenient_stray_close() {
        let finder = finder();
        let text = "{{/each}}b";
        let template = Parser::new(text, &finder).compile(None).unwrap();

        assert_eq!(raw_text(&template.scope, text), text);
    }

    #[test]
    fn test_strict_errors() {
        let finder = finder();
        let cases = [
            ("{{ first name }}", UNEXPECTED_TOKEN),
            ("{{> partial }}", UNEXPECTED_TOKEN),
            ("{{ order . total }}", INVALID_SYNTAX),
            ("{{ order. total }}", INVALID_SYNTAX),
            ("{{order.}}", INVALID_SYNTAX),
            ("{{.order}}", INVALID_SYNTAX),
            ("{{order..total}}", INVALID_SYNTAX),
            ("{{#each items.}}{{/each}}", INVALID_SYNTAX),
            ("{{# each items}}{{/each}}", INVALID_SYNTAX),
            ("{{ #each items}}{{/each}}", INVALID_SYNTAX),
            ("{{#each items}}{{ /each}}", INVALID_SYNTAX),
            ("{{#each}}{{/each}}", UNEXPECTED_TOKEN),
            ("{{#if items}}", UNEXPECTED_TOKEN),
            ("{{/each}}", UNEXPECTED_BLOCK),
            ("{{#each items}}", INVALID_SYNTAX),
            ("a }} b", UNEXPECTED_TOKEN),
            ("{{ name", UNEXPECTED_EOF),
        ];

        for (text, reason) in cases {
            let result = Parser::new(text, &finder).with_strict(true).compile(None);

            assert_eq!(result.unwrap_err().get_reason(), reason, "{text}");
        }
    }

    #[test]
    fn test_strict_error_carries_name() {
        let finder = finder();
        let result = Parser::new("{{#each items}}", &finder)
            .with_strict(true)
            .compile(Some("order-confirmation"));

        assert_eq!(result.unwrap_err().get_name(), Some("order-confirmation"));
    }
}
