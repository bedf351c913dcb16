use morel::Syntax;

/// Markers that identify tags within text.
///
/// Scalar and block directives share the same delimiters, a block is told
/// apart by the `#` or `/` that follows the opening marker.
pub enum Marker {
    /// Beginning of a tag.
    BeginExpression = 0,
    /// End of a tag.
    EndExpression = 1,
    /// Same as BeginExpression, but causes the trailing whitespace of the
    /// preceding raw text to be removed.
    BeginExpressionTrim = 2,
    /// Same as EndExpression, but causes the leading whitespace of the
    /// following raw text to be removed.
    EndExpressionTrim = 3,
}

impl From<usize> for Marker {
    fn from(value: usize) -> Self {
        match value {
            0 => Self::BeginExpression,
            1 => Self::EndExpression,
            2 => Self::BeginExpressionTrim,
            3 => Self::EndExpressionTrim,
            _ => unreachable!(),
        }
    }
}

impl From<Marker> for usize {
    fn from(k: Marker) -> Self {
        k as usize
    }
}

/// Provides methods to build a `Syntax`.
///
/// # Example
///
/// ```
/// use missive::Builder;
///
/// let syntax = Builder::new()
///     .with_expression("[[", "]]")
///     .with_whitespace('-')
///     .to_syntax();
/// ```
#[derive(Debug, Clone)]
pub struct Builder<'marker> {
    expression: (&'marker str, &'marker str),
    whitespace: char,
}

impl<'marker> Builder<'marker> {
    /// Create a new [`Builder`].
    ///
    /// The `Builder` has default markers:
    ///
    /// ```text
    /// Tags: {{ name }}, {{#each items}} ... {{/each}}
    /// Whitespace: {{~ name ~}}
    /// ```
    ///
    /// To proceed with these defaults, you may immediately call `to_syntax` to receive the
    /// [`Syntax`] instance.
    #[inline]
    pub fn new() -> Self {
        Self {
            expression: ("{{", "}}"),
            whitespace: '~',
        }
    }

    /// Set the tag markers.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::Builder;
    ///
    /// let mut builder = Builder::new();
    /// builder.set_expression("[[", "]]");
    /// ```
    #[inline]
    pub fn set_expression(&mut self, begin: &'marker str, end: &'marker str) {
        assert!(!begin.is_empty() && !end.is_empty());
        self.expression = (begin, end);
    }

    /// Set the tag markers.
    ///
    /// Returns the [`Builder`], so additional methods may be chained.
    #[inline]
    pub fn with_expression(mut self, begin: &'marker str, end: &'marker str) -> Self {
        self.set_expression(begin, end);

        self
    }

    /// Set the whitespace trim character.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::Builder;
    ///
    /// let mut builder = Builder::new();
    /// builder.set_whitespace('-');
    /// ```
    #[inline]
    pub fn set_whitespace(&mut self, character: char) {
        assert!(!character.is_whitespace());
        self.whitespace = character;
    }

    /// Set the whitespace trim character.
    ///
    /// Returns the Builder, so additional methods may be chained.
    #[inline]
    pub fn with_whitespace(mut self, character: char) -> Self {
        self.set_whitespace(character);

        self
    }

    /// Return a Syntax instance from the markers in this [`Builder`].
    pub fn to_syntax(self) -> Syntax {
        let (left, right) = self.expression;
        let whitespace = self.whitespace;

        Syntax::new(vec![
            (Marker::BeginExpression.into(), left.into()),
            (Marker::EndExpression.into(), right.into()),
            (
                Marker::BeginExpressionTrim.into(),
                format!("{left}{whitespace}"),
            ),
            (
                Marker::EndExpressionTrim.into(),
                format!("{whitespace}{right}"),
            ),
        ])
    }
}

impl Default for Builder<'_> {
    fn default() -> Self {
        Self::new()
    }
}
