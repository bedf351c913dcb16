use crate::{
    compile::{Builder, Message, Parser, Template},
    log::Error,
    render::{
        render_message_report_with, render_message_with, MessageReport, Rendered, Renderer,
        Report, Scoping,
    },
    Store,
};
use morel::{Finder, Syntax};
use tracing::debug;

/// Compiles and renders templates with one marker syntax and one set of
/// options.
///
/// Templates are owned by the caller. Where they come from and how they
/// are chosen is not the Engine's concern.
pub struct Engine {
    /// Finds the markers of the `Syntax` this Engine was created with.
    finder: Finder,
    /// When true, malformed tags are compile errors.
    strict: bool,
    /// How repetition blocks bind their items.
    scoping: Scoping,
}

impl Engine {
    /// Create a new instance of [`Engine`] with the given `Syntax`.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::{Builder, Engine};
    ///
    /// let engine = Engine::new(Builder::new().with_expression("[[", "]]").to_syntax());
    /// let template = engine.compile("Hello [[ name ]]!");
    /// assert!(template.is_ok());
    /// ```
    #[inline]
    pub fn new(syntax: Syntax) -> Self {
        Self {
            finder: Finder::new(syntax),
            strict: false,
            scoping: Scoping::default(),
        }
    }

    /// Set strict mode, where malformed, stray and unclosed tags are
    /// reported as an [`Error`] instead of being kept as raw text.
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    #[inline]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;

        self
    }

    /// Set the [`Scoping`] used by repetition blocks.
    ///
    /// Returns the [`Engine`], so additional methods may be chained.
    #[inline]
    pub fn with_scoping(mut self, scoping: Scoping) -> Self {
        self.scoping = scoping;

        self
    }

    /// Compile a new [`Template`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the Engine is strict and the source contains
    /// a malformed tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::Engine;
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile("Hello {{ name }}!");
    /// assert!(template.is_ok());
    /// ```
    #[inline]
    pub fn compile<'source>(&self, text: &'source str) -> Result<Template<'source>, Error> {
        self.parse(text, None)
    }

    /// Compile a new [`Template`] that carries a name, which appears in
    /// any [`Error`] pointing into it.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the Engine is strict and the source contains
    /// a malformed tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::Engine;
    ///
    /// let engine = Engine::default().with_strict(true);
    /// let error = engine.compile_named("welcome", "Hello {{ first name }}!").unwrap_err();
    ///
    /// assert_eq!(error.get_name(), Some("welcome"));
    /// ```
    #[inline]
    pub fn compile_named<'source>(
        &self,
        name: &'source str,
        text: &'source str,
    ) -> Result<Template<'source>, Error> {
        self.parse(text, Some(name))
    }

    /// Compile the subject line and body of a [`Message`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when either template fails to compile.
    pub fn compile_message<'source>(
        &self,
        subject: &'source str,
        body: &'source str,
    ) -> Result<Message<'source>, Error> {
        Ok(Message {
            subject: self.parse(subject, Some("subject"))?,
            body: self.parse(body, Some("body"))?,
        })
    }

    /// Render a [`Template`] with the given [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] only if writing the output fails. Paths that do
    /// not resolve render as nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use missive::{Engine, Store};
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile("Hello {{ name }}!").unwrap();
    /// let result = engine.render(&template, &Store::new().with_must("name", "Jonas"));
    ///
    /// assert_eq!(result.unwrap(), "Hello Jonas!")
    /// ```
    #[inline]
    pub fn render(&self, template: &Template, store: &Store) -> Result<String, Error> {
        Renderer::new(template, store)
            .with_scoping(self.scoping)
            .render()
    }

    /// Render a [`Template`] with the given [`Store`], and report every path
    /// that did not resolve.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] only if writing the output fails.
    #[inline]
    pub fn render_report(&self, template: &Template, store: &Store) -> Result<Report, Error> {
        Renderer::new(template, store)
            .with_scoping(self.scoping)
            .render_report()
    }

    /// Render both templates of a [`Message`] with the same [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] only if writing the output fails.
    #[inline]
    pub fn render_message(&self, message: &Message, store: &Store) -> Result<Rendered, Error> {
        render_message_with(message, store, self.scoping)
    }

    /// Render both templates of a [`Message`] with the same [`Store`], and
    /// report every path that did not resolve in either.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] only if writing the output fails.
    #[inline]
    pub fn render_message_report(
        &self,
        message: &Message,
        store: &Store,
    ) -> Result<MessageReport, Error> {
        render_message_report_with(message, store, self.scoping)
    }

    fn parse<'source>(
        &self,
        text: &'source str,
        name: Option<&'source str>,
    ) -> Result<Template<'source>, Error> {
        let template = Parser::new(text, &self.finder)
            .with_strict(self.strict)
            .compile(name)?;
        debug!(
            template = template.get_name(),
            trees = template.scope.data.len(),
            "compiled template"
        );

        Ok(template)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Builder::new().to_syntax())
    }
}

#[cfg(test)]
mod tests {
    use crate::{engine::Engine, log::INVALID_SYNTAX, Builder, Scoping, Store};
    use serde_json::json;

    #[test]
    fn test_strict() {
        let lenient = Engine::default();
        let strict = Engine::default().with_strict(true);
        let text = "{{#each items}}{{name}}";
        let store = Store::new().with_must("name", "x");

        let template = lenient.compile(text).unwrap();
        assert_eq!(lenient.render(&template, &store).unwrap(), "{{#each items}}x");

        let error = strict.compile_named("cart", text).unwrap_err();
        assert_eq!(error.get_reason(), INVALID_SYNTAX);
        assert_eq!(error.get_name(), Some("cart"));
        assert!(strict.compile(text).is_err());
    }

    #[test]
    fn test_compile_named() {
        let template = Engine::default()
            .compile_named("welcome", "Welcome!")
            .unwrap();

        assert_eq!(template.get_name(), Some("welcome"));
    }

    #[test]
    fn test_scoping() {
        let engine = Engine::default().with_scoping(Scoping::Item);
        let template = engine
            .compile("{{#each items}}{{name}}|{{this.name}};{{/each}}")
            .unwrap();
        let store = Store::new().with_must("items", json!([{ "name": "Deck" }]));

        assert_eq!(engine.render(&template, &store).unwrap(), "|Deck;");

        let report = engine.render_report(&template, &store).unwrap();
        assert!(report.is_missing("name"));
    }

    #[test]
    fn test_custom_syntax() {
        let engine = Engine::new(Builder::new().with_expression("<%", "%>").to_syntax());
        let template = engine
            .compile("{{ name }} <%#each items%><% this %>,<%/each%>")
            .unwrap();
        let store = Store::new().with_must("items", json!([1, 2]));

        assert_eq!(engine.render(&template, &store).unwrap(), "{{ name }} 1,2,");
    }

    #[test]
    fn test_message() {
        let engine = Engine::default();
        let message = engine
            .compile_message(
                "Order Confirmation #{{ orderNumber }}",
                "Total: {{ totalAmount }}",
            )
            .unwrap();
        let store = Store::new().with_must("orderNumber", "YW-2025-001");

        let rendered = engine.render_message(&message, &store).unwrap();
        assert_eq!(rendered.subject, "Order Confirmation #YW-2025-001");
        assert_eq!(rendered.body, "Total: ");

        let report = engine.render_message_report(&message, &store).unwrap();
        assert!(report.subject.is_complete());
        assert!(report.body.is_missing("totalAmount"));
        assert!(!report.is_complete());
    }
}
