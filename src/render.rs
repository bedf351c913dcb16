mod pipe;
mod report;
mod store;

pub use report::{Missing, Report};
pub use store::{resolve, Store};

use crate::{
    compile::{
        tree::{Each, Output, Tree, Variable},
        Message, Scope, Template,
    },
    log::{error_write, Error},
};
use serde_json::Value;
use std::fmt::Write;
use tracing::trace;

use self::{pipe::Pipe, store::Shadow};

/// Name of the binding that holds the current item inside a repetition block.
pub const THIS: &str = "this";

/// Describes how the item of a repetition block is made visible to its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoping {
    /// Bind the item to `this`, and when the item is a mapping, also bind each
    /// of its fields by name, shadowing any outer value with the same name
    /// for the duration of the iteration.
    #[default]
    Spread,
    /// Bind the item to `this` only. Fields must be reached through
    /// `this.field`.
    Item,
}

/// The rendered subject line and body of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub body: String,
}

/// A [`Report`] for both templates of a [`Message`].
#[derive(Debug, Clone, PartialEq)]
pub struct MessageReport {
    pub subject: Report,
    pub body: Report,
}

impl MessageReport {
    /// Return true if every path in both templates resolved to a value.
    pub fn is_complete(&self) -> bool {
        self.subject.is_complete() && self.body.is_complete()
    }

    /// Discard the missing paths and keep the rendered text.
    pub fn into_rendered(self) -> Rendered {
        Rendered {
            subject: self.subject.output,
            body: self.body.output,
        }
    }
}

/// Render a [`Template`].
///
/// Provides a shortcut to quickly render a `Template` with the default
/// [`Scoping`].
///
/// Paths that do not resolve, and paths that resolve to a mapping or
/// sequence, render as nothing.
///
/// # Errors
///
/// Returns an [`Error`] only if writing to the output buffer fails.
///
/// # Examples
///
/// ```
/// use missive::{compile, render, Store};
///
/// let template = compile("Hello {{name}}!");
/// assert!(template.is_ok());
///
/// let output = render(&template.unwrap(), &Store::new().with_must("name", "Jonas"));
/// assert_eq!(output.unwrap(), "Hello Jonas!");
/// ```
pub fn render(template: &Template, store: &Store) -> Result<String, Error> {
    Renderer::new(template, store).render()
}

/// Render a [`Template`], and report every path that did not resolve.
///
/// # Errors
///
/// Returns an [`Error`] only if writing to the output buffer fails.
///
/// # Examples
///
/// ```
/// use missive::{compile, render_report, Store};
///
/// let template = compile("Total: {{ totalAmount }}").unwrap();
/// let report = render_report(&template, &Store::new()).unwrap();
///
/// assert_eq!(report.output, "Total: ");
/// assert!(report.is_missing("totalAmount"));
/// ```
pub fn render_report(template: &Template, store: &Store) -> Result<Report, Error> {
    Renderer::new(template, store).render_report()
}

/// Render both templates of a [`Message`] with the same [`Store`].
///
/// # Errors
///
/// Returns an [`Error`] only if writing to an output buffer fails.
pub fn render_message(message: &Message, store: &Store) -> Result<Rendered, Error> {
    render_message_with(message, store, Scoping::default())
}

pub(crate) fn render_message_with(
    message: &Message,
    store: &Store,
    scoping: Scoping,
) -> Result<Rendered, Error> {
    Ok(Rendered {
        subject: Renderer::new(&message.subject, store)
            .with_scoping(scoping)
            .render()?,
        body: Renderer::new(&message.body, store)
            .with_scoping(scoping)
            .render()?,
    })
}

pub(crate) fn render_message_report_with(
    message: &Message,
    store: &Store,
    scoping: Scoping,
) -> Result<MessageReport, Error> {
    Ok(MessageReport {
        subject: Renderer::new(&message.subject, store)
            .with_scoping(scoping)
            .render_report()?,
        body: Renderer::new(&message.body, store)
            .with_scoping(scoping)
            .render_report()?,
    })
}

pub struct Renderer<'template, 'store> {
    /// The template being rendered.
    template: &'template Template<'template>,
    /// The Store that the Template is rendered with, beneath a stack of
    /// frames holding the bindings of each open repetition block.
    shadow: Shadow<'store>,
    /// How the item of a repetition block is bound.
    scoping: Scoping,
    /// Paths that did not resolve, only collected when reporting.
    missing: Option<Vec<Missing>>,
}

impl<'template, 'store> Renderer<'template, 'store> {
    /// Create a new Renderer.
    pub fn new(template: &'template Template<'template>, store: &'store Store) -> Self {
        Renderer {
            template,
            shadow: Shadow::new(store),
            scoping: Scoping::default(),
            missing: None,
        }
    }

    /// Set the [`Scoping`] used by repetition blocks.
    ///
    /// Returns the Renderer, so additional methods may be chained.
    #[inline]
    pub fn with_scoping(mut self, scoping: Scoping) -> Self {
        self.scoping = scoping;

        self
    }

    /// Render the [`Template`] stored inside the [`Renderer`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if writing a rendered [`Tree`] to the buffer fails.
    pub fn render(&mut self) -> Result<String, Error> {
        let template = self.template;
        let mut buffer = String::with_capacity(template.source.len());
        let mut pipe = Pipe::new(&mut buffer);

        self.render_scope(&template.scope, &mut pipe)?;
        Ok(buffer)
    }

    /// Render the [`Template`] stored inside the [`Renderer`], collecting
    /// every path that did not resolve.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if writing a rendered [`Tree`] to the buffer fails.
    pub fn render_report(mut self) -> Result<Report, Error> {
        self.missing = Some(vec![]);
        let output = self.render()?;

        Ok(Report {
            output,
            missing: self.missing.unwrap_or_default(),
        })
    }

    /// Render the given [`Scope`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if any of the [`Tree`] instances in the `Scope` cannot be
    /// written.
    fn render_scope(&mut self, scope: &'template Scope, pipe: &mut Pipe) -> Result<(), Error> {
        for tree in scope.data.iter() {
            match tree {
                Tree::Raw(region) => pipe
                    .write_str(region.literal(self.template.source))
                    .map_err(|_| error_write())?,
                Tree::Output(output) => self.render_output(output, pipe)?,
                Tree::Each(each) => self.render_each(each, pipe)?,
            }
        }

        Ok(())
    }

    /// Write the value of an [`Output`] path.
    ///
    /// The value is written once and never scanned for tags.
    fn render_output(&mut self, output: &Output, pipe: &mut Pipe) -> Result<(), Error> {
        let source = self.template.source;

        match self.shadow.resolve(output.variable.keys(source)) {
            Some(value) => pipe.write_value(value).map_err(|_| error_write()),
            None => {
                self.note_missing(&output.variable);
                Ok(())
            }
        }
    }

    /// Render the body of an [`Each`] once per item in its sequence.
    ///
    /// Each iteration pushes a frame holding that item's bindings, so nested
    /// blocks and outputs in the body see the item, while siblings and the
    /// enclosing scope never do.
    fn render_each(&mut self, each: &'template Each, pipe: &mut Pipe) -> Result<(), Error> {
        let source = self.template.source;

        let items = match self.shadow.resolve(each.variable.keys(source)) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                trace!(
                    path = each.variable.to_path(source),
                    "skipping block over a value that is not a sequence"
                );
                return Ok(());
            }
            None => {
                self.note_missing(&each.variable);
                return Ok(());
            }
        };

        for item in items {
            self.shadow.push();
            self.bind(item);
            let result = self.render_scope(&each.scope, pipe);
            self.shadow.pop();
            result?;
        }

        Ok(())
    }

    /// Bind an item to the top frame.
    ///
    /// Fields are bound after `this`, so a field named `this` wins.
    fn bind(&mut self, item: &'store Value) {
        self.shadow.insert(THIS, item);

        if let (Scoping::Spread, Value::Object(fields)) = (self.scoping, item) {
            for (key, value) in fields {
                self.shadow.insert(key, value);
            }
        }
    }

    /// Record a path that did not resolve.
    fn note_missing(&mut self, variable: &Variable) {
        let path = variable.to_path(self.template.source);
        trace!(path, "path did not resolve to a value");

        if let Some(missing) = &mut self.missing {
            missing.push(Missing {
                path: path.to_owned(),
                region: variable.get_region(),
            });
        }
    }
}
