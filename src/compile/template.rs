use super::Scope;

/// A compiled [`Template`] that can be rendered with a `Store`.
#[derive(Debug, Clone)]
pub struct Template<'source> {
    /// The name of the [`Template`].
    pub name: Option<&'source str>,
    /// The Abstract Syntax Tree generated during compilation.
    pub scope: Scope,
    /// Reference to the source data from which this [`Template`] was generated.
    pub source: &'source str,
}

impl<'source> Template<'source> {
    /// Return the name of the [`Template`], if it has one.
    #[inline]
    pub fn get_name(&self) -> Option<&'source str> {
        self.name
    }
}

/// A subject line and a body, compiled together and rendered against
/// the same `Store`.
#[derive(Debug, Clone)]
pub struct Message<'source> {
    pub subject: Template<'source>,
    pub body: Template<'source>,
}
