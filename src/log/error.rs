use super::{Pointer, RED, RESET};
use crate::region::Region;
use std::fmt::{self, Display, Formatter};

/// A compile or render failure.
///
/// Carries a short reason, and optionally the name of the template, a help
/// line and a [`Pointer`] into the template source.
///
/// # Examples
///
/// ```
/// use missive::{Error, Region};
///
/// let error = Error::build("unexpected token")
///     .with_pointer("{{ first name }}", Region::new(9..13))
///     .with_name("order-confirmation")
///     .with_help("expected `}}`");
///
/// assert_eq!(error.get_name(), Some("order-confirmation"));
/// ```
///
/// Printed with `{:#}`, the error shows where it happened:
///
/// ```text
/// error: unexpected token
///   --> order-confirmation:1:10
///    |
///  1 | {{ first name }}
///    |          ^^^^
///    |
///    = help: expected `}}`
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    reason: String,
    name: Option<String>,
    help: Option<String>,
    pointer: Option<Pointer>,
}

impl Error {
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            reason: reason.into(),
            name: None,
            help: None,
            pointer: None,
        }
    }

    /// Name the template the error belongs to.
    pub fn with_name<T>(mut self, name: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(name.into());

        self
    }

    pub fn with_help<T>(mut self, help: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(help.into());

        self
    }

    /// Point at a region of the given source.
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.pointer = Some(Pointer::new(source, region.into()));

        self
    }

    pub fn get_reason(&self) -> &str {
        &self.reason
    }

    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{RED}error{RESET}: {}", self.reason)?;

        match &self.pointer {
            Some(pointer) if f.alternate() => {
                pointer.write(f, self.name.as_deref(), self.help.as_deref())
            }
            _ => Ok(()),
        }
    }
}

impl std::error::Error for Error {}
