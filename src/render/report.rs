use crate::{
    compile::Template,
    log::{Error, MISSING_VALUE},
    region::Region,
};

/// The output of a render, along with every path that did not resolve
/// to a value while rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The rendered text, identical to what a plain render returns.
    pub output: String,
    /// Paths that resolved to nothing, in the order they were rendered.
    ///
    /// A path inside a repetition block is listed once per iteration that
    /// failed to resolve it.
    pub missing: Vec<Missing>,
}

impl Report {
    /// Return true if every path resolved to a value.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Return true if the given dotted path failed to resolve at least once.
    pub fn is_missing(&self, path: &str) -> bool {
        self.missing.iter().any(|missing| missing.path == path)
    }
}

/// A path that did not resolve to a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Missing {
    /// The dotted path as written in the template, such as `order.total`.
    pub path: String,
    /// Location of the path within the template source.
    pub region: Region,
}

impl Missing {
    /// Create an [`Error`] that points at this path within the given
    /// [`Template`], suitable for printing as a warning.
    pub fn to_error(&self, template: &Template) -> Error {
        let error = Error::build(MISSING_VALUE)
            .with_pointer(template.source, self.region)
            .with_help(format!("`{}` did not resolve to a value", self.path));

        match template.name {
            Some(name) => error.with_name(name),
            None => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Missing, Report};
    use crate::{compile, log::MISSING_VALUE, region::Region};

    #[test]
    fn test_report_queries() {
        let report = Report {
            output: String::from("Total: "),
            missing: vec![Missing {
                path: String::from("order.total"),
                region: Region::new(10..21),
            }],
        };

        assert!(!report.is_complete());
        assert!(report.is_missing("order.total"));
        assert!(!report.is_missing("order"));
    }

    #[test]
    fn test_missing_to_error() {
        let template = compile("Total: {{ order.total }}").unwrap();
        let missing = Missing {
            path: String::from("order.total"),
            region: Region::new(10..21),
        };
        let error = missing.to_error(&template);

        assert_eq!(error.get_reason(), MISSING_VALUE);
        assert_eq!(error.get_help(), Some("`order.total` did not resolve to a value"));
        assert!(format!("{error:#}").contains("Total: {{ order.total }}"));
    }
}
