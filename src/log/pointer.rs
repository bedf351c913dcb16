use super::{RESET, YELLOW};
use crate::region::Region;
use std::fmt::{self, Formatter};
use unicode_width::UnicodeWidthStr;

/// Marks a region of template source, printed beneath an [`Error`][`super::Error`].
#[derive(Debug, Clone, PartialEq)]
pub struct Pointer {
    /// Zero indexed line number.
    line: usize,
    /// Zero indexed display column where the region begins.
    column: usize,
    /// Display width of the marked text, never less than one.
    width: usize,
    /// The whole line containing the region.
    text: String,
}

impl Pointer {
    /// Locate the region within the source.
    ///
    /// A region past the end of the source points just after the last
    /// character, and a region spanning lines is cut at the first line end.
    pub fn new(source: &str, region: Region) -> Self {
        let begin = floor(source, region.begin);
        let start = source[..begin].rfind('\n').map_or(0, |newline| newline + 1);
        let stop = source[begin..]
            .find('\n')
            .map_or(source.len(), |newline| begin + newline);
        let marked = source.get(begin..region.end.min(stop)).unwrap_or_default();

        Self {
            line: source[..start].matches('\n').count(),
            column: source[start..begin].width(),
            width: marked.width().max(1),
            text: source[start..stop].trim_end_matches('\r').to_owned(),
        }
    }

    pub(super) fn write(
        &self,
        f: &mut Formatter<'_>,
        name: Option<&str>,
        help: Option<&str>,
    ) -> fmt::Result {
        let number = (self.line + 1).to_string();
        let gutter = " ".repeat(number.len());
        let indent = " ".repeat(self.column);
        let carets = "^".repeat(self.width);
        let name = name.unwrap_or("?");

        writeln!(f)?;
        writeln!(f, " {gutter}--> {name}:{number}:{}", self.column + 1)?;
        writeln!(f, " {gutter} |")?;
        writeln!(f, " {number} | {}", self.text)?;
        writeln!(f, " {gutter} | {indent}{YELLOW}{carets}{RESET}")?;
        writeln!(f, " {gutter} |")?;
        if let Some(help) = help {
            writeln!(f, " {gutter} = help: {help}")?;
        }

        Ok(())
    }
}

/// Clamp the offset into the source, stepping back to a char boundary.
fn floor(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }

    offset
}
