#![forbid(unsafe_code)]

//! The rows produced by one layout computation.

use std::fmt;
use std::ops::Index;

/// An ordered sequence of screen rows.
///
/// Each row is a string of printable characters, one column per character,
/// no longer than the width it was laid out for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Screen {
    lines: Vec<String>,
}

impl Screen {
    /// Create a screen from rows.
    #[must_use]
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Create a screen from anything yielding string-like rows.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(Into::into).collect())
    }

    /// All rows, top to bottom.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Row `row`, if present.
    #[must_use]
    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    /// Width of row `row` in columns (0 for missing rows).
    #[must_use]
    pub fn line_width(&self, row: usize) -> usize {
        self.line(row).map_or(0, |line| line.chars().count())
    }

    /// Width of the widest row.
    #[must_use]
    pub fn max_line_width(&self) -> usize {
        (0..self.len()).map(|row| self.line_width(row)).max().unwrap_or(0)
    }

    /// Character at `(col, row)`, if any.
    #[must_use]
    pub fn char_at(&self, col: usize, row: usize) -> Option<char> {
        self.line(row).and_then(|line| line.chars().nth(col))
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Append a row.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Consume the screen, returning its rows.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Index<usize> for Screen {
    type Output = str;

    fn index(&self, row: usize) -> &str {
        &self.lines[row]
    }
}

impl From<Vec<String>> for Screen {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}

impl<'a> FromIterator<&'a str> for Screen {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self::from_lines(iter)
    }
}

impl FromIterator<String> for Screen {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Screen {
    /// Rows joined by newlines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, line) in self.lines.iter().enumerate() {
            if row > 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}
