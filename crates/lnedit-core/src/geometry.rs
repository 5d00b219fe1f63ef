#![forbid(unsafe_code)]

//! Screen geometry.
//!
//! Coordinates are relative to the first row of the editing area (row 0 is
//! where the prompt, or a top status message, starts) and 0-indexed.

use std::fmt;

/// A cell coordinate on the editing area: `col` counts columns from the left
/// margin, `row` counts screen rows from the top of the editing area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    /// Column (0-indexed).
    pub col: usize,
    /// Row (0-indexed, relative to the editing area).
    pub row: usize,
}

impl Position {
    /// The top-left corner of the editing area.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a position from a column and a row.
    #[inline]
    #[must_use]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Signed `(dx, dy)` motion that takes `self` to `other`.
    #[inline]
    #[must_use]
    pub const fn delta_to(&self, other: Position) -> (isize, isize) {
        (
            other.col as isize - self.col as isize,
            other.row as isize - self.row as isize,
        )
    }
}

impl From<(usize, usize)> for Position {
    /// Converts a `(col, row)` pair.
    fn from((col, row): (usize, usize)) -> Self {
        Self::new(col, row)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_signed() {
        let a = Position::new(4, 2);
        let b = Position::new(1, 5);
        assert_eq!(a.delta_to(b), (-3, 3));
        assert_eq!(b.delta_to(a), (3, -3));
        assert_eq!(a.delta_to(a), (0, 0));
    }

    #[test]
    fn from_pair_is_col_row() {
        assert_eq!(Position::from((7, 1)), Position { col: 7, row: 1 });
        assert_eq!(Position::ORIGIN, Position::default());
    }

    #[test]
    fn display_matches_pair() {
        assert_eq!(Position::new(9, 0).to_string(), "(9, 0)");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn position() -> impl Strategy<Value = Position> {
        (0usize..10_000, 0usize..10_000).prop_map(Position::from)
    }

    proptest! {
        #[test]
        fn delta_lands_on_target(a in position(), b in position()) {
            let (dx, dy) = a.delta_to(b);
            prop_assert_eq!(a.col.checked_add_signed(dx), Some(b.col));
            prop_assert_eq!(a.row.checked_add_signed(dy), Some(b.row));
        }

        #[test]
        fn delta_is_antisymmetric(a in position(), b in position()) {
            let (dx, dy) = a.delta_to(b);
            prop_assert_eq!(b.delta_to(a), (-dx, -dy));
        }

        #[test]
        fn ordering_compares_col_then_row(a in position(), b in position()) {
            prop_assert_eq!(a.cmp(&b), (a.col, a.row).cmp(&(b.col, b.row)));
        }
    }
}
