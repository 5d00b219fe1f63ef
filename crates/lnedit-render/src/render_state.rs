#![forbid(unsafe_code)]

//! What the terminal shows after a repaint.
//!
//! A [`RenderState`] is the only memory the repaint engine has of the screen.
//! It records the painted rows, how each row continues into the next one
//! ([`Boundary`]), the width they were painted at, and where the cursor was
//! left.

use lnedit_core::Position;

/// How a painted row continues into the row below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// The terminal auto-wrapped: the row is exactly `width` wide and the next
    /// row was written straight after it. Copying text joins the two rows.
    Soft,
    /// An explicit newline, or the last row.
    Hard,
}

impl Boundary {
    /// Kind of the boundary after row `row` of `lines` painted at `width`.
    ///
    /// Soft iff the row is exactly `width` wide and the next row exists and is
    /// non-empty.
    #[must_use]
    pub fn after(lines: &[String], row: usize, width: usize) -> Self {
        let full = lines
            .get(row)
            .is_some_and(|line| line.chars().count() == width);
        let continued = lines.get(row + 1).is_some_and(|next| !next.is_empty());
        if full && continued {
            Self::Soft
        } else {
            Self::Hard
        }
    }

    /// Whether this is a soft boundary.
    #[inline]
    #[must_use]
    pub const fn is_soft(self) -> bool {
        matches!(self, Self::Soft)
    }
}

/// The screen as last painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    lines: Vec<String>,
    boundaries: Vec<Boundary>,
    width: usize,
    cursor: Position,
    stale: bool,
}

impl RenderState {
    pub(crate) fn new(lines: Vec<String>, width: usize, cursor: Position) -> Self {
        let boundaries = (0..lines.len())
            .map(|row| Boundary::after(&lines, row, width))
            .collect();
        Self {
            lines,
            boundaries,
            width,
            cursor,
            stale: false,
        }
    }

    /// Painted rows, including empty rows added to reach the cursor row.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of painted rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    /// Boundary after row `row` (rows past the end are [`Boundary::Hard`]).
    #[must_use]
    pub fn boundary(&self, row: usize) -> Boundary {
        self.boundaries.get(row).copied().unwrap_or(Boundary::Hard)
    }

    /// All boundaries, one per painted row.
    #[must_use]
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Terminal width the rows were painted at.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Where the cursor was parked, relative to the first painted row.
    #[must_use]
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Whether the next repaint must redraw everything.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Forget what the terminal shows. The next repaint returns to the origin
    /// row through the recorded cursor and redraws every row.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }
}
