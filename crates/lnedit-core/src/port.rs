#![forbid(unsafe_code)]

//! The terminal capability port.
//!
//! The repaint engine never talks to a terminal directly. It drives a
//! [`CapabilityPort`], a small table of relative-motion and erase capabilities
//! plus the terminal geometry. `lnedit-render` ships two implementations: an
//! ANSI/VT writer for real terminals and an in-memory terminal model for tests.
//!
//! # Contract
//!
//! - All motions are relative to the cursor; the port never needs to know
//!   where the editing area starts.
//! - Writing a character into the last column leaves the cursor on that column
//!   with a wrap pending. The next printable character lands on column 0 of the
//!   following row (a soft wrap); any motion, erase, or `hard_newline` cancels
//!   the pending wrap first.
//! - Methods are synchronous. A failure is fatal for the editing session and
//!   is propagated, never retried.

use std::io;

/// Terminal operations consumed by the repaint engine.
pub trait CapabilityPort {
    /// Terminal width in columns.
    fn width(&self) -> usize;

    /// Terminal height in rows.
    fn height(&self) -> usize;

    /// Write printable text at the cursor. The text never contains control
    /// characters and never extends past the last column.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Move the cursor `dx` columns right (negative: left) and `dy` rows down
    /// (negative: up). Never scrolls.
    fn move_cursor_relative(&mut self, dx: isize, dy: isize) -> io::Result<()>;

    /// Move the cursor to column `col` of the current row.
    fn move_cursor_to_column(&mut self, col: usize) -> io::Result<()>;

    /// Erase from the cursor to the end of the current row, including the
    /// row's soft-wrap continuation.
    fn clear_to_end_of_line(&mut self) -> io::Result<()>;

    /// Erase from the start of the row `rows_below` rows under the cursor to
    /// the end of the display. The cursor does not move.
    fn clear_rows_from(&mut self, rows_below: usize) -> io::Result<()>;

    /// Move to column 0 of the next row, scrolling if the cursor is on the
    /// bottom row. Never marks the row as soft-wrapped.
    fn hard_newline(&mut self) -> io::Result<()>;

    /// Called before a repaint cycle that rewrites or clears rows.
    fn begin_update(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Called after the cursor has been parked at the end of such a cycle.
    fn end_update(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Push buffered output to the terminal.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<P: CapabilityPort + ?Sized> CapabilityPort for &mut P {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        (**self).write(text)
    }

    fn move_cursor_relative(&mut self, dx: isize, dy: isize) -> io::Result<()> {
        (**self).move_cursor_relative(dx, dy)
    }

    fn move_cursor_to_column(&mut self, col: usize) -> io::Result<()> {
        (**self).move_cursor_to_column(col)
    }

    fn clear_to_end_of_line(&mut self) -> io::Result<()> {
        (**self).clear_to_end_of_line()
    }

    fn clear_rows_from(&mut self, rows_below: usize) -> io::Result<()> {
        (**self).clear_rows_from(rows_below)
    }

    fn hard_newline(&mut self) -> io::Result<()> {
        (**self).hard_newline()
    }

    fn begin_update(&mut self) -> io::Result<()> {
        (**self).begin_update()
    }

    fn end_update(&mut self) -> io::Result<()> {
        (**self).end_update()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
