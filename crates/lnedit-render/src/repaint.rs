#![forbid(unsafe_code)]

//! Incremental repaint with soft/hard wrap tracking.
//!
//! [`repaint`] turns the terminal from the previously painted [`RenderState`]
//! into a new [`Screen`] with as few [`CapabilityPort`] calls as it can, and
//! leaves the cursor on the requested cell.
//!
//! # Algorithm
//!
//! 1. **Validate** every row against the port width and the cursor target,
//!    before any output.
//! 2. **Full redraw** when there is no previous state, when it was
//!    invalidated, or when it was painted at another width: return to the
//!    origin row, go to column 0, clear every row from there, paint all rows.
//! 3. **Diff** otherwise: find the first row `i` that differs and rewrite rows
//!    `i..` completely. A row that got shorter has its tail erased. Rows past
//!    the new end are erased with a single `clear_rows_from`.
//! 4. **Park** the cursor on the target cell with relative motions.
//!
//! # Soft and hard boundaries
//!
//! The boundary after row `r` is soft iff row `r` is exactly `width` wide and
//! row `r + 1` is non-empty. A soft boundary is produced by writing row
//! `r + 1` straight after the full row, so the terminal wraps by itself and
//! copies the two rows as one line. A hard boundary is an explicit
//! `hard_newline`. The terminal's wrap mark on a row is dropped only by
//! erasing that row to its end, so a row losing its soft boundary is always
//! erased before its last cell is written again.
//!
//! # Pending wrap
//!
//! After a full row is written the cursor stays on the last column with a
//! wrap pending: the next character lands on the following row, while any
//! motion cancels the wrap. The painter tracks this state and resolves it
//! explicitly before relative motions that start from the last column.
//!
//! # Invariants
//!
//! 1. After `repaint` the rows `0..current.len()` show `current` exactly, the
//!    rows below are blank, and the cursor sits on `cursor_target`.
//! 2. The returned state records the boundary kind of every row as the
//!    terminal has it.
//! 3. Repainting an unchanged screen emits at most cursor motions.

use std::fmt;
use std::io;

use lnedit_core::{CapabilityPort, Position};
use lnedit_layout::Screen;

use crate::render_state::{Boundary, RenderState};

/// Errors raised by [`repaint`].
#[derive(Debug)]
pub enum RepaintError {
    /// The capability port failed. The terminal is in an unknown state.
    Io(io::Error),
    /// A row is wider than the terminal.
    LineTooWide {
        /// Offending row.
        row: usize,
        /// Its width in columns.
        len: usize,
        /// Terminal width.
        width: usize,
    },
    /// The cursor target column is outside the terminal.
    CursorOutOfBounds {
        /// Requested cursor position.
        position: Position,
        /// Terminal width.
        width: usize,
    },
}

impl fmt::Display for RepaintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "terminal I/O failed: {e}"),
            Self::LineTooWide { row, len, width } => {
                write!(f, "row {row} is {len} columns wide on a {width}-column terminal")
            }
            Self::CursorOutOfBounds { position, width } => {
                write!(f, "cursor target {position} is outside a {width}-column terminal")
            }
        }
    }
}

impl std::error::Error for RepaintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RepaintError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Tracks where the terminal cursor physically is while painting.
///
/// Positions are relative to the first painted row. While `pending` is set
/// the cursor is on column `width - 1` of `row` with a wrap pending.
#[derive(Debug, Clone, Copy)]
struct Painter {
    col: usize,
    row: usize,
    pending: bool,
    width: usize,
}

impl Painter {
    const fn at(pos: Position, width: usize) -> Self {
        Self {
            col: pos.col,
            row: pos.row,
            pending: false,
            width,
        }
    }

    const fn position(&self) -> Position {
        Position::new(self.col, self.row)
    }

    /// Move to `target`, resolving a pending wrap.
    fn move_to<P: CapabilityPort + ?Sized>(
        &mut self,
        target: Position,
        port: &mut P,
    ) -> io::Result<()> {
        if target == self.position() && !self.pending {
            return Ok(());
        }
        let (dx, dy) = self.position().delta_to(target);
        if target.col == 0 && (self.col != 0 || self.pending) {
            port.move_cursor_to_column(0)?;
            if dy != 0 {
                port.move_cursor_relative(0, dy)?;
            }
        } else if dx != 0 || dy != 0 {
            port.move_cursor_relative(dx, dy)?;
        } else {
            port.move_cursor_to_column(target.col)?;
        }
        self.col = target.col;
        self.row = target.row;
        self.pending = false;
        Ok(())
    }

    /// Cancel a pending wrap without moving.
    fn settle<P: CapabilityPort + ?Sized>(&mut self, port: &mut P) -> io::Result<()> {
        if self.pending {
            port.move_cursor_to_column(self.col)?;
            self.pending = false;
        }
        Ok(())
    }

    /// Write `text`, following the terminal's auto-wrap.
    fn put<P: CapabilityPort + ?Sized>(&mut self, text: &str, port: &mut P) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        port.write(text)?;
        for _ in text.chars() {
            if self.pending {
                self.pending = false;
                self.row += 1;
                self.col = 0;
            }
            if self.col + 1 == self.width {
                self.pending = true;
            } else {
                self.col += 1;
            }
        }
        Ok(())
    }

    fn hard_newline<P: CapabilityPort + ?Sized>(&mut self, port: &mut P) -> io::Result<()> {
        port.hard_newline()?;
        self.col = 0;
        self.row += 1;
        self.pending = false;
        Ok(())
    }
}

fn char_count(line: &str) -> usize {
    line.chars().count()
}

fn validate(current: &Screen, cursor_target: Position, width: usize) -> Result<(), RepaintError> {
    for (row, line) in current.iter().enumerate() {
        let len = char_count(line);
        if len > width {
            return Err(RepaintError::LineTooWide { row, len, width });
        }
    }
    if cursor_target.col >= width {
        return Err(RepaintError::CursorOutOfBounds {
            position: cursor_target,
            width,
        });
    }
    Ok(())
}

/// Paint `current` over `previous` and park the cursor on `cursor_target`.
///
/// `previous` is the state returned by the last call for this terminal, or
/// `None` when nothing has been painted yet (the cursor is then assumed to be
/// on the row where painting starts). If `cursor_target.row` is past the last
/// row, empty rows are added so the cursor row exists on screen.
///
/// Cycles that rewrite or clear rows are bracketed by
/// [`CapabilityPort::begin_update`] and [`CapabilityPort::end_update`]; the
/// port is flushed at the end of every call.
///
/// # Errors
///
/// - [`RepaintError::LineTooWide`] / [`RepaintError::CursorOutOfBounds`] for
///   contract violations, detected before any output.
/// - [`RepaintError::Io`] when the port fails. The terminal state is then
///   unknown and the next repaint should be a full redraw.
pub fn repaint<P: CapabilityPort + ?Sized>(
    previous: Option<&RenderState>,
    current: &Screen,
    cursor_target: Position,
    port: &mut P,
) -> Result<RenderState, RepaintError> {
    let width = port.width();
    validate(current, cursor_target, width)?;

    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "repaint",
        rows = current.len(),
        width,
        cursor_col = cursor_target.col,
        cursor_row = cursor_target.row
    );
    #[cfg(feature = "tracing")]
    let _guard = _span.enter();

    let mut lines = current.lines().to_vec();
    if lines.len() <= cursor_target.row {
        lines.resize(cursor_target.row + 1, String::new());
    }
    if lines.len() > port.height() {
        lnedit_core::warn!(
            rows = lines.len(),
            height = port.height(),
            "screen taller than the terminal"
        );
    }
    let next = RenderState::new(lines, width, cursor_target);

    let reusable = previous.filter(|prev| !prev.is_stale() && prev.width() == width);
    let mut began = false;

    let mut painter = match (previous, reusable) {
        (_, Some(prev)) => {
            let mut painter = Painter::at(prev.cursor(), width);
            let old = prev.lines();
            let new = next.lines();
            let common = old.len().min(new.len());
            let first = (0..common).find(|&r| old[r] != new[r]).unwrap_or(common);
            if first < new.len() || old.len() > new.len() {
                lnedit_core::debug!(first_diff = first, "incremental repaint");
                port.begin_update()?;
                began = true;
                paint_rows(first, old, &next, &mut painter, port)?;
                clear_surplus(old.len(), new.len(), &mut painter, port)?;
            }
            painter
        }
        (prev, None) => {
            #[cfg(feature = "tracing")]
            {
                let reason = match prev {
                    None => "initial",
                    Some(prev) if prev.is_stale() => "invalidated",
                    Some(_) => "width changed",
                };
                tracing::debug!(reason, "full redraw");
            }
            port.begin_update()?;
            began = true;
            if let Some(prev) = prev {
                let (_, dy) = prev.cursor().delta_to(Position::ORIGIN);
                if dy != 0 {
                    port.move_cursor_relative(0, dy)?;
                }
            }
            port.move_cursor_to_column(0)?;
            port.clear_rows_from(0)?;
            let mut painter = Painter::at(Position::ORIGIN, width);
            paint_rows(0, &[], &next, &mut painter, port)?;
            painter
        }
    };

    painter.move_to(cursor_target, port)?;
    if began {
        port.end_update()?;
    }
    port.flush()?;
    Ok(next)
}

/// Rewrite rows `first..` of `next` over `old`.
fn paint_rows<P: CapabilityPort + ?Sized>(
    first: usize,
    old: &[String],
    next: &RenderState,
    painter: &mut Painter,
    port: &mut P,
) -> io::Result<()> {
    let width = painter.width;
    let new = next.lines();
    let old_soft = |row: usize| Boundary::after(old, row, width).is_soft();
    let old_width = |row: usize| old.get(row).map_or(0, |line| char_count(line));

    // Whether the cursor sits at the end of row `first - 1`, so that row
    // `first` follows through a newline or a wrap instead of a motion.
    let mut resumed = false;
    if first == 0 {
        painter.move_to(Position::ORIGIN, port)?;
    } else if first <= new.len() {
        let above = first - 1;
        let was_soft = old_soft(above);
        let is_soft = next.boundary(above).is_soft();
        if was_soft != is_soft {
            // The row above is full and unchanged, but the terminal's wrap
            // mark on it must follow the new boundary kind.
            if let Some(last) = new[above].chars().last() {
                painter.move_to(Position::new(width - 1, above), port)?;
                if was_soft {
                    port.clear_to_end_of_line()?;
                }
                let mut buf = [0u8; 4];
                painter.put(last.encode_utf8(&mut buf), port)?;
                resumed = true;
            }
        } else if first < new.len() {
            if first < old.len() {
                painter.move_to(Position::new(0, first), port)?;
            } else {
                let end = char_count(&new[above]).min(width - 1);
                painter.move_to(Position::new(end, above), port)?;
                resumed = true;
            }
        }
    }

    for (row, line) in new.iter().enumerate().skip(first) {
        if (resumed || row > first) && !(painter.pending && !line.is_empty()) {
            painter.hard_newline(port)?;
        }
        let len = char_count(line);
        if len == width && old_soft(row) && !next.boundary(row).is_soft() {
            // Full row losing its soft boundary: erase under the last cell
            // so the terminal drops the row's wrap mark.
            let split = line
                .char_indices()
                .nth(width - 1)
                .map_or(line.len(), |(idx, _)| idx);
            let (head, last) = line.split_at(split);
            if head.is_empty() {
                // One-column row: wrap onto it first so the EL lands here
                // and not on the row above.
                painter.put(line, port)?;
                painter.settle(port)?;
            } else {
                painter.put(head, port)?;
            }
            port.clear_to_end_of_line()?;
            painter.put(last, port)?;
        } else {
            painter.put(line, port)?;
            if len < width && old_width(row) > len {
                port.clear_to_end_of_line()?;
            }
        }
    }
    Ok(())
}

/// Erase the rows an earlier, taller screen left below the new last row.
fn clear_surplus<P: CapabilityPort + ?Sized>(
    old_rows: usize,
    new_rows: usize,
    painter: &mut Painter,
    port: &mut P,
) -> io::Result<()> {
    if old_rows <= new_rows {
        return Ok(());
    }
    lnedit_core::debug!(surplus = old_rows - new_rows, "clearing surplus rows");
    if painter.row >= new_rows {
        painter.move_to(Position::new(0, new_rows), port)?;
    } else {
        painter.settle(port)?;
    }
    port.clear_rows_from(new_rows - painter.row)
}

/// Move below the rows recorded in `state` and start a fresh row there.
pub(crate) fn leave_screen<P: CapabilityPort + ?Sized>(
    state: &RenderState,
    port: &mut P,
) -> io::Result<()> {
    let mut painter = Painter::at(state.cursor(), state.width());
    let last = state.rows().saturating_sub(1);
    painter.move_to(Position::new(0, last), port)?;
    painter.hard_newline(port)?;
    port.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal_model::{PortOp, TerminalModel};

    fn screen(rows: &[&str]) -> Screen {
        Screen::from_lines(rows.iter().copied())
    }

    fn paint(
        model: &mut TerminalModel,
        previous: Option<&RenderState>,
        rows: &[&str],
        cursor: (usize, usize),
    ) -> RenderState {
        repaint(previous, &screen(rows), Position::from(cursor), model).unwrap()
    }

    #[test]
    fn first_paint_clears_then_writes() {
        let mut model = TerminalModel::new(10, 10);
        let state = paint(&mut model, None, &["foo$01234\\", "567890123\\", "456789"], (6, 2));
        assert_eq!(model.visible_lines(), ["foo$01234\\", "567890123\\", "456789"]);
        assert_eq!(model.cursor(), Position::new(6, 2));
        assert_eq!(state.cursor(), Position::new(6, 2));
        assert_eq!(
            &model.ops()[..3],
            [
                PortOp::BeginUpdate,
                PortOp::MoveToColumn(0),
                PortOp::ClearRowsFrom(0)
            ]
        );
        assert_eq!(model.ops().last(), Some(&PortOp::EndUpdate));
        assert!(model.updates_balanced());
    }

    #[test]
    fn unchanged_screen_emits_nothing() {
        let mut model = TerminalModel::new(10, 10);
        let rows = ["foo$01234\\", "567890123\\", "456789"];
        let state = paint(&mut model, None, &rows, (6, 2));
        model.take_ops();
        paint(&mut model, Some(&state), &rows, (6, 2));
        assert!(model.ops().is_empty());
    }

    #[test]
    fn unchanged_screen_only_moves_cursor() {
        let mut model = TerminalModel::new(10, 10);
        let rows = ["foo$01234\\", "567890123\\", "456789"];
        let state = paint(&mut model, None, &rows, (6, 2));
        model.take_ops();
        paint(&mut model, Some(&state), &rows, (0, 0));
        assert!(model.ops().iter().all(PortOp::is_motion));
        assert_eq!(
            model.ops(),
            [
                PortOp::MoveToColumn(0),
                PortOp::MoveRelative { dx: 0, dy: -2 }
            ]
        );
        assert_eq!(model.cursor(), Position::ORIGIN);
    }

    #[test]
    fn rewrite_starts_at_first_changed_row() {
        let mut model = TerminalModel::new(10, 10);
        let state = paint(&mut model, None, &["abc", "def"], (3, 1));
        model.take_ops();
        paint(&mut model, Some(&state), &["abc", "dXf"], (2, 1));
        assert_eq!(
            model.ops(),
            [
                PortOp::BeginUpdate,
                PortOp::MoveToColumn(0),
                PortOp::Write("dXf".to_string()),
                PortOp::MoveRelative { dx: -1, dy: 0 },
                PortOp::EndUpdate,
            ]
        );
        assert_eq!(model.visible_lines(), ["abc", "dXf"]);
    }

    #[test]
    fn shorter_row_has_tail_erased() {
        let mut model = TerminalModel::new(10, 10);
        let state = paint(&mut model, None, &["abcdef"], (6, 0));
        model.take_ops();
        paint(&mut model, Some(&state), &["abc"], (3, 0));
        assert!(model.ops().contains(&PortOp::ClearToEndOfLine));
        assert_eq!(model.visible_lines(), ["abc"]);
        assert_eq!(model.cursor(), Position::new(3, 0));
    }

    #[test]
    fn surplus_rows_are_cleared_once() {
        let mut model = TerminalModel::new(10, 10);
        let state = paint(&mut model, None, &["abc", "def", "ghi"], (3, 2));
        model.take_ops();
        paint(&mut model, Some(&state), &["abc"], (3, 0));
        assert_eq!(
            model.ops(),
            [
                PortOp::BeginUpdate,
                PortOp::MoveToColumn(0),
                PortOp::MoveRelative { dx: 0, dy: -1 },
                PortOp::ClearRowsFrom(0),
                PortOp::MoveRelative { dx: 3, dy: -1 },
                PortOp::EndUpdate,
            ]
        );
        assert_eq!(model.visible_lines(), ["abc"]);
    }

    #[test]
    fn cursor_row_past_screen_is_padded() {
        let mut model = TerminalModel::new(10, 10);
        let state = paint(&mut model, None, &["0123456789"], (0, 1));
        assert_eq!(state.lines(), ["0123456789", ""]);
        assert_eq!(state.boundary(0), Boundary::Hard);
        assert_eq!(model.cursor(), Position::new(0, 1));
        assert!(!model.is_soft_wrapped(0));
    }

    #[test]
    fn soft_boundary_lost_when_next_row_empties() {
        let mut model = TerminalModel::new(10, 10);
        let state = paint(&mut model, None, &["0123456789", "a"], (1, 1));
        assert!(model.is_soft_wrapped(0));
        let state = paint(&mut model, Some(&state), &["0123456789", ""], (0, 1));
        assert!(!model.is_soft_wrapped(0));
        assert_eq!(state.boundary(0), Boundary::Hard);
        assert_eq!(model.visible_lines(), ["0123456789"]);
        assert_eq!(model.cursor(), Position::new(0, 1));
    }

    #[test]
    fn invalidated_state_redraws_from_origin() {
        let mut model = TerminalModel::new(10, 10);
        let mut state = paint(&mut model, None, &["abc", "def"], (3, 1));
        state.invalidate();
        model.take_ops();
        paint(&mut model, Some(&state), &["abc", "def"], (3, 1));
        assert_eq!(
            &model.ops()[..4],
            [
                PortOp::BeginUpdate,
                PortOp::MoveRelative { dx: 0, dy: -1 },
                PortOp::MoveToColumn(0),
                PortOp::ClearRowsFrom(0),
            ]
        );
        assert_eq!(model.visible_lines(), ["abc", "def"]);
        assert_eq!(model.cursor(), Position::new(3, 1));
    }

    #[test]
    fn width_change_forces_full_redraw() {
        let mut model = TerminalModel::new(10, 10);
        let state = paint(&mut model, None, &["abcdefghij", "k"], (1, 1));
        model.resize(5, 10);
        model.take_ops();
        let state = paint(&mut model, Some(&state), &["abcde", "fghij", "k"], (1, 2));
        assert!(model.ops().contains(&PortOp::ClearRowsFrom(0)));
        assert_eq!(model.visible_lines(), ["abcde", "fghij", "k"]);
        assert_eq!(state.width(), 5);
    }

    #[test]
    fn too_wide_row_is_rejected_before_output() {
        let mut model = TerminalModel::new(4, 4);
        let err = repaint(None, &screen(&["abcde"]), Position::ORIGIN, &mut model).unwrap_err();
        assert!(matches!(
            err,
            RepaintError::LineTooWide {
                row: 0,
                len: 5,
                width: 4
            }
        ));
        assert!(model.ops().is_empty());
        assert_eq!(err.to_string(), "row 0 is 5 columns wide on a 4-column terminal");
    }

    #[test]
    fn cursor_outside_width_is_rejected() {
        let mut model = TerminalModel::new(4, 4);
        let err = repaint(None, &screen(&["ab"]), Position::new(4, 0), &mut model).unwrap_err();
        assert!(matches!(err, RepaintError::CursorOutOfBounds { width: 4, .. }));
        assert!(model.ops().is_empty());
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn io_errors_convert_and_keep_source() {
        let err = RepaintError::from(io::Error::other("gone"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "terminal I/O failed: gone");
    }

    #[test]
    fn width_one_terminal() {
        let mut model = TerminalModel::new(1, 10);
        let state = paint(&mut model, None, &["a", "b", "c"], (0, 2));
        assert_eq!(model.visible_lines(), ["a", "b", "c"]);
        assert!(model.is_soft_wrapped(0) && model.is_soft_wrapped(1));
        paint(&mut model, Some(&state), &["a", "", "c"], (0, 2));
        assert_eq!(model.visible_lines(), ["a", "", "c"]);
        assert!(!model.is_soft_wrapped(0));
    }

    #[test]
    fn width_one_row_losing_soft_boundary_stays_on_its_row() {
        let mut model = TerminalModel::new(1, 10);
        let state = paint(&mut model, None, &["", "", "", "a", "a"], (0, 4));
        assert!(model.is_soft_wrapped(3));
        let state = paint(&mut model, Some(&state), &["", "", "a", "a"], (0, 3));
        assert_eq!(model.visible_lines(), ["", "", "a", "a"]);
        assert!(model.is_soft_wrapped(2));
        assert!(!model.is_soft_wrapped(3));
        assert_eq!(state.boundaries()[2..], [Boundary::Soft, Boundary::Hard]);
        assert_eq!(model.cursor(), Position::new(0, 3));
    }

    #[test]
    fn leave_screen_moves_below_last_row() {
        let mut model = TerminalModel::new(10, 10);
        let state = paint(&mut model, None, &["abc", "def", "ghi"], (1, 0));
        leave_screen(&state, &mut model).unwrap();
        assert_eq!(model.cursor(), Position::new(0, 3));
    }
}
