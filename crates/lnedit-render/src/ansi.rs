#![forbid(unsafe_code)]

//! ANSI escape sequence generation helpers.
//!
//! Pure byte-generation functions for the ANSI/VT control sequences the
//! [`AnsiTerminal`](crate::ansi_terminal::AnsiTerminal) port emits. No state
//! is tracked here; cursor bookkeeping lives in the repaint engine.
//!
//! Every motion is relative. The editor shares the screen with whatever the
//! shell printed before it, so absolute positioning (CUP) is never used.
//!
//! # Sequence Reference
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | CSI | `ESC [ n A/B/C/D` | CUU/CUD/CUF/CUB (relative motion) |
//! | CSI | `ESC [ col G` | CHA (Cursor Horizontal Absolute, 1-indexed) |
//! | CSI | `ESC [ K` | EL 0 (erase to end of line) |
//! | CSI | `ESC [ J` | ED 0 (erase to end of display) |
//! | CSI | `ESC [ ? 25 h/l` | Cursor show/hide (DECTCEM) |
//! | CSI | `ESC [ ? 2026 h/l` | Synchronized Output (DEC) |
//! | DEC | `ESC 7` / `ESC 8` | Cursor save/restore (DECSC/DECRC) |
//! | C0 | `CR` / `CR LF` | Carriage return / hard newline |

use std::io::{self, Write};

// =============================================================================
// Cursor Motion
// =============================================================================

/// CHA (Cursor Horizontal Absolute): `CSI col G` (1-indexed)
///
/// Moves the cursor to column `col` (0-indexed input) of the current row.
pub fn cha<W: Write>(w: &mut W, col: usize) -> io::Result<()> {
    write!(w, "\x1b[{}G", col.saturating_add(1))
}

/// Move cursor up: `CSI n A`
pub fn cuu<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    if n == 1 {
        w.write_all(b"\x1b[A")
    } else {
        write!(w, "\x1b[{n}A")
    }
}

/// Move cursor down: `CSI n B`
///
/// Stops at the bottom margin; never scrolls.
pub fn cud<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    if n == 1 {
        w.write_all(b"\x1b[B")
    } else {
        write!(w, "\x1b[{n}B")
    }
}

/// Move cursor forward (right): `CSI n C`
pub fn cuf<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    if n == 1 {
        w.write_all(b"\x1b[C")
    } else {
        write!(w, "\x1b[{n}C")
    }
}

/// Move cursor back (left): `CSI n D`
pub fn cub<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    if n == 1 {
        w.write_all(b"\x1b[D")
    } else {
        write!(w, "\x1b[{n}D")
    }
}

/// Signed relative motion: `dx` columns right, `dy` rows down.
///
/// Vertical motion is emitted first. Emits nothing for `(0, 0)`.
pub fn move_relative<W: Write>(w: &mut W, dx: isize, dy: isize) -> io::Result<()> {
    if dy < 0 {
        cuu(w, dy.unsigned_abs())?;
    } else {
        cud(w, dy.unsigned_abs())?;
    }
    if dx < 0 {
        cub(w, dx.unsigned_abs())
    } else {
        cuf(w, dx.unsigned_abs())
    }
}

/// Move cursor to start of line: `\r` (CR)
#[inline]
pub fn cr<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\r")
}

/// Hard newline: `\r\n`
///
/// Column 0 of the next row, scrolling at the bottom margin. Unlike an
/// auto-wrap, the terminal does not mark the row as continued.
#[inline]
pub fn crlf<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\r\n")
}

/// DEC cursor save: `ESC 7` (DECSC)
pub const CURSOR_SAVE: &[u8] = b"\x1b7";

/// DEC cursor restore: `ESC 8` (DECRC)
pub const CURSOR_RESTORE: &[u8] = b"\x1b8";

/// Write cursor save (DECSC).
#[inline]
pub fn cursor_save<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_SAVE)
}

/// Write cursor restore (DECRC).
#[inline]
pub fn cursor_restore<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_RESTORE)
}

/// Hide cursor: `CSI ? 25 l`
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";

/// Show cursor: `CSI ? 25 h`
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

/// Write hide cursor.
#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_HIDE)
}

/// Write show cursor.
#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

// =============================================================================
// Erase Operations
// =============================================================================

/// EL 0 (Erase Line): `CSI K`
///
/// Erases from the cursor to the end of the row. Terminals also drop the
/// row's soft-wrap mark.
#[inline]
pub fn erase_to_end_of_line<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// ED 0 (Erase Display): `CSI J`
#[inline]
pub fn erase_to_end_of_display<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[J")
}

/// Erase from the start of the row `rows_below` rows under the cursor to the
/// end of the display, leaving the cursor where it was.
///
/// Emits `DECSC`, `CUD n`, `CR`, `ED 0`, `DECRC`.
pub fn erase_rows_below<W: Write>(w: &mut W, rows_below: usize) -> io::Result<()> {
    cursor_save(w)?;
    cud(w, rows_below)?;
    cr(w)?;
    erase_to_end_of_display(w)?;
    cursor_restore(w)
}

// =============================================================================
// Synchronized Output (DEC 2026)
// =============================================================================

/// Begin synchronized output: `CSI ? 2026 h`
pub const SYNC_BEGIN: &[u8] = b"\x1b[?2026h";

/// End synchronized output: `CSI ? 2026 l`
pub const SYNC_END: &[u8] = b"\x1b[?2026l";

/// Write synchronized output begin.
#[inline]
pub fn sync_begin<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SYNC_BEGIN)
}

/// Write synchronized output end.
#[inline]
pub fn sync_end<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SYNC_END)
}

// =============================================================================
// Tests
// =============================================================================
