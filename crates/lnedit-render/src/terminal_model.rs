#![forbid(unsafe_code)]

//! Terminal model for repaint validation.
//!
//! A minimal terminal emulator that understands the subset of ANSI sequences
//! the repaint engine produces, enabling deterministic testing without real
//! terminal I/O. The model can be driven two ways:
//!
//! - as a [`CapabilityPort`] (each call is recorded in [`TerminalModel::ops`]
//!   and applied to the grid), or
//! - with raw bytes through [`TerminalModel::process`], to check what the
//!   [`AnsiTerminal`](crate::ansi_terminal::AnsiTerminal) port writes.
//!
//! # Scope
//!
//! This is NOT a full VT emulator. It supports only:
//! - Printable text with deferred auto-wrap ("pending wrap")
//! - Relative cursor motion (CUU/CUD/CUF/CUB), CHA, CR, LF, BS
//! - Erase operations (EL, ED)
//! - DECSC/DECRC cursor save and restore
//! - Cursor visibility and DEC 2026 synchronized output (tracked, visual
//!   effects ignored)
//!
//! # Wrap model
//!
//! Writing into the last column leaves the cursor there with a wrap pending.
//! The next printable character moves to column 0 of the following row
//! (scrolling at the bottom) and marks the row it left as soft-wrapped. Any
//! motion, erase, CR, or LF cancels a pending wrap. A row loses its soft-wrap
//! mark when it is erased to its end. [`TerminalModel::text`] joins
//! soft-wrapped rows without a newline, the way terminals copy text.
//!
//! # Usage
//!
//! ```
//! use lnedit_render::terminal_model::TerminalModel;
//!
//! let mut model = TerminalModel::new(10, 3);
//! model.process(b"0123456789ab");
//! assert!(model.is_soft_wrapped(0));
//! assert_eq!(model.text(), "0123456789ab\n\n");
//! ```

use std::io;

use lnedit_core::{CapabilityPort, Position};

/// One capability call received by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortOp {
    /// `write(text)`
    Write(String),
    /// `move_cursor_relative(dx, dy)`
    MoveRelative {
        /// Columns to the right.
        dx: isize,
        /// Rows down.
        dy: isize,
    },
    /// `move_cursor_to_column(col)`
    MoveToColumn(usize),
    /// `clear_to_end_of_line()`
    ClearToEndOfLine,
    /// `clear_rows_from(rows_below)`
    ClearRowsFrom(usize),
    /// `hard_newline()`
    HardNewline,
    /// `begin_update()`
    BeginUpdate,
    /// `end_update()`
    EndUpdate,
}

impl PortOp {
    /// Whether this operation only moves the cursor.
    #[must_use]
    pub const fn is_motion(&self) -> bool {
        matches!(self, Self::MoveRelative { .. } | Self::MoveToColumn(_))
    }
}

/// Mode flags tracked by the terminal model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeFlags {
    /// Cursor visibility.
    pub cursor_visible: bool,
    /// DEC 2026 synchronized output nesting level.
    pub sync_output_level: u32,
    /// `begin_update` calls not yet matched by `end_update`.
    pub update_depth: u32,
}

impl ModeFlags {
    /// Flags of a freshly opened terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor_visible: true,
            sync_output_level: 0,
            update_depth: 0,
        }
    }
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Parser state for ANSI escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Ground,
    Escape,
    CsiEntry,
    CsiParam,
    Utf8,
}

/// Saved cursor for DECSC/DECRC.
#[derive(Debug, Clone, Copy)]
struct SavedCursor {
    x: usize,
    y: usize,
    pending_wrap: bool,
}

/// A minimal terminal model for testing repaint output.
#[derive(Debug, Clone)]
pub struct TerminalModel {
    width: usize,
    height: usize,
    cells: Vec<char>,
    /// `soft[y]`: row `y` auto-wrapped into row `y + 1`.
    soft: Vec<bool>,
    cursor_x: usize,
    cursor_y: usize,
    pending_wrap: bool,
    saved: Option<SavedCursor>,
    modes: ModeFlags,
    /// Capability calls received through the port interface.
    ops: Vec<PortOp>,
    /// Rows scrolled off the top.
    scrolled: usize,
    /// Parser state.
    parse_state: ParseState,
    /// CSI parameter buffer.
    csi_params: Vec<u32>,
    /// CSI intermediate accumulator.
    csi_intermediate: Vec<u8>,
    /// Partial UTF-8 sequence.
    utf8: Vec<u8>,
    utf8_len: usize,
}

impl TerminalModel {
    /// Create a blank terminal. Zero dimensions are raised to one.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![' '; width * height],
            soft: vec![false; height],
            cursor_x: 0,
            cursor_y: 0,
            pending_wrap: false,
            saved: None,
            modes: ModeFlags::new(),
            ops: Vec::new(),
            scrolled: 0,
            parse_state: ParseState::Ground,
            csi_params: Vec::with_capacity(16),
            csi_intermediate: Vec::with_capacity(4),
            utf8: Vec::with_capacity(4),
            utf8_len: 0,
        }
    }

    /// Get the terminal width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the terminal height.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the cursor position.
    #[must_use]
    pub fn cursor(&self) -> Position {
        Position::new(self.cursor_x, self.cursor_y)
    }

    /// Whether a wrap is pending (the last column was just written).
    #[must_use]
    pub fn pending_wrap(&self) -> bool {
        self.pending_wrap
    }

    /// Place the cursor, as if the shell had printed output before the editor
    /// started. Clamped to the grid.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor_x = pos.col.min(self.width - 1);
        self.cursor_y = pos.row.min(self.height - 1);
        self.pending_wrap = false;
    }

    /// Get the current mode flags.
    #[must_use]
    pub fn modes(&self) -> ModeFlags {
        self.modes
    }

    /// Check if synchronized output and update brackets are balanced.
    #[must_use]
    pub fn updates_balanced(&self) -> bool {
        self.modes.sync_output_level == 0 && self.modes.update_depth == 0
    }

    /// Capability calls received so far.
    #[must_use]
    pub fn ops(&self) -> &[PortOp] {
        &self.ops
    }

    /// Return and forget the recorded capability calls.
    pub fn take_ops(&mut self) -> Vec<PortOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of rows scrolled off the top so far.
    #[must_use]
    pub fn scrolled_rows(&self) -> usize {
        self.scrolled
    }

    /// Get the character at `(x, y)`. Returns None if out of bounds.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Get a row of cells.
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[char]> {
        if y < self.height {
            let start = y * self.width;
            Some(&self.cells[start..start + self.width])
        } else {
            None
        }
    }

    /// Extract the text content of a row as a string (trimmed of trailing spaces).
    #[must_use]
    pub fn row_text(&self, y: usize) -> Option<String> {
        self.row(y).map(|cells| {
            let s: String = cells.iter().collect();
            s.trim_end().to_string()
        })
    }

    /// Whether row `y` auto-wrapped into the row below.
    #[must_use]
    pub fn is_soft_wrapped(&self, y: usize) -> bool {
        self.soft.get(y).copied().unwrap_or(false)
    }

    /// Trimmed text of every row up to the last non-blank one.
    #[must_use]
    pub fn visible_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = (0..self.height)
            .filter_map(|y| self.row_text(y))
            .collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines
    }

    /// Whole-screen text as a terminal copies it: every row followed by a
    /// newline, except soft-wrapped rows, which run into the next row. Rows
    /// that end in a newline are trimmed of trailing spaces.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            let start = y * self.width;
            let row: String = self.cells[start..start + self.width].iter().collect();
            if self.soft[y] {
                out.push_str(&row);
            } else {
                out.push_str(row.trim_end_matches(' '));
                out.push('\n');
            }
        }
        out
    }

    /// Reset the terminal model to initial state.
    pub fn reset(&mut self) {
        *self = Self::new(self.width, self.height);
    }

    /// Change the grid size. Content is kept where it fits; a width change
    /// drops every soft-wrap mark.
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.max(1);
        let height = height.max(1);
        let mut cells = vec![' '; width * height];
        for y in 0..self.height.min(height) {
            for x in 0..self.width.min(width) {
                cells[y * width + x] = self.cells[y * self.width + x];
            }
        }
        let mut soft = vec![false; height];
        if width == self.width {
            for (y, flag) in soft.iter_mut().enumerate().take(self.height) {
                *flag = self.soft[y];
            }
        }
        self.cells = cells;
        self.soft = soft;
        self.width = width;
        self.height = height;
        self.cursor_x = self.cursor_x.min(width - 1);
        self.cursor_y = self.cursor_y.min(height - 1);
        self.pending_wrap = false;
    }

    // =========================================================================
    // Grid Operations
    // =========================================================================

    fn put_char(&mut self, ch: char) {
        if self.pending_wrap {
            self.pending_wrap = false;
            self.soft[self.cursor_y] = true;
            self.cursor_x = 0;
            self.index();
        }
        self.cells[self.cursor_y * self.width + self.cursor_x] = ch;
        if self.cursor_x + 1 == self.width {
            self.pending_wrap = true;
        } else {
            self.cursor_x += 1;
        }
    }

    /// Move down one row, scrolling at the bottom.
    fn index(&mut self) {
        if self.cursor_y + 1 < self.height {
            self.cursor_y += 1;
        } else {
            self.cells.drain(..self.width);
            self.cells.extend(std::iter::repeat_n(' ', self.width));
            self.soft.remove(0);
            self.soft.push(false);
            self.scrolled += 1;
        }
    }

    fn carriage_return(&mut self) {
        self.cursor_x = 0;
        self.pending_wrap = false;
    }

    fn line_feed(&mut self) {
        self.pending_wrap = false;
        self.index();
    }

    fn move_by(&mut self, dx: isize, dy: isize) {
        self.cursor_x = self
            .cursor_x
            .saturating_add_signed(dx)
            .min(self.width - 1);
        self.cursor_y = self
            .cursor_y
            .saturating_add_signed(dy)
            .min(self.height - 1);
        self.pending_wrap = false;
    }

    fn move_to_column(&mut self, col: usize) {
        self.cursor_x = col.min(self.width - 1);
        self.pending_wrap = false;
    }

    fn erase_cells(&mut self, y: usize, from_x: usize, to_x: usize) {
        let start = y * self.width;
        self.cells[start + from_x..start + to_x].fill(' ');
    }

    fn erase_line(&mut self, mode: u32) {
        let y = self.cursor_y;
        match mode {
            0 => {
                self.erase_cells(y, self.cursor_x, self.width);
                self.soft[y] = false;
            }
            1 => self.erase_cells(y, 0, self.cursor_x + 1),
            2 => {
                self.erase_cells(y, 0, self.width);
                self.soft[y] = false;
            }
            _ => {}
        }
        self.pending_wrap = false;
    }

    fn erase_display(&mut self, mode: u32) {
        match mode {
            0 => {
                self.erase_cells(self.cursor_y, self.cursor_x, self.width);
                self.erase_rows(self.cursor_y + 1);
                self.soft[self.cursor_y] = false;
            }
            1 => {
                for y in 0..self.cursor_y {
                    self.erase_cells(y, 0, self.width);
                    self.soft[y] = false;
                }
                self.erase_cells(self.cursor_y, 0, self.cursor_x + 1);
            }
            2 | 3 => self.erase_rows(0),
            _ => {}
        }
        self.pending_wrap = false;
    }

    /// Blank rows `from..` and drop their soft-wrap marks.
    fn erase_rows(&mut self, from: usize) {
        if from >= self.height {
            return;
        }
        self.cells[from * self.width..].fill(' ');
        self.soft[from..].fill(false);
    }

    fn save_cursor(&mut self) {
        self.saved = Some(SavedCursor {
            x: self.cursor_x,
            y: self.cursor_y,
            pending_wrap: self.pending_wrap,
        });
    }

    fn restore_cursor(&mut self) {
        if let Some(saved) = self.saved {
            self.cursor_x = saved.x.min(self.width - 1);
            self.cursor_y = saved.y.min(self.height - 1);
            self.pending_wrap = saved.pending_wrap;
        }
    }

    // =========================================================================
    // Byte Parser
    // =========================================================================

    /// Process a byte sequence, updating the terminal state.
    pub fn process(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.process_byte(b);
        }
    }

    /// Process a single byte.
    fn process_byte(&mut self, b: u8) {
        match self.parse_state {
            ParseState::Ground => self.ground_state(b),
            ParseState::Escape => self.escape_state(b),
            ParseState::CsiEntry => self.csi_entry_state(b),
            ParseState::CsiParam => self.csi_param_state(b),
            ParseState::Utf8 => self.utf8_state(b),
        }
    }

    fn ground_state(&mut self, b: u8) {
        match b {
            0x1B => {
                // ESC
                self.parse_state = ParseState::Escape;
            }
            0x00..=0x1A | 0x1C..=0x1F => self.handle_c0(b),
            0x20..=0x7E => self.put_char(char::from(b)),
            0x7F => {}
            0xC2..=0xF4 => {
                self.utf8.clear();
                self.utf8.push(b);
                self.utf8_len = match b {
                    0xC2..=0xDF => 2,
                    0xE0..=0xEF => 3,
                    _ => 4,
                };
                self.parse_state = ParseState::Utf8;
            }
            _ => self.put_char(char::REPLACEMENT_CHARACTER),
        }
    }

    fn utf8_state(&mut self, b: u8) {
        if !(0x80..=0xBF).contains(&b) {
            // Truncated sequence: emit a replacement and reprocess the byte.
            self.put_char(char::REPLACEMENT_CHARACTER);
            self.parse_state = ParseState::Ground;
            self.ground_state(b);
            return;
        }
        self.utf8.push(b);
        if self.utf8.len() < self.utf8_len {
            return;
        }
        let ch = std::str::from_utf8(&self.utf8)
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        self.parse_state = ParseState::Ground;
        self.put_char(ch);
    }

    fn escape_state(&mut self, b: u8) {
        match b {
            b'[' => {
                // CSI
                self.csi_params.clear();
                self.csi_intermediate.clear();
                self.parse_state = ParseState::CsiEntry;
            }
            b'7' => {
                self.save_cursor();
                self.parse_state = ParseState::Ground;
            }
            b'8' => {
                self.restore_cursor();
                self.parse_state = ParseState::Ground;
            }
            0x1B => {
                // ESC ESC - stay in escape (malformed, but handle gracefully)
            }
            _ => {
                // Unknown escape, return to ground
                self.parse_state = ParseState::Ground;
            }
        }
    }

    fn csi_entry_state(&mut self, b: u8) {
        match b {
            b'0'..=b'9' => {
                self.csi_params.push(u32::from(b - b'0'));
                self.parse_state = ParseState::CsiParam;
            }
            b';' => {
                self.csi_params.push(0);
                self.parse_state = ParseState::CsiParam;
            }
            b'?' | b'>' | b'!' => {
                self.csi_intermediate.push(b);
                self.parse_state = ParseState::CsiParam;
            }
            0x40..=0x7E => {
                // Final byte with no params
                self.execute_csi(b);
                self.parse_state = ParseState::Ground;
            }
            _ => {
                self.parse_state = ParseState::Ground;
            }
        }
    }

    fn csi_param_state(&mut self, b: u8) {
        match b {
            b'0'..=b'9' => {
                if self.csi_params.is_empty() {
                    self.csi_params.push(0);
                }
                if let Some(last) = self.csi_params.last_mut() {
                    *last = last.saturating_mul(10).saturating_add(u32::from(b - b'0'));
                }
            }
            b';' => {
                self.csi_params.push(0);
            }
            0x20..=0x2F => {
                self.csi_intermediate.push(b);
            }
            0x40..=0x7E => {
                // Final byte
                self.execute_csi(b);
                self.parse_state = ParseState::Ground;
            }
            _ => {
                self.parse_state = ParseState::Ground;
            }
        }
    }

    fn handle_c0(&mut self, b: u8) {
        match b {
            0x08 => {
                // BS - backspace
                self.cursor_x = self.cursor_x.saturating_sub(1);
                self.pending_wrap = false;
            }
            0x0A..=0x0C => self.line_feed(),
            0x0D => self.carriage_return(),
            _ => {} // Other C0 controls ignored
        }
    }

    /// First CSI parameter, with 0 and absence read as `default`.
    fn param_or(&self, default: u32) -> usize {
        let n = self.csi_params.first().copied().unwrap_or(default);
        (if n == 0 { default } else { n }) as usize
    }

    fn execute_csi(&mut self, final_byte: u8) {
        let has_question = self.csi_intermediate.contains(&b'?');
        let mode = self.csi_params.first().copied().unwrap_or(0);

        match final_byte {
            b'A' => self.move_by(0, -(self.param_or(1) as isize)), // CUU - cursor up
            b'B' => self.move_by(0, self.param_or(1) as isize),    // CUD - cursor down
            b'C' => self.move_by(self.param_or(1) as isize, 0),    // CUF - cursor forward
            b'D' => self.move_by(-(self.param_or(1) as isize), 0), // CUB - cursor back
            b'G' => self.move_to_column(self.param_or(1) - 1),     // CHA
            b'J' => self.erase_display(mode),                      // ED - erase in display
            b'K' => self.erase_line(mode),                         // EL - erase in line
            b'h' if has_question => self.set_private_modes(true),  // DECSET
            b'l' if has_question => self.set_private_modes(false), // DECRST
            _ => {}                                                // Unknown CSI - ignored
        }
    }

    fn set_private_modes(&mut self, on: bool) {
        for i in 0..self.csi_params.len() {
            match self.csi_params[i] {
                25 => self.modes.cursor_visible = on,
                2026 if on => self.modes.sync_output_level += 1,
                2026 => {
                    self.modes.sync_output_level = self.modes.sync_output_level.saturating_sub(1);
                }
                _ => {}
            }
        }
    }

    /// Dump the escape sequences in a human-readable format (for debugging test failures).
    #[must_use]
    pub fn dump_sequences(bytes: &[u8]) -> String {
        let mut output = String::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == 0x1B {
                if i + 1 < bytes.len() {
                    if bytes[i + 1] == b'[' {
                        // CSI sequence
                        output.push_str("\\e[");
                        i += 2;
                        while i < bytes.len() && !(0x40..=0x7E).contains(&bytes[i]) {
                            output.push(char::from(bytes[i]));
                            i += 1;
                        }
                        if i < bytes.len() {
                            output.push(char::from(bytes[i]));
                            i += 1;
                        }
                    } else {
                        output.push_str("\\e");
                        output.push(char::from(bytes[i + 1]));
                        i += 2;
                    }
                } else {
                    output.push_str("\\e");
                    i += 1;
                }
            } else if bytes[i] < 0x20 {
                output.push_str(&format!("\\x{:02x}", bytes[i]));
                i += 1;
            } else {
                output.push(char::from(bytes[i]));
                i += 1;
            }
        }
        output
    }
}

impl CapabilityPort for TerminalModel {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.ops.push(PortOp::Write(text.to_string()));
        for ch in text.chars() {
            self.put_char(ch);
        }
        Ok(())
    }

    fn move_cursor_relative(&mut self, dx: isize, dy: isize) -> io::Result<()> {
        self.ops.push(PortOp::MoveRelative { dx, dy });
        self.move_by(dx, dy);
        Ok(())
    }

    fn move_cursor_to_column(&mut self, col: usize) -> io::Result<()> {
        self.ops.push(PortOp::MoveToColumn(col));
        self.move_to_column(col);
        Ok(())
    }

    fn clear_to_end_of_line(&mut self) -> io::Result<()> {
        self.ops.push(PortOp::ClearToEndOfLine);
        self.erase_line(0);
        Ok(())
    }

    fn clear_rows_from(&mut self, rows_below: usize) -> io::Result<()> {
        self.ops.push(PortOp::ClearRowsFrom(rows_below));
        self.erase_rows(self.cursor_y.saturating_add(rows_below));
        Ok(())
    }

    fn hard_newline(&mut self) -> io::Result<()> {
        self.ops.push(PortOp::HardNewline);
        self.carriage_return();
        self.line_feed();
        Ok(())
    }

    fn begin_update(&mut self) -> io::Result<()> {
        self.ops.push(PortOp::BeginUpdate);
        self.modes.update_depth += 1;
        Ok(())
    }

    fn end_update(&mut self) -> io::Result<()> {
        self.ops.push(PortOp::EndUpdate);
        self.modes.update_depth = self.modes.update_depth.saturating_sub(1);
        Ok(())
    }
}
