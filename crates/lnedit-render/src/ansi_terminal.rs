#![forbid(unsafe_code)]

//! ANSI/VT capability port.
//!
//! [`AnsiTerminal`] implements [`CapabilityPort`] by writing escape sequences
//! from [`crate::ansi`] to any [`Write`]. Output is buffered and reaches the
//! terminal on [`CapabilityPort::flush`], which the repaint engine calls once
//! per cycle.
//!
//! | Capability | Bytes |
//! |------------|-------|
//! | `move_cursor_relative` | `CUU`/`CUD` then `CUB`/`CUF` |
//! | `move_cursor_to_column(0)` | `CR` |
//! | `move_cursor_to_column(n)` | `CHA` |
//! | `clear_to_end_of_line` | `EL 0` |
//! | `clear_rows_from(n)` | `DECSC`, `CUD n`, `CR`, `ED 0`, `DECRC` |
//! | `hard_newline` | `CR LF` |
//! | `begin_update` | `CSI ? 2026 h` (when supported), hide cursor |
//! | `end_update` | show cursor, `CSI ? 2026 l` (when supported) |
//!
//! The terminal must be in raw mode (no `LF` to `CR LF` translation). Setting
//! that up is the host's job.
//!
//! # Usage
//!
//! ```no_run
//! use lnedit_core::Position;
//! use lnedit_layout::Screen;
//! use lnedit_render::{AnsiTerminal, Repainter};
//!
//! let mut terminal = AnsiTerminal::stdout()?;
//! let mut repainter = Repainter::new();
//! let screen = Screen::from_lines(["$ echo hi"]);
//! repainter.repaint(&screen, Position::new(9, 0), &mut terminal)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{self, BufWriter, Write};

use lnedit_core::CapabilityPort;

use crate::ansi;

pub use lnedit_core::terminal_capabilities::TerminalCapabilities;

/// Size of the internal write buffer (64KB).
const BUFFER_CAPACITY: usize = 64 * 1024;

/// Size assumed when the terminal cannot report one.
const FALLBACK_SIZE: (usize, usize) = (80, 24);

/// Capability port writing ANSI sequences.
#[derive(Debug)]
pub struct AnsiTerminal<W: Write> {
    /// Buffered writer for efficient output.
    writer: BufWriter<W>,
    width: usize,
    height: usize,
    /// Terminal capabilities for conditional output.
    capabilities: TerminalCapabilities,
}

impl<W: Write> AnsiTerminal<W> {
    /// Create a port of the given size over `writer`.
    pub fn new(
        writer: W,
        width: usize,
        height: usize,
        capabilities: TerminalCapabilities,
    ) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            width,
            height,
            capabilities,
        }
    }

    /// Get the terminal capabilities.
    #[inline]
    pub fn capabilities(&self) -> &TerminalCapabilities {
        &self.capabilities
    }

    /// Record a new terminal size (after `SIGWINCH` or a resize event).
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Get the inner writer (consuming the port).
    ///
    /// Flushes any buffered data before returning the writer.
    pub fn into_inner(self) -> Result<W, io::Error> {
        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AnsiTerminal<io::Stdout> {
    /// A port over standard output, sized by the terminal and configured from
    /// the environment.
    ///
    /// # Errors
    ///
    /// Never fails today; the size falls back to 80x24 when the terminal
    /// cannot report it. The `Result` keeps room for setup that can fail.
    pub fn stdout() -> io::Result<Self> {
        let (width, height) = query_size().unwrap_or(FALLBACK_SIZE);
        let capabilities = TerminalCapabilities::detect();
        lnedit_core::debug!(
            width,
            height,
            sync_output = capabilities.use_sync_output(),
            "ANSI terminal opened"
        );
        Ok(Self::new(io::stdout(), width, height, capabilities))
    }

    /// Re-read the terminal size.
    ///
    /// Returns `true` when the size changed; callers then invalidate their
    /// render state.
    pub fn refresh_size(&mut self) -> bool {
        match query_size() {
            Some((width, height)) if (width, height) != (self.width, self.height) => {
                self.set_size(width, height);
                true
            }
            _ => false,
        }
    }
}

/// Terminal size from the OS, if it reports a usable one.
#[cfg(not(target_arch = "wasm32"))]
fn query_size() -> Option<(usize, usize)> {
    match crossterm::terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => {
            Some((usize::from(cols), usize::from(rows)))
        }
        Ok(_) => None,
        Err(_e) => {
            lnedit_core::warn!(error = %_e, "terminal size unavailable");
            None
        }
    }
}

impl<W: Write> CapabilityPort for AnsiTerminal<W> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    fn move_cursor_relative(&mut self, dx: isize, dy: isize) -> io::Result<()> {
        ansi::move_relative(&mut self.writer, dx, dy)
    }

    fn move_cursor_to_column(&mut self, col: usize) -> io::Result<()> {
        if col == 0 {
            ansi::cr(&mut self.writer)
        } else {
            ansi::cha(&mut self.writer, col)
        }
    }

    fn clear_to_end_of_line(&mut self) -> io::Result<()> {
        ansi::erase_to_end_of_line(&mut self.writer)
    }

    fn clear_rows_from(&mut self, rows_below: usize) -> io::Result<()> {
        ansi::erase_rows_below(&mut self.writer, rows_below)
    }

    fn hard_newline(&mut self) -> io::Result<()> {
        ansi::crlf(&mut self.writer)
    }

    fn begin_update(&mut self) -> io::Result<()> {
        if self.capabilities.use_sync_output() {
            ansi::sync_begin(&mut self.writer)?;
        }
        if !self.capabilities.dumb {
            ansi::cursor_hide(&mut self.writer)?;
        }
        Ok(())
    }

    fn end_update(&mut self) -> io::Result<()> {
        if !self.capabilities.dumb {
            ansi::cursor_show(&mut self.writer)?;
        }
        if self.capabilities.use_sync_output() {
            ansi::sync_end(&mut self.writer)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
