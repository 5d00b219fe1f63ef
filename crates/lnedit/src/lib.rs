#![forbid(unsafe_code)]

//! lnedit public facade crate.
//!
//! Re-exports the layout and repaint engines and offers [`refresh`], the one
//! call an editor makes after every edit: lay out the prompt and buffer, then
//! bring the terminal up to date.
//!
//! # Example
//!
//! ```
//! use lnedit::prelude::*;
//!
//! let mut terminal = TerminalModel::new(10, 5);
//! let mut repainter = Repainter::new();
//! let config = LayoutConfig::new(10).with_wrap_marker("");
//! let buffer: Vec<char> = "echo hello".chars().collect();
//!
//! refresh(&mut repainter, "$ ", &buffer, buffer.len(), &config, &mut terminal)?;
//! assert_eq!(terminal.text().lines().next(), Some("$ echo hello"));
//! # Ok::<(), lnedit::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use lnedit_core::terminal_capabilities::TerminalCapabilities;
pub use lnedit_core::{CapabilityPort, Position};

// --- Layout re-exports -----------------------------------------------------

pub use lnedit_layout::{
    ConfigError, ContinuationPrompts, CursorMap, LayoutConfig, LayoutError, Screen,
    StatusPlacement, compute_screen,
};

// --- Render re-exports -----------------------------------------------------

pub use lnedit_render::{
    AnsiTerminal, Boundary, PortOp, RenderState, RepaintError, Repainter, TerminalModel, repaint,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for lnedit.
#[derive(Debug)]
pub enum Error {
    /// The prompt, buffer, or configuration could not be laid out.
    Layout(LayoutError),
    /// The terminal could not be repainted.
    Repaint(RepaintError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "{err}"),
            Self::Repaint(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Repaint(err) => Some(err),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<RepaintError> for Error {
    fn from(err: RepaintError) -> Self {
        Self::Repaint(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Repaint(RepaintError::Io(err))
    }
}

/// Standard result type for lnedit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Refresh --------------------------------------------------------------

/// Lay out `prompt` and `buffer` and repaint `port` to show them, with the
/// cursor on `cursor_offset`.
///
/// Returns the cursor map of the new screen, so the caller can translate
/// later offsets (for example, mouse or search hits) without laying out
/// again.
///
/// # Errors
///
/// [`Error::Layout`] for an invalid configuration or cursor offset (nothing
/// is written), [`Error::Repaint`] when the screen does not fit the port or
/// the port fails.
pub fn refresh<P: CapabilityPort + ?Sized>(
    repainter: &mut Repainter,
    prompt: &str,
    buffer: &[char],
    cursor_offset: usize,
    config: &LayoutConfig,
    port: &mut P,
) -> Result<CursorMap> {
    let (screen, map) = compute_screen(prompt, buffer, cursor_offset, config)?;
    repainter.repaint(&screen, map.cursor(), port)?;
    Ok(map)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AnsiTerminal, CapabilityPort, Error, LayoutConfig, Position, Repainter, Result, Screen,
        StatusPlacement, TerminalModel, compute_screen, refresh,
    };

    pub use crate::{core, layout, render};
}

pub use lnedit_core as core;
pub use lnedit_layout as layout;
pub use lnedit_render as render;
