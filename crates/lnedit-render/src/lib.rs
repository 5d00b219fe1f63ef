#![forbid(unsafe_code)]

//! Repaint engine for the lnedit line editor.
//!
//! Brings a terminal from what was painted last to a new [`Screen`] through a
//! [`CapabilityPort`](lnedit_core::CapabilityPort), tracking which rows the
//! terminal joined by auto-wrap so copied text matches the edited line.
//!
//! - [`repaint`] - one repaint cycle from a previous [`RenderState`]
//! - [`Repainter`] - owns the state between cycles (invalidate, resize, finish)
//! - [`AnsiTerminal`] - capability port writing ANSI sequences
//! - [`TerminalModel`] - in-memory terminal for tests and validation
//! - [`ansi`] - the escape sequences themselves
//!
//! [`Screen`]: lnedit_layout::Screen

pub mod ansi;
pub mod ansi_terminal;
pub mod render_state;
pub mod repaint;
pub mod repainter;
pub mod terminal_model;

pub use ansi_terminal::{AnsiTerminal, TerminalCapabilities};
pub use render_state::{Boundary, RenderState};
pub use repaint::{RepaintError, repaint};
pub use repainter::Repainter;
pub use terminal_model::{PortOp, TerminalModel};
