#![forbid(unsafe_code)]

//! Render state owner for one terminal session.
//!
//! [`Repainter`] keeps the [`RenderState`] between calls to
//! [`repaint`](crate::repaint::repaint) so callers only hand it the new screen
//! and cursor. It also covers the life-cycle events around repainting:
//!
//! | Event | Call | Effect |
//! |-------|------|--------|
//! | Screen changed | [`Repainter::repaint`] | incremental update |
//! | Foreign output, lost sync | [`Repainter::invalidate`] | next repaint is a full redraw |
//! | Terminal resized | [`Repainter::resize`] | invalidate, logged |
//! | Line accepted | [`Repainter::finish`] | cursor below the screen, state forgotten |

use lnedit_core::{CapabilityPort, Position};
use lnedit_layout::Screen;

use crate::render_state::RenderState;
use crate::repaint::{RepaintError, leave_screen, repaint};

/// Owns the render state of one editing session.
#[derive(Debug, Clone, Default)]
pub struct Repainter {
    state: Option<RenderState>,
}

impl Repainter {
    /// A repainter that has painted nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint `screen` and park the cursor on `cursor`.
    ///
    /// # Errors
    ///
    /// Contract violations leave the stored state untouched. A port failure
    /// invalidates it, so the next call redraws everything.
    pub fn repaint<P: CapabilityPort + ?Sized>(
        &mut self,
        screen: &Screen,
        cursor: Position,
        port: &mut P,
    ) -> Result<(), RepaintError> {
        match repaint(self.state.as_ref(), screen, cursor, port) {
            Ok(next) => {
                self.state = Some(next);
                Ok(())
            }
            Err(err) => {
                if matches!(err, RepaintError::Io(_)) {
                    lnedit_core::warn!(error = %err, "repaint failed, forcing full redraw");
                    self.invalidate();
                }
                Err(err)
            }
        }
    }

    /// Make the next repaint redraw every row from the origin.
    pub fn invalidate(&mut self) {
        if let Some(state) = &mut self.state {
            state.invalidate();
        }
    }

    /// Record a terminal resize. The port reports the new size; the stored
    /// rows no longer match what the terminal shows.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn resize(&mut self, width: usize, height: usize) {
        lnedit_core::debug!(width, height, "terminal resized");
        self.invalidate();
    }

    /// Leave the painted rows on screen, move to a fresh row below them, and
    /// forget them. The next repaint starts on that row.
    ///
    /// # Errors
    ///
    /// Returns the port's error; the state is forgotten either way.
    pub fn finish<P: CapabilityPort + ?Sized>(&mut self, port: &mut P) -> Result<(), RepaintError> {
        if let Some(state) = self.state.take() {
            leave_screen(&state, port)?;
        }
        Ok(())
    }

    /// The state of the last successful repaint, if any.
    #[must_use]
    pub fn state(&self) -> Option<&RenderState> {
        self.state.as_ref()
    }
}
