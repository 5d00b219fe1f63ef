#![forbid(unsafe_code)]

//! Terminal capability detection for the repaint path.
//!
//! Only the capabilities that change what the ANSI port emits are modelled:
//! synchronized output (DEC 2026) and multiplexer presence. Detection reads
//! environment variables and is deterministic for a given environment.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `TERM` | `dumb`/empty disables everything; `kitty` enables sync output |
//! | `TERM_PROGRAM` | known programs enable sync output |
//! | `KITTY_WINDOW_ID` | kitty detection |
//! | `TMUX`, `STY`, `ZELLIJ` | multiplexer detection |
//! | `WT_SESSION` | Windows Terminal (never dumb even without `TERM`) |
//!
//! # Invariants
//!
//! 1. `use_sync_output()` is `false` inside any multiplexer: `CSI ? 2026 h/l`
//!    is unreliable through passthrough.
//! 2. A dumb terminal gets no optional sequences at all.

use std::env;

#[derive(Debug, Clone, Default)]
struct DetectInputs {
    term: String,
    term_program: String,
    in_tmux: bool,
    in_screen: bool,
    in_zellij: bool,
    kitty_window_id: bool,
    wt_session: bool,
}

impl DetectInputs {
    fn from_env() -> Self {
        Self {
            term: env::var("TERM").unwrap_or_default(),
            term_program: env::var("TERM_PROGRAM").unwrap_or_default(),
            in_tmux: env::var("TMUX").is_ok(),
            in_screen: env::var("STY").is_ok(),
            in_zellij: env::var("ZELLIJ").is_ok(),
            kitty_window_id: env::var("KITTY_WINDOW_ID").is_ok(),
            wt_session: env::var("WT_SESSION").is_ok(),
        }
    }
}

/// Terminal programs that support synchronized output (DEC 2026).
const SYNC_OUTPUT_TERMINALS: &[&str] = &["WezTerm", "Alacritty", "Ghostty", "kitty", "Contour"];

/// Capabilities that shape repaint output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    /// The terminal brackets updates with DEC 2026 synchronized output.
    pub sync_output: bool,
    /// Running inside tmux.
    pub in_tmux: bool,
    /// Running inside GNU screen.
    pub in_screen: bool,
    /// Running inside Zellij.
    pub in_zellij: bool,
    /// `TERM=dumb` (or unset outside Windows Terminal).
    pub dumb: bool,
}

impl TerminalCapabilities {
    /// Detect capabilities from the environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from_inputs(&DetectInputs::from_env())
    }

    fn detect_from_inputs(env: &DetectInputs) -> Self {
        let term = env.term.as_str();
        let term_program = env.term_program.as_str();

        // Windows Terminal often omits TERM.
        let dumb = term == "dumb" || (term.is_empty() && !env.wt_session);
        let is_kitty = env.kitty_window_id || term.contains("kitty");

        let sync_output = !dumb
            && (is_kitty
                || SYNC_OUTPUT_TERMINALS
                    .iter()
                    .any(|t| term_program.contains(t)));

        Self {
            sync_output,
            in_tmux: env.in_tmux,
            in_screen: env.in_screen,
            in_zellij: env.in_zellij,
            dumb,
        }
    }

    /// A capability set that is safe on any terminal.
    #[must_use]
    pub const fn basic() -> Self {
        Self {
            sync_output: false,
            in_tmux: false,
            in_screen: false,
            in_zellij: false,
            dumb: false,
        }
    }

    /// Set synchronized output support.
    #[must_use]
    pub const fn with_sync_output(mut self, enabled: bool) -> Self {
        self.sync_output = enabled;
        self
    }

    /// Running inside tmux, screen, or Zellij.
    #[must_use]
    #[inline]
    pub const fn in_any_mux(&self) -> bool {
        self.in_tmux || self.in_screen || self.in_zellij
    }

    /// Whether repaint cycles should be bracketed with DEC 2026.
    #[must_use]
    #[inline]
    pub const fn use_sync_output(&self) -> bool {
        if self.dumb || self.in_any_mux() {
            return false;
        }
        self.sync_output
    }
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self::basic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(term: &str, term_program: &str) -> DetectInputs {
        DetectInputs {
            term: term.to_string(),
            term_program: term_program.to_string(),
            ..DetectInputs::default()
        }
    }

    #[test]
    fn basic_is_minimal() {
        let caps = TerminalCapabilities::basic();
        assert!(!caps.sync_output);
        assert!(!caps.in_any_mux());
        assert!(!caps.use_sync_output());
    }

    #[test]
    fn detect_does_not_panic() {
        let _caps = TerminalCapabilities::detect();
    }

    #[test]
    fn dumb_terminal_disables_sync() {
        let caps = TerminalCapabilities::detect_from_inputs(&inputs("dumb", "WezTerm"));
        assert!(caps.dumb);
        assert!(!caps.sync_output);
    }

    #[test]
    fn empty_term_is_dumb_outside_windows_terminal() {
        let caps = TerminalCapabilities::detect_from_inputs(&inputs("", ""));
        assert!(caps.dumb);

        let mut env = inputs("", "");
        env.wt_session = true;
        assert!(!TerminalCapabilities::detect_from_inputs(&env).dumb);
    }

    #[test]
    fn known_programs_enable_sync() {
        for program in ["WezTerm", "Alacritty", "Ghostty", "Contour"] {
            let caps = TerminalCapabilities::detect_from_inputs(&inputs("xterm-256color", program));
            assert!(caps.use_sync_output(), "{program} supports sync output");
        }
        let caps = TerminalCapabilities::detect_from_inputs(&inputs("xterm-256color", "Apple_Terminal"));
        assert!(!caps.sync_output);
    }

    #[test]
    fn kitty_detected_by_window_id() {
        let mut env = inputs("xterm-256color", "");
        env.kitty_window_id = true;
        assert!(TerminalCapabilities::detect_from_inputs(&env).sync_output);
    }

    #[test]
    fn multiplexers_disable_sync() {
        let caps = TerminalCapabilities::basic().with_sync_output(true);
        assert!(caps.use_sync_output());

        for mux in 0..3 {
            let mut caps = caps;
            match mux {
                0 => caps.in_tmux = true,
                1 => caps.in_screen = true,
                _ => caps.in_zellij = true,
            }
            assert!(caps.in_any_mux());
            assert!(!caps.use_sync_output());
        }
    }
}
