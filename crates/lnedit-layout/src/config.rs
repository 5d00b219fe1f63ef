#![forbid(unsafe_code)]

//! Layout configuration.
//!
//! A [`LayoutConfig`] is built fresh for every render cycle. All fields are
//! plain values with documented defaults; [`LayoutConfig::validate`] reports
//! every violated constraint at once.

use std::fmt;

use crate::display;

/// Where the status message is drawn relative to the prompt and buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPlacement {
    /// Message rows come before the prompt rows.
    Top,
    /// Message rows come after the last buffer row.
    #[default]
    Bottom,
}

/// Prompts used when the buffer spans several logical lines.
///
/// The primary prompt passed to `compute_screen` is used only for single-line
/// buffers once these are configured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContinuationPrompts {
    /// Prompt for the first logical line.
    pub first: String,
    /// Prompt for every line between the first and the last.
    pub middle: String,
    /// Prompt for the last logical line.
    pub last: String,
}

impl ContinuationPrompts {
    /// Create a prompt set.
    #[must_use]
    pub fn new(
        first: impl Into<String>,
        middle: impl Into<String>,
        last: impl Into<String>,
    ) -> Self {
        Self {
            first: first.into(),
            middle: middle.into(),
            last: last.into(),
        }
    }

    /// Prompt for logical line `lineno` of `line_count` lines.
    #[must_use]
    pub fn for_line(&self, lineno: usize, line_count: usize) -> &str {
        if lineno == 0 {
            &self.first
        } else if lineno + 1 == line_count {
            &self.last
        } else {
            &self.middle
        }
    }
}

/// Per-render layout configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Terminal width in columns. Must be positive. Default: 80.
    pub width: usize,
    /// Appended to every row broken in the middle of a stream. Empty disables
    /// the marker and rows are packed to the full width. Default: `\`.
    pub wrap_marker: String,
    /// Optional status message, drawn as its own stream(s). Default: none.
    pub status_message: Option<String>,
    /// Placement of the status message. Default: [`StatusPlacement::Bottom`].
    pub status_placement: StatusPlacement,
    /// Prompts for multi-line buffers. Default: none (primary prompt on the
    /// first line, no prompt on the following ones).
    pub continuation_prompts: Option<ContinuationPrompts>,
}

impl LayoutConfig {
    /// Default terminal width.
    pub const DEFAULT_WIDTH: usize = 80;

    /// Default wrap marker.
    pub const DEFAULT_WRAP_MARKER: &'static str = "\\";

    /// Create a configuration for a terminal `width` columns wide.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width,
            wrap_marker: Self::DEFAULT_WRAP_MARKER.to_string(),
            status_message: None,
            status_placement: StatusPlacement::default(),
            continuation_prompts: None,
        }
    }

    /// Set the terminal width.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Set the wrap marker (empty to disable).
    #[must_use]
    pub fn with_wrap_marker(mut self, marker: impl Into<String>) -> Self {
        self.wrap_marker = marker.into();
        self
    }

    /// Show a status message.
    #[must_use]
    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }

    /// Remove the status message.
    #[must_use]
    pub fn without_status_message(mut self) -> Self {
        self.status_message = None;
        self
    }

    /// Set where the status message is drawn.
    #[must_use]
    pub fn with_status_placement(mut self, placement: StatusPlacement) -> Self {
        self.status_placement = placement;
        self
    }

    /// Use continuation prompts for multi-line buffers.
    #[must_use]
    pub fn with_continuation_prompts(mut self, prompts: ContinuationPrompts) -> Self {
        self.continuation_prompts = Some(prompts);
        self
    }

    /// Width of the wrap marker in columns.
    #[must_use]
    pub fn marker_width(&self) -> usize {
        self.wrap_marker.chars().count()
    }

    /// Columns available for content on a row that gets broken.
    #[must_use]
    pub fn usable_width(&self) -> usize {
        self.width.saturating_sub(self.marker_width())
    }

    /// Check every constraint and return all violations.
    ///
    /// # Errors
    ///
    /// Returns one [`ConfigError`] per violated constraint.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if self.width == 0 {
            errors.push(ConfigError::new(
                "width",
                self.width.to_string(),
                "must be positive",
            ));
        }
        if self.width > 0 && self.marker_width() >= self.width {
            errors.push(ConfigError::new(
                "wrap_marker",
                self.wrap_marker.clone(),
                format!("must be narrower than the width ({})", self.width),
            ));
        }
        if self.wrap_marker.chars().any(display::needs_escape) {
            errors.push(ConfigError::new(
                "wrap_marker",
                self.wrap_marker.escape_debug().to_string(),
                "must not contain control characters",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH)
    }
}

/// A violated configuration constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Offending field.
    pub field: &'static str,
    /// Offending value, rendered for display.
    pub value: String,
    /// What is wrong with it.
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}
