#![forbid(unsafe_code)]

//! Layout engine for the lnedit line editor.
//!
//! Turns a prompt, an edit buffer, and an optional status message into the
//! rows to paint on a terminal of a given width, together with the mapping
//! from buffer offsets to screen positions.
//!
//! - [`LayoutConfig`] - per-render configuration (width, wrap marker, status)
//! - [`compute_screen`] - the packing algorithm, producing a [`Screen`] and a
//!   [`CursorMap`] in one pass
//! - [`display`] - how individual buffer characters are drawn
//!
//! # Example
//! ```
//! use lnedit_layout::{LayoutConfig, compute_screen};
//!
//! let buffer: Vec<char> = "01234567890123456789".chars().collect();
//! let config = LayoutConfig::new(10);
//! let (screen, map) = compute_screen("foo$", &buffer, buffer.len(), &config).unwrap();
//!
//! assert_eq!(screen.lines(), ["foo$01234\\", "567890123\\", "456789"]);
//! assert_eq!(map.cursor().row, 2);
//! ```

pub mod config;
pub mod display;
pub mod layout;
pub mod screen;

pub use config::{ConfigError, ContinuationPrompts, LayoutConfig, StatusPlacement};
pub use layout::{CursorMap, LayoutError, compute_screen};
pub use screen::Screen;
