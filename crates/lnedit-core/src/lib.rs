#![forbid(unsafe_code)]

//! Core: screen geometry, the terminal capability port, capability detection,
//! and the logging facade shared by the layout and render crates.

pub mod geometry;
pub mod logging;
pub mod port;
pub mod terminal_capabilities;

pub use geometry::Position;
pub use port::CapabilityPort;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
