//! Utility functions module

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::format_clock;
pub use signals::shutdown_signal;
