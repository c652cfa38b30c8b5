//! Background tasks module
//!
//! The shared game clock and the delayed pair resolution of memory games.

pub mod game_ticker;
pub mod resolution;

// Re-export main functions
pub use game_ticker::game_ticker_task;
pub use resolution::schedule_resolution;
