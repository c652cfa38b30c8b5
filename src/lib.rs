//! MindWell - Game session server for the MindWell student wellness portal
//!
//! This library provides the breathing pacer and memory matching state
//! machines, an HTTP layer that hosts them behind a shared game clock,
//! and the chat proxy that forwards conversations to a hosted model.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
