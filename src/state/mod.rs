//! State management module
//!
//! The two game state machines and the shared server state that hosts them.

pub mod app_state;
pub mod breathing;
pub mod memory;

// Re-export main types
pub use app_state::{AppState, GameSettings, TickSummary};
pub use breathing::{scale_factor, BreathingPattern, BreathingSession, Phase};
pub use memory::{
    GameStatus, Grade, LayoutError, MemoryMatchGame, Resolution, RevealOutcome, Symbol, Tile,
};
