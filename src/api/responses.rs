//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    state::{
        BreathingPattern, BreathingSession, GameStatus, Grade, MemoryMatchGame, Phase, Symbol, Tile,
    },
    utils::format_clock,
};

/// Error body shared by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Snapshot of a breathing session with presentation fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathingView {
    pub id: Uuid,
    pub phase: Phase,
    pub instruction: String,
    pub pattern: BreathingPattern,
    pub pattern_label: String,
    pub seconds_remaining: u32,
    pub cycles_completed: u32,
    pub session_seconds: u64,
    pub session_clock: String,
    pub is_running: bool,
    pub scale: f32,
    pub session_complete: bool,
    pub points_earned: u32,
}

impl BreathingView {
    pub fn new(id: Uuid, session: &BreathingSession) -> Self {
        Self {
            id,
            phase: session.phase,
            instruction: session.phase.instruction().to_string(),
            pattern: session.pattern,
            pattern_label: session.pattern.label(),
            seconds_remaining: session.seconds_remaining,
            cycles_completed: session.cycles_completed,
            session_seconds: session.session_seconds,
            session_clock: format_clock(session.session_seconds),
            is_running: session.is_running,
            scale: session.scale(),
            session_complete: session.is_complete(),
            points_earned: session.points_earned(),
        }
    }
}

/// A tile as the player may see it: face-down tiles hide their symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileView {
    pub id: usize,
    pub symbol: Option<Symbol>,
    pub face: Option<String>,
    pub is_revealed: bool,
    pub is_matched: bool,
}

impl From<&Tile> for TileView {
    fn from(tile: &Tile) -> Self {
        let visible = tile.is_revealed || tile.is_matched;
        Self {
            id: tile.id,
            symbol: visible.then_some(tile.symbol),
            face: visible.then(|| tile.symbol.emoji().to_string()),
            is_revealed: tile.is_revealed,
            is_matched: tile.is_matched,
        }
    }
}

/// Final rating of a completed game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeView {
    pub grade: Grade,
    pub label: String,
    pub stars: u8,
}

impl From<Grade> for GradeView {
    fn from(grade: Grade) -> Self {
        Self {
            grade,
            label: grade.label().to_string(),
            stars: grade.stars(),
        }
    }
}

/// Snapshot of a memory game with presentation fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryView {
    pub id: Uuid,
    pub status: GameStatus,
    pub tiles: Vec<TileView>,
    pub pending: Vec<usize>,
    pub move_count: u32,
    pub matched_count: u32,
    pub pairs: u32,
    pub elapsed_seconds: u64,
    pub clock: String,
    pub grade: Option<GradeView>,
    pub points_earned: u32,
}

impl MemoryView {
    pub fn new(id: Uuid, game: &MemoryMatchGame) -> Self {
        Self {
            id,
            status: game.status,
            tiles: game.board.iter().map(TileView::from).collect(),
            pending: game.revealed_pending.clone(),
            move_count: game.move_count,
            matched_count: game.matched_count,
            pairs: game.pairs,
            elapsed_seconds: game.elapsed_seconds,
            clock: format_clock(game.elapsed_seconds),
            grade: game.is_complete().then(|| game.grade().into()),
            points_earned: game.points_earned(),
        }
    }
}

/// Server status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub breathing_sessions: usize,
    pub memory_games: usize,
    pub tick_interval_ms: u64,
    pub reveal_delay_ms: u64,
    pub chat_configured: bool,
    pub chat_model: String,
    pub uptime: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
