//! Memory matching game state machine

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Move count at or below which a finished game earns the top grade
pub const EXCELLENT_MAX_MOVES: u32 = 16;
/// Move count at or below which a finished game earns the middle grade
pub const GOOD_MAX_MOVES: u32 = 24;

/// Wellness points reported for a completed game
pub const COMPLETION_POINTS: u32 = 50;

/// Face value of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Brain,
    GreenHeart,
    GlowingStar,
    DirectHit,
    LightBulb,
    Palette,
    CrystalBall,
    Star,
}

impl Symbol {
    /// The standard alphabet used for the 4x4 board
    pub const ALPHABET: [Symbol; 8] = [
        Symbol::Brain,
        Symbol::GreenHeart,
        Symbol::GlowingStar,
        Symbol::DirectHit,
        Symbol::LightBulb,
        Symbol::Palette,
        Symbol::CrystalBall,
        Symbol::Star,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            Symbol::Brain => "🧠",
            Symbol::GreenHeart => "💚",
            Symbol::GlowingStar => "🌟",
            Symbol::DirectHit => "🎯",
            Symbol::LightBulb => "💡",
            Symbol::Palette => "🎨",
            Symbol::CrystalBall => "🔮",
            Symbol::Star => "⭐",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: usize,
    pub symbol: Symbol,
    pub is_revealed: bool,
    pub is_matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Three-tier rating of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    KeepPracticing,
}

impl Grade {
    pub fn from_moves(moves: u32) -> Self {
        if moves <= EXCELLENT_MAX_MOVES {
            Grade::Excellent
        } else if moves <= GOOD_MAX_MOVES {
            Grade::Good
        } else {
            Grade::KeepPracticing
        }
    }

    pub fn stars(self) -> u8 {
        match self {
            Grade::Excellent => 3,
            Grade::Good => 2,
            Grade::KeepPracticing => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent",
            Grade::Good => "Good",
            Grade::KeepPracticing => "Keep Practicing",
        }
    }
}

/// Result of a reveal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The click was not applicable and changed nothing
    Ignored,
    /// The tile is face-up, waiting for a partner
    Revealed,
    /// Two tiles are face-up; `resolve_pending` must run after the display delay
    PairPending([usize; 2]),
}

/// Result of resolving a pending pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Matched,
    Mismatched,
}

/// Error building a game from an explicit layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("board is empty")]
    Empty,
    #[error("symbol {0:?} appears {1} times, expected 2")]
    Unpaired(Symbol, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMatchGame {
    pub board: Vec<Tile>,
    pub revealed_pending: Vec<usize>,
    pub move_count: u32,
    pub matched_count: u32,
    pub elapsed_seconds: u64,
    pub status: GameStatus,
    /// Distinct symbols on the board (K)
    pub pairs: u32,
}

impl MemoryMatchGame {
    /// A freshly shuffled game over the standard alphabet
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut game = Self::from_symbols(&doubled(&Symbol::ALPHABET));
        game.new_game(rng);
        game
    }

    /// Build a game from a fixed layout; every symbol must appear exactly twice.
    pub fn with_layout(symbols: &[Symbol]) -> Result<Self, LayoutError> {
        if symbols.is_empty() {
            return Err(LayoutError::Empty);
        }
        for symbol in symbols {
            let count = symbols.iter().filter(|s| *s == symbol).count();
            if count != 2 {
                return Err(LayoutError::Unpaired(*symbol, count));
            }
        }
        Ok(Self::from_symbols(symbols))
    }

    fn from_symbols(symbols: &[Symbol]) -> Self {
        Self {
            board: symbols
                .iter()
                .enumerate()
                .map(|(id, &symbol)| Tile {
                    id,
                    symbol,
                    is_revealed: false,
                    is_matched: false,
                })
                .collect(),
            revealed_pending: Vec::with_capacity(2),
            move_count: 0,
            matched_count: 0,
            elapsed_seconds: 0,
            status: GameStatus::NotStarted,
            pairs: (symbols.len() / 2) as u32,
        }
    }

    /// Reshuffle the same symbol multiset and reset every counter
    pub fn new_game<R: Rng>(&mut self, rng: &mut R) {
        let mut symbols: Vec<Symbol> = self.board.iter().map(|t| t.symbol).collect();
        // Fisher-Yates
        for i in (1..symbols.len()).rev() {
            let j = rng.gen_range(0..=i);
            symbols.swap(i, j);
        }
        *self = Self::from_symbols(&symbols);
    }

    /// Start the clock without revealing a tile
    pub fn start(&mut self) {
        if self.status == GameStatus::NotStarted {
            self.status = GameStatus::InProgress;
        }
    }

    pub fn reveal_tile(&mut self, id: usize) -> RevealOutcome {
        if self.status == GameStatus::Completed || self.revealed_pending.len() >= 2 {
            return RevealOutcome::Ignored;
        }
        let Some(tile) = self.board.get_mut(id) else {
            return RevealOutcome::Ignored;
        };
        if tile.is_revealed || tile.is_matched {
            return RevealOutcome::Ignored;
        }

        tile.is_revealed = true;
        self.revealed_pending.push(id);
        self.start();

        match self.revealed_pending[..] {
            [first, second] => RevealOutcome::PairPending([first, second]),
            _ => RevealOutcome::Revealed,
        }
    }

    /// Settle the two face-up tiles. Returns None when no pair is pending.
    pub fn resolve_pending(&mut self) -> Option<Resolution> {
        let [first, second] = self.revealed_pending[..] else {
            return None;
        };
        self.revealed_pending.clear();
        self.move_count += 1;

        if self.board[first].symbol == self.board[second].symbol {
            for id in [first, second] {
                self.board[id].is_matched = true;
            }
            self.matched_count += 1;
            if self.matched_count == self.pairs {
                self.status = GameStatus::Completed;
            }
            Some(Resolution::Matched)
        } else {
            for id in [first, second] {
                self.board[id].is_revealed = false;
            }
            Some(Resolution::Mismatched)
        }
    }

    /// Apply one elapsed second
    pub fn tick(&mut self) {
        if self.status == GameStatus::InProgress {
            self.elapsed_seconds += 1;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == GameStatus::Completed
    }

    /// Grade for the current move count; only meaningful once complete
    pub fn grade(&self) -> Grade {
        Grade::from_moves(self.move_count)
    }

    pub fn points_earned(&self) -> u32 {
        if self.is_complete() { COMPLETION_POINTS } else { 0 }
    }
}

fn doubled(alphabet: &[Symbol]) -> Vec<Symbol> {
    alphabet.iter().chain(alphabet.iter()).copied().collect()
}
