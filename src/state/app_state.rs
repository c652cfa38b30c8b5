//! Shared server state: hosted game sessions and the chat upstream

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use tokio::task::AbortHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    BreathingPattern, BreathingSession, GameStatus, MemoryMatchGame, Resolution, RevealOutcome,
};
use crate::{config::Config, error::AppError, services::UpstreamClient, tasks::schedule_resolution};

/// Timing knobs for the game loop
#[derive(Debug, Clone, Copy)]
pub struct GameSettings {
    /// Period of the shared game clock
    pub tick_interval: Duration,
    /// How long a revealed pair stays face-up before it is resolved
    pub reveal_delay: Duration,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            reveal_delay: Duration::from_secs(1),
        }
    }
}

/// A hosted memory game plus its pending resolution timer
#[derive(Debug)]
struct MemoryEntry {
    game: MemoryMatchGame,
    /// Bumped on every reshuffle so stale resolutions can be told apart
    epoch: u64,
    resolution: Option<AbortHandle>,
}

impl MemoryEntry {
    fn new(game: MemoryMatchGame) -> Self {
        Self {
            game,
            epoch: 0,
            resolution: None,
        }
    }

    fn cancel_resolution(&mut self) {
        if let Some(handle) = self.resolution.take() {
            handle.abort();
        }
    }
}

/// Sessions advanced by one pass of the game clock
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub breathing: usize,
    pub memory: usize,
}

/// Main application state
#[derive(Debug)]
pub struct AppState {
    pub settings: GameSettings,
    pub chat: UpstreamClient,
    pub start_time: Instant,
    breathing: Mutex<HashMap<Uuid, BreathingSession>>,
    memory: Mutex<HashMap<Uuid, MemoryEntry>>,
}

impl AppState {
    pub fn new(settings: GameSettings, chat: UpstreamClient) -> Self {
        Self {
            settings,
            chat,
            start_time: Instant::now(),
            breathing: Mutex::new(HashMap::new()),
            memory: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            GameSettings {
                tick_interval: Duration::from_millis(config.tick_ms),
                reveal_delay: Duration::from_millis(config.reveal_delay_ms),
            },
            UpstreamClient::new(
                config.upstream_url.clone(),
                config.model.clone(),
                config.api_key.clone(),
            ),
        )
    }

    fn breathing_sessions(&self) -> Result<MutexGuard<'_, HashMap<Uuid, BreathingSession>>, AppError> {
        self.breathing.lock().map_err(|_| AppError::LockPoisoned("breathing"))
    }

    fn memory_games(&self) -> Result<MutexGuard<'_, HashMap<Uuid, MemoryEntry>>, AppError> {
        self.memory.lock().map_err(|_| AppError::LockPoisoned("memory"))
    }

    pub fn create_breathing(&self, pattern: BreathingPattern) -> Result<(Uuid, BreathingSession), AppError> {
        let id = Uuid::new_v4();
        let session = BreathingSession::new(pattern);
        self.breathing_sessions()?.insert(id, session.clone());
        info!("Created breathing session {} ({})", id, pattern.name());
        Ok((id, session))
    }

    pub fn get_breathing(&self, id: Uuid) -> Result<BreathingSession, AppError> {
        self.update_breathing(id, |_| {})
    }

    /// Apply an operation to a breathing session and return the new snapshot
    pub fn update_breathing<F>(&self, id: Uuid, updater: F) -> Result<BreathingSession, AppError>
    where
        F: FnOnce(&mut BreathingSession),
    {
        let mut sessions = self.breathing_sessions()?;
        let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        updater(session);
        Ok(session.clone())
    }

    pub fn remove_breathing(&self, id: Uuid) -> Result<(), AppError> {
        self.breathing_sessions()?
            .remove(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        info!("Removed breathing session {}", id);
        Ok(())
    }

    pub fn create_memory(&self) -> Result<(Uuid, MemoryMatchGame), AppError> {
        self.insert_memory(MemoryMatchGame::new(&mut rand::thread_rng()))
    }

    /// Host an already built game, e.g. one with a fixed layout
    pub fn insert_memory(&self, game: MemoryMatchGame) -> Result<(Uuid, MemoryMatchGame), AppError> {
        let id = Uuid::new_v4();
        self.memory_games()?.insert(id, MemoryEntry::new(game.clone()));
        info!("Created memory game {} with {} pairs", id, game.pairs);
        Ok((id, game))
    }

    pub fn get_memory(&self, id: Uuid) -> Result<MemoryMatchGame, AppError> {
        self.update_memory(id, |_| {})
    }

    pub fn update_memory<F>(&self, id: Uuid, updater: F) -> Result<MemoryMatchGame, AppError>
    where
        F: FnOnce(&mut MemoryMatchGame),
    {
        let mut games = self.memory_games()?;
        let entry = games.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        updater(&mut entry.game);
        Ok(entry.game.clone())
    }

    /// Reveal a tile and, when it completes a pair, schedule the delayed resolution
    pub fn reveal_tile(self: &Arc<Self>, id: Uuid, tile: usize) -> Result<MemoryMatchGame, AppError> {
        let mut games = self.memory_games()?;
        let entry = games.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;

        match entry.game.reveal_tile(tile) {
            RevealOutcome::Ignored => debug!("Ignored reveal of tile {} in game {}", tile, id),
            RevealOutcome::Revealed => debug!("Revealed tile {} in game {}", tile, id),
            RevealOutcome::PairPending(pair) => {
                debug!("Pair {:?} pending in game {}", pair, id);
                entry.cancel_resolution();
                entry.resolution = Some(schedule_resolution(Arc::clone(self), id, entry.epoch));
            }
        }
        Ok(entry.game.clone())
    }

    /// Settle the pending pair of a game, unless the game was removed or reshuffled
    pub fn resolve_memory(&self, id: Uuid, epoch: u64) -> Result<Option<Resolution>, AppError> {
        let mut games = self.memory_games()?;
        let Some(entry) = games.get_mut(&id) else {
            return Ok(None);
        };
        if entry.epoch != epoch {
            return Ok(None);
        }

        entry.resolution = None;
        let resolution = entry.game.resolve_pending();
        if resolution == Some(Resolution::Matched) && entry.game.is_complete() {
            info!(
                "Memory game {} completed in {} moves ({})",
                id,
                entry.game.move_count,
                entry.game.grade().label()
            );
        }
        Ok(resolution)
    }

    pub fn new_memory_game(&self, id: Uuid) -> Result<MemoryMatchGame, AppError> {
        let mut games = self.memory_games()?;
        let entry = games.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        entry.cancel_resolution();
        entry.epoch += 1;
        entry.game.new_game(&mut rand::thread_rng());
        Ok(entry.game.clone())
    }

    pub fn remove_memory(&self, id: Uuid) -> Result<(), AppError> {
        let mut entry = self
            .memory_games()?
            .remove(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        entry.cancel_resolution();
        info!("Removed memory game {}", id);
        Ok(())
    }

    /// Advance every hosted session by one second
    pub fn tick_all(&self) -> Result<TickSummary, AppError> {
        let mut summary = TickSummary::default();

        for (id, session) in self.breathing_sessions()?.iter_mut() {
            if !session.is_running {
                continue;
            }
            let goal_reached_before = session.is_complete();
            if session.tick() {
                debug!("Breathing session {} entered {:?}", id, session.phase);
            }
            if session.is_complete() && !goal_reached_before {
                info!("Breathing session {} reached {} cycles", id, session.cycles_completed);
            }
            summary.breathing += 1;
        }

        for entry in self.memory_games()?.values_mut() {
            if entry.game.status == GameStatus::InProgress {
                entry.game.tick();
                summary.memory += 1;
            }
        }

        Ok(summary)
    }

    /// Number of hosted breathing sessions and memory games
    pub fn session_counts(&self) -> Result<(usize, usize), AppError> {
        Ok((self.breathing_sessions()?.len(), self.memory_games()?.len()))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Phase, Symbol};

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            GameSettings::default(),
            UpstreamClient::new("http://127.0.0.1:9/".to_string(), "gpt-4".to_string(), None),
        ))
    }

    fn small_game() -> MemoryMatchGame {
        MemoryMatchGame::with_layout(&[Symbol::Brain, Symbol::Star, Symbol::Brain, Symbol::Star])
            .unwrap()
    }

    #[test]
    fn test_tick_all_skips_paused_sessions() {
        let state = state();
        let (running, _) = state.create_breathing(BreathingPattern::Beginner).unwrap();
        let (paused, _) = state.create_breathing(BreathingPattern::Beginner).unwrap();
        state.update_breathing(running, |s| s.start()).unwrap();

        for _ in 0..4 {
            assert_eq!(state.tick_all().unwrap().breathing, 1);
        }

        let running = state.get_breathing(running).unwrap();
        assert_eq!(running.phase, Phase::Hold);
        assert_eq!(running.session_seconds, 4);
        assert_eq!(state.get_breathing(paused).unwrap().session_seconds, 0);
    }

    #[test]
    fn test_tick_all_only_counts_games_in_progress() {
        let state = state();
        let (waiting, _) = state.insert_memory(small_game()).unwrap();
        let (playing, _) = state.insert_memory(small_game()).unwrap();
        state.update_memory(playing, |g| g.start()).unwrap();

        assert_eq!(state.tick_all().unwrap(), TickSummary { breathing: 0, memory: 1 });
        assert_eq!(state.get_memory(playing).unwrap().elapsed_seconds, 1);
        assert_eq!(state.get_memory(waiting).unwrap().elapsed_seconds, 0);
    }

    #[test]
    fn test_unknown_sessions_are_reported() {
        let state = state();
        let id = Uuid::new_v4();
        assert!(matches!(state.get_breathing(id), Err(AppError::SessionNotFound(_))));
        assert!(matches!(state.remove_memory(id), Err(AppError::SessionNotFound(_))));
    }

    #[test]
    fn test_stale_resolution_is_discarded() {
        let state = state();
        let (id, _) = state.insert_memory(small_game()).unwrap();
        state
            .update_memory(id, |g| {
                g.reveal_tile(0);
                g.reveal_tile(2);
            })
            .unwrap();

        assert_eq!(state.resolve_memory(id, 1).unwrap(), None);
        assert_eq!(state.resolve_memory(id, 0).unwrap(), Some(Resolution::Matched));
        assert_eq!(state.resolve_memory(Uuid::new_v4(), 0).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pair_resolves_after_display_delay() {
        let state = state();
        let (id, _) = state.insert_memory(small_game()).unwrap();

        state.reveal_tile(id, 0).unwrap();
        let game = state.reveal_tile(id, 1).unwrap();
        assert_eq!(game.revealed_pending, vec![0, 1]);

        // a third click inside the window does nothing
        let game = state.reveal_tile(id, 2).unwrap();
        assert!(!game.board[2].is_revealed);

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let game = state.get_memory(id).unwrap();
        assert!(game.revealed_pending.is_empty());
        assert!(!game.board[0].is_revealed && !game.board[1].is_revealed);
        assert_eq!(game.move_count, 1);
        assert_eq!(game.status, GameStatus::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_cancels_pending_resolution() {
        let state = state();
        let (id, _) = state.insert_memory(small_game()).unwrap();
        state.reveal_tile(id, 0).unwrap();
        state.reveal_tile(id, 2).unwrap();

        // the scheduled task holds a clone of the state until it runs or is dropped
        assert_eq!(Arc::strong_count(&state), 2);
        state.remove_memory(id).unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(Arc::strong_count(&state), 1);
        assert!(matches!(state.get_memory(id), Err(AppError::SessionNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_game_cancels_pending_resolution() {
        let state = state();
        let (id, _) = state.insert_memory(small_game()).unwrap();
        state.reveal_tile(id, 0).unwrap();
        state.reveal_tile(id, 2).unwrap();

        let game = state.new_memory_game(id).unwrap();
        assert_eq!(game.status, GameStatus::NotStarted);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        let game = state.get_memory(id).unwrap();
        assert_eq!(game.move_count, 0);
        assert_eq!(game.matched_count, 0);
    }
}
