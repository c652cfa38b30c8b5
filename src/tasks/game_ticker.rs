//! Shared game clock background task

use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that advances every hosted session once per tick interval
pub async fn game_ticker_task(state: Arc<AppState>) {
    info!(
        "Starting game ticker task ({}ms interval)",
        state.settings.tick_interval.as_millis()
    );

    let mut ticker = interval(state.settings.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match state.tick_all() {
            Ok(summary) => {
                if summary.breathing > 0 || summary.memory > 0 {
                    debug!(
                        "Ticked {} breathing sessions and {} memory games",
                        summary.breathing, summary.memory
                    );
                }
            }
            Err(e) => error!("Failed to tick sessions: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::UpstreamClient,
        state::{BreathingPattern, GameSettings, Phase},
    };
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_ticker_drives_a_full_cycle() {
        let state = Arc::new(AppState::new(
            GameSettings::default(),
            UpstreamClient::new("http://127.0.0.1:9/".to_string(), "gpt-4".to_string(), None),
        ));
        let (id, _) = state.create_breathing(BreathingPattern::Beginner).unwrap();
        state.update_breathing(id, |s| s.start()).unwrap();

        let ticker = tokio::spawn(game_ticker_task(Arc::clone(&state)));
        tokio::time::sleep(Duration::from_millis(12_500)).await;

        let session = state.get_breathing(id).unwrap();
        assert_eq!(session.session_seconds, 12);
        assert_eq!(session.cycles_completed, 1);
        assert_eq!(session.phase, Phase::Inhale);

        // tearing the session down stops its clock
        state.remove_breathing(id).unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(state.get_breathing(id).is_err());

        ticker.abort();
    }
}
