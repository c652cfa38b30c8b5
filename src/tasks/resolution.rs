//! Delayed resolution of a revealed memory pair

use std::sync::Arc;
use tokio::{task::AbortHandle, time::sleep};
use tracing::{debug, error};
use uuid::Uuid;

use crate::state::AppState;

/// Resolve the pending pair of `game_id` once the display delay has passed.
///
/// The returned handle is stored with the game so that deleting or
/// reshuffling it cancels the resolution.
pub fn schedule_resolution(state: Arc<AppState>, game_id: Uuid, epoch: u64) -> AbortHandle {
    let delay = state.settings.reveal_delay;

    tokio::spawn(async move {
        sleep(delay).await;

        match state.resolve_memory(game_id, epoch) {
            Ok(Some(resolution)) => debug!("Game {} pair resolved: {:?}", game_id, resolution),
            Ok(None) => debug!("Game {} had nothing to resolve", game_id),
            Err(e) => error!("Failed to resolve pair for game {}: {}", game_id, e),
        }
    })
    .abort_handle()
}
