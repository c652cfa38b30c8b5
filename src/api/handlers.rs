//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::AppError,
    services::{ChatBackend, ChatError, ChatReply, ChatRequest},
    state::{AppState, BreathingPattern},
};
use super::responses::{BreathingView, HealthResponse, MemoryView, StatusResponse};

/// Session id taken from the `:id` path segment
#[derive(Debug, Clone, Copy)]
pub struct SessionId(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Uuid::parse_str(&raw)
            .map(SessionId)
            .map_err(|_| AppError::BadRequest(format!("invalid session id '{}'", raw)))
    }
}

/// Parse a JSON request body regardless of its content type
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("invalid body: {}", e)))
}

/// Body carrying a breathing pattern name
#[derive(Debug, Default, Deserialize)]
pub struct PatternRequest {
    pub pattern: Option<String>,
}

impl PatternRequest {
    /// An empty body means no pattern; anything else must be valid JSON
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        parse_body(body)
    }

    fn resolve(&self) -> Result<Option<BreathingPattern>, AppError> {
        match self.pattern.as_deref() {
            None => Ok(None),
            Some(name) => BreathingPattern::from_name(name)
                .map(Some)
                .ok_or_else(|| AppError::BadRequest(format!("unknown pattern '{}'", name))),
        }
    }
}

/// Body of a tile reveal. Indexes outside the board are ignored by the game.
#[derive(Debug, Deserialize)]
pub struct RevealRequest {
    pub tile: i64,
}

impl RevealRequest {
    /// Board index, with negative values mapped past the end of any board
    pub fn index(&self) -> usize {
        usize::try_from(self.tile).unwrap_or(usize::MAX)
    }
}

/// Handle POST /ai-chat - Forward a conversation to the chat-completion API
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatReply>, ChatError> {
    let request = ChatRequest::from_body(&body)?;
    info!("Chat request with {} messages", request.messages.len());

    let message = state.chat.complete(&request.messages).await?;
    Ok(Json(ChatReply { message }))
}

/// Handle POST /breathing - Create a breathing session
pub async fn create_breathing_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<BreathingView>), AppError> {
    let request = PatternRequest::from_body(&body)?;
    let pattern = request.resolve()?.unwrap_or_default();

    let (id, session) = state.create_breathing(pattern)?;
    Ok((StatusCode::CREATED, Json(BreathingView::new(id, &session))))
}

/// Handle GET /breathing/:id
pub async fn get_breathing_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
) -> Result<Json<BreathingView>, AppError> {
    let session = state.get_breathing(id)?;
    Ok(Json(BreathingView::new(id, &session)))
}

/// Handle POST /breathing/:id/start
pub async fn start_breathing_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
) -> Result<Json<BreathingView>, AppError> {
    let session = state.update_breathing(id, |s| s.start())?;
    info!("Breathing session {} started", id);
    Ok(Json(BreathingView::new(id, &session)))
}

/// Handle POST /breathing/:id/pause
pub async fn pause_breathing_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
) -> Result<Json<BreathingView>, AppError> {
    let session = state.update_breathing(id, |s| s.pause())?;
    info!("Breathing session {} paused", id);
    Ok(Json(BreathingView::new(id, &session)))
}

/// Handle POST /breathing/:id/reset
pub async fn reset_breathing_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
) -> Result<Json<BreathingView>, AppError> {
    let session = state.update_breathing(id, |s| s.reset())?;
    info!("Breathing session {} reset", id);
    Ok(Json(BreathingView::new(id, &session)))
}

/// Handle PUT /breathing/:id/pattern - Switch the duration profile
pub async fn set_pattern_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
    body: Bytes,
) -> Result<Json<BreathingView>, AppError> {
    let pattern = PatternRequest::from_body(&body)?
        .resolve()?
        .ok_or_else(|| AppError::BadRequest("missing pattern".to_string()))?;

    let session = state.update_breathing(id, |s| s.set_pattern(pattern))?;
    info!("Breathing session {} switched to {}", id, pattern.name());
    Ok(Json(BreathingView::new(id, &session)))
}

/// Handle DELETE /breathing/:id - Tear the session down
pub async fn delete_breathing_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
) -> Result<StatusCode, AppError> {
    state.remove_breathing(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /memory - Create a freshly shuffled memory game
pub async fn create_memory_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<MemoryView>), AppError> {
    let (id, game) = state.create_memory()?;
    Ok((StatusCode::CREATED, Json(MemoryView::new(id, &game))))
}

/// Handle GET /memory/:id
pub async fn get_memory_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
) -> Result<Json<MemoryView>, AppError> {
    let game = state.get_memory(id)?;
    Ok(Json(MemoryView::new(id, &game)))
}

/// Handle POST /memory/:id/start - Start the clock without revealing a tile
pub async fn start_memory_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
) -> Result<Json<MemoryView>, AppError> {
    let game = state.update_memory(id, |g| g.start())?;
    Ok(Json(MemoryView::new(id, &game)))
}

/// Handle POST /memory/:id/reveal - Flip a tile face-up
pub async fn reveal_tile_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
    body: Bytes,
) -> Result<Json<MemoryView>, AppError> {
    let request: RevealRequest = parse_body(&body)?;
    let game = state.reveal_tile(id, request.index())?;
    Ok(Json(MemoryView::new(id, &game)))
}

/// Handle POST /memory/:id/new-game - Reshuffle and reset counters
pub async fn new_memory_game_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
) -> Result<Json<MemoryView>, AppError> {
    let game = state.new_memory_game(id)?;
    info!("Memory game {} reshuffled", id);
    Ok(Json(MemoryView::new(id, &game)))
}

/// Handle DELETE /memory/:id - Tear the game down and cancel its timers
pub async fn delete_memory_handler(
    State(state): State<Arc<AppState>>,
    SessionId(id): SessionId,
) -> Result<StatusCode, AppError> {
    state.remove_memory(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle GET /status - Return current server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, AppError> {
    let (breathing_sessions, memory_games) = state.session_counts()?;

    Ok(Json(StatusResponse {
        breathing_sessions,
        memory_games,
        tick_interval_ms: state.settings.tick_interval.as_millis() as u64,
        reveal_delay_ms: state.settings.reveal_delay.as_millis() as u64,
        chat_configured: state.chat.has_credential(),
        chat_model: state.chat.model().to_string(),
        uptime: state.get_uptime(),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_body_parsing() {
        assert!(PatternRequest::from_body(b"").unwrap().pattern.is_none());
        assert!(PatternRequest::from_body(b" \n").unwrap().pattern.is_none());
        assert_eq!(
            PatternRequest::from_body(br#"{"pattern":"advanced"}"#).unwrap().pattern.as_deref(),
            Some("advanced")
        );
        assert!(matches!(PatternRequest::from_body(br#"{"pattern":42}"#), Err(AppError::BadRequest(_))));
        assert!(matches!(PatternRequest::from_body(br#"{"pattern":"#), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_negative_tile_maps_off_board() {
        assert_eq!(RevealRequest { tile: 3 }.index(), 3);
        assert_eq!(RevealRequest { tile: -1 }.index(), usize::MAX);
    }
}
