//! MindWell - Game session server for the MindWell student wellness portal
//!
//! This is the main entry point for the mindwell application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use mindwell::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::game_ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("mindwell={},tower_http=info", config.log_level()))
        .init();

    info!("Starting mindwell server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms, reveal_delay={}ms, model={}",
        config.host, config.port, config.tick_ms, config.reveal_delay_ms, config.model
    );

    if config.tick_ms == 0 {
        anyhow::bail!("--tick-ms must be greater than zero");
    }

    let state = Arc::new(AppState::from_config(&config));
    if !state.chat.has_credential() {
        warn!("No chat API key configured, /ai-chat will answer with an error");
    }

    // Start the shared game clock
    let ticker_state = Arc::clone(&state);
    let ticker = tokio::spawn(async move {
        game_ticker_task(ticker_state).await;
    });

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /ai-chat                 - Chat proxy");
    info!("  POST   /breathing               - Create breathing session");
    info!("  GET    /breathing/:id           - Breathing session snapshot");
    info!("  POST   /breathing/:id/start     - Start or resume");
    info!("  POST   /breathing/:id/pause     - Pause");
    info!("  POST   /breathing/:id/reset     - Reset");
    info!("  PUT    /breathing/:id/pattern   - Change pattern");
    info!("  DELETE /breathing/:id           - End session");
    info!("  POST   /memory                  - Create memory game");
    info!("  GET    /memory/:id              - Memory game snapshot");
    info!("  POST   /memory/:id/start        - Start the clock");
    info!("  POST   /memory/:id/reveal       - Reveal a tile");
    info!("  POST   /memory/:id/new-game     - Reshuffle");
    info!("  DELETE /memory/:id              - End game");
    info!("  GET    /status                  - Server status");
    info!("  GET    /health                  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    ticker.abort();
    info!("Server shutdown complete");
    Ok(())
}
