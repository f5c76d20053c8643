use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Wellness records
        .route(
            "/moods",
            get(handlers::list_moods).post(handlers::add_mood),
        )
        .route(
            "/journal",
            get(handlers::list_journal).post(handlers::add_journal),
        )
        // Chat companion
        .route("/chat", get(handlers::chat_transcript).post(handlers::chat))
        // Emotion scan
        .route("/scan", post(handlers::scan))
        // Breathing exercise
        .route("/breathing", get(handlers::breathing_state))
        .route("/breathing/start", post(handlers::breathing_start))
        .route("/breathing/stop", post(handlers::breathing_stop))
        // Live session control
        .route("/live", get(handlers::live_status))
        .route("/live/start", post(handlers::live_start))
        .route("/live/stop", post(handlers::live_stop))
        .route("/live/mute", post(handlers::live_toggle_mute))
        .route("/live/video", post(handlers::live_toggle_video))
        .route("/live/playback", get(handlers::live_playback))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
