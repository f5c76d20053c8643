use super::state::AppState;
use crate::error::CompanionError;
use crate::live::PlaybackCommand;
use crate::store::{JournalEntry, Mood, MoodEntry};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddMoodRequest {
    pub mood: Mood,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct AddMoodResponse {
    pub entry: MoodEntry,
    /// One-sentence AI reflection (fixed line when the service is down)
    pub reflection: String,
}

#[derive(Debug, Deserialize)]
pub struct AddJournalRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Base64-encoded JPEG still
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct PlaybackChunk {
    /// Base64-encoded PCM
    pub pcm: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// Playback-clock start time, seconds
    pub start: f64,
}

#[derive(Debug, Serialize)]
pub struct PlaybackResponse {
    /// True when a barge-in or stop invalidated earlier chunks; the
    /// client should drop anything still queued before playing these.
    pub flushed: bool,
    pub chunks: Vec<PlaybackChunk>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn companion_error(e: CompanionError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        CompanionError::DeviceAccess(_) => StatusCode::FORBIDDEN,
        CompanionError::RemoteService(_) => StatusCode::BAD_GATEWAY,
    };

    (status, Json(ErrorResponse { error: e.to_string() }))
}

fn storage_error(e: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    error!("Storage failure: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "storage failure".to_string(),
        }),
    )
}

// ============================================================================
// Wellness records
// ============================================================================

/// POST /moods — record a mood check-in and return an AI reflection
pub async fn add_mood(
    State(state): State<AppState>,
    Json(req): Json<AddMoodRequest>,
) -> impl IntoResponse {
    let entry = MoodEntry::new(req.mood, req.note);

    if let Err(e) = state.store.add_mood(entry.clone()) {
        return storage_error(e).into_response();
    }

    info!("Mood entry recorded: {}", entry.id);

    let reflection = state.gemini.mood_reflection(&entry.note).await;

    (StatusCode::OK, Json(AddMoodResponse { entry, reflection })).into_response()
}

/// GET /moods — the full collection, newest first
pub async fn list_moods(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.moods() {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => storage_error(e).into_response(),
    }
}

/// POST /journal — record a journal entry
pub async fn add_journal(
    State(state): State<AppState>,
    Json(req): Json<AddJournalRequest>,
) -> impl IntoResponse {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "title and content must be non-empty".to_string(),
            }),
        )
            .into_response();
    }

    let entry = JournalEntry::new(req.title, req.content);

    match state.store.add_journal(entry.clone()) {
        Ok(_) => {
            info!("Journal entry recorded: {}", entry.id);
            (StatusCode::OK, Json(entry)).into_response()
        }
        Err(e) => storage_error(e).into_response(),
    }
}

/// GET /journal — the full collection, newest first
pub async fn list_journal(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.journal() {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => storage_error(e).into_response(),
    }
}

// ============================================================================
// Chat and vision
// ============================================================================

/// POST /chat — send a message, get the (streamed, then frozen) reply
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "message must be non-empty".to_string(),
            }),
        )
            .into_response();
    }

    let mut chat = state.chat.lock().await;
    let reply = chat.send(&req.message).await;

    (StatusCode::OK, Json(ChatResponse { reply })).into_response()
}

/// GET /chat — the conversation so far
pub async fn chat_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let chat = state.chat.lock().await;
    (
        StatusCode::OK,
        Json(chat.transcript().messages().to_vec()),
    )
        .into_response()
}

/// POST /scan — single-shot emotion analysis of a camera still
pub async fn scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> impl IntoResponse {
    let jpeg = match base64::engine::general_purpose::STANDARD.decode(&req.image) {
        Ok(bytes) => bytes,
        Err(_) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: "image must be base64-encoded JPEG".to_string(),
                }),
            )
                .into_response();
        }
    };

    match state.gemini.analyze(&jpeg).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => companion_error(e).into_response(),
    }
}

// ============================================================================
// Breathing exercise
// ============================================================================

/// POST /breathing/start
pub async fn breathing_start(State(state): State<AppState>) -> impl IntoResponse {
    state.breathing.start().await;
    (StatusCode::OK, Json(state.breathing.state())).into_response()
}

/// POST /breathing/stop
pub async fn breathing_stop(State(state): State<AppState>) -> impl IntoResponse {
    state.breathing.stop().await;
    (StatusCode::OK, Json(state.breathing.state())).into_response()
}

/// GET /breathing — current phase snapshot
pub async fn breathing_state(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.breathing.state())).into_response()
}

// ============================================================================
// Live session
// ============================================================================

/// POST /live/start
pub async fn live_start(State(state): State<AppState>) -> impl IntoResponse {
    match state.live.start().await {
        Ok(()) => (StatusCode::OK, Json(state.live.status().await)).into_response(),
        Err(e) => companion_error(e).into_response(),
    }
}

/// POST /live/stop
pub async fn live_stop(State(state): State<AppState>) -> impl IntoResponse {
    match state.live.stop().await {
        Ok(()) => (StatusCode::OK, Json(state.live.status().await)).into_response(),
        Err(e) => {
            error!("Failed to stop live session: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to stop session".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /live/mute — toggle, returns the new flag
pub async fn live_toggle_mute(State(state): State<AppState>) -> impl IntoResponse {
    let muted = state.live.toggle_mute();
    (StatusCode::OK, Json(ToggleResponse { enabled: muted })).into_response()
}

/// POST /live/video — toggle, returns the new flag
pub async fn live_toggle_video(State(state): State<AppState>) -> impl IntoResponse {
    let video_off = state.live.toggle_video();
    (StatusCode::OK, Json(ToggleResponse { enabled: video_off })).into_response()
}

/// GET /live — session status
pub async fn live_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.live.status().await)).into_response()
}

/// GET /live/playback — drain scheduled AI audio for the client to play
pub async fn live_playback(State(state): State<AppState>) -> impl IntoResponse {
    let mut rx = state.playback.lock().await;
    let mut flushed = false;
    let mut chunks = Vec::new();

    while let Ok(command) = rx.try_recv() {
        match command {
            PlaybackCommand::Start { audio, at } => chunks.push(PlaybackChunk {
                pcm: base64::engine::general_purpose::STANDARD.encode(&audio.pcm),
                sample_rate: audio.sample_rate,
                channels: audio.channels,
                start: at,
            }),
            PlaybackCommand::StopAll => {
                // Everything queued before this point is invalid.
                flushed = true;
                chunks.clear();
            }
        }
    }

    (StatusCode::OK, Json(PlaybackResponse { flushed, chunks })).into_response()
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
