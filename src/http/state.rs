use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::breathing::BreathingPacer;
use crate::live::{LiveSession, PlaybackCommand};
use crate::remote::{ChatSession, GeminiClient};
use crate::store::WellnessStore;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Persisted wellness collections
    pub store: Arc<WellnessStore>,

    /// Remote chat/vision/reflection client
    pub gemini: Arc<GeminiClient>,

    /// The running chat conversation (one per service instance, like the
    /// chat view it replaces)
    pub chat: Arc<Mutex<ChatSession>>,

    /// Breathing exercise pacer
    pub breathing: Arc<BreathingPacer>,

    /// The live audio/video session controller
    pub live: Arc<LiveSession>,

    /// Scheduled AI playback, drained by the client
    pub playback: Arc<Mutex<mpsc::UnboundedReceiver<PlaybackCommand>>>,
}
