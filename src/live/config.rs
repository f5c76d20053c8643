use serde::{Deserialize, Serialize};
use std::time::Duration;

/// System prompt for the live audio/video companion
pub const LIVE_SYSTEM_PROMPT: &str = "You are Serenity Pro, a professional therapist. \
You can see the user and hear them. Respond with deep empathy, observe their facial \
expressions and tone, and guide them through their emotions. Maintain a professional \
yet warm therapeutic stance.";

/// Configuration for a live session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// System prompt sent when the channel opens
    pub system_prompt: String,

    /// Outbound audio format (the service expects 16kHz mono)
    pub input_sample_rate: u32,
    pub input_channels: u16,

    /// Camera still cadence (1 frame per second keeps the channel cheap)
    pub frame_interval: Duration,
}

impl Default for LiveSessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("live-{}", uuid::Uuid::new_v4()),
            system_prompt: LIVE_SYSTEM_PROMPT.to_string(),
            input_sample_rate: 16000,
            input_channels: 1,
            frame_interval: Duration::from_secs(1),
        }
    }
}
