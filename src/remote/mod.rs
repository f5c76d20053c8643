//! Remote intelligence service clients
//!
//! Three independent capabilities, consumed over two transports:
//! - Streamed text chat and single-shot vision analysis over the Gemini
//!   REST endpoints (reqwest)
//! - The realtime audio/video channel as a message-passing boundary,
//!   carried over the NATS bus by the production connector
//!
//! Every failure here converts to a user-visible, retryable state at the
//! boundary; nothing propagates as a process-level fault.

pub mod chat;
pub mod client;
pub mod live;
pub mod vision;

pub use chat::{ChatMessage, ChatRole, ChatSession, ChatTranscript};
pub use client::GeminiClient;
pub use live::{
    AudioPayload, ClientCommand, LiveChannel, MediaBlob, NatsConnector, RealtimeConnector,
    ServerEvent,
};
pub use vision::{BiometricProfile, StressLevel};
