use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::client::GeminiClient;
use crate::error::CompanionError;

/// System prompt for the text chat companion
pub const CHAT_SYSTEM_PROMPT: &str = "You are a clinical-grade AI therapist named Serenity. \
Use CBT and DBT principles to guide users. Keep responses empathetic but professional. \
Always prioritize safety and provide crisis resources if high distress is detected.";

/// Opening message shown before the user has said anything
pub const CHAT_GREETING: &str =
    "Hello, I'm Serenity. I'm here to listen and support you. How are you feeling today?";

/// Shown in place of a reply when the remote service fails
pub const CHAT_FALLBACK: &str =
    "My neural link is currently unstable. Please wait a moment while I reconnect.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message in a chat session. Assistant text is mutable while the
/// reply streams in, then frozen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// In-memory conversation state for one chat session. Not persisted;
/// lives only as long as the session does.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    /// A fresh transcript, seeded with the companion greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(ChatRole::Assistant, CHAT_GREETING)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(ChatRole::User, text));
    }

    /// Open an empty assistant message for a streaming reply.
    pub fn begin_reply(&mut self) {
        self.messages.push(ChatMessage::new(ChatRole::Assistant, ""));
    }

    /// Append a streamed chunk to the in-flight reply.
    pub fn append_chunk(&mut self, chunk: &str) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == ChatRole::Assistant {
                last.text.push_str(chunk);
            }
        }
    }

    /// Replace the in-flight reply wholesale (fallback path).
    pub fn replace_reply(&mut self, text: impl Into<String>) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == ChatRole::Assistant {
                last.text = text.into();
            }
        }
    }

    /// Text of the most recent reply.
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .map(|m| m.text.as_str())
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

/// A chat session bound to the remote client.
///
/// Failures never escape: a broken stream leaves the fallback line in
/// the transcript and the session stays usable for the next send.
pub struct ChatSession {
    client: Arc<GeminiClient>,
    transcript: ChatTranscript,
}

impl ChatSession {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self {
            client,
            transcript: ChatTranscript::new(),
        }
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    /// Send a user message and stream the reply into the transcript.
    /// Returns the final (frozen) reply text.
    pub async fn send(&mut self, text: &str) -> String {
        self.transcript.push_user(text);
        self.transcript.begin_reply();

        let mut chunks = match self
            .client
            .stream_chat(CHAT_SYSTEM_PROMPT, self.transcript.messages())
            .await
        {
            Ok(rx) => rx,
            Err(e) => {
                warn!("Chat stream failed to open: {}", e);
                self.transcript.replace_reply(CHAT_FALLBACK);
                return CHAT_FALLBACK.to_string();
            }
        };

        while let Some(chunk) = chunks.recv().await {
            match chunk {
                Ok(text) => self.transcript.append_chunk(&text),
                Err(CompanionError::RemoteService(e)) => {
                    warn!("Chat stream broke mid-reply: {}", e);
                    self.transcript.replace_reply(CHAT_FALLBACK);
                    break;
                }
                Err(e) => {
                    warn!("Chat stream error: {}", e);
                    self.transcript.replace_reply(CHAT_FALLBACK);
                    break;
                }
            }
        }

        self.transcript
            .last_reply()
            .unwrap_or(CHAT_FALLBACK)
            .to_string()
    }
}
