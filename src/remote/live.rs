use base64::Engine;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::CompanionError;

/// A base64-encoded media payload with its MIME type, the unit both
/// forwarders put on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaBlob {
    pub data: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Commands the session controller issues to the remote channel
#[derive(Debug, Clone)]
pub enum ClientCommand {
    /// One encoded audio chunk, in capture order
    Audio(MediaBlob),
    /// One downscaled camera still
    Video(MediaBlob),
    /// Close the channel; no further commands follow
    Close,
}

/// Decoded audio chunk received from the remote service
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Events the remote channel delivers to the session controller
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// An audio chunk to schedule for playback
    Audio(AudioPayload),
    /// The user's live speech preempted pending playback
    Interrupted,
    /// The channel closed normally
    Closed,
    /// The channel failed; the session reports and goes inactive
    Error(String),
}

/// An open realtime channel: commands out, events in.
///
/// This is the whole contract between the session controller and the
/// remote service; ordering on each side is the mpsc ordering.
pub struct LiveChannel {
    pub commands: mpsc::Sender<ClientCommand>,
    pub events: mpsc::Receiver<ServerEvent>,
}

/// Opens realtime channels. The production connector rides the NATS
/// bus; tests connect an in-process fake.
#[async_trait::async_trait]
pub trait RealtimeConnector: Send + Sync {
    async fn connect(
        &self,
        session_id: &str,
        system_prompt: &str,
    ) -> Result<LiveChannel, CompanionError>;
}

// ============================================================================
// Wire messages (NATS payloads)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct SessionOpenMessage {
    session_id: String,
    system_prompt: String,
    timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LiveMediaMessage {
    session_id: String,
    sequence: u32,
    media: MediaBlob,
    timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LiveEventMessage {
    session_id: String,
    kind: String, // "audio" | "interrupted" | "closed" | "error"
    #[serde(default)]
    pcm: String, // base64, audio events only
    #[serde(default)]
    sample_rate: u32,
    #[serde(default)]
    channels: u16,
    #[serde(default)]
    message: String, // error events only
}

impl LiveEventMessage {
    fn into_event(self) -> Option<ServerEvent> {
        match self.kind.as_str() {
            "audio" => {
                let pcm = match base64::engine::general_purpose::STANDARD.decode(&self.pcm) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Dropping audio event with bad payload: {}", e);
                        return None;
                    }
                };
                Some(ServerEvent::Audio(AudioPayload {
                    pcm,
                    sample_rate: self.sample_rate,
                    channels: self.channels,
                }))
            }
            "interrupted" => Some(ServerEvent::Interrupted),
            "closed" => Some(ServerEvent::Closed),
            "error" => Some(ServerEvent::Error(self.message)),
            other => {
                warn!("Dropping unknown live event kind: {}", other);
                None
            }
        }
    }
}

// ============================================================================
// NATS connector
// ============================================================================

/// Carries the realtime channel over NATS subjects:
/// `live.session.{id}.{open,audio,video,close}` outbound and
/// `live.session.{id}.events` inbound.
pub struct NatsConnector {
    url: String,
}

impl NatsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl RealtimeConnector for NatsConnector {
    async fn connect(
        &self,
        session_id: &str,
        system_prompt: &str,
    ) -> Result<LiveChannel, CompanionError> {
        info!("Connecting live channel via NATS at {}", self.url);

        let client = async_nats::connect(&self.url)
            .await
            .map_err(|e| CompanionError::remote(format!("NATS connect failed: {e}")))?;

        let open = SessionOpenMessage {
            session_id: session_id.to_string(),
            system_prompt: system_prompt.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&open)
            .map_err(|e| CompanionError::remote(format!("encode failed: {e}")))?;

        client
            .publish(format!("live.session.{session_id}.open"), payload.into())
            .await
            .map_err(|e| CompanionError::remote(format!("open publish failed: {e}")))?;

        let mut subscriber = client
            .subscribe(format!("live.session.{session_id}.events"))
            .await
            .map_err(|e| CompanionError::remote(format!("event subscribe failed: {e}")))?;

        info!("Live channel open for session {}", session_id);

        let (command_tx, mut command_rx) = mpsc::channel::<ClientCommand>(64);
        let (event_tx, event_rx) = mpsc::channel::<ServerEvent>(64);

        // Outbound: drain commands in order onto their subjects.
        let outbound_client = client.clone();
        let outbound_session = session_id.to_string();
        tokio::spawn(async move {
            let mut sequence: u32 = 0;

            while let Some(command) = command_rx.recv().await {
                let (subject, media) = match command {
                    ClientCommand::Audio(media) => {
                        (format!("live.session.{outbound_session}.audio"), media)
                    }
                    ClientCommand::Video(media) => {
                        (format!("live.session.{outbound_session}.video"), media)
                    }
                    ClientCommand::Close => {
                        let _ = outbound_client
                            .publish(
                                format!("live.session.{outbound_session}.close"),
                                Vec::<u8>::new().into(),
                            )
                            .await;
                        break;
                    }
                };

                let message = LiveMediaMessage {
                    session_id: outbound_session.clone(),
                    sequence,
                    media,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
                sequence += 1;

                let payload = match serde_json::to_vec(&message) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Failed to encode live media message: {}", e);
                        continue;
                    }
                };

                if let Err(e) = outbound_client.publish(subject, payload.into()).await {
                    warn!("Failed to publish live media: {}", e);
                }
            }

            info!("Live outbound task stopped");
        });

        // Inbound: translate bus messages into channel events.
        let inbound_session = session_id.to_string();
        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<LiveEventMessage>(&msg.payload) {
                    Ok(event) if event.session_id == inbound_session => {
                        if let Some(event) = event.into_event() {
                            if event_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(_) => {} // another session's traffic
                    Err(e) => warn!("Failed to parse live event: {}", e),
                }
            }

            // Subscription ended; tell the controller the channel closed.
            let _ = event_tx.send(ServerEvent::Closed).await;

            info!("Live inbound task stopped");
        });

        Ok(LiveChannel {
            commands: command_tx,
            events: event_rx,
        })
    }
}
