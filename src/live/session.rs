use anyhow::Result;
use base64::Engine;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::config::LiveSessionConfig;
use super::playback::{AudioSink, PlaybackScheduler};
use crate::error::CompanionError;
use crate::media::{pcm, MediaBackend, MediaConstraints};
use crate::remote::{ClientCommand, MediaBlob, RealtimeConnector, ServerEvent};

/// Snapshot of a live session for status queries
#[derive(Debug, Clone, Serialize)]
pub struct LiveStatus {
    pub session_id: String,
    pub active: bool,
    pub muted: bool,
    pub video_off: bool,
    /// Playback-clock time where the next inbound chunk would start
    pub playback_cursor: f64,
    /// Reason the channel ended, if it failed
    pub last_error: Option<String>,
}

/// A live session that manages device capture, the realtime channel,
/// ordered media forwarding, and inbound playback scheduling.
///
/// All session state lives here, owned explicitly; there is no ambient
/// "current session" anywhere. `start` and `stop` are idempotent, and a
/// stop leaves no task or timer behind.
pub struct LiveSession {
    config: LiveSessionConfig,

    /// Local device seam
    backend: Mutex<Box<dyn MediaBackend>>,

    /// Opens the realtime channel to the remote service
    connector: Arc<dyn RealtimeConnector>,

    /// Whether the session is currently running
    active: Arc<AtomicBool>,

    /// Forwarders consult these per iteration; toggling never
    /// renegotiates the channel
    muted: Arc<AtomicBool>,
    video_off: Arc<AtomicBool>,

    /// Why the channel ended, when it ended badly
    last_error: Arc<Mutex<Option<String>>>,

    /// Inbound playback ordering state
    scheduler: Arc<Mutex<PlaybackScheduler>>,
    sink: Arc<Mutex<Box<dyn AudioSink>>>,

    /// Outbound command side of the open channel
    commands: Mutex<Option<mpsc::Sender<ClientCommand>>>,

    /// Handles for the three session tasks
    audio_task: Mutex<Option<JoinHandle<()>>>,
    video_task: Mutex<Option<JoinHandle<()>>>,
    inbound_task: Mutex<Option<JoinHandle<()>>>,
}

impl LiveSession {
    pub fn new(
        config: LiveSessionConfig,
        backend: Box<dyn MediaBackend>,
        connector: Arc<dyn RealtimeConnector>,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        Self {
            config,
            backend: Mutex::new(backend),
            connector,
            active: Arc::new(AtomicBool::new(false)),
            muted: Arc::new(AtomicBool::new(false)),
            video_off: Arc::new(AtomicBool::new(false)),
            last_error: Arc::new(Mutex::new(None)),
            scheduler: Arc::new(Mutex::new(PlaybackScheduler::new())),
            sink: Arc::new(Mutex::new(sink)),
            commands: Mutex::new(None),
            audio_task: Mutex::new(None),
            video_task: Mutex::new(None),
            inbound_task: Mutex::new(None),
        }
    }

    /// Acquire devices, open the channel, and begin forwarding.
    ///
    /// Fails with `DeviceAccess` before anything is started when the
    /// devices are unavailable; fails with `RemoteService` (devices
    /// released) when the channel cannot open. No automatic retry —
    /// retry is the caller starting again.
    pub async fn start(&self) -> Result<(), CompanionError> {
        if self.active.load(Ordering::SeqCst) {
            warn!("Live session already started");
            return Ok(());
        }

        info!("Starting live session: {}", self.config.session_id);

        {
            let mut last_error = self.last_error.lock().await;
            *last_error = None;
        }

        // Devices first: a denied permission means the session never starts.
        let stream = {
            let mut backend = self.backend.lock().await;
            backend.start(MediaConstraints::AUDIO_VIDEO).await?
        };

        let channel = match self
            .connector
            .connect(&self.config.session_id, &self.config.system_prompt)
            .await
        {
            Ok(channel) => channel,
            Err(e) => {
                // Release the devices we just grabbed.
                let mut backend = self.backend.lock().await;
                if let Err(stop_err) = backend.stop().await {
                    warn!("Failed to release devices after connect failure: {}", stop_err);
                }
                return Err(e);
            }
        };

        self.active.store(true, Ordering::SeqCst);

        {
            let mut commands = self.commands.lock().await;
            *commands = Some(channel.commands.clone());
        }

        // Outbound audio forwarder: capture order is preserved by the
        // single pipeline; muting skips forwarding but keeps draining.
        if let Some(mut audio_rx) = stream.audio {
            let active = Arc::clone(&self.active);
            let muted = Arc::clone(&self.muted);
            let command_tx = channel.commands.clone();
            let sample_rate = self.config.input_sample_rate;
            let channels = self.config.input_channels;

            let audio_task = tokio::spawn(async move {
                info!("Audio forwarder started");

                while let Some(frame) = audio_rx.recv().await {
                    if !active.load(Ordering::SeqCst) {
                        break;
                    }

                    if muted.load(Ordering::SeqCst) {
                        continue;
                    }

                    let shaped = pcm::shape_frame(frame, sample_rate, channels);
                    let blob = MediaBlob {
                        data: base64::engine::general_purpose::STANDARD
                            .encode(pcm::to_le_bytes(&shaped.samples)),
                        mime_type: format!("audio/pcm;rate={}", sample_rate),
                    };

                    if command_tx.send(ClientCommand::Audio(blob)).await.is_err() {
                        break;
                    }
                }

                info!("Audio forwarder stopped");
            });

            let mut handle = self.audio_task.lock().await;
            *handle = Some(audio_task);
        }

        // Outbound video forwarder: one downscaled still per interval,
        // skipped entirely while video is off.
        if let Some(mut camera) = stream.video {
            let active = Arc::clone(&self.active);
            let video_off = Arc::clone(&self.video_off);
            let command_tx = channel.commands.clone();
            let frame_interval = self.config.frame_interval;

            let video_task = tokio::spawn(async move {
                info!("Video forwarder started");

                let mut interval = tokio::time::interval(frame_interval);
                interval.tick().await; // tokio fires the first tick immediately

                loop {
                    interval.tick().await;

                    if !active.load(Ordering::SeqCst) {
                        break;
                    }

                    if video_off.load(Ordering::SeqCst) {
                        continue;
                    }

                    match camera.next_frame().await {
                        Ok(frame) => {
                            let blob = MediaBlob {
                                data: base64::engine::general_purpose::STANDARD.encode(&frame.jpeg),
                                mime_type: "image/jpeg".to_string(),
                            };

                            if command_tx.send(ClientCommand::Video(blob)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Camera frame grab failed: {}", e),
                    }
                }

                info!("Video forwarder stopped");
            });

            let mut handle = self.video_task.lock().await;
            *handle = Some(video_task);
        }

        // Inbound handler: schedule audio gapless, honor barge-in, and
        // go inactive on close or error (no automatic retry).
        {
            let active = Arc::clone(&self.active);
            let last_error = Arc::clone(&self.last_error);
            let scheduler = Arc::clone(&self.scheduler);
            let sink = Arc::clone(&self.sink);
            let mut events = channel.events;

            let inbound_task = tokio::spawn(async move {
                info!("Inbound handler started");

                while let Some(event) = events.recv().await {
                    match event {
                        ServerEvent::Audio(payload) => {
                            let duration = pcm::pcm_duration_secs(
                                payload.pcm.len(),
                                payload.sample_rate,
                                payload.channels,
                            );

                            let mut sink = sink.lock().await;
                            let now = sink.now();
                            let start = scheduler.lock().await.schedule(duration, now);
                            sink.start_at(payload, start);
                        }
                        ServerEvent::Interrupted => {
                            let mut sink = sink.lock().await;
                            sink.stop_all();
                            let now = sink.now();
                            scheduler.lock().await.interrupt(now);
                        }
                        ServerEvent::Closed => {
                            info!("Live channel closed");
                            break;
                        }
                        ServerEvent::Error(e) => {
                            error!("Live channel failed: {}", e);
                            let mut last_error = last_error.lock().await;
                            *last_error = Some(e);
                            break;
                        }
                    }
                }

                active.store(false, Ordering::SeqCst);
                info!("Inbound handler stopped");
            });

            let mut handle = self.inbound_task.lock().await;
            *handle = Some(inbound_task);
        }

        info!("Live session started: {}", self.config.session_id);

        Ok(())
    }

    /// Tear the session down: close the channel, release the devices,
    /// cancel the forwarders and all pending playback. A stop on an
    /// already-stopped session is a no-op.
    pub async fn stop(&self) -> Result<()> {
        let was_active = self.active.swap(false, Ordering::SeqCst);

        let had_channel = {
            let mut commands = self.commands.lock().await;
            match commands.take() {
                Some(command_tx) => {
                    let _ = command_tx.send(ClientCommand::Close).await;
                    true
                }
                None => false,
            }
        };

        if !was_active && !had_channel {
            return Ok(());
        }

        info!("Stopping live session: {}", self.config.session_id);

        // Release capture first; the audio forwarder drains out when the
        // frame channel closes.
        {
            let mut backend = self.backend.lock().await;
            if let Err(e) = backend.stop().await {
                warn!("Failed to stop media backend: {}", e);
            }
        }

        for slot in [&self.audio_task, &self.video_task, &self.inbound_task] {
            let mut handle = slot.lock().await;
            if let Some(task) = handle.take() {
                task.abort();
                if let Err(e) = task.await {
                    if !e.is_cancelled() {
                        error!("Session task panicked: {}", e);
                    }
                }
            }
        }

        // Nothing scheduled survives a stop.
        {
            let mut sink = self.sink.lock().await;
            sink.stop_all();
            let now = sink.now();
            self.scheduler.lock().await.interrupt(now);
        }

        info!("Live session stopped: {}", self.config.session_id);

        Ok(())
    }

    /// Flip the mute flag; returns the new value. The forwarder keeps
    /// draining capture either way.
    pub fn toggle_mute(&self) -> bool {
        !self.muted.fetch_xor(true, Ordering::SeqCst)
    }

    /// Flip the video flag; returns the new value.
    pub fn toggle_video(&self) -> bool {
        !self.video_off.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> LiveStatus {
        LiveStatus {
            session_id: self.config.session_id.clone(),
            active: self.active.load(Ordering::SeqCst),
            muted: self.muted.load(Ordering::SeqCst),
            video_off: self.video_off.load(Ordering::SeqCst),
            playback_cursor: self.scheduler.lock().await.cursor(),
            last_error: self.last_error.lock().await.clone(),
        }
    }
}
