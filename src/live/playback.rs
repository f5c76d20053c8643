use std::time::Instant;
use tokio::sync::mpsc;
use tracing::warn;

use crate::remote::AudioPayload;

/// One chunk on the playback schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledChunk {
    /// Playback-clock start time, seconds
    pub start: f64,
    /// Chunk duration, seconds
    pub duration: f64,
}

/// Orders inbound audio chunks back-to-back on the playback clock.
///
/// The cursor only moves forward: each chunk starts at
/// `max(cursor, now)` and pushes the cursor past its own end, so chunks
/// arriving with network jitter still play gapless and never overlap.
/// An interrupt throws away everything pending and snaps the cursor back
/// to the live clock.
#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    next_start: f64,
    pending: Vec<ScheduledChunk>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a chunk on the schedule; returns its start time.
    pub fn schedule(&mut self, duration: f64, now: f64) -> f64 {
        // Chunks that already finished playing are no longer pending.
        self.pending.retain(|c| c.start + c.duration > now);

        let start = self.next_start.max(now);
        self.pending.push(ScheduledChunk { start, duration });
        self.next_start = start + duration;

        start
    }

    /// Barge-in: drop everything pending and restart from the live clock.
    pub fn interrupt(&mut self, now: f64) {
        self.pending.clear();
        self.next_start = now;
    }

    /// Where the next chunk would start if it arrived at or before the
    /// cursor.
    pub fn cursor(&self) -> f64 {
        self.next_start
    }

    pub fn pending(&self) -> &[ScheduledChunk] {
        &self.pending
    }
}

/// Output seam for scheduled audio.
///
/// The controller never touches an audio device directly; it asks the
/// sink for the playback clock, hands it chunks with start times, and
/// tells it to drop everything on barge-in or stop.
pub trait AudioSink: Send {
    /// Current playback-clock time, seconds
    fn now(&self) -> f64;

    /// Begin playing the chunk at the given clock time
    fn start_at(&mut self, audio: AudioPayload, start: f64);

    /// Stop and discard everything scheduled or playing
    fn stop_all(&mut self);
}

/// Playback instruction emitted by [`ChannelSink`]
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    Start { audio: AudioPayload, at: f64 },
    StopAll,
}

/// Sink that forwards playback instructions over a channel to whatever
/// owns the output device (the HTTP layer hands them to the client).
/// The clock is seconds since the sink was created.
pub struct ChannelSink {
    epoch: Instant,
    tx: mpsc::UnboundedSender<PlaybackCommand>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PlaybackCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                epoch: Instant::now(),
                tx,
            },
            rx,
        )
    }
}

impl AudioSink for ChannelSink {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn start_at(&mut self, audio: AudioPayload, start: f64) {
        if self
            .tx
            .send(PlaybackCommand::Start { audio, at: start })
            .is_err()
        {
            warn!("Playback consumer is gone; dropping chunk");
        }
    }

    fn stop_all(&mut self) {
        let _ = self.tx.send(PlaybackCommand::StopAll);
    }
}
