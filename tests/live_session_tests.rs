// Integration tests for the live session controller, run against the
// synthetic capture backend, a fake realtime connector, and a recording
// audio sink — no devices and no network.

use base64::Engine;
use serenity_companion::error::CompanionError;
use serenity_companion::live::{AudioSink, LiveSession, LiveSessionConfig};
use serenity_companion::media::{SyntheticBackend, SyntheticConfig};
use serenity_companion::remote::{
    AudioPayload, ClientCommand, LiveChannel, RealtimeConnector, ServerEvent,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Fakes
// ============================================================================

/// Hands out one pre-built channel, then refuses further connects.
struct FakeConnector {
    channel: Mutex<Option<LiveChannel>>,
}

impl FakeConnector {
    fn with_channel(channel: LiveChannel) -> Self {
        Self {
            channel: Mutex::new(Some(channel)),
        }
    }

    fn refusing() -> Self {
        Self {
            channel: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl RealtimeConnector for FakeConnector {
    async fn connect(
        &self,
        _session_id: &str,
        _system_prompt: &str,
    ) -> Result<LiveChannel, CompanionError> {
        self.channel
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| CompanionError::remote("connect refused"))
    }
}

/// Builds the two sides of a fake channel: the session gets the
/// `LiveChannel`, the test keeps the command receiver and event sender.
fn fake_channel() -> (
    LiveChannel,
    mpsc::Receiver<ClientCommand>,
    mpsc::Sender<ServerEvent>,
) {
    let (command_tx, command_rx) = mpsc::channel(64);
    let (event_tx, event_rx) = mpsc::channel(64);

    (
        LiveChannel {
            commands: command_tx,
            events: event_rx,
        },
        command_rx,
        event_tx,
    )
}

#[derive(Debug, Clone, PartialEq)]
enum SinkCall {
    Start { at: f64, bytes: usize },
    StopAll,
}

/// Records every playback instruction; the clock is set by the test.
#[derive(Clone, Default)]
struct TestSink {
    clock: Arc<Mutex<f64>>,
    log: Arc<Mutex<Vec<SinkCall>>>,
}

impl TestSink {
    fn set_clock(&self, now: f64) {
        *self.clock.lock().unwrap() = now;
    }

    fn calls(&self) -> Vec<SinkCall> {
        self.log.lock().unwrap().clone()
    }
}

impl AudioSink for TestSink {
    fn now(&self) -> f64 {
        *self.clock.lock().unwrap()
    }

    fn start_at(&mut self, audio: AudioPayload, start: f64) {
        self.log.lock().unwrap().push(SinkCall::Start {
            at: start,
            bytes: audio.pcm.len(),
        });
    }

    fn stop_all(&mut self) {
        self.log.lock().unwrap().push(SinkCall::StopAll);
    }
}

fn capture_config(frames: usize) -> SyntheticConfig {
    SyntheticConfig {
        frames,
        ..SyntheticConfig::default()
    }
}

fn build_session(
    capture: SyntheticConfig,
    connector: FakeConnector,
    sink: TestSink,
) -> LiveSession {
    LiveSession::new(
        LiveSessionConfig {
            session_id: "live-test".to_string(),
            ..LiveSessionConfig::default()
        },
        Box::new(SyntheticBackend::new(capture)),
        Arc::new(connector),
        Box::new(sink),
    )
}

/// One second of 24kHz mono 16-bit PCM is 48000 bytes.
fn audio_event(seconds: f64) -> ServerEvent {
    let bytes = (seconds * 24000.0 * 2.0) as usize;
    ServerEvent::Audio(AudioPayload {
        pcm: vec![0u8; bytes],
        sample_rate: 24000,
        channels: 1,
    })
}

fn first_sample(blob_data: &str) -> i16 {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(blob_data)
        .expect("valid base64 payload");
    i16::from_le_bytes([bytes[0], bytes[1]])
}

// ============================================================================
// Outbound forwarding
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_audio_chunks_forwarded_in_capture_order() {
    let (channel, mut command_rx, _event_tx) = fake_channel();
    let session = build_session(
        capture_config(5),
        FakeConnector::with_channel(channel),
        TestSink::default(),
    );

    session.start().await.expect("session starts");

    // The synthetic backend stamps each frame with a ramp value, so
    // capture order is visible in the decoded payloads.
    let mut order = Vec::new();
    while order.len() < 5 {
        match command_rx.recv().await.expect("channel stays open") {
            ClientCommand::Audio(blob) => {
                assert!(blob.mime_type.starts_with("audio/pcm"));
                order.push(first_sample(&blob.data));
            }
            ClientCommand::Video(_) => {} // interleaved stills are fine
            ClientCommand::Close => panic!("unexpected close"),
        }
    }

    assert_eq!(order, vec![0, 1, 2, 3, 4]);

    session.stop().await.expect("session stops");
}

#[tokio::test(start_paused = true)]
async fn test_muted_session_forwards_no_audio() {
    let (channel, mut command_rx, _event_tx) = fake_channel();
    let session = build_session(
        capture_config(5),
        FakeConnector::with_channel(channel),
        TestSink::default(),
    );

    assert!(session.toggle_mute(), "toggle reports the new value");
    session.start().await.expect("session starts");

    // Capture keeps running and video stills keep flowing; audio must not.
    let mut stills = 0;
    while stills < 3 {
        match tokio::time::timeout(Duration::from_secs(5), command_rx.recv()).await {
            Ok(Some(ClientCommand::Audio(_))) => panic!("audio forwarded while muted"),
            Ok(Some(ClientCommand::Video(_))) => stills += 1,
            Ok(Some(ClientCommand::Close)) | Ok(None) => break,
            Err(_) => break,
        }
    }

    assert_eq!(stills, 3);

    session.stop().await.expect("session stops");
}

#[tokio::test(start_paused = true)]
async fn test_video_off_skips_stills_entirely() {
    let (channel, mut command_rx, _event_tx) = fake_channel();
    let session = build_session(
        capture_config(5),
        FakeConnector::with_channel(channel),
        TestSink::default(),
    );

    assert!(session.toggle_video());
    session.start().await.expect("session starts");

    let mut audio = 0;
    while audio < 5 {
        match command_rx.recv().await.expect("channel stays open") {
            ClientCommand::Audio(_) => audio += 1,
            ClientCommand::Video(_) => panic!("still forwarded with video off"),
            ClientCommand::Close => panic!("unexpected close"),
        }
    }

    // A few more camera intervals pass; still nothing.
    let extra = tokio::time::timeout(Duration::from_secs(3), command_rx.recv()).await;
    assert!(extra.is_err(), "no commands while video is off");

    session.stop().await.expect("session stops");
}

#[tokio::test(start_paused = true)]
async fn test_second_start_is_a_no_op_while_active() {
    let (channel, mut command_rx, _event_tx) = fake_channel();
    let session = build_session(
        capture_config(3),
        FakeConnector::with_channel(channel),
        TestSink::default(),
    );

    session.start().await.expect("first start");
    // A second start must not reconnect (the fake would refuse anyway).
    session.start().await.expect("second start is a no-op");
    assert!(session.is_active());

    let mut audio = 0;
    while audio < 3 {
        if let ClientCommand::Audio(_) = command_rx.recv().await.expect("open") {
            audio += 1;
        }
    }

    session.stop().await.expect("session stops");
}

// ============================================================================
// Inbound playback
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_inbound_chunks_scheduled_back_to_back() {
    let (channel, _command_rx, event_tx) = fake_channel();
    let sink = TestSink::default();
    let session = build_session(
        capture_config(0),
        FakeConnector::with_channel(channel),
        sink.clone(),
    );

    session.start().await.expect("session starts");

    for _ in 0..3 {
        event_tx.send(audio_event(1.0)).await.expect("event sent");
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let starts: Vec<f64> = sink
        .calls()
        .iter()
        .map(|c| match c {
            SinkCall::Start { at, .. } => *at,
            other => panic!("unexpected sink call: {:?}", other),
        })
        .collect();

    assert_eq!(starts, vec![0.0, 1.0, 2.0], "gapless, no overlap");
    assert_eq!(session.status().await.playback_cursor, 3.0);

    session.stop().await.expect("session stops");
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_discards_playback_and_restarts_from_clock() {
    let (channel, _command_rx, event_tx) = fake_channel();
    let sink = TestSink::default();
    let session = build_session(
        capture_config(0),
        FakeConnector::with_channel(channel),
        sink.clone(),
    );

    session.start().await.expect("session starts");

    event_tx.send(audio_event(2.0)).await.expect("event sent");
    event_tx.send(audio_event(2.0)).await.expect("event sent");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.status().await.playback_cursor, 4.0);

    // The user keeps talking at t=1.2: pending audio is torn down and
    // the cursor snaps to the live clock.
    sink.set_clock(1.2);
    event_tx.send(ServerEvent::Interrupted).await.expect("event sent");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(sink.calls().contains(&SinkCall::StopAll));
    assert_eq!(session.status().await.playback_cursor, 1.2);

    // The next chunk schedules from the live clock, not the dead queue.
    sink.set_clock(1.5);
    event_tx.send(audio_event(0.5)).await.expect("event sent");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        sink.calls().last(),
        Some(&SinkCall::Start {
            at: 1.5,
            bytes: 24000
        })
    );

    session.stop().await.expect("session stops");
}

// ============================================================================
// Failure and teardown
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_channel_error_ends_session_without_retry() {
    let (channel, _command_rx, event_tx) = fake_channel();
    let session = build_session(
        capture_config(0),
        FakeConnector::with_channel(channel),
        TestSink::default(),
    );

    session.start().await.expect("session starts");
    assert!(session.is_active());

    event_tx
        .send(ServerEvent::Error("bus unreachable".to_string()))
        .await
        .expect("event sent");
    tokio::time::sleep(Duration::from_millis(50)).await;

    let status = session.status().await;
    assert!(!status.active);
    assert_eq!(status.last_error.as_deref(), Some("bus unreachable"));

    // Still inactive later: recovery is a fresh user-initiated start.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!session.is_active());

    session.stop().await.expect("stop after error still cleans up");
}

#[tokio::test(start_paused = true)]
async fn test_remote_close_ends_session() {
    let (channel, _command_rx, event_tx) = fake_channel();
    let session = build_session(
        capture_config(0),
        FakeConnector::with_channel(channel),
        TestSink::default(),
    );

    session.start().await.expect("session starts");

    event_tx.send(ServerEvent::Closed).await.expect("event sent");
    tokio::time::sleep(Duration::from_millis(50)).await;

    let status = session.status().await;
    assert!(!status.active);
    assert!(status.last_error.is_none(), "a clean close is not an error");
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent_and_leaves_nothing_running() {
    let (channel, mut command_rx, event_tx) = fake_channel();
    let sink = TestSink::default();
    let session = build_session(
        capture_config(2),
        FakeConnector::with_channel(channel),
        sink.clone(),
    );

    session.start().await.expect("session starts");
    session.stop().await.expect("first stop");

    assert!(!session.is_active());

    // The channel was told to close.
    let mut saw_close = false;
    while let Ok(command) = command_rx.try_recv() {
        if matches!(command, ClientCommand::Close) {
            saw_close = true;
        }
    }
    assert!(saw_close, "close command reached the channel");

    // The inbound handler is gone, so the event side is dangling.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(event_tx.is_closed(), "no inbound handler survives a stop");

    // Pending playback was cancelled.
    assert_eq!(sink.calls().last(), Some(&SinkCall::StopAll));

    // Stopping again is a no-op.
    session.stop().await.expect("second stop");
    session.stop().await.expect("third stop");
}

#[tokio::test(start_paused = true)]
async fn test_denied_device_access_fails_start() {
    let (channel, _command_rx, _event_tx) = fake_channel();
    let session = build_session(
        SyntheticConfig {
            deny_access: true,
            ..SyntheticConfig::default()
        },
        FakeConnector::with_channel(channel),
        TestSink::default(),
    );

    let err = session.start().await.expect_err("start must fail");
    assert!(matches!(err, CompanionError::DeviceAccess(_)));
    assert!(!session.is_active());

    // Retry affordance: stop on a never-started session is a no-op.
    session.stop().await.expect("no-op stop");
}

#[tokio::test(start_paused = true)]
async fn test_failed_connect_fails_start_and_releases_devices() {
    let session = build_session(
        capture_config(3),
        FakeConnector::refusing(),
        TestSink::default(),
    );

    let err = session.start().await.expect_err("start must fail");
    assert!(matches!(err, CompanionError::RemoteService(_)));
    assert!(!session.is_active());

    session.stop().await.expect("no-op stop");
}
