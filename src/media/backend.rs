use anyhow::Result;
use tokio::sync::mpsc;

use crate::error::CompanionError;

/// Which local devices a session wants opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl MediaConstraints {
    pub const AUDIO_VIDEO: Self = Self {
        audio: true,
        video: true,
    };
}

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// One still frame grabbed from the camera, already downscaled and
/// JPEG-encoded for the wire.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Pull-based camera frame source.
///
/// The forwarder asks for a frame when it wants one (1 fps), rather than
/// the camera pushing at its native rate.
#[async_trait::async_trait]
pub trait VideoFrameSource: Send {
    async fn next_frame(&mut self) -> Result<VideoFrame>;
}

/// The streams a backend hands out for one capture session
pub struct MediaStream {
    /// Audio frames in capture order; `None` if audio was not requested
    pub audio: Option<mpsc::Receiver<AudioFrame>>,
    /// Camera frame source; `None` if video was not requested
    pub video: Option<Box<dyn VideoFrameSource>>,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("audio", &self.audio.is_some())
            .field("video", &self.video.is_some())
            .finish()
    }
}

/// Media capture backend trait
///
/// Implementations own the underlying devices. `start` fails with
/// [`CompanionError::DeviceAccess`] when permission is denied or no
/// device exists; the session surfaces that to the caller and does not
/// start.
#[async_trait::async_trait]
pub trait MediaBackend: Send + Sync {
    /// Open the requested devices and start capturing
    async fn start(&mut self, constraints: MediaConstraints)
        -> Result<MediaStream, CompanionError>;

    /// Release the devices; the audio channel closes as a result
    async fn stop(&mut self) -> Result<()>;

    /// Check if the backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
