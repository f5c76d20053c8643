use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::backend::{
    AudioFrame, MediaBackend, MediaConstraints, MediaStream, VideoFrame, VideoFrameSource,
};
use crate::error::CompanionError;

/// Configuration for the synthetic capture backend
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per emitted frame (per channel set, interleaved total)
    pub samples_per_frame: usize,
    /// Total frames to emit before the audio stream closes
    pub frames: usize,
    /// Simulate a denied permission prompt
    pub deny_access: bool,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            samples_per_frame: 1600, // 100ms at 16kHz mono
            frames: 50,
            deny_access: false,
        }
    }
}

/// Deterministic in-process capture backend.
///
/// Emits a fixed number of ramp-valued audio frames at 100ms spacing in
/// their timestamps (delivered as fast as the consumer drains them) and
/// serves a constant placeholder camera frame on demand. Used by tests
/// and headless development; no devices are touched.
pub struct SyntheticBackend {
    config: SyntheticConfig,
    capturing: bool,
    feeder: Option<JoinHandle<()>>,
}

impl SyntheticBackend {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            capturing: false,
            feeder: None,
        }
    }
}

#[async_trait::async_trait]
impl MediaBackend for SyntheticBackend {
    async fn start(
        &mut self,
        constraints: MediaConstraints,
    ) -> Result<MediaStream, CompanionError> {
        if self.config.deny_access {
            return Err(CompanionError::device_access(
                "permission denied by synthetic backend",
            ));
        }

        let audio = if constraints.audio {
            let (tx, rx) = mpsc::channel(64);
            let config = self.config.clone();

            let feeder = tokio::spawn(async move {
                for i in 0..config.frames {
                    let frame = AudioFrame {
                        // Ramp value per frame so capture order is observable
                        samples: vec![i as i16; config.samples_per_frame],
                        sample_rate: config.sample_rate,
                        channels: config.channels,
                        timestamp_ms: (i as u64) * 100,
                    };

                    if tx.send(frame).await.is_err() {
                        break;
                    }
                }
            });

            self.feeder = Some(feeder);
            Some(rx)
        } else {
            None
        };

        let video: Option<Box<dyn VideoFrameSource>> = if constraints.video {
            Some(Box::new(SyntheticCamera::default()))
        } else {
            None
        };

        self.capturing = true;
        info!("Synthetic media backend started");

        Ok(MediaStream { audio, video })
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
            let _ = feeder.await;
        }

        self.capturing = false;
        info!("Synthetic media backend stopped");

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Serves the same 320x240 placeholder frame on every pull.
#[derive(Default)]
struct SyntheticCamera {
    grabbed: u64,
}

#[async_trait::async_trait]
impl VideoFrameSource for SyntheticCamera {
    async fn next_frame(&mut self) -> Result<VideoFrame> {
        self.grabbed += 1;

        // Minimal JPEG marker prefix; downstream only moves bytes.
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
        jpeg.extend_from_slice(&self.grabbed.to_le_bytes());

        Ok(VideoFrame {
            jpeg,
            width: 320,
            height: 240,
        })
    }
}
