//! Live session management
//!
//! This module provides the `LiveSession` controller that manages:
//! - Device acquisition through the media capture seam
//! - The realtime channel to the remote intelligence service
//! - Ordered forwarding of local audio and periodic camera stills
//! - Gapless, overlap-free playback scheduling of inbound audio
//! - Barge-in (discard pending playback when the user keeps talking)
//! - Deterministic teardown on stop or channel failure

mod config;
mod playback;
mod session;

pub use config::LiveSessionConfig;
pub use playback::{AudioSink, ChannelSink, PlaybackCommand, PlaybackScheduler, ScheduledChunk};
pub use session::{LiveSession, LiveStatus};
