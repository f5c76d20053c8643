//! Local media capture
//!
//! The capture seam the live session consumes: a backend hands out a
//! stream of PCM audio frames plus a pull-based video frame source, so
//! forwarding logic runs the same against real devices or the synthetic
//! backend used in tests and headless development.

pub mod backend;
pub mod pcm;
pub mod synthetic;

pub use backend::{
    AudioFrame, MediaBackend, MediaConstraints, MediaStream, VideoFrame, VideoFrameSource,
};
pub use synthetic::{SyntheticBackend, SyntheticConfig};
