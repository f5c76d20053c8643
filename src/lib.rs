pub mod breathing;
pub mod config;
pub mod error;
pub mod http;
pub mod live;
pub mod media;
pub mod remote;
pub mod store;

pub use breathing::{BreathingPacer, BreathingState, Phase, PhaseTimer};
pub use config::Config;
pub use error::CompanionError;
pub use http::{create_router, AppState};
pub use live::{AudioSink, ChannelSink, LiveSession, LiveSessionConfig, PlaybackScheduler};
pub use media::{AudioFrame, MediaBackend, MediaConstraints, SyntheticBackend};
pub use remote::{ChatSession, GeminiClient, LiveChannel, NatsConnector, RealtimeConnector};
pub use store::{JournalEntry, Mood, MoodEntry, WellnessStore};
