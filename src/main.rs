use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use serenity_companion::breathing::BreathingPacer;
use serenity_companion::live::{ChannelSink, LiveSession, LiveSessionConfig};
use serenity_companion::media::{SyntheticBackend, SyntheticConfig};
use serenity_companion::remote::{ChatSession, GeminiClient, NatsConnector};
use serenity_companion::store::WellnessStore;
use serenity_companion::{create_router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load("config/serenity-companion")?;

    info!("Serenity Companion v0.1.0");
    info!("Loaded config: {}", cfg.service.name);
    info!("Storage directory: {}", cfg.storage.path);

    let store = Arc::new(WellnessStore::open(&cfg.storage.path)?);
    let gemini = Arc::new(GeminiClient::new(cfg.gemini.clone()));
    let chat = Arc::new(Mutex::new(ChatSession::new(Arc::clone(&gemini))));
    let breathing = Arc::new(BreathingPacer::new());

    let (sink, playback_rx) = ChannelSink::new();
    let live = Arc::new(LiveSession::new(
        LiveSessionConfig::default(),
        // Synthetic capture until a device backend lands; clients that
        // bring their own media talk to the bus directly.
        Box::new(SyntheticBackend::new(SyntheticConfig::default())),
        Arc::new(NatsConnector::new(&cfg.live.nats_url)),
        Box::new(sink),
    ));

    let state = AppState {
        store,
        gemini,
        chat,
        breathing,
        live,
        playback: Arc::new(Mutex::new(playback_rx)),
    };

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .await
        .context("HTTP server failed")?;

    Ok(())
}
