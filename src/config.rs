use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub gemini: GeminiConfig,
    pub live: LiveTransportConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the serialized wellness collections
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub base_url: String,
    pub chat_model: String,
    pub vision_model: String,
    pub reflection_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveTransportConfig {
    pub nats_url: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            chat_model: "gemini-3-pro-preview".to_string(),
            vision_model: "gemini-2.5-flash-image".to_string(),
            reflection_model: "gemini-3-flash-preview".to_string(),
        }
    }
}

impl Default for LiveTransportConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://localhost:4222".to_string(),
        }
    }
}
