use base64::Engine;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::chat::{ChatMessage, ChatRole};
use super::vision::{parse_report, BiometricProfile};
use crate::config::GeminiConfig;
use crate::error::CompanionError;

/// Environment variable carrying the API credential (the only one the
/// service reads).
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default reflection when the remote service is unreachable
pub const REFLECTION_FALLBACK: &str = "I'm listening and I'm here for you.";

const VISION_PROMPT: &str = "PERFORM NEURAL EMOTION ANALYSIS. \
Respond ONLY with a structured analysis in this format:\n\
EMOTION: [Name]\n\
CONFIDENCE: [0-100]\n\
CUES: [Feature1, Feature2, Feature3]\n\
ANALYSIS: [Deep psychological context]\n\
INTERVENTION: [Specific therapeutic advice]\n\
STRESS: [LOW/MEDIUM/HIGH/CRITICAL]";

// ============================================================================
// Wire types (Gemini REST v1beta)
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone())
    }
}

fn text_content(role: &str, text: &str) -> Content {
    Content {
        role: Some(role.to_string()),
        parts: vec![Part {
            text: Some(text.to_string()),
            inline_data: None,
        }],
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for the Gemini REST endpoints: streamed chat, single-shot
/// vision analysis, and one-line mood reflections.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiClient {
    /// Build a client, reading the credential from `GEMINI_API_KEY`.
    pub fn new(config: GeminiConfig) -> Self {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();

        if api_key.is_empty() {
            warn!("{} is not set; remote calls will be rejected upstream", API_KEY_ENV);
        }

        Self {
            http: reqwest::Client::new(),
            config,
            api_key,
        }
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.config.base_url, model, method, self.api_key
        )
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<String, CompanionError> {
        let response = self
            .http
            .post(self.endpoint(model, "generateContent"))
            .json(request)
            .send()
            .await
            .map_err(|e| CompanionError::remote(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| CompanionError::remote(format!("rejected: {e}")))?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CompanionError::remote(format!("unreadable response: {e}")))?;

        Ok(body.first_text().unwrap_or_default())
    }

    /// Stream a chat reply. Chunks arrive in order on the returned
    /// channel; a mid-stream failure is delivered as a final `Err` item.
    pub async fn stream_chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<mpsc::Receiver<Result<String, CompanionError>>, CompanionError> {
        let contents = history
            .iter()
            .filter(|m| !m.text.is_empty())
            .map(|m| {
                let role = match m.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                };
                text_content(role, &m.text)
            })
            .collect();

        let request = GenerateRequest {
            contents,
            system_instruction: Some(text_content("system", system_prompt)),
            generation_config: Some(GenerationConfig { temperature: 0.7 }),
        };

        let url = format!(
            "{}&alt=sse",
            self.endpoint(&self.config.chat_model, "streamGenerateContent")
        );

        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompanionError::remote(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| CompanionError::remote(format!("rejected: {e}")))?;

        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(next) = stream.next().await {
                let bytes = match next {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx
                            .send(Err(CompanionError::remote(format!("stream broke: {e}"))))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer.drain(..=pos);

                    let Some(payload) = line.strip_prefix("data: ") else {
                        continue;
                    };

                    if payload == "[DONE]" {
                        return;
                    }

                    match serde_json::from_str::<GenerateResponse>(payload) {
                        Ok(chunk) => {
                            if let Some(text) = chunk.first_text() {
                                if tx.send(Ok(text)).await.is_err() {
                                    return;
                                }
                            }
                        }
                        Err(e) => warn!("Skipping unparseable stream event: {}", e),
                    }
                }
            }
        });

        Ok(rx)
    }

    /// Single-shot vision analysis of a JPEG still. The labeled-field
    /// report is parsed with per-field defaults; only transport failures
    /// surface as errors.
    pub async fn analyze(&self, jpeg: &[u8]) -> Result<BiometricProfile, CompanionError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: base64::engine::general_purpose::STANDARD.encode(jpeg),
                        }),
                    },
                    Part {
                        text: Some(VISION_PROMPT.to_string()),
                        inline_data: None,
                    },
                ],
            }],
            system_instruction: None,
            generation_config: None,
        };

        let text = self.generate(&self.config.vision_model, &request).await?;

        info!("Vision analysis returned {} bytes of report", text.len());

        Ok(parse_report(&text))
    }

    /// One-sentence empathetic reflection for a mood note. Degrades to a
    /// fixed line on any failure; never errors.
    pub async fn mood_reflection(&self, note: &str) -> String {
        let prompt = format!(
            "Analyze this mood note and provide a 1-sentence empathetic reflection: \"{note}\""
        );

        let request = GenerateRequest {
            contents: vec![text_content("user", &prompt)],
            system_instruction: None,
            generation_config: None,
        };

        match self.generate(&self.config.reflection_model, &request).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => REFLECTION_FALLBACK.to_string(),
            Err(e) => {
                warn!("Mood reflection failed: {}", e);
                REFLECTION_FALLBACK.to_string()
            }
        }
    }
}
