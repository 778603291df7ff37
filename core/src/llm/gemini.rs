use crate::conversation::Citation;
use crate::{Result, YokeError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

use super::api::{Completion, CompletionApi, CompletionRequest, SpeechApi, SpeechAudio, SpeechRequest};

/// Title used when a grounding chunk carries no title
pub const DEFAULT_CITATION_TITLE: &str = "Source data node";
/// Url used when a grounding chunk carries no uri
pub const DEFAULT_CITATION_URL: &str = "#";

/// Configuration for GeminiClient loaded from environment variables
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String, // e.g., https://generativelanguage.googleapis.com/v1beta
    pub api_key: Option<String>,
    pub model: String,
    pub tts_model: String,
    pub request_timeout_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("GEMINI_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|s| !s.is_empty())
                .or_else(|| std::env::var("API_KEY").ok().filter(|s| !s.is_empty())),
            model: std::env::var("YOKE_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "gemini-3-pro-preview".to_string()),
            tts_model: std::env::var("YOKE_TTS_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "gemini-2.5-flash-preview-tts".to_string()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60_000),
        }
    }
}

/// HTTP client for generateContent-style endpoints: text with search grounding, and speech
#[derive(Clone)]
pub struct GeminiClient {
    pub(crate) http: Client,
    pub(crate) cfg: GeminiConfig,
}

impl GeminiClient {
    pub fn new(cfg: GeminiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| YokeError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::default())
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.cfg
    }

    async fn generate_content(
        &self,
        model: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.cfg.base_url.trim_end_matches('/'),
            model
        );
        debug!(target = "gemini_client", "POST {}", url);

        let mut req = self
            .http
            .post(&url)
            .header("content-type", "application/json");
        if let Some(key) = &self.cfg.api_key {
            req = req.header("x-goog-api-key", key);
        }

        let resp = req
            .json(&body)
            .send()
            .await
            .map_err(|e| YokeError::Api(format!("generateContent HTTP error: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(target = "gemini_client", %status, body = %text, "generateContent error");
            return Err(YokeError::Api(format!(
                "generateContent error: status={} body={}",
                status, text
            )));
        }

        resp.json()
            .await
            .map_err(|e| YokeError::Api(format!("Failed to parse generateContent JSON: {e}")))
    }
}

#[async_trait]
impl CompletionApi for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let val = self
            .generate_content(&self.cfg.model, completion_body(request))
            .await?;
        Ok(Completion {
            text: extract_text(&val).unwrap_or_default(),
            citations: extract_citations(&val),
        })
    }
}

#[async_trait]
impl SpeechApi for GeminiClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio> {
        let val = self
            .generate_content(&self.cfg.tts_model, speech_body(request))
            .await?;
        extract_inline_audio(&val)
            .ok_or_else(|| YokeError::Api("Speech response carried no inline audio".into()))
    }
}

/// generateContent body for a text turn; search grounding is attached as a tool
pub(crate) fn completion_body(request: &CompletionRequest) -> serde_json::Value {
    let mut body = json!({
        "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
    });
    if !request.system_instruction.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": request.system_instruction }] });
    }
    if request.web_search {
        body["tools"] = json!([{ "google_search": {} }]);
    }
    body
}

/// generateContent body asking for audio only, in a prebuilt voice
pub(crate) fn speech_body(request: &SpeechRequest) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": request.text }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": request.voice } }
            }
        }
    })
}

/// Concatenate every text part of the first candidate
pub(crate) fn extract_text(v: &serde_json::Value) -> Option<String> {
    let parts = v
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let mut acc = String::new();
    for p in parts {
        if let Some(t) = p.get("text").and_then(|t| t.as_str()) {
            acc.push_str(t);
        }
    }
    if acc.is_empty() {
        None
    } else {
        Some(acc)
    }
}

/// Grounding chunks of the first candidate as citations; missing fields get placeholders
pub(crate) fn extract_citations(v: &serde_json::Value) -> Vec<Citation> {
    let chunks = v
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("groundingMetadata"))
        .and_then(|g| g.get("groundingChunks"))
        .and_then(|g| g.as_array());
    let Some(chunks) = chunks else {
        return Vec::new();
    };
    chunks
        .iter()
        .map(|chunk| {
            let web = chunk.get("web");
            Citation {
                title: web
                    .and_then(|w| w.get("title"))
                    .and_then(|t| t.as_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(DEFAULT_CITATION_TITLE)
                    .to_string(),
                url: web
                    .and_then(|w| w.get("uri"))
                    .and_then(|t| t.as_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(DEFAULT_CITATION_URL)
                    .to_string(),
            }
        })
        .collect()
}

pub(crate) fn extract_inline_audio(v: &serde_json::Value) -> Option<SpeechAudio> {
    let inline = v
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("inlineData")?;
    let data = inline.get("data")?.as_str()?;
    if data.is_empty() {
        return None;
    }
    Some(SpeechAudio {
        data_base64: data.to_string(),
        mime_type: inline
            .get("mimeType")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string()),
    })
}
