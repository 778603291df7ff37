use crate::{Result, YokeError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

use super::api::{Completion, CompletionApi, CompletionRequest};

/// Configuration for OpenAiCompatClient loaded from environment variables
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    pub base_url: String, // e.g., http://localhost:8000/v1
    pub model: String,    // e.g., qwen2.5-0.5b-instruct
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
    pub temperature: f32,
}

impl Default for OpenAiCompatConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("LLM_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "http://localhost:8000/v1".to_string()),
            model: std::env::var("LLM_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "qwen2.5-0.5b-instruct".to_string()),
            api_key: std::env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60_000),
            temperature: std::env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(0.7),
        }
    }
}

/// Chat Completions client for OpenAI-compatible servers (vLLM, llama.cpp, hosted APIs).
/// Has no search grounding, so replies never carry citations.
#[derive(Clone)]
pub struct OpenAiCompatClient {
    pub(crate) http: Client,
    pub(crate) cfg: OpenAiCompatConfig,
}

impl OpenAiCompatClient {
    pub fn new(cfg: OpenAiCompatConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| YokeError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiCompatConfig::default())
    }

    pub fn config(&self) -> &OpenAiCompatConfig {
        &self.cfg
    }
}

#[async_trait]
impl CompletionApi for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        if request.web_search {
            debug!(
                target = "llm_client",
                "web search requested but not supported by chat.completions; ignoring"
            );
        }

        let chat_url = format!(
            "{}/chat/completions",
            self.cfg.base_url.trim_end_matches('/')
        );
        debug!(target = "llm_client", "POST {} via Chat Completions", chat_url);

        let mut req = self
            .http
            .post(&chat_url)
            .header("content-type", "application/json");
        if let Some(key) = &self.cfg.api_key {
            req = req.bearer_auth(key);
        }

        let body = json!({
            "model": self.cfg.model,
            "messages": build_messages(request),
            "temperature": self.cfg.temperature,
        });

        let resp = req
            .json(&body)
            .send()
            .await
            .map_err(|e| YokeError::Api(format!("Chat Completions HTTP error: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(target = "llm_client", %status, body = %text, "Chat Completions error");
            return Err(YokeError::Api(format!(
                "Chat Completions error: status={} body={}",
                status, text
            )));
        }

        let val: serde_json::Value = resp.json().await.map_err(|e| {
            YokeError::Api(format!("Failed to parse Chat Completions JSON: {e}"))
        })?;
        let text = extract_text_from_chat_completions(&val).ok_or_else(|| {
            YokeError::Api("Missing choices[0].message.content in chat completions".into())
        })?;
        Ok(Completion {
            text,
            citations: Vec::new(),
        })
    }
}

fn build_messages(request: &CompletionRequest) -> Vec<serde_json::Value> {
    let mut messages = Vec::new();
    if !request.system_instruction.is_empty() {
        messages.push(json!({"role": "system", "content": request.system_instruction}));
    }
    messages.push(json!({"role": "user", "content": request.prompt}));
    messages
}

fn extract_text_from_chat_completions(v: &serde_json::Value) -> Option<String> {
    v.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}
