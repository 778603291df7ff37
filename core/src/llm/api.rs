use crate::conversation::Citation;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_instruction: String,
    pub web_search: bool,
    /// Engine this attempt is made on behalf of; backends may ignore it
    pub engine_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
}

/// Encoded audio as returned by the speech API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechAudio {
    /// Base64 encoded 16-bit little-endian PCM
    pub data_base64: String,
    pub mime_type: Option<String>,
}

/// Text generation backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

/// Speech synthesis backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechApi: Send + Sync {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio>;
}
