//! LLM module: completion/speech capability traits and their HTTP clients
//!
//! This module provides:
//! - `CompletionApi` / `SpeechApi` traits, the seams the orchestrator and voice controller call
//! - `GeminiClient` + `GeminiConfig` for generateContent-style completions (with search grounding) and speech
//! - `OpenAiCompatClient` + `OpenAiCompatConfig` for OpenAI-compatible chat completions backends
//! - `YOKE_SYSTEM_PROMPT`, the fixed persona directive sent with every completion

mod api;
mod client;
mod gemini;
mod prompt;

pub use api::{Completion, CompletionApi, CompletionRequest, SpeechApi, SpeechAudio, SpeechRequest};
#[cfg(test)]
pub use api::{MockCompletionApi, MockSpeechApi};
pub use client::{OpenAiCompatClient, OpenAiCompatConfig};
pub use gemini::{GeminiClient, GeminiConfig};
pub use prompt::YOKE_SYSTEM_PROMPT;
