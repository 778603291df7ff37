//! Test doubles shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine as _;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use yoke_core::audio::{AudioBuffer, AudioOutput};
use yoke_core::engine::{Engine, EngineCategory, EngineRegistry};
use yoke_core::llm::{
    Completion, CompletionApi, CompletionRequest, SpeechApi, SpeechAudio, SpeechRequest,
};
use yoke_core::{Citation, Result, YokeError, YokeState};

pub fn engine(id: &str, weight: u32) -> Engine {
    Engine::new(
        id,
        format!("{}-Node", id.to_uppercase()),
        "Test-Sim",
        10,
        EngineCategory::Logic,
        weight,
        false,
    )
}

pub fn state_with(engines: Vec<Engine>) -> Arc<YokeState> {
    Arc::new(YokeState::new(EngineRegistry::new(engines)))
}

/// Completion backend that answers per engine id and records every call.
/// Engines without a scripted answer fail.
#[derive(Default)]
pub struct ScriptedCompletion {
    answers: HashMap<String, Completion>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed(mut self, engine_id: &str, text: &str) -> Self {
        self.answers.insert(
            engine_id.to_string(),
            Completion {
                text: text.to_string(),
                citations: Vec::new(),
            },
        );
        self
    }

    pub fn succeed_with_citations(
        mut self,
        engine_id: &str,
        text: &str,
        citations: Vec<Citation>,
    ) -> Self {
        self.answers.insert(
            engine_id.to_string(),
            Completion {
                text: text.to_string(),
                citations,
            },
        );
        self
    }

    pub fn called_engines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.engine_id.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionApi for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.calls.lock().unwrap().push(request.clone());
        self.answers
            .get(&request.engine_id)
            .cloned()
            .ok_or_else(|| YokeError::Api(format!("upstream 503 for {}", request.engine_id)))
    }
}

pub fn pcm16_base64(samples: &[i16]) -> String {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Speech backend returning a fixed payload, or failing
pub struct FixedSpeech {
    payload: Option<String>,
    pub calls: AtomicUsize,
    pub last_text: Mutex<Option<String>>,
}

impl FixedSpeech {
    pub fn ok() -> Self {
        Self {
            payload: Some(pcm16_base64(&[0, 1000, -1000, 0])),
            calls: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        }
    }

    pub fn with_payload(payload: &str) -> Self {
        Self {
            payload: Some(payload.to_string()),
            calls: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            payload: None,
            calls: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechApi for FixedSpeech {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(request.text.clone());
        match &self.payload {
            Some(p) => Ok(SpeechAudio {
                data_base64: p.clone(),
                mime_type: Some("audio/L16;rate=24000".into()),
            }),
            None => Err(YokeError::Api("speech endpoint unreachable".into())),
        }
    }
}

/// Output that holds playback open until `release` is called
#[derive(Default)]
pub struct GatedOutput {
    gate: Notify,
    pub played: AtomicUsize,
}

impl GatedOutput {
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn played_count(&self) -> usize {
        self.played.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioOutput for GatedOutput {
    async fn play(&self, _buffer: AudioBuffer) -> Result<()> {
        self.played.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(())
    }
}

/// Output whose device always errors
pub struct BrokenOutput;

#[async_trait]
impl AudioOutput for BrokenOutput {
    async fn play(&self, _buffer: AudioBuffer) -> Result<()> {
        Err(YokeError::Playback("no output device".into()))
    }
}

/// Completion backend that blocks until released, then answers for any engine
#[derive(Default)]
pub struct GatedCompletion {
    gate: Notify,
}

impl GatedCompletion {
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl CompletionApi for GatedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.gate.notified().await;
        Ok(Completion {
            text: format!("late reply from {}", request.engine_id),
            citations: Vec::new(),
        })
    }
}

/// Speech backend that never answers
pub struct StalledSpeech;

#[async_trait]
impl SpeechApi for StalledSpeech {
    async fn synthesize(&self, _request: &SpeechRequest) -> Result<SpeechAudio> {
        std::future::pending().await
    }
}
