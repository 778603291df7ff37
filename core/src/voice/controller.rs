use crate::app::{SessionGuard, YokeState};
use crate::audio::{decode_pcm16_base64, AudioBuffer, AudioOutput};
use crate::llm::{SpeechApi, SpeechRequest};
use crate::log_stream::LogKind;
use crate::session::SessionState;
use crate::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::clean::strip_meta_tags;

/// Voice profile and PCM format of the speech API output
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    pub voice: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice: std::env::var("YOKE_VOICE")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Kore".to_string()),
            sample_rate: 24_000,
            channels: 1,
        }
    }
}

/// Result of a `speak` call
#[derive(Debug)]
pub enum SpeakOutcome {
    /// Nothing left to say after cleaning
    Skipped,
    /// Another synthesis or playback cycle was in progress
    Busy,
    /// Synthesis or decode failed; the pipeline is back to Idle
    Failed(String),
    /// Playback started; the handle completes when the pipeline is Idle again
    Playing(JoinHandle<()>),
}

impl SpeakOutcome {
    pub fn is_playing(&self) -> bool {
        matches!(self, SpeakOutcome::Playing(_))
    }

    /// Wait for playback (if any) to finish
    pub async fn wait(self) {
        if let SpeakOutcome::Playing(handle) = self {
            if let Err(e) = handle.await {
                warn!(target = "voice", error = %e, "Playback task panicked or was cancelled");
            }
        }
    }
}

/// Single-flight text-to-speech controller.
///
/// A call while the voice phase is not `Idle` is rejected, never queued.
#[derive(Clone)]
pub struct VoiceController {
    speech: Arc<dyn SpeechApi>,
    output: Arc<dyn AudioOutput>,
    state: Arc<YokeState>,
    cfg: VoiceConfig,
}

impl VoiceController {
    pub fn new(
        speech: Arc<dyn SpeechApi>,
        output: Arc<dyn AudioOutput>,
        state: Arc<YokeState>,
        cfg: VoiceConfig,
    ) -> Self {
        Self {
            speech,
            output,
            state,
            cfg,
        }
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.cfg
    }

    /// Narrate a reply. Meta tags are stripped first; playback continues on a
    /// background task after this returns.
    pub async fn speak(&self, text: &str) -> SpeakOutcome {
        let cleaned = strip_meta_tags(text);
        if cleaned.is_empty() {
            return SpeakOutcome::Skipped;
        }
        if !self.state.session.write().await.try_begin_synthesis() {
            debug!(target = "voice", "Voice pipeline busy; dropping request");
            return SpeakOutcome::Busy;
        }
        // held until the phase leaves Synthesizing
        let synthesizing =
            SessionGuard::new(Arc::clone(&self.state), SessionState::abort_synthesis);
        self.state.logs.write().await.push(
            LogKind::Synthesis,
            format!("Voice synthesis engaged ({} chars)", cleaned.chars().count()),
        );

        let buffer = match self.synthesize(&cleaned).await {
            Ok(b) => b,
            Err(e) => {
                warn!(target = "voice", error = %e, "Speech synthesis failed");
                self.state.session.write().await.abort_synthesis();
                synthesizing.disarm();
                self.state
                    .logs
                    .write()
                    .await
                    .push(LogKind::Error, "TTS pipeline reconnection failed.");
                return SpeakOutcome::Failed(e.to_string());
            }
        };

        info!(
            target = "voice",
            duration_ms = buffer.duration().as_millis() as u64,
            "Playback starting"
        );
        self.state.session.write().await.begin_playback();
        synthesizing.disarm();

        let output = Arc::clone(&self.output);
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            if let Err(e) = output.play(buffer).await {
                warn!(target = "voice", error = %e, "Playback failed");
                state
                    .logs
                    .write()
                    .await
                    .push(LogKind::Error, format!("Audio output dropped: {e}"));
            }
            state.session.write().await.finish_playback();
        });
        SpeakOutcome::Playing(handle)
    }

    async fn synthesize(&self, text: &str) -> Result<AudioBuffer> {
        let request = SpeechRequest {
            text: text.to_string(),
            voice: self.cfg.voice.clone(),
        };
        let audio = self.speech.synthesize(&request).await?;
        decode_pcm16_base64(&audio.data_base64, self.cfg.sample_rate, self.cfg.channels)
    }
}
