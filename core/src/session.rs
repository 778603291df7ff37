//! Session state and its transition functions.
//!
//! All mutation goes through the methods below. The voice phase machine is
//! `Idle → Synthesizing → Playing → Idle`, with `Synthesizing → Idle` on error.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the text-to-speech pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoicePhase {
    #[default]
    Idle,
    Synthesizing,
    Playing,
    /// Display-only; failures return the pipeline to `Idle`.
    Error,
}

impl fmt::Display for VoicePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoicePhase::Idle => "IDLE",
            VoicePhase::Synthesizing => "SYNTHESIZING",
            VoicePhase::Playing => "PLAYING",
            VoicePhase::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Upper bound of the per-turn evolution bump
const EVOLUTION_STEP: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub listening: bool,
    pub speaking: bool,
    pub thinking: bool,
    pub active_engine_id: Option<String>,
    pub voice_phase: VoicePhase,
    /// 0..=100
    pub evolution_index: f64,
    /// 0..1
    pub entropy_level: f64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            listening: false,
            speaking: false,
            thinking: false,
            active_engine_id: None,
            voice_phase: VoicePhase::Idle,
            evolution_index: 78.4,
            entropy_level: 0.12,
        }
    }
}

impl SessionState {
    pub fn activate_engine(&mut self, id: &str) {
        self.active_engine_id = Some(id.to_string());
    }

    pub fn clear_active_engine(&mut self) {
        self.active_engine_id = None;
    }

    pub fn set_thinking(&mut self, thinking: bool) {
        self.thinking = thinking;
    }

    /// Single-flight guard: moves `Idle → Synthesizing` and returns true, or
    /// leaves the state untouched and returns false when the pipeline is busy.
    pub fn try_begin_synthesis(&mut self) -> bool {
        if self.voice_phase != VoicePhase::Idle {
            return false;
        }
        self.voice_phase = VoicePhase::Synthesizing;
        true
    }

    /// `Synthesizing → Playing`
    pub fn begin_playback(&mut self) {
        debug_assert_eq!(self.voice_phase, VoicePhase::Synthesizing);
        self.voice_phase = VoicePhase::Playing;
        self.speaking = true;
    }

    /// `Playing → Idle`, fired when playback ends
    pub fn finish_playback(&mut self) {
        self.voice_phase = VoicePhase::Idle;
        self.speaking = false;
    }

    /// `Synthesizing → Idle` after a synthesis or decode failure, or when the
    /// synthesis step was cancelled. No effect in any other phase.
    pub fn abort_synthesis(&mut self) {
        if self.voice_phase == VoicePhase::Synthesizing {
            self.voice_phase = VoicePhase::Idle;
        }
    }

    /// Cosmetic drift applied after each successful reply
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let step: f64 = rng.gen_range(0.0..EVOLUTION_STEP);
        self.evolution_index = (self.evolution_index + step).min(100.0);
        self.entropy_level = rng.gen_range(0.0..1.0);
    }
}
