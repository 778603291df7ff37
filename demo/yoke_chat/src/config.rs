use std::fs;
use std::path::Path;

use yoke_core::llm::{GeminiConfig, OpenAiCompatConfig};
use yoke_core::voice::VoiceConfig;

/// Which completion backend every engine calls
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    Gemini,
    OpenAiCompat,
}

impl Backend {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(Backend::Gemini),
            "openai" | "openai-compat" | "openai_compat" => Some(Backend::OpenAiCompat),
            _ => None,
        }
    }
}

/// High-level configuration for the chat front end
#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub backend: Backend,
    pub gemini: GeminiConfig,
    pub llm: OpenAiCompatConfig,
    pub narration: NarrationConfig,
    /// Overrides the built-in persona directive when set
    pub system_prompt: Option<String>,
    pub web_search: bool,
}

/// Speech settings (speech always goes through the Gemini client)
#[derive(Clone, Debug)]
pub struct NarrationConfig {
    pub enabled: bool,
    pub voice: VoiceConfig,
    /// Hold the Playing phase for the clip's duration when no device is used
    pub realtime: bool,
    /// Play on the default output device (needs the `playback` feature)
    pub device: bool,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            enabled: env_flag("YOKE_NARRATION").unwrap_or(true),
            voice: VoiceConfig::default(),
            realtime: env_flag("YOKE_NARRATION_REALTIME").unwrap_or(true),
            device: env_flag("YOKE_AUDIO_DEVICE").unwrap_or(cfg!(feature = "playback")),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            backend: std::env::var("YOKE_BACKEND")
                .ok()
                .and_then(|s| Backend::parse(&s))
                .unwrap_or(Backend::Gemini),
            gemini: GeminiConfig::default(),
            llm: OpenAiCompatConfig::default(),
            narration: NarrationConfig::default(),
            system_prompt: std::env::var("YOKE_SYSTEM_PROMPT")
                .ok()
                .filter(|s| !s.is_empty()),
            web_search: env_flag("YOKE_WEB_SEARCH").unwrap_or(true),
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

impl ChatConfig {
    /// Load configuration from a TOML file (path via YOKE_CONFIG or ./yoke.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path = std::env::var("YOKE_CONFIG").unwrap_or_else(|_| "yoke.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target = "yoke_chat", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => Self::from_toml_str(&s, default),
            Err(e) => {
                tracing::warn!(target = "yoke_chat", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    fn from_toml_str(s: &str, default: Self) -> Self {
        match toml::from_str::<ChatToml>(s) {
            Ok(t) => t.overlay(default),
            Err(e) => {
                tracing::warn!(target = "yoke_chat", error = %e, "Failed to parse TOML; using defaults");
                default
            }
        }
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ChatToml {
    pub backend: Option<String>,
    pub system_prompt: Option<String>,
    pub web_search: Option<bool>,
    pub gemini: Option<GeminiToml>,
    pub llm: Option<LlmToml>,
    pub narration: Option<NarrationToml>,
}

impl ChatToml {
    fn overlay(self, mut base: ChatConfig) -> ChatConfig {
        if let Some(b) = self.backend.as_deref().and_then(Backend::parse) {
            base.backend = b;
        }
        if let Some(p) = self.system_prompt {
            base.system_prompt = Some(p);
        }
        if let Some(w) = self.web_search {
            base.web_search = w;
        }
        if let Some(g) = self.gemini {
            g.apply(&mut base.gemini);
        }
        if let Some(l) = self.llm {
            l.apply(&mut base.llm);
        }
        if let Some(n) = self.narration {
            n.apply(&mut base.narration);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct GeminiToml {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub tts_model: Option<String>,
    pub request_timeout_ms: Option<u64>,
}
impl GeminiToml {
    fn apply(self, g: &mut GeminiConfig) {
        if let Some(x) = self.base_url {
            g.base_url = x;
        }
        if let Some(x) = self.api_key {
            g.api_key = Some(x);
        }
        if let Some(x) = self.model {
            g.model = x;
        }
        if let Some(x) = self.tts_model {
            g.tts_model = x;
        }
        if let Some(x) = self.request_timeout_ms {
            g.request_timeout_ms = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct LlmToml {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub temperature: Option<f32>,
}
impl LlmToml {
    fn apply(self, l: &mut OpenAiCompatConfig) {
        if let Some(x) = self.base_url {
            l.base_url = x;
        }
        if let Some(x) = self.model {
            l.model = x;
        }
        if let Some(x) = self.api_key {
            l.api_key = Some(x);
        }
        if let Some(x) = self.request_timeout_ms {
            l.request_timeout_ms = x;
        }
        if let Some(x) = self.temperature {
            l.temperature = x;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct NarrationToml {
    pub enabled: Option<bool>,
    pub voice: Option<String>,
    pub realtime: Option<bool>,
    pub device: Option<bool>,
}
impl NarrationToml {
    fn apply(self, n: &mut NarrationConfig) {
        if let Some(x) = self.enabled {
            n.enabled = x;
        }
        if let Some(x) = self.voice {
            n.voice.voice = x;
        }
        if let Some(x) = self.realtime {
            n.realtime = x;
        }
        if let Some(x) = self.device {
            n.device = x;
        }
    }
}
