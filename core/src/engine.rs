// Engine registry: the fixed roster of labeled backends the orchestrator walks
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Display status of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineStatus {
    Idle,
    Processing,
    Synced,
    Offline,
    Failed,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineStatus::Idle => "IDLE",
            EngineStatus::Processing => "PROCESSING",
            EngineStatus::Synced => "SYNCED",
            EngineStatus::Offline => "OFFLINE",
            EngineStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCategory {
    Core,
    Logic,
    Creative,
    Search,
    Context,
    Reasoning,
    Empathy,
}

/// A labeled candidate backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub id: String,
    pub display_name: String,
    pub provider_label: String,
    pub status: EngineStatus,
    pub load_percent: u32,
    pub priority_weight: u32,
    pub category: EngineCategory,
    pub pinned: bool,
}

impl Engine {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        provider_label: impl Into<String>,
        load_percent: u32,
        category: EngineCategory,
        priority_weight: u32,
        pinned: bool,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            provider_label: provider_label.into(),
            status: EngineStatus::Synced,
            load_percent,
            priority_weight,
            category,
            pinned,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == EngineStatus::Failed
    }
}

/// Registry of engines in seed order. Engines are never added or removed after
/// construction; only their status changes.
#[derive(Debug, Clone)]
pub struct EngineRegistry {
    engines: Vec<Engine>,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

impl EngineRegistry {
    pub fn new(engines: Vec<Engine>) -> Self {
        Self { engines }
    }

    /// The fourteen built-in engines, all starting `Synced`
    pub fn seeded() -> Self {
        use EngineCategory::*;
        Self::new(vec![
            Engine::new("yoke-core", "YOKE-Core Consciousness", "Sentient", 30, Core, 100, true),
            Engine::new("gpt-ref", "GPT-Logic Mapping", "OpenAI-Sim", 15, Reasoning, 80, false),
            Engine::new("claude-log", "CLAUDE-Rational Frame", "Anthropic-Sim", 12, Logic, 90, false),
            Engine::new("deep-soul", "DEEPSEEK-Abyssal Soul", "DeepSeek-Sim", 45, Empathy, 85, false),
            Engine::new("llama-nova", "LLAMA-Creative Nova", "Meta-Sim", 8, Creative, 70, false),
            Engine::new("gemini-pro", "GEMINI-Omniscient View", "Google", 20, Core, 95, true),
            Engine::new("mistral-w", "MISTRAL-Free Monsoon", "Mistral-Sim", 5, Logic, 60, false),
            Engine::new("qwen-sky", "QWEN-Cloud Summit", "Alibaba-Sim", 10, Reasoning, 75, false),
            Engine::new("grok-in", "GROK-Truth Insight", "xAI-Sim", 25, Search, 80, false),
            Engine::new("ernie-sp", "ERNIE-Resonance", "Baidu-Sim", 14, Empathy, 65, false),
            Engine::new("pi-emp", "PI-Emotive Force", "Inflection-Sim", 18, Empathy, 88, false),
            Engine::new("perp-scan", "PERPLEX-Boundless Scan", "Perplex-Sim", 30, Search, 90, false),
            Engine::new("minimax-c", "MINIMAX-Wings of Imagination", "MiniMax-Sim", 7, Creative, 70, false),
            Engine::new("yoke-backup", "YOKE-Emergency Overclock", "Emergency", 2, Core, 100, true),
        ])
    }

    /// All engines in registry order
    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Engine> {
        self.engines.iter().find(|e| e.id == id)
    }

    /// Snapshot sorted by priority weight, highest first. The sort is stable so
    /// equal weights keep registry order.
    pub fn ranked(&self) -> Vec<Engine> {
        let mut out = self.engines.clone();
        out.sort_by(|a, b| b.priority_weight.cmp(&a.priority_weight));
        out
    }

    /// Number of engines currently `Synced`
    pub fn healthy_count(&self) -> usize {
        self.engines
            .iter()
            .filter(|e| e.status == EngineStatus::Synced)
            .count()
    }

    pub fn is_failed(&self, id: &str) -> bool {
        self.get(id).map(Engine::is_failed).unwrap_or(false)
    }

    /// Flip an engine to `Failed`. Returns false if the id is unknown.
    pub fn mark_failed(&mut self, id: &str) -> bool {
        match self.engines.iter_mut().find(|e| e.id == id) {
            Some(engine) => {
                engine.status = EngineStatus::Failed;
                debug!(target = "engine", engine = %id, "Engine marked failed");
                true
            }
            None => false,
        }
    }

    /// Restore every failed engine to `Synced`. Operator action only; the
    /// orchestrator never calls this. Returns how many engines were restored.
    pub fn reset_failed(&mut self) -> usize {
        let mut restored = 0;
        for engine in self.engines.iter_mut().filter(|e| e.is_failed()) {
            engine.status = EngineStatus::Synced;
            restored += 1;
        }
        if restored > 0 {
            info!(target = "engine", restored, "Failed engines restored");
        }
        restored
    }
}
