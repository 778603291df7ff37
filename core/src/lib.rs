// Yoke Core Library
// Engine fallback orchestration and voice narration runtime

pub mod app;
pub mod audio;
pub mod conversation;
pub mod engine;
pub mod llm;
pub mod log_stream;
pub mod orchestrator;
pub mod session;
pub mod voice;

mod utils;

// Export core types
pub use app::{TurnOutcome, YokeApp, YokeState};
pub use conversation::{Citation, Conversation, Message, Role};
pub use engine::{Engine, EngineCategory, EngineRegistry, EngineStatus};
pub use log_stream::{LogEntry, LogKind, LogStream};
pub use orchestrator::{OrchestratedReply, ResponseOrchestrator};
pub use session::{SessionState, VoicePhase};
pub use voice::{SpeakOutcome, VoiceController};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum YokeError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Audio decode error: {0}")]
    Decode(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Total exhaustion: every engine failed this turn")]
    Exhausted,

    #[error("An orchestration round is already in flight")]
    RoundInFlight,

    #[error("Input text is empty")]
    EmptyInput,
}
pub type Result<T> = std::result::Result<T, YokeError>;
