//! Voice narration: meta-tag cleaning and the single-flight synthesis/playback controller

mod clean;
mod controller;

pub use clean::strip_meta_tags;
pub use controller::{SpeakOutcome, VoiceConfig, VoiceController};
