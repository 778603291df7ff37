// Audio decode and output sinks for narration

pub mod decode;
pub mod output;

pub use decode::{decode_pcm16_base64, AudioBuffer};
#[cfg(feature = "playback")]
pub use output::RodioOutput;
pub use output::{AudioOutput, SilentOutput};
