//! Audio output sinks.
//!
//! `AudioOutput::play` resolves once playback has ended; the voice controller
//! uses that as its completion notification.

use crate::audio::decode::AudioBuffer;
use crate::Result;
use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Play the buffer to completion
    async fn play(&self, buffer: AudioBuffer) -> Result<()>;
}

/// Output with no device behind it. With `realtime` set it waits out the
/// clip's duration so the Playing phase lasts as long as real playback would.
#[derive(Debug, Clone, Default)]
pub struct SilentOutput {
    pub realtime: bool,
}

impl SilentOutput {
    pub fn new(realtime: bool) -> Self {
        Self { realtime }
    }
}

#[async_trait]
impl AudioOutput for SilentOutput {
    async fn play(&self, buffer: AudioBuffer) -> Result<()> {
        let duration = buffer.duration();
        debug!(
            target = "audio_output",
            frames = buffer.frames(),
            sample_rate = buffer.sample_rate,
            ?duration,
            "Silent playback"
        );
        if self.realtime {
            tokio::time::sleep(duration).await;
        }
        Ok(())
    }
}

/// Playback on the default output device via rodio.
///
/// rodio's `OutputStream` is not `Send`, so each clip opens the device inside a
/// blocking task and holds it until the sink drains.
#[cfg(feature = "playback")]
#[derive(Debug, Clone, Default)]
pub struct RodioOutput;

#[cfg(feature = "playback")]
impl RodioOutput {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "playback")]
#[async_trait]
impl AudioOutput for RodioOutput {
    async fn play(&self, buffer: AudioBuffer) -> Result<()> {
        use crate::YokeError;
        use rodio::buffer::SamplesBuffer;
        use rodio::{OutputStream, Sink};

        let duration = buffer.duration();
        let join = tokio::task::spawn_blocking(move || -> Result<()> {
            let (_stream, handle) = OutputStream::try_default()
                .map_err(|e| YokeError::Playback(e.to_string()))?;
            let sink = Sink::try_new(&handle).map_err(|e| YokeError::Playback(e.to_string()))?;
            sink.append(SamplesBuffer::new(
                buffer.channels,
                buffer.sample_rate,
                buffer.samples,
            ));
            sink.sleep_until_end();
            Ok(())
        });
        join.await
            .map_err(|e| YokeError::Playback(format!("playback task failed: {e}")))??;
        info!(target = "audio_output", ?duration, "Playback finished");
        Ok(())
    }
}
