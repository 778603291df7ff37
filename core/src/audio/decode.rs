//! Decoding of speech payloads into playable sample buffers.

use crate::{Result, YokeError};
use std::time::Duration;

/// Interleaved f32 samples in [-1, 1] ready for an output device
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Decode a base64 payload of 16-bit little-endian PCM into an `AudioBuffer`.
/// Accepts a `data:` URL prefix and embedded whitespace.
pub fn decode_pcm16_base64(data: &str, sample_rate: u32, channels: u16) -> Result<AudioBuffer> {
    let bytes = base64_decode(data)?;
    decode_pcm16(&bytes, sample_rate, channels)
}

fn base64_decode(data: &str) -> Result<Vec<u8>> {
    use base64::Engine;

    let payload = if data.starts_with("data:") {
        data.split_once(',').map(|(_, b64)| b64).unwrap_or(data)
    } else {
        data
    };

    let normalized: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(normalized.as_bytes())
        .map_err(|e| YokeError::Decode(format!("Base64 decode error: {}", e)))
}

fn decode_pcm16(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<AudioBuffer> {
    if channels == 0 {
        return Err(YokeError::Decode("channel count must be at least 1".into()));
    }
    if bytes.is_empty() {
        return Err(YokeError::Decode("empty audio payload".into()));
    }
    if bytes.len() % 2 != 0 {
        return Err(YokeError::Decode(format!(
            "PCM16 payload has odd byte length {}",
            bytes.len()
        )));
    }
    let samples: Vec<f32> = bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]) as f32 / 32768.0)
        .collect();
    if samples.len() % channels as usize != 0 {
        return Err(YokeError::Decode(format!(
            "{} samples do not divide into {} channels",
            samples.len(),
            channels
        )));
    }
    Ok(AudioBuffer {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn encode(samples: &[i16]) -> String {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn pcm16_is_scaled_to_unit_range() {
        let buf = decode_pcm16_base64(&encode(&[0, 16384, -32768, 32767]), 24_000, 1).unwrap();
        assert_eq!(buf.samples.len(), 4);
        assert_eq!(buf.samples[0], 0.0);
        assert_eq!(buf.samples[1], 0.5);
        assert_eq!(buf.samples[2], -1.0);
        assert!(buf.samples[3] < 1.0 && buf.samples[3] > 0.999);
    }

    #[test]
    fn duration_follows_sample_rate() {
        let buf = decode_pcm16_base64(&encode(&vec![0i16; 24_000]), 24_000, 1).unwrap();
        assert_eq!(buf.frames(), 24_000);
        assert_eq!(buf.duration(), Duration::from_secs(1));
    }

    #[test]
    fn data_url_prefix_is_accepted() {
        let payload = format!("data:audio/L16;base64,{}", encode(&[1, 2]));
        assert_eq!(decode_pcm16_base64(&payload, 24_000, 1).unwrap().samples.len(), 2);
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(
            decode_pcm16_base64("not base64!!", 24_000, 1),
            Err(YokeError::Decode(_))
        ));
        assert!(matches!(
            decode_pcm16_base64("", 24_000, 1),
            Err(YokeError::Decode(_))
        ));
        // three bytes: odd length
        let odd = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]);
        assert!(matches!(
            decode_pcm16_base64(&odd, 24_000, 1),
            Err(YokeError::Decode(_))
        ));
    }
}
