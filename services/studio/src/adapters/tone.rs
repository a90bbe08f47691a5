//! services/studio/src/adapters/tone.rs
//!
//! A stand-in for a real text-to-speech backend: every request is answered with
//! the same short sine beep, encoded as a mono 16-bit PCM WAV file.
//! It implements the `TextToSpeechService` port from the `core` crate.

use async_trait::async_trait;
use echoverse_core::ports::{PortError, PortResult, TextToSpeechService};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f64::consts::PI;
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

pub const SAMPLE_RATE: u32 = 44_100;
pub const AMPLITUDE: f64 = 16_000.0;
pub const DEFAULT_DURATION_MS: u32 = 900;
pub const DEFAULT_FREQUENCY_HZ: f64 = 440.0;

/// Bytes of a canonical WAV header counted by the RIFF chunk size, besides the PCM data.
const RIFF_OVERHEAD: u64 = 36;
const BYTES_PER_SAMPLE: u64 = 2;

#[derive(Debug, thiserror::Error)]
pub enum ToneError {
    #[error("A {duration_ms} ms tone needs {samples} samples, more than a WAV file can hold")]
    TooLong { duration_ms: u32, samples: u64 },
    #[error("Failed to encode WAV: {0}")]
    Encoding(#[from] hound::Error),
}

/// `round(SAMPLE_RATE * duration_ms / 1000)`, computed in integers.
pub fn sample_count(duration_ms: u32) -> u64 {
    (u64::from(SAMPLE_RATE) * u64::from(duration_ms) + 500) / 1000
}

/// Synthesizes a sine tone as a complete, playable WAV byte stream.
///
/// Sample `i` is `round(AMPLITUDE * sin(2π · frequency_hz · i / SAMPLE_RATE))`.
/// Durations whose PCM data would overflow the 32-bit RIFF sizes are refused.
pub fn generate_tone(duration_ms: u32, frequency_hz: f64) -> Result<Vec<u8>, ToneError> {
    let samples = sample_count(duration_ms);
    if samples * BYTES_PER_SAMPLE + RIFF_OVERHEAD > u64::from(u32::MAX) {
        return Err(ToneError::TooLong {
            duration_ms,
            samples,
        });
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)?;

    let step = 2.0 * PI * frequency_hz / f64::from(SAMPLE_RATE);
    for i in 0..samples {
        let value = (AMPLITUDE * (step * i as f64).sin()).round();
        writer.write_sample(value as i16)?;
    }

    writer.finalize()?;
    Ok(cursor.into_inner())
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Answers every speech request with the default beep after a fixed pause.
#[derive(Clone, Debug)]
pub struct ToneSynthesizer {
    delay: Duration,
    duration_ms: u32,
    frequency_hz: f64,
}

impl ToneSynthesizer {
    /// Creates a new `ToneSynthesizer` that waits `delay` before answering.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            duration_ms: DEFAULT_DURATION_MS,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
        }
    }
}

//=========================================================================================
// `TextToSpeechService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextToSpeechService for ToneSynthesizer {
    /// The text is ignored; the audio never depends on it.
    async fn generate_audio(&self, text: &str) -> PortResult<Vec<u8>> {
        debug!("Synthesizing placeholder tone for {} characters of text", text.chars().count());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        generate_tone(self.duration_ms, self.frequency_hz)
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
