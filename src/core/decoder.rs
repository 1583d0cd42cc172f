// src/core/decoder.rs
//
// WAV decoding at the analyzer boundary. Trial signals are written and
// read back as mono 32-bit float WAV; arbitrary integer WAVs are accepted
// and normalized.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Container for decoded audio data
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Interleaved samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub channels: usize,
    /// Duration in seconds
    pub duration_secs: f64,
}

/// Decode a WAV file to floating-point samples
pub fn decode_wav(path: &Path) -> Result<AudioData> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .with_context(|| format!("Failed to read samples from {}", path.display()))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .with_context(|| format!("Failed to read samples from {}", path.display()))?
        }
    };

    if samples.is_empty() {
        bail!("No audio samples decoded from {}", path.display());
    }

    let channels = spec.channels as usize;
    let duration_secs = samples.len() as f64 / (spec.sample_rate as f64 * channels as f64);

    Ok(AudioData {
        samples,
        sample_rate: spec.sample_rate,
        channels,
        duration_secs,
    })
}

/// Extract mono samples from potentially multi-channel audio
pub fn extract_mono(audio: &AudioData) -> Vec<f32> {
    if audio.channels == 1 {
        return audio.samples.clone();
    }

    let num_samples = audio.samples.len() / audio.channels;
    let mut mono = Vec::with_capacity(num_samples);

    for i in 0..num_samples {
        let mut sum = 0.0f32;
        for ch in 0..audio.channels {
            sum += audio.samples[i * audio.channels + ch];
        }
        mono.push(sum / audio.channels as f32);
    }

    mono
}
