//! Synthetic protocol signal generation
//!
//! Produces the two trial signal families: a stationary bank of equally
//! spaced sinusoids (the null condition) and the same bank with every
//! component swept linearly in frequency (the drift condition). Both are
//! RMS-normalized so the analyzer sees identical power.

use std::f64::consts::PI;
use std::path::Path;

use anyhow::{Context, Result};

/// Seeded xorshift64 generator.
///
/// Deterministic per seed, which keeps whole experiment runs and test
/// fixtures reproducible without carrying an external RNG dependency.
#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Scramble the seed so small consecutive seeds diverge immediately
        let mut state = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        if state == 0 {
            state = 0x853c49e6748fea9b;
        }
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform draw in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform draw in [lo, hi)
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Gaussian draw via Box-Muller
    pub fn gaussian(&mut self, mean: f64, sigma: f64) -> f64 {
        let u1 = 1.0 - self.next_f64(); // (0, 1], keeps ln() finite
        let u2 = self.next_f64();
        mean + sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_u64() % (i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }
}

/// Shared shape of both protocol signals
#[derive(Debug, Clone)]
pub struct ToneBankParams {
    /// Number of sinusoid components
    pub n_tones: usize,
    /// Lowest component start frequency in Hz
    pub f_min: f64,
    /// Highest component start frequency in Hz
    pub f_max: f64,
}

impl Default for ToneBankParams {
    fn default() -> Self {
        Self {
            n_tones: 50,
            f_min: 1000.0,
            f_max: 15000.0,
        }
    }
}

/// Sweep parameters for the drift condition
#[derive(Debug, Clone)]
pub struct ChirpParams {
    /// Nominal chirp rate in Hz per second
    pub rate: f64,
    /// Draw a random phase per component (instead of phase 0)
    pub vary_phases: bool,
    /// Per-component gaussian jitter on the chirp rate, std dev in Hz/s.
    /// 0.0 disables jitter.
    pub jitter_sigma: f64,
}

impl Default for ChirpParams {
    fn default() -> Self {
        Self {
            rate: 500.0,
            vary_phases: true,
            jitter_sigma: 50.0,
        }
    }
}

/// Stationary multitone signal: `n_tones` sinusoids linearly spaced over
/// [f_min, f_max], equal amplitudes, random phases. The null condition.
pub fn stationary_tones(
    duration_secs: f64,
    fs: u32,
    tones: &ToneBankParams,
    rng: &mut Prng,
) -> Vec<f32> {
    let freqs = linspace(tones.f_min, tones.f_max, tones.n_tones);
    let amplitude = 1.0 / tones.n_tones as f64;
    let phases: Vec<f64> = freqs.iter().map(|_| rng.uniform(0.0, 2.0 * PI)).collect();

    let n_samples = (duration_secs * fs as f64) as usize;
    let mut signal = vec![0.0f64; n_samples];
    for (&f, &phase) in freqs.iter().zip(&phases) {
        for (i, s) in signal.iter_mut().enumerate() {
            let t = i as f64 / fs as f64;
            *s += amplitude * (2.0 * PI * f * t + phase).sin();
        }
    }

    normalize_rms(&mut signal);
    signal.iter().map(|&s| s as f32).collect()
}

/// Chirped multitone signal: the same tone bank with each component's
/// frequency swept at `chirp.rate` Hz/s (plus optional per-component
/// jitter). The drift condition.
pub fn chirped_tones(
    duration_secs: f64,
    fs: u32,
    tones: &ToneBankParams,
    chirp: &ChirpParams,
    rng: &mut Prng,
) -> Vec<f32> {
    let freqs = linspace(tones.f_min, tones.f_max, tones.n_tones);
    let amplitude = 1.0 / tones.n_tones as f64;
    let phases: Vec<f64> = freqs
        .iter()
        .map(|_| {
            if chirp.vary_phases {
                rng.uniform(0.0, 2.0 * PI)
            } else {
                0.0
            }
        })
        .collect();

    let n_samples = (duration_secs * fs as f64) as usize;
    let mut signal = vec![0.0f64; n_samples];
    for (&f_start, &phase) in freqs.iter().zip(&phases) {
        let rate = if chirp.jitter_sigma > 0.0 {
            chirp.rate + rng.gaussian(0.0, chirp.jitter_sigma)
        } else {
            chirp.rate
        };

        for (i, s) in signal.iter_mut().enumerate() {
            let t = i as f64 / fs as f64;
            // Linear sweep: instantaneous frequency f_start + rate * t
            let arg = 2.0 * PI * (f_start * t + 0.5 * rate * t * t) + phase;
            *s += amplitude * arg.sin();
        }
    }

    normalize_rms(&mut signal);
    signal.iter().map(|&s| s as f32).collect()
}

/// Write mono samples as a 32-bit float WAV
pub fn write_wav(path: &Path, samples: &[f32], fs: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: fs,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;

    Ok(())
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![lo];
    }
    let step = (hi - lo) / (n - 1) as f64;
    (0..n).map(|i| lo + step * i as f64).collect()
}

/// Scale the signal to unit RMS power
fn normalize_rms(signal: &mut [f64]) {
    let ms = signal.iter().map(|s| s * s).sum::<f64>() / signal.len().max(1) as f64;
    if ms > 0.0 {
        let rms = ms.sqrt();
        for s in signal.iter_mut() {
            *s /= rms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rms_f32(samples: &[f32]) -> f64 {
        let ms = samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / samples.len() as f64;
        ms.sqrt()
    }

    #[test]
    fn test_prng_is_deterministic() {
        let mut a = Prng::new(42);
        let mut b = Prng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_prng_seeds_diverge() {
        let mut a = Prng::new(1);
        let mut b = Prng::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_uniform_in_range() {
        let mut rng = Prng::new(7);
        for _ in 0..1000 {
            let x = rng.uniform(-1.0, 1.0);
            assert!((-1.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = Prng::new(5);
        let mut items: Vec<u32> = (0..64).collect();
        rng.shuffle(&mut items);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..64).collect::<Vec<u32>>());
        assert_ne!(items, (0..64).collect::<Vec<u32>>());
    }

    #[test]
    fn test_stationary_signal_shape() {
        let mut rng = Prng::new(42);
        let signal = stationary_tones(1.0, 48000, &ToneBankParams::default(), &mut rng);
        assert_eq!(signal.len(), 48000);
        assert!((rms_f32(&signal) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_chirped_signal_shape() {
        let mut rng = Prng::new(42);
        let signal = chirped_tones(
            1.0,
            48000,
            &ToneBankParams::default(),
            &ChirpParams::default(),
            &mut rng,
        );
        assert_eq!(signal.len(), 48000);
        assert!((rms_f32(&signal) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_same_seed_same_signal() {
        let tones = ToneBankParams::default();
        let a = stationary_tones(0.5, 48000, &tones, &mut Prng::new(9));
        let b = stationary_tones(0.5, 48000, &tones, &mut Prng::new(9));
        assert_eq!(a, b);
    }
}
