//! Spectral block processing and peak detection

use crate::config::AnalyzerConfig;
use crate::core::dsp::stats::{mean_square, median};
use crate::core::dsp::{bin_frequencies, FftProcessor, WindowKind};

/// Blocks with mean squared amplitude below this are treated as silence
/// and produce no peaks (no spectrum is computed for them).
const SILENCE_FLOOR: f64 = 1e-10;

/// Keeps the noise-floor division defined when a band is entirely empty
const NOISE_EPS: f64 = 1e-12;

/// Windows one audio block, computes its banded magnitude spectrum, and
/// picks the bins standing above an adaptive noise floor.
///
/// The floor is the *median* band magnitude: robust to the peaks
/// themselves, so detection stays stable as the number of simultaneous
/// tones varies.
pub struct BlockProcessor {
    fft: FftProcessor,
    band_bins: Vec<usize>,
    bin_freqs: Vec<f64>,
    peak_thresh: f64,
}

impl BlockProcessor {
    pub fn new(config: &AnalyzerConfig) -> Self {
        let bin_freqs = bin_frequencies(config.block, config.fs);
        let band_bins: Vec<usize> = bin_freqs
            .iter()
            .enumerate()
            .filter(|(_, &f)| f >= config.band_min && f <= config.band_max)
            .map(|(i, _)| i)
            .collect();

        Self {
            fft: FftProcessor::new(config.block, WindowKind::Hann),
            band_bins,
            bin_freqs,
            peak_thresh: config.peak_thresh,
        }
    }

    /// Detect peak frequencies in one block of raw samples.
    ///
    /// Returns an empty list for near-silent blocks. Order of the returned
    /// frequencies follows bin order; callers must not rely on it.
    pub fn detect_peaks(&mut self, block: &[f64]) -> Vec<f64> {
        if mean_square(block) < SILENCE_FLOOR {
            return Vec::new();
        }

        let mag = self.fft.magnitude_spectrum(block);

        let band_mag: Vec<f64> = self.band_bins.iter().map(|&b| mag[b]).collect();
        let noise_floor = median(&mut band_mag.clone()) + NOISE_EPS;

        self.band_bins
            .iter()
            .zip(band_mag.iter())
            .filter(|(_, &m)| m / noise_floor > self.peak_thresh)
            .map(|(&bin, _)| self.bin_freqs[bin])
            .collect()
    }

    pub fn band_bin_count(&self) -> usize {
        self.band_bins.len()
    }
}
