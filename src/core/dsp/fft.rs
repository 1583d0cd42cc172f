//! FFT processing with windowing

use rustfft::{num_complex::Complex, FftPlanner};

use super::windows::{create_window, WindowKind};

/// Windowed forward FFT producing one-sided spectra
pub struct FftProcessor {
    planner: FftPlanner<f64>,
    window: Vec<f64>,
    fft_size: usize,
}

impl FftProcessor {
    pub fn new(fft_size: usize, kind: WindowKind) -> Self {
        Self {
            planner: FftPlanner::new(),
            window: create_window(fft_size, kind),
            fft_size,
        }
    }

    /// One-sided magnitude spectrum (`fft_size / 2 + 1` bins)
    pub fn magnitude_spectrum(&mut self, samples: &[f64]) -> Vec<f64> {
        let fft = self.planner.plan_fft_forward(self.fft_size);

        let mut buffer: Vec<Complex<f64>> = samples
            .iter()
            .take(self.fft_size)
            .enumerate()
            .map(|(i, &s)| Complex::new(s * self.window[i], 0.0))
            .collect();

        // Zero-pad short blocks
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        fft.process(&mut buffer);

        buffer[..self.fft_size / 2 + 1]
            .iter()
            .map(|c| c.norm())
            .collect()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
}

/// Center frequencies of the one-sided spectrum bins
pub fn bin_frequencies(fft_size: usize, sample_rate: u32) -> Vec<f64> {
    let bin_width = sample_rate as f64 / fft_size as f64;
    (0..=fft_size / 2).map(|i| i as f64 * bin_width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_spectrum_length() {
        let mut proc = FftProcessor::new(1024, WindowKind::Hann);
        let samples = vec![0.0; 1024];
        assert_eq!(proc.magnitude_spectrum(&samples).len(), 513);
    }

    #[test]
    fn test_pure_tone_peak_bin() {
        // 1 kHz tone at 48 kHz with a 4096 FFT lands near bin 85
        let fs = 48000.0;
        let n = 4096;
        let samples: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 1000.0 * i as f64 / fs).sin())
            .collect();

        let mut proc = FftProcessor::new(n, WindowKind::Hann);
        let mag = proc.magnitude_spectrum(&samples);

        let peak_bin = mag
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        let freqs = bin_frequencies(n, 48000);
        assert!((freqs[peak_bin] - 1000.0).abs() < 48000.0 / 4096.0);
    }

    #[test]
    fn test_bin_frequencies() {
        let freqs = bin_frequencies(4096, 48000);
        assert_eq!(freqs.len(), 2049);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[2048] - 24000.0).abs() < 1e-9);
    }
}
