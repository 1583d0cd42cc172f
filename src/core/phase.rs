//! Phase-locked instantaneous-frequency estimation
//!
//! Each matched track gets a single-bin DFT of the raw block against a
//! local oscillator at the track's current center frequency. Only the
//! phase slope between consecutive matched blocks matters, which makes the
//! estimate robust to amplitude noise; the center frequency re-centers
//! every block through the track bank's EMA, keeping the phase increment
//! small enough to unwrap.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Wrap an angle into (-pi, pi]
pub fn principal_angle(a: f64) -> f64 {
    (a + PI).rem_euclid(2.0 * PI) - PI
}

/// Phase of the block demodulated at `f0`.
///
/// `n0` is the absolute sample index of the block start, so phases from
/// consecutive blocks share one time reference. Computes
/// `angle(sum(conj(exp(-i 2 pi f0 (n0+k)/fs)) * x[k]))`.
pub fn lock_in_phase(block: &[f64], n0: u64, f0: f64, fs: f64) -> f64 {
    let step = 2.0 * PI * f0 / fs;
    let mut z = Complex64::new(0.0, 0.0);
    for (k, &x) in block.iter().enumerate() {
        let theta = step * (n0 + k as u64) as f64;
        z += Complex64::from_polar(x, theta);
    }
    z.arg()
}

/// Result of one lock-in measurement
#[derive(Debug, Clone, Copy)]
pub struct PhaseLockedEstimate {
    /// Phase to carry forward as the next block's reference
    pub phase: f64,
    /// Instantaneous frequency in Hz: `f0` plus the phase-slope deviation
    pub inst_freq: f64,
}

/// Estimate a track's instantaneous frequency from one block.
///
/// `f0` is the track's center frequency *before* the EMA update for this
/// block. On the track's first match there is no phase reference yet and
/// the deviation is zero.
pub fn estimate_inst_freq(
    block: &[f64],
    n0: u64,
    f0: f64,
    fs: f64,
    previous_phase: Option<f64>,
) -> PhaseLockedEstimate {
    let phase = lock_in_phase(block, n0, f0, fs);

    let deviation = match previous_phase {
        Some(prev) => {
            let dphi = principal_angle(phase - prev);
            // Time between successive processed blocks, overlap ignored
            let dt = block.len() as f64 / fs;
            (dphi / (2.0 * PI)) / dt
        }
        None => 0.0,
    };

    PhaseLockedEstimate {
        phase,
        inst_freq: f0 + deviation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_angle_wrapping() {
        assert!((principal_angle(0.0)).abs() < 1e-12);
        assert!((principal_angle(PI) - PI).abs() < 1e-12);
        assert!((principal_angle(-PI) - PI).abs() < 1e-12);
        assert!((principal_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((principal_angle(2.0 * PI + 0.25) - 0.25).abs() < 1e-12);
        assert!((principal_angle(-2.0 * PI - 0.25) + 0.25).abs() < 1e-12);
    }

    fn tone_block(f: f64, fs: f64, start: usize, len: usize) -> Vec<f64> {
        (start..start + len)
            .map(|n| (2.0 * PI * f * n as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_on_frequency_tone_has_no_deviation() {
        let fs = 48000.0;
        let n = 4096;
        let f0 = 1000.0;

        let first = estimate_inst_freq(&tone_block(f0, fs, 0, n), 0, f0, fs, None);
        assert!((first.inst_freq - f0).abs() < 1e-9);

        let second =
            estimate_inst_freq(&tone_block(f0, fs, n, n), n as u64, f0, fs, Some(first.phase));
        assert!((second.inst_freq - f0).abs() < 0.05);
    }

    #[test]
    fn test_detuned_tone_deviation() {
        // The demodulation conjugate flips the sign of the deviation:
        // a tone at f against an oscillator at f0 reads as f0 + (f0 - f).
        let fs = 48000.0;
        let n = 4096;
        let f0 = 1000.0;
        let f = 1001.0;

        let first = estimate_inst_freq(&tone_block(f, fs, 0, n), 0, f0, fs, None);
        let second =
            estimate_inst_freq(&tone_block(f, fs, n, n), n as u64, f0, fs, Some(first.phase));

        assert!((second.inst_freq - (2.0 * f0 - f)).abs() < 0.05);
    }

    #[test]
    fn test_first_match_has_zero_deviation() {
        let fs = 48000.0;
        let block = tone_block(3000.0, fs, 0, 4096);
        let est = estimate_inst_freq(&block, 0, 2990.0, fs, None);
        assert_eq!(est.inst_freq, 2990.0);
    }
}
