//! Trend correlation over track frequency histories
//!
//! A track whose instantaneous frequency moves linearly with time has a
//! Pearson correlation near +/-1 against its sample index; a stationary
//! track hovers near zero. The per-block statistic is the mean coefficient
//! over all tracks with enough history, and the per-file scalar is the
//! mean *absolute* block value: the sign of the drift depends on the
//! demodulation convention, the magnitude is the discriminating signal.

use crate::core::dsp::stats::pearson_vs_index;
use crate::core::tracks::{Track, TrackBank};

/// Minimum history length before a track contributes a trend coefficient
pub const MIN_HISTORY: usize = 3;

/// Degenerate-history guard for the correlation denominator
const CORR_EPS: f64 = 1e-9;

/// Trend coefficient for one track, or `None` when its history is too
/// short or constant.
pub fn track_trend(track: &Track) -> Option<f64> {
    let history = track.inst_freq_history();
    if history.len() < MIN_HISTORY {
        return None;
    }
    let values: Vec<f64> = history.iter().copied().collect();
    pearson_vs_index(&values, CORR_EPS)
}

/// Mean trend coefficient over all qualifying live tracks, or `None`
/// when no track qualifies this block.
pub fn block_trend(bank: &TrackBank) -> Option<f64> {
    let coefficients: Vec<f64> = bank.tracks().iter().filter_map(track_trend).collect();
    if coefficients.is_empty() {
        return None;
    }
    Some(coefficients.iter().sum::<f64>() / coefficients.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    fn bank_with_history(histories: &[&[f64]]) -> TrackBank {
        let config = AnalyzerConfig::default();
        let mut bank = TrackBank::new(&config);
        for (i, history) in histories.iter().enumerate() {
            let idx = bank.spawn(1000.0 + 500.0 * i as f64).unwrap();
            for &value in *history {
                bank.track_mut(idx)
                    .record_match(1000.0, 0.0, value, config.smooth, config.hist_len);
            }
        }
        bank
    }

    #[test]
    fn test_linear_ramp_correlates_fully() {
        let bank = bank_with_history(&[&[100.0, 110.0, 120.0, 130.0]]);
        let rho = track_trend(&bank.tracks()[0]).unwrap();
        assert!((rho - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_history_excluded() {
        let bank = bank_with_history(&[&[100.0, 100.0, 100.0, 100.0]]);
        assert!(track_trend(&bank.tracks()[0]).is_none());
        assert!(block_trend(&bank).is_none());
    }

    #[test]
    fn test_short_history_excluded() {
        let bank = bank_with_history(&[&[100.0, 110.0]]);
        assert!(track_trend(&bank.tracks()[0]).is_none());
    }

    #[test]
    fn test_block_trend_averages_qualifying_tracks() {
        let bank = bank_with_history(&[
            &[100.0, 110.0, 120.0, 130.0],  // rho = 1
            &[400.0, 390.0, 380.0, 370.0],  // rho = -1
            &[250.0, 250.0, 250.0, 250.0],  // excluded
        ]);
        let block = block_trend(&bank).unwrap();
        assert!(block.abs() < 1e-12);
    }
}
