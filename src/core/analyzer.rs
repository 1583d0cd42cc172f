//! File analysis driver
//!
//! Slides half-overlapping blocks over a whole-file sample buffer, feeds
//! them through peak detection, track matching, phase-locked frequency
//! estimation and the timeout sweep, and reduces the per-block trend
//! coefficients into one scalar per file.

use log::debug;
use thiserror::Error;

use crate::config::AnalyzerConfig;
use crate::core::block::BlockProcessor;
use crate::core::phase;
use crate::core::tracks::TrackBank;
use crate::core::trend;

/// Errors that abort a single file's analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("sample rate mismatch: analyzer expects {expected} Hz, input is {found} Hz")]
    SampleRateMismatch { expected: u32, found: u32 },
}

/// Per-file analysis outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileAnalysis {
    /// Mean absolute block-level trend coefficient; 0.0 when no block
    /// ever produced a qualifying track
    pub rho_mean_abs: f64,
    /// Number of blocks processed
    pub blocks_processed: usize,
    /// Number of blocks that contributed a trend value
    pub blocks_with_trend: usize,
}

/// Builder for a [`DriftAnalyzer`] with non-default tuning
pub struct AnalyzerBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
        }
    }

    pub fn sample_rate(mut self, fs: u32) -> Self {
        self.config.fs = fs;
        self
    }

    pub fn block_size(mut self, block: usize) -> Self {
        self.config.block = block;
        self
    }

    pub fn band(mut self, min_hz: f64, max_hz: f64) -> Self {
        self.config.band_min = min_hz;
        self.config.band_max = max_hz;
        self
    }

    pub fn peak_threshold(mut self, ratio: f64) -> Self {
        self.config.peak_thresh = ratio;
        self
    }

    pub fn max_tracks(mut self, max: usize) -> Self {
        self.config.max_tracks = max;
        self
    }

    pub fn timeout_blocks(mut self, blocks: u32) -> Self {
        self.config.timeout_blocks = blocks;
        self
    }

    pub fn smoothing(mut self, window: usize) -> Self {
        self.config.smooth = window;
        self
    }

    pub fn build(self) -> DriftAnalyzer {
        DriftAnalyzer::with_config(self.config)
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Streaming drift-signature analyzer.
///
/// One instance analyzes files sequentially; all track state is owned by
/// the instance and reset at the start of every file, so consecutive
/// analyses are independent and deterministic.
pub struct DriftAnalyzer {
    config: AnalyzerConfig,
    blocks: BlockProcessor,
    bank: TrackBank,
}

impl DriftAnalyzer {
    /// Analyzer with default configuration
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            blocks: BlockProcessor::new(&config),
            bank: TrackBank::new(&config),
            config,
        }
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one whole-file mono sample buffer.
    ///
    /// `sample_rate` must match the configured rate; a mismatch aborts
    /// this file without touching any other state.
    pub fn analyze(&mut self, samples: &[f32], sample_rate: u32) -> Result<FileAnalysis, AnalysisError> {
        if sample_rate != self.config.fs {
            return Err(AnalysisError::SampleRateMismatch {
                expected: self.config.fs,
                found: sample_rate,
            });
        }

        self.bank.clear();

        let block_len = self.config.block;
        let hop = block_len / 2;
        let fs = self.config.fs as f64;

        let mut block_values: Vec<f64> = Vec::new();
        let mut blocks_processed = 0usize;
        // Phase-reference counter: advances one full block per processed
        // block, matching the dt = block/fs convention of the estimator.
        let mut n0: u64 = 0;
        let mut block = vec![0.0f64; block_len];

        let mut start = 0usize;
        while start + block_len < samples.len() {
            for (dst, &src) in block.iter_mut().zip(&samples[start..start + block_len]) {
                *dst = f64::from(src);
            }

            self.process_block(&block, n0, fs);
            if let Some(value) = trend::block_trend(&self.bank) {
                block_values.push(value);
            }

            blocks_processed += 1;
            n0 += block_len as u64;
            start += hop;
        }

        let rho_mean_abs = if block_values.is_empty() {
            0.0
        } else {
            block_values.iter().map(|v| v.abs()).sum::<f64>() / block_values.len() as f64
        };

        debug!(
            "analyzed {} blocks ({} with trend), rho_mean_abs = {:.4}",
            blocks_processed,
            block_values.len(),
            rho_mean_abs
        );

        Ok(FileAnalysis {
            rho_mean_abs,
            blocks_processed,
            blocks_with_trend: block_values.len(),
        })
    }

    fn process_block(&mut self, block: &[f64], n0: u64, fs: f64) {
        let peaks = self.blocks.detect_peaks(block);

        self.bank.begin_block();
        for peak_freq in peaks {
            let Some(idx) = self.bank.resolve(peak_freq) else {
                // Bank full and nothing close enough: peak dropped
                continue;
            };

            let (smooth, hist_len) = (self.bank.smooth(), self.bank.hist_len());
            let track = self.bank.track_mut(idx);
            let estimate = phase::estimate_inst_freq(
                block,
                n0,
                track.center_frequency(),
                fs,
                track.previous_phase(),
            );
            track.record_match(peak_freq, estimate.phase, estimate.inst_freq, smooth, hist_len);
        }

        // The sweep runs on silent blocks too, so eviction timing does not
        // depend on whether a spectrum was computed.
        self.bank.sweep();
    }
}

impl Default for DriftAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rate_mismatch_is_fatal() {
        let mut analyzer = DriftAnalyzer::new();
        let err = analyzer.analyze(&vec![0.0; 48000], 44100).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::SampleRateMismatch { expected: 48000, found: 44100 }
        ));
    }

    #[test]
    fn test_short_input_yields_zero() {
        let mut analyzer = DriftAnalyzer::new();
        // Shorter than one block: no blocks processed, scalar defaults to 0.0
        let result = analyzer.analyze(&vec![0.1; 1024], 48000).unwrap();
        assert_eq!(result.blocks_processed, 0);
        assert_eq!(result.rho_mean_abs, 0.0);
    }

    #[test]
    fn test_silence_yields_zero() {
        let mut analyzer = DriftAnalyzer::new();
        let result = analyzer.analyze(&vec![0.0; 48000], 48000).unwrap();
        assert!(result.blocks_processed > 0);
        assert_eq!(result.blocks_with_trend, 0);
        assert_eq!(result.rho_mean_abs, 0.0);
    }

    #[test]
    fn test_builder_overrides() {
        let analyzer = DriftAnalyzer::builder()
            .max_tracks(50)
            .smoothing(10)
            .build();
        assert_eq!(analyzer.config().max_tracks, 50);
        assert_eq!(analyzer.config().smooth, 10);
        assert_eq!(analyzer.config().fs, 48000);
    }
}
