//! Analyzer configuration

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tuning parameters for the drift analyzer.
///
/// The defaults reproduce the reference experiment setup: 48 kHz audio,
/// 4096-sample blocks with 50% overlap, and peak tracking restricted to
/// the 500 Hz – 18 kHz band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Expected sample rate in Hz; files at any other rate are rejected
    pub fs: u32,
    /// Analysis block size in samples (also the FFT size)
    pub block: usize,
    /// Lower edge of the analysis band in Hz
    pub band_min: f64,
    /// Upper edge of the analysis band in Hz
    pub band_max: f64,
    /// Peak-to-noise-floor ratio required for peak detection
    pub peak_thresh: f64,
    /// Maximum number of simultaneously live tracks
    pub max_tracks: usize,
    /// Consecutive missed blocks before a track is evicted
    pub timeout_blocks: u32,
    /// Instantaneous-frequency history window used for trend estimation
    pub smooth: usize,
    /// Capacity of the secondary per-track drift log.
    /// Not consumed by the trend statistic; retained for forward compatibility.
    pub hist_len: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fs: 48000,
            block: 4096,
            band_min: 500.0,
            band_max: 18000.0,
            peak_thresh: 6.0,
            max_tracks: 10,
            timeout_blocks: 20,
            smooth: 8,
            hist_len: 50,
        }
    }
}

impl AnalyzerConfig {
    /// Peak-to-track matching tolerance: one FFT bin width.
    ///
    /// Derived from `fs / block` rather than configured separately, so the
    /// matching semantics stay coupled to the spectral resolution.
    pub fn tol_hz(&self) -> f64 {
        self.fs as f64 / self.block as f64
    }

    /// Block duration in seconds
    pub fn block_secs(&self) -> f64 {
        self.block as f64 / self.fs as f64
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
