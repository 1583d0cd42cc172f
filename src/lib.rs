//! driftscan - Detect frequency-drift signatures in audio
//!
//! Measures whether an audio signal exhibits a chirp-like frequency drift
//! versus a stationary null, by tracking spectral peaks across overlapping
//! FFT blocks and correlating each track's phase-derived instantaneous
//! frequency against time.
//!
//! ## How it works
//!
//! - **Block processing**: Hann-windowed FFT per 50%-overlapping block,
//!   peaks picked against a median noise floor inside the analysis band
//! - **Track bank**: peaks are matched to persistent frequency tracks
//!   within one bin width, spawning new tracks under a capacity cap and
//!   evicting tracks that miss too many consecutive blocks
//! - **Phase-locked estimation**: each matched block is demodulated at the
//!   track's center frequency; the phase slope between blocks gives an
//!   instantaneous-frequency estimate
//! - **Trend statistic**: Pearson correlation of each track's frequency
//!   history against time, averaged per block, then `mean(|block value|)`
//!   per file. Chirps score near 1, stationary signals near 0.
//!
//! ## Module Structure
//!
//! - `core` - analysis engine (blocks, tracks, phase, trend, driver)
//! - `config` - analyzer tuning parameters
//! - `synth` - protocol signal generation for experiments
//! - `experiment` - trial scheduling and CSV result persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use driftscan::{DriftAnalyzer, synth};
//! use driftscan::synth::{ChirpParams, Prng, ToneBankParams};
//!
//! let mut rng = Prng::new(42);
//! let signal = synth::chirped_tones(
//!     2.0, 48000, &ToneBankParams::default(), &ChirpParams::default(), &mut rng,
//! );
//!
//! let mut analyzer = DriftAnalyzer::new();
//! let result = analyzer.analyze(&signal, 48000).unwrap();
//! println!("rho_mean_abs = {:.3}", result.rho_mean_abs);
//! ```

// Core analysis engine
pub mod core;

// Configuration
pub mod config;

// Experiment orchestration and persistence
pub mod experiment;

// Synthetic protocol signals
pub mod synth;

// Re-export commonly used types at crate root for convenience
pub use config::AnalyzerConfig;
pub use core::{AnalysisError, AnalyzerBuilder, DriftAnalyzer, FileAnalysis};
pub use experiment::{Condition, ExperimentConfig, ResultSink, TrialRecord};
