//! Core analysis engine

pub mod analyzer;
pub mod block;
pub mod decoder;
pub mod dsp;
pub mod phase;
pub mod tracks;
pub mod trend;

pub use analyzer::{AnalysisError, AnalyzerBuilder, DriftAnalyzer, FileAnalysis};
pub use block::BlockProcessor;
pub use decoder::{decode_wav, extract_mono, AudioData};
pub use tracks::{Track, TrackBank};
