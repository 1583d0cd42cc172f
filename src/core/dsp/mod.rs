//! Digital Signal Processing utilities

pub mod fft;
pub mod stats;
pub mod windows;

pub use fft::{bin_frequencies, FftProcessor};
pub use windows::{create_window, WindowKind};
