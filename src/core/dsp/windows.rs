//! Window function implementations

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Rectangular,
    Hann,
    Hamming,
    Blackman,
}

impl Default for WindowKind {
    fn default() -> Self {
        Self::Hann
    }
}

/// Create window coefficients (periodic form, suited to FFT analysis)
pub fn create_window(size: usize, kind: WindowKind) -> Vec<f64> {
    let denom = size as f64;
    (0..size)
        .map(|i| {
            let x = 2.0 * PI * i as f64 / denom;
            match kind {
                WindowKind::Rectangular => 1.0,
                WindowKind::Hann => 0.5 * (1.0 - x.cos()),
                WindowKind::Hamming => 0.54 - 0.46 * x.cos(),
                WindowKind::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
            }
        })
        .collect()
}
