//! Analysis windows applied before the FFT to reduce spectral leakage

use std::f32::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    Hamming,

    /// Rectangular window (no windowing)
    Rectangular,
}

/// Generate window coefficients w[n] for n = 0..length-1.
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f32> {
    let m = length as f32;
    let mut window = Vec::with_capacity(length);

    match window_type {
        WindowType::Hann => {
            for n in 0..length {
                let angle = 2.0 * PI * n as f32 / (m - 1.0);
                window.push(0.5 - 0.5 * angle.cos());
            }
        }

        WindowType::Hamming => {
            for n in 0..length {
                let angle = 2.0 * PI * n as f32 / (m - 1.0);
                window.push(0.54 - 0.46 * angle.cos());
            }
        }

        WindowType::Rectangular => {
            window.resize(length, 1.0);
        }
    }

    window
}

/// Multiply `signal` by precomputed coefficients in place.
///
/// The frame producer precomputes its window once, so the per-tick cost is
/// a single multiply pass with no allocation.
pub fn apply_window_inplace(signal: &mut [f32], window: &[f32]) {
    debug_assert_eq!(signal.len(), window.len());
    for (s, w) in signal.iter_mut().zip(window.iter()) {
        *s *= w;
    }
}
