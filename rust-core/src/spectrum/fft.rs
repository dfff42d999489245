//! FFT engine using realfft for real-valued signals
//!
//! Provides the forward-transform primitive of the pipeline: N real samples
//! in, N/2 dB-magnitude bins out.

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Real-to-complex FFT with preallocated working storage.
///
/// All buffers are sized at construction; `magnitude_db` performs no
/// allocation and is safe to call from the analysis tick every frame.
pub struct FftEngine {
    fft_size: usize,
    r2c: Arc<dyn RealToComplex<f32>>,
    input_buffer: Vec<f32>,
    output_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl FftEngine {
    /// Plan a forward FFT of `fft_size` samples.
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();
        let scratch = r2c.make_scratch_vec();

        Self {
            fft_size,
            r2c,
            input_buffer,
            output_buffer,
            scratch,
        }
    }

    /// Compute the dB-magnitude spectrum of `signal` into `out`.
    ///
    /// `out` must hold exactly `fft_size / 2` bins; the Nyquist bin is
    /// dropped so the spectrum is exactly half the time-domain length.
    /// Signals shorter than `fft_size` are zero-padded. Magnitudes are
    /// clamped at 1e-10 before the log to avoid -inf on silent bins.
    pub fn magnitude_db(&mut self, signal: &[f32], out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.fft_size / 2);

        let copy_len = signal.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&signal[..copy_len]);
        if copy_len < self.fft_size {
            self.input_buffer[copy_len..].fill(0.0);
        }

        // realfft only fails on mis-sized buffers, which are fixed here.
        self.r2c
            .process_with_scratch(
                &mut self.input_buffer,
                &mut self.output_buffer,
                &mut self.scratch,
            )
            .expect("FFT buffer sizes fixed at construction");

        for (slot, c) in out.iter_mut().zip(self.output_buffer.iter()) {
            let mag = c.norm().max(1e-10);
            *slot = 20.0 * mag.log10();
        }
    }

    /// FFT size (time-domain length).
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of spectrum bins produced (`fft_size / 2`).
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_sine_peak_lands_on_expected_bin() {
        let mut fft = FftEngine::new(1024);
        let sample_rate = 48000.0;
        let freq_hz = 3000.0;

        let signal: Vec<f32> = (0..1024)
            .map(|n| (TAU * freq_hz * n as f32 / sample_rate).sin())
            .collect();

        let mut spectrum = vec![0.0; 512];
        fft.magnitude_db(&signal, &mut spectrum);

        let (peak_bin, _) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        let expected_bin = (freq_hz * 1024.0 / sample_rate).round() as usize;
        assert!((peak_bin as i32 - expected_bin as i32).abs() <= 1);
    }

    #[test]
    fn test_silence_hits_the_floor_not_neg_inf() {
        let mut fft = FftEngine::new(256);
        let signal = vec![0.0f32; 256];

        let mut spectrum = vec![0.0; 128];
        fft.magnitude_db(&signal, &mut spectrum);

        for &db in &spectrum {
            assert!(db.is_finite());
            assert!(db <= -190.0); // 20*log10(1e-10)
        }
    }

    #[test]
    fn test_short_signal_is_zero_padded() {
        let mut fft = FftEngine::new(512);
        let signal = vec![1.0f32; 100];

        let mut spectrum = vec![0.0; 256];
        fft.magnitude_db(&signal, &mut spectrum);

        // DC bin should dominate for a constant signal.
        assert!(spectrum[0] > spectrum[50]);
        assert!(spectrum[0] > 20.0); // |X[0]| = 100
    }

    #[test]
    fn test_spectrum_is_half_the_fft_size() {
        let fft = FftEngine::new(4096);
        assert_eq!(fft.num_bins(), 2048);
    }
}
