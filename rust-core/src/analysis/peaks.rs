//! Sliding-window peak extraction over the dB spectrum
//!
//! Finds the two loudest tones in a single left-to-right pass, with a
//! stale-retention policy when fewer than two qualifying peaks show up.

/// One detected spectral peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub bin: usize,
    pub magnitude_db: f32,
    pub frequency_hz: f32,
}

impl Peak {
    const fn zero() -> Self {
        Self {
            bin: 0,
            magnitude_db: 0.0,
            frequency_hz: 0.0,
        }
    }
}

/// Peak detector tuning, fixed at construction.
#[derive(Debug, Clone)]
pub struct PeakConfig {
    /// Sliding window length in bins; must be odd.
    pub window_len: usize,
    /// Minimum center magnitude for a candidate, in dB.
    pub threshold_db: f32,
    /// Refine peak frequencies with parabolic sub-bin interpolation.
    pub interpolate: bool,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            window_len: 9,
            threshold_db: 5.0,
            interpolate: false,
        }
    }
}

/// Stateful top-two peak extractor.
///
/// Retains the previous result across calls that find fewer than two
/// qualifying peaks, so downstream consumers never see the output flicker
/// back to zero on a quiet frame. Startup state is two zero peaks.
pub struct PeakExtractor {
    config: PeakConfig,
    /// Bin spacing in Hz (`sample_rate / fft_size`).
    delta_f: f32,
    top_two: [Peak; 2],
}

impl PeakExtractor {
    pub fn new(config: PeakConfig, delta_f: f32) -> Self {
        Self {
            config,
            delta_f,
            top_two: [Peak::zero(), Peak::zero()],
        }
    }

    /// Scan `spectrum` and return the current top-two peaks.
    ///
    /// A candidate is the center bin of each window position; it is accepted
    /// when its magnitude reaches the threshold and equals the window
    /// maximum (ties accept). The running top-two is maintained in one pass:
    /// beating the primary demotes it to secondary.
    pub fn detect(&mut self, spectrum: &[f32]) -> [Peak; 2] {
        let w = self.config.window_len;
        let half = w / 2;

        let mut max1 = 0.0f32;
        let mut max2 = 0.0f32;
        let mut idx1 = 0usize;
        let mut idx2 = 0usize;

        for i in 0..spectrum.len().saturating_sub(w) {
            let middle = i + half;
            let center = spectrum[middle];
            if center < self.config.threshold_db {
                continue;
            }
            let window_max = spectrum[i..i + w]
                .iter()
                .fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
            if window_max != center {
                continue;
            }

            if center > max1 {
                max2 = max1;
                idx2 = idx1;
                max1 = center;
                idx1 = middle;
            } else if center > max2 {
                max2 = center;
                idx2 = middle;
            }
        }

        // Fewer than two qualifying peaks: keep the previous result.
        if idx1 != 0 && idx2 != 0 {
            self.top_two = [
                self.make_peak(spectrum, idx1, max1),
                self.make_peak(spectrum, idx2, max2),
            ];
        }

        self.top_two
    }

    fn make_peak(&self, spectrum: &[f32], bin: usize, magnitude_db: f32) -> Peak {
        let frequency_hz = if self.config.interpolate {
            parabolic_interpolation(spectrum, bin, self.delta_f)
        } else {
            bin as f32 * self.delta_f
        };
        Peak {
            bin,
            magnitude_db,
            frequency_hz,
        }
    }

    /// Last published top-two without rescanning.
    pub fn top_two(&self) -> [Peak; 2] {
        self.top_two
    }

    pub fn config(&self) -> &PeakConfig {
        &self.config
    }
}

/// Quadratic sub-bin frequency estimate from the three magnitudes around a
/// peak bin: offset = (m3-m1)/(2*m2-m1-m3) * Δf/2.
///
/// Falls back to the bin-center frequency at the spectrum edges or when the
/// three points are collinear.
pub fn parabolic_interpolation(spectrum: &[f32], bin: usize, delta_f: f32) -> f32 {
    let center = bin as f32 * delta_f;
    if bin == 0 || bin + 1 >= spectrum.len() {
        return center;
    }
    let m1 = spectrum[bin - 1];
    let m2 = spectrum[bin];
    let m3 = spectrum[bin + 1];
    let denom = 2.0 * m2 - m1 - m3;
    if denom == 0.0 {
        return center;
    }
    center + (m3 - m1) / denom * (delta_f / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat floor with isolated peaks at the given (bin, dB) positions.
    fn spectrum_with_peaks(len: usize, peaks: &[(usize, f32)]) -> Vec<f32> {
        let mut spectrum = vec![0.0f32; len];
        for &(bin, db) in peaks {
            spectrum[bin] = db;
        }
        spectrum
    }

    #[test]
    fn test_top_two_ordered_by_magnitude() {
        let spectrum = spectrum_with_peaks(512, &[(100, 20.0), (300, 35.0), (200, 10.0)]);
        let mut extractor = PeakExtractor::new(PeakConfig::default(), 1.0);

        let [primary, secondary] = extractor.detect(&spectrum);
        assert_eq!(primary.bin, 300);
        assert_eq!(secondary.bin, 100);
        assert!(primary.magnitude_db >= secondary.magnitude_db);
    }

    #[test]
    fn test_no_peak_below_threshold() {
        let spectrum = spectrum_with_peaks(512, &[(100, 4.9), (300, 35.0), (200, 30.0)]);
        let mut extractor = PeakExtractor::new(PeakConfig::default(), 1.0);

        let result = extractor.detect(&spectrum);
        for peak in result {
            assert!(peak.magnitude_db >= 5.0);
        }
        assert_eq!(result[0].bin, 300);
        assert_eq!(result[1].bin, 200);
    }

    #[test]
    fn test_idempotent_on_same_spectrum() {
        let spectrum = spectrum_with_peaks(512, &[(80, 25.0), (400, 15.0)]);
        let mut extractor = PeakExtractor::new(PeakConfig::default(), 2.0);

        let first = extractor.detect(&spectrum);
        let second = extractor.detect(&spectrum);
        assert_eq!(first, second);
    }

    #[test]
    fn test_stale_retention_when_spectrum_goes_quiet() {
        let loud = spectrum_with_peaks(512, &[(100, 20.0), (300, 30.0)]);
        let quiet = vec![0.0f32; 512];
        let mut extractor = PeakExtractor::new(PeakConfig::default(), 1.0);

        let before = extractor.detect(&loud);
        let after = extractor.detect(&quiet);
        assert_eq!(before, after);
        assert_eq!(after[0].bin, 300);
    }

    #[test]
    fn test_startup_state_is_zero_until_two_peaks() {
        let one_peak = spectrum_with_peaks(512, &[(250, 40.0)]);
        let mut extractor = PeakExtractor::new(PeakConfig::default(), 1.0);

        let result = extractor.detect(&one_peak);
        assert_eq!(result, [Peak::zero(), Peak::zero()]);
    }

    #[test]
    fn test_non_center_maximum_rejected() {
        // Two bins above threshold next to each other: only the larger can
        // be the window-center maximum.
        let spectrum = spectrum_with_peaks(512, &[(100, 30.0), (102, 25.0), (300, 20.0)]);
        let mut extractor = PeakExtractor::new(PeakConfig::default(), 1.0);

        let [primary, secondary] = extractor.detect(&spectrum);
        assert_eq!(primary.bin, 100);
        assert_eq!(secondary.bin, 300);
    }

    #[test]
    fn test_frequency_uses_bin_spacing() {
        let spectrum = spectrum_with_peaks(512, &[(100, 20.0), (200, 30.0)]);
        // 48 kHz / 4096 samples
        let delta_f = 48000.0 / 4096.0;
        let mut extractor = PeakExtractor::new(PeakConfig::default(), delta_f);

        let [primary, secondary] = extractor.detect(&spectrum);
        assert!((primary.frequency_hz - 200.0 * delta_f).abs() < 1e-3);
        assert!((secondary.frequency_hz - 100.0 * delta_f).abs() < 1e-3);
    }

    #[test]
    fn test_parabolic_interpolation_recovers_offset() {
        // Symmetric neighbors: no correction.
        let mut spectrum = vec![0.0f32; 32];
        spectrum[15] = 8.0;
        spectrum[16] = 10.0;
        spectrum[17] = 8.0;
        assert_eq!(parabolic_interpolation(&spectrum, 16, 1.0), 16.0);

        // Heavier right neighbor pulls the estimate up.
        spectrum[17] = 9.0;
        let refined = parabolic_interpolation(&spectrum, 16, 1.0);
        assert!(refined > 16.0 && refined < 17.0);
    }

    #[test]
    fn test_parabolic_interpolation_edge_bins() {
        let spectrum = vec![1.0f32; 16];
        assert_eq!(parabolic_interpolation(&spectrum, 0, 2.0), 0.0);
        assert_eq!(parabolic_interpolation(&spectrum, 15, 2.0), 30.0);
    }
}
