//! Doppler-shift gesture classification around the probe tone
//!
//! A hand moving toward the device compresses the reflected tone upward in
//! frequency, away stretches it downward. The classifier looks at a narrow
//! sub-band centered on the transmitted tone and turns the asymmetry of
//! secondary energy around the carrier into a tri-state gesture.

/// Gesture inferred from reflected-energy asymmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    None,
    Toward,
    Away,
}

/// Classifier tuning, fixed at construction.
#[derive(Debug, Clone)]
pub struct DopplerConfig {
    /// Sub-band width in bins around the reference tone.
    pub subband_len: usize,
    /// Inner sliding window length in bins; must be odd.
    pub window_len: usize,
    /// A point qualifies as a vote when (max - v) / (max - first) stays at
    /// or below this ratio.
    pub vote_ratio: f32,
}

impl Default for DopplerConfig {
    fn default() -> Self {
        Self {
            subband_len: 50,
            window_len: 5,
            vote_ratio: 0.5,
        }
    }
}

/// Stateful gesture classifier over the zoomed sub-band.
pub struct DopplerClassifier {
    config: DopplerConfig,
    /// Window-center magnitudes, reused across ticks.
    centers: Vec<f32>,
    state: GestureState,
}

impl DopplerClassifier {
    pub fn new(config: DopplerConfig) -> Self {
        let m = config.subband_len - config.window_len + 1;
        Self {
            config,
            centers: vec![0.0; m],
            state: GestureState::None,
        }
    }

    /// Classify the current spectrum given the bin of the transmitted tone.
    ///
    /// The sub-band starts at `reference_bin - subband_len / 2`, clamped to
    /// the spectrum. A sliding window walks the sub-band and its center
    /// magnitudes form the sequence `P`. Stability gate: the maximum of `P`
    /// must sit at the middle element (`M/2 - 1`); if the dominant energy is
    /// not centered on the carrier the previous state is kept.
    ///
    /// Each non-maximum point whose drop below the maximum stays within
    /// `vote_ratio` of the band's dynamic range votes by its position:
    /// before the midpoint is Toward, at or past it is Away. The last vote
    /// wins; this is order-dependent on purpose, mirroring the long-standing
    /// behavior of the detector rather than a majority count.
    pub fn classify(&mut self, spectrum: &[f32], reference_bin: usize) -> GestureState {
        let len = self.config.subband_len;
        let w = self.config.window_len;
        let half_band = len / 2;

        // Too little spectrum to place the sub-band; treat like a failed
        // stability gate and keep the previous state.
        if spectrum.len() < len {
            return self.state;
        }

        let mut start = reference_bin.saturating_sub(half_band);
        if start + len > spectrum.len() {
            start = spectrum.len() - len;
        }
        let subband = &spectrum[start..start + len];

        let m = self.centers.len();
        for (j, slot) in self.centers.iter_mut().enumerate() {
            *slot = subband[j + w / 2];
        }

        let max_p = self
            .centers
            .iter()
            .fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));

        // Dominant reflected energy must be centered on the carrier.
        if self.centers[m / 2 - 1] != max_p {
            return self.state;
        }

        let diff = max_p - self.centers[0];
        let mut vote = None;
        if diff != 0.0 {
            for (j, &v) in self.centers.iter().enumerate() {
                if v == max_p || (max_p - v) / diff > self.config.vote_ratio {
                    continue;
                }
                vote = Some(if j >= m / 2 {
                    GestureState::Away
                } else {
                    GestureState::Toward
                });
            }
        }

        self.state = vote.unwrap_or(GestureState::None);
        self.state
    }

    /// Last classification without reprocessing.
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Forget gesture history, e.g. when the probe tone turns off.
    pub fn reset(&mut self) {
        self.state = GestureState::None;
    }

    pub fn config(&self) -> &DopplerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF_BIN: usize = 500;

    /// With defaults (subband 50, window 5), the sub-band starts at 475 and
    /// the gate position P[22] maps to spectrum bin 475 + 22 + 2 = 499.
    const GATE_BIN: usize = 499;

    fn spectrum_with(levels: &[(usize, f32)]) -> Vec<f32> {
        let mut spectrum = vec![0.0f32; 2048];
        for &(bin, db) in levels {
            spectrum[bin] = db;
        }
        spectrum
    }

    #[test]
    fn test_centered_peak_alone_is_none() {
        let spectrum = spectrum_with(&[(GATE_BIN, 30.0)]);
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        assert_eq!(classifier.classify(&spectrum, REF_BIN), GestureState::None);
    }

    #[test]
    fn test_secondary_before_midpoint_is_toward() {
        // Secondary within half the dynamic range, left of the carrier.
        let spectrum = spectrum_with(&[(GATE_BIN, 30.0), (485, 20.0)]);
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        assert_eq!(classifier.classify(&spectrum, REF_BIN), GestureState::Toward);
    }

    #[test]
    fn test_secondary_after_midpoint_is_away() {
        let spectrum = spectrum_with(&[(GATE_BIN, 30.0), (515, 20.0)]);
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        assert_eq!(classifier.classify(&spectrum, REF_BIN), GestureState::Away);
    }

    #[test]
    fn test_weak_secondary_does_not_vote() {
        // Drop ratio (30 - 10) / 30 = 0.67 exceeds 0.5: no vote.
        let spectrum = spectrum_with(&[(GATE_BIN, 30.0), (485, 10.0)]);
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        assert_eq!(classifier.classify(&spectrum, REF_BIN), GestureState::None);
    }

    #[test]
    fn test_off_center_maximum_keeps_previous_state() {
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        let toward = spectrum_with(&[(GATE_BIN, 30.0), (485, 20.0)]);
        assert_eq!(classifier.classify(&toward, REF_BIN), GestureState::Toward);

        // Dominant energy drifts off the carrier: gate fails, state sticks.
        let drifted = spectrum_with(&[(510, 30.0)]);
        assert_eq!(classifier.classify(&drifted, REF_BIN), GestureState::Toward);
        assert_eq!(classifier.state(), GestureState::Toward);
    }

    #[test]
    fn test_last_vote_wins_over_earlier_votes() {
        // Qualifying points on both sides; the later (right) one decides.
        let spectrum = spectrum_with(&[(GATE_BIN, 30.0), (485, 20.0), (515, 18.0)]);
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        assert_eq!(classifier.classify(&spectrum, REF_BIN), GestureState::Away);
    }

    #[test]
    fn test_flat_band_is_none() {
        let spectrum = vec![12.0f32; 2048];
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        assert_eq!(classifier.classify(&spectrum, REF_BIN), GestureState::None);
    }

    #[test]
    fn test_subband_clamped_at_spectrum_edges(){
        let mut spectrum = vec![0.0f32; 2048];
        // Reference near the top of the spectrum: sub-band clamps to the
        // last 50 bins, gate position 1998 + 22 + 2.
        spectrum[2022] = 30.0;
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        assert_eq!(classifier.classify(&spectrum, 2040), GestureState::None);
    }

    #[test]
    fn test_spectrum_shorter_than_subband_keeps_previous_state() {
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        let toward = spectrum_with(&[(GATE_BIN, 30.0), (485, 20.0)]);
        assert_eq!(classifier.classify(&toward, REF_BIN), GestureState::Toward);

        // Fewer bins than the sub-band needs: nothing to classify.
        let short = vec![0.0f32; 32];
        assert_eq!(classifier.classify(&short, 16), GestureState::Toward);
    }

    #[test]
    fn test_reset_clears_state() {
        let spectrum = spectrum_with(&[(GATE_BIN, 30.0), (485, 20.0)]);
        let mut classifier = DopplerClassifier::new(DopplerConfig::default());

        assert_eq!(classifier.classify(&spectrum, REF_BIN), GestureState::Toward);
        classifier.reset();
        assert_eq!(classifier.state(), GestureState::None);
    }
}
