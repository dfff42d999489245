//! Phase-continuous sine synthesizer for the transmit-side probe tone

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use super::sink::OutputSource;

/// Shared control handle for the tone generator.
///
/// Frequency is stored as f32 bits in an atomic so the control thread can
/// retune while the audio callback is generating. The generator picks up a
/// new frequency at the next block boundary with no amplitude ramp; the
/// resulting click on retune is a known limitation, not a bug.
pub struct ToneControl {
    freq_bits: AtomicU32,
    enabled: AtomicBool,
}

impl ToneControl {
    pub fn new(frequency_hz: f32) -> Self {
        Self {
            freq_bits: AtomicU32::new(frequency_hz.to_bits()),
            enabled: AtomicBool::new(false),
        }
    }

    /// Retune the probe tone; effective on the next generated block.
    pub fn set_frequency(&self, frequency_hz: f32) {
        self.freq_bits.store(frequency_hz.to_bits(), Ordering::Relaxed);
    }

    pub fn frequency(&self) -> f32 {
        f32::from_bits(self.freq_bits.load(Ordering::Relaxed))
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

/// Sine generator owned by the output callback.
///
/// Phase lives in `[0, 2π)` and is continuous across calls and across
/// frequency changes (only the increment jumps).
pub struct ToneGenerator {
    control: Arc<ToneControl>,
    sample_rate: f32,
    phase: f32,
    increment: f32,
    current_freq: f32,
}

impl ToneGenerator {
    pub fn new(control: Arc<ToneControl>, sample_rate: f32) -> Self {
        let current_freq = control.frequency();
        Self {
            control,
            sample_rate,
            phase: 0.0,
            increment: TAU * current_freq / sample_rate,
            current_freq,
        }
    }

    /// Fill every channel of every frame with the sine value, advancing
    /// phase once per frame. Writes zeros while the tone is disabled.
    pub fn generate(&mut self, buffer: &mut [f32], channels: u16) {
        if !self.control.is_enabled() {
            buffer.fill(0.0);
            return;
        }

        let freq = self.control.frequency();
        if freq != self.current_freq {
            self.increment = TAU * freq / self.sample_rate;
            self.current_freq = freq;
        }

        for frame in buffer.chunks_exact_mut(channels as usize) {
            let sample = self.phase.sin();
            for slot in frame.iter_mut() {
                *slot = sample;
            }
            self.phase += self.increment;
            if self.phase >= TAU {
                self.phase -= TAU;
            }
        }
    }
}

impl OutputSource for ToneGenerator {
    fn on_output_frames(&mut self, buffer: &mut [f32], channels: u16) {
        self.generate(buffer, channels);
    }
}
