//! Spectral frame producer: buffer -> window -> FFT magnitude, once per tick

use crate::audio::buffer::BufferReader;

use super::fft::FftEngine;
use super::windowing::{apply_window_inplace, generate_window, WindowType};

/// Produces one spectral frame per tick from the freshest buffer window.
///
/// Owns every working array in the pipeline: time-domain samples, the
/// windowed scratch copy, the dB spectrum and the zoomed sub-band. All are
/// overwritten in place each tick and sized once at construction.
pub struct FrameProducer {
    reader: BufferReader,
    fft: FftEngine,
    window: Vec<f32>,
    time_data: Vec<f32>,
    windowed: Vec<f32>,
    spectrum_db: Vec<f32>,
    zoomed_db: Vec<f32>,
    zoom_start: usize,
}

impl FrameProducer {
    /// `zoom_start_hz` picks the sub-band origin; the start bin is clamped
    /// so the zoomed slice always lies inside the spectrum.
    pub fn new(
        reader: BufferReader,
        buffer_size: usize,
        window_type: WindowType,
        zoom_len: usize,
        zoom_start_hz: f32,
        sample_rate: f32,
    ) -> Self {
        let num_bins = buffer_size / 2;
        let start_bin = (zoom_start_hz * buffer_size as f32 / sample_rate) as usize;
        let zoom_start = start_bin.min(num_bins.saturating_sub(zoom_len));

        Self {
            reader,
            fft: FftEngine::new(buffer_size),
            window: generate_window(window_type, buffer_size),
            time_data: vec![0.0; buffer_size],
            windowed: vec![0.0; buffer_size],
            spectrum_db: vec![0.0; num_bins],
            zoomed_db: vec![0.0; zoom_len],
            zoom_start,
        }
    }

    /// Recompute the frame from the freshest buffer window.
    pub fn tick(&mut self) {
        self.reader.read_freshest(&mut self.time_data);

        self.windowed.copy_from_slice(&self.time_data);
        apply_window_inplace(&mut self.windowed, &self.window);
        self.fft.magnitude_db(&self.windowed, &mut self.spectrum_db);

        let end = self.zoom_start + self.zoomed_db.len();
        self.zoomed_db
            .copy_from_slice(&self.spectrum_db[self.zoom_start..end]);
    }

    /// Raw time-domain samples of the last tick.
    pub fn time_data(&self) -> &[f32] {
        &self.time_data
    }

    /// dB-magnitude spectrum of the last tick, length `buffer_size / 2`.
    pub fn spectrum_db(&self) -> &[f32] {
        &self.spectrum_db
    }

    /// Zoomed sub-band slice of the spectrum.
    pub fn zoomed_db(&self) -> &[f32] {
        &self.zoomed_db
    }

    /// First bin of the zoomed slice.
    pub fn zoom_start(&self) -> usize {
        self.zoom_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::SampleBuffer;
    use std::f32::consts::TAU;

    fn producer_with_tone(
        buffer_size: usize,
        sample_rate: f32,
        freq_hz: f32,
    ) -> FrameProducer {
        let (writer, reader) = SampleBuffer::new(1, buffer_size).split();
        let signal: Vec<f32> = (0..buffer_size)
            .map(|n| (TAU * freq_hz * n as f32 / sample_rate).sin())
            .collect();
        writer.write(&signal);

        FrameProducer::new(reader, buffer_size, WindowType::Hann, 300, 150.0, sample_rate)
    }

    #[test]
    fn test_tick_places_tone_in_spectrum() {
        let mut producer = producer_with_tone(4096, 48000.0, 1000.0);
        producer.tick();

        let spectrum = producer.spectrum_db();
        assert_eq!(spectrum.len(), 2048);

        let (peak_bin, _) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();
        let expected = (1000.0 * 4096.0 / 48000.0_f32).round() as usize;
        assert!((peak_bin as i32 - expected as i32).abs() <= 1);
    }

    #[test]
    fn test_zoom_slice_matches_spectrum_region() {
        let mut producer = producer_with_tone(4096, 48000.0, 440.0);
        producer.tick();

        let start = producer.zoom_start();
        // 150 Hz * 4096 / 48000 = 12.8 -> bin 12
        assert_eq!(start, 12);
        assert_eq!(
            producer.zoomed_db(),
            &producer.spectrum_db()[start..start + 300]
        );
    }

    #[test]
    fn test_zoom_start_clamped_to_spectrum_end() {
        let (_writer, reader) = SampleBuffer::new(1, 1024).split();
        let producer =
            FrameProducer::new(reader, 1024, WindowType::Hann, 100, 23000.0, 48000.0);
        // 23 kHz lands past bin 512 - 100; clamp to the last valid start.
        assert_eq!(producer.zoom_start(), 412);
    }

    #[test]
    fn test_tick_overwrites_previous_frame() {
        let (writer, reader) = SampleBuffer::new(1, 1024).split();
        let mut producer =
            FrameProducer::new(reader, 1024, WindowType::Rectangular, 100, 150.0, 48000.0);

        writer.write(&vec![0.5f32; 1024]);
        producer.tick();
        let dc_first = producer.spectrum_db()[0];

        writer.write(&vec![0.0f32; 1024]);
        producer.tick();
        let dc_second = producer.spectrum_db()[0];

        assert!(dc_first > dc_second);
    }
}
