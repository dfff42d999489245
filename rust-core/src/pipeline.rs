//! Schedule-agnostic analysis pipeline
//!
//! Owns the whole buffer -> spectrum -> {peaks, gesture} chain behind a
//! single `tick()` that an external scheduler drives. The pipeline itself
//! never touches a platform audio API; frames arrive through the
//! [`crate::audio::InputSink`] handle it hands out.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::analysis::doppler::{DopplerClassifier, DopplerConfig, GestureState};
use crate::analysis::peaks::{Peak, PeakConfig, PeakExtractor};
use crate::audio::buffer::{BufferWriter, SampleBuffer};
use crate::audio::tone::ToneControl;
use crate::spectrum::frame::FrameProducer;
use crate::spectrum::windowing::WindowType;

/// Invalid construction parameters. Rejected up front; nothing in the
/// running pipeline clamps or repairs configuration mid-stream.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("buffer size must be even and non-zero (got {0})")]
    BadBufferSize(usize),

    #[error("channel count must be non-zero")]
    NoChannels,

    #[error("sample rate must be positive (got {0})")]
    BadSampleRate(f32),

    #[error("{name} window length must be odd and non-zero (got {len})")]
    WindowNotOdd { name: &'static str, len: usize },

    #[error("peak window of {window} bins does not fit a {bins}-bin spectrum")]
    WindowTooLarge { window: usize, bins: usize },

    #[error("zoom slice of {zoom} bins does not fit a {bins}-bin spectrum")]
    ZoomTooLarge { zoom: usize, bins: usize },

    #[error("doppler sub-band of {subband} bins does not fit a {bins}-bin spectrum")]
    SubbandTooLarge { subband: usize, bins: usize },

    #[error("doppler window of {window} bins must be smaller than the {subband}-bin sub-band")]
    SubbandTooSmall { window: usize, subband: usize },
}

/// Everything fixed at construction. Only the tone frequency and on/off
/// state are runtime-mutable, through [`ToneControl`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// FFT size and circular buffer capacity, in samples.
    pub buffer_size: usize,
    /// Channels of the interleaved input; only channel 0 is analyzed.
    pub channels: u16,
    /// Device sample rate in Hz.
    pub sample_rate: f32,
    /// Analysis window applied before the FFT.
    pub window_type: WindowType,
    /// Length of the zoomed display sub-band, in bins.
    pub zoom_len: usize,
    /// Frequency at which the zoomed sub-band starts.
    pub zoom_start_hz: f32,
    pub peaks: PeakConfig,
    pub doppler: DopplerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_size: 4096,
            channels: 1,
            sample_rate: 48000.0,
            window_type: WindowType::Hann,
            zoom_len: 300,
            zoom_start_hz: 150.0,
            peaks: PeakConfig::default(),
            doppler: DopplerConfig::default(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 || self.buffer_size % 2 != 0 {
            return Err(ConfigError::BadBufferSize(self.buffer_size));
        }
        if self.channels == 0 {
            return Err(ConfigError::NoChannels);
        }
        if self.sample_rate <= 0.0 {
            return Err(ConfigError::BadSampleRate(self.sample_rate));
        }

        let bins = self.buffer_size / 2;
        let pw = self.peaks.window_len;
        if pw == 0 || pw % 2 == 0 {
            return Err(ConfigError::WindowNotOdd { name: "peak", len: pw });
        }
        if pw >= bins {
            return Err(ConfigError::WindowTooLarge { window: pw, bins });
        }
        if self.zoom_len > bins {
            return Err(ConfigError::ZoomTooLarge { zoom: self.zoom_len, bins });
        }

        let dw = self.doppler.window_len;
        if dw == 0 || dw % 2 == 0 {
            return Err(ConfigError::WindowNotOdd { name: "doppler", len: dw });
        }
        if self.doppler.subband_len > bins {
            return Err(ConfigError::SubbandTooLarge {
                subband: self.doppler.subband_len,
                bins,
            });
        }
        if dw >= self.doppler.subband_len {
            return Err(ConfigError::SubbandTooSmall {
                window: dw,
                subband: self.doppler.subband_len,
            });
        }
        Ok(())
    }
}

/// One completed analysis frame, published whole.
///
/// Readers hold an `Arc` to a frame that is never mutated after publish, so
/// a consumer can never observe a half-written tick.
#[derive(Debug, Clone)]
pub struct AnalysisSnapshot {
    pub time_domain: Vec<f32>,
    pub spectrum_db: Vec<f32>,
    pub zoomed_db: Vec<f32>,
    /// Primary and secondary tone, primary first.
    pub top_two: [Peak; 2],
    pub gesture: GestureState,
    pub sample_rate: f32,
}

impl AnalysisSnapshot {
    fn empty(config: &PipelineConfig) -> Self {
        Self {
            time_domain: vec![0.0; config.buffer_size],
            spectrum_db: vec![0.0; config.buffer_size / 2],
            zoomed_db: vec![0.0; config.zoom_len],
            top_two: [
                Peak { bin: 0, magnitude_db: 0.0, frequency_hz: 0.0 },
                Peak { bin: 0, magnitude_db: 0.0, frequency_hz: 0.0 },
            ],
            gesture: GestureState::None,
            sample_rate: config.sample_rate,
        }
    }
}

/// Shared read handle to the latest published snapshot.
#[derive(Clone)]
pub struct SnapshotReader {
    slot: Arc<Mutex<Arc<AnalysisSnapshot>>>,
}

impl SnapshotReader {
    /// Cheap `Arc` clone of the most recently published frame.
    pub fn latest(&self) -> Arc<AnalysisSnapshot> {
        let guard = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&guard)
    }
}

/// The analysis core: circular buffer, frame producer, peak extractor and
/// gesture classifier, driven by an externally scheduled [`tick`].
///
/// [`tick`]: AnalysisPipeline::tick
pub struct AnalysisPipeline {
    producer: FrameProducer,
    peaks: PeakExtractor,
    doppler: DopplerClassifier,
    writer: BufferWriter,
    tone: Arc<ToneControl>,
    config: PipelineConfig,
    slot: Arc<Mutex<Arc<AnalysisSnapshot>>>,
}

impl AnalysisPipeline {
    /// Build the pipeline, failing fast on invalid configuration.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (writer, reader) = SampleBuffer::new(config.channels, config.buffer_size).split();
        let producer = FrameProducer::new(
            reader,
            config.buffer_size,
            config.window_type,
            config.zoom_len,
            config.zoom_start_hz,
            config.sample_rate,
        );
        let delta_f = config.sample_rate / config.buffer_size as f32;
        let peaks = PeakExtractor::new(config.peaks.clone(), delta_f);
        let doppler = DopplerClassifier::new(config.doppler.clone());
        let slot = Arc::new(Mutex::new(Arc::new(AnalysisSnapshot::empty(&config))));

        Ok(Self {
            producer,
            peaks,
            doppler,
            writer,
            tone: Arc::new(ToneControl::new(0.0)),
            config,
            slot,
        })
    }

    /// Writer handle for the device input callback. May be cloned, but the
    /// buffer expects a single producing thread.
    pub fn input_sink(&self) -> BufferWriter {
        self.writer.clone()
    }

    /// Shared control for the outgoing probe tone.
    pub fn tone_control(&self) -> Arc<ToneControl> {
        Arc::clone(&self.tone)
    }

    /// Read handle for presentation-side consumers.
    pub fn snapshot_reader(&self) -> SnapshotReader {
        SnapshotReader {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Run one analysis pass and publish the resulting frame.
    ///
    /// The gesture classifier only runs while the probe tone is active;
    /// with the tone off there is nothing to reflect, so the state resets.
    pub fn tick(&mut self) {
        self.producer.tick();

        let top_two = self.peaks.detect(self.producer.spectrum_db());

        let gesture = if self.tone.is_enabled() {
            let reference_bin = (self.tone.frequency() * self.config.buffer_size as f32
                / self.config.sample_rate)
                .round() as usize;
            self.doppler.classify(self.producer.spectrum_db(), reference_bin)
        } else {
            self.doppler.reset();
            GestureState::None
        };

        let snapshot = Arc::new(AnalysisSnapshot {
            time_domain: self.producer.time_data().to_vec(),
            spectrum_db: self.producer.spectrum_db().to_vec(),
            zoomed_db: self.producer.zoomed_db().to_vec(),
            top_two,
            gesture,
            sample_rate: self.config.sample_rate,
        });
        let mut guard = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = snapshot;
    }

    /// Latest published frame.
    pub fn snapshot(&self) -> Arc<AnalysisSnapshot> {
        self.snapshot_reader().latest()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
