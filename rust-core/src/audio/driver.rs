//! Live pipeline: analysis core wired to real audio devices
//!
//! Owns the cpal streams and the tick thread. The analysis core itself is
//! schedule-agnostic; this module is the external scheduler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::info;

use crate::pipeline::{AnalysisPipeline, PipelineConfig, SnapshotReader};

use super::input::{default_input_info, AudioError, AudioInput};
use super::output::{default_output_info, AudioOutput};
use super::tone::{ToneControl, ToneGenerator};

/// Analysis tick rate while live, in ticks per second.
pub const DEFAULT_TICK_RATE_HZ: f64 = 20.0;

/// Runs an [`AnalysisPipeline`] against the default input and output
/// devices, ticking it on a background thread.
pub struct LivePipeline {
    audio_input: Option<AudioInput>,
    audio_output: Option<AudioOutput>,
    tick_thread: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    snapshots: Option<SnapshotReader>,
    tone: Option<Arc<ToneControl>>,
    tick_rate_hz: f64,
}

impl LivePipeline {
    pub fn new(tick_rate_hz: f64) -> Self {
        Self {
            audio_input: None,
            audio_output: None,
            tick_thread: None,
            running: Arc::new(AtomicBool::new(false)),
            snapshots: None,
            tone: None,
            tick_rate_hz,
        }
    }

    /// Open the default devices, build the pipeline around their native
    /// sample rate and start processing.
    ///
    /// A missing input or output device is fatal for the whole pipeline and
    /// surfaced once; there is no retry.
    pub fn start(&mut self, mut config: PipelineConfig) -> Result<String, AudioError> {
        let device_info = default_input_info()?;
        let output_info = default_output_info()?;
        config.sample_rate = device_info.sample_rate as f32;
        config.channels = device_info.channels;

        let mut pipeline =
            AnalysisPipeline::new(config).map_err(|e| AudioError::BadConfig(e.to_string()))?;

        self.snapshots = Some(pipeline.snapshot_reader());
        let tone = pipeline.tone_control();
        self.tone = Some(Arc::clone(&tone));

        let input = AudioInput::from_default_device(Box::new(pipeline.input_sink()))?;
        input.start()?;

        // The synthesizer runs inside the output callback, so its phase
        // increment must come from the output device's rate, which can
        // differ from the capture rate.
        let synth = ToneGenerator::new(tone, output_info.sample_rate as f32);
        let output = AudioOutput::from_default_device(Box::new(synth))?;
        output.start()?;
        self.audio_output = Some(output);

        self.audio_input = Some(input);
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let interval = Duration::from_secs_f64(1.0 / self.tick_rate_hz);
        let handle = std::thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                pipeline.tick();
                std::thread::sleep(interval);
            }
        });
        self.tick_thread = Some(handle);

        info!(
            "live pipeline started on '{}' at {} Hz",
            device_info.name, device_info.sample_rate
        );
        Ok(device_info.name)
    }

    /// Stop processing.
    ///
    /// Streams are paused and dropped before the tick thread is joined and
    /// the pipeline released, so no device callback can touch a buffer that
    /// is being torn down.
    pub fn stop(&mut self) {
        if let Some(input) = &self.audio_input {
            let _ = input.pause();
        }
        if let Some(output) = &self.audio_output {
            let _ = output.pause();
        }
        self.audio_input = None;
        self.audio_output = None;

        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.tick_thread.take() {
            let _ = handle.join();
        }

        info!("live pipeline stopped");
    }

    /// Turn the probe tone on at `frequency_hz`; the gesture classifier
    /// starts running on the next tick.
    pub fn start_probe(&self, frequency_hz: f32) {
        if let Some(tone) = &self.tone {
            tone.set_frequency(frequency_hz);
            tone.set_enabled(true);
        }
    }

    /// Silence the probe tone and with it the gesture classifier.
    pub fn stop_probe(&self) {
        if let Some(tone) = &self.tone {
            tone.set_enabled(false);
        }
    }

    /// Shared tone control, if the pipeline has started.
    pub fn tone_control(&self) -> Option<Arc<ToneControl>> {
        self.tone.as_ref().map(Arc::clone)
    }

    /// Read handle for the latest analysis frame, if started.
    pub fn snapshots(&self) -> Option<SnapshotReader> {
        self.snapshots.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for LivePipeline {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE_HZ)
    }
}

impl Drop for LivePipeline {
    fn drop(&mut self) {
        self.stop();
    }
}
