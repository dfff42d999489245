//! Audio output playback using cpal
//!
//! The output callback pulls frames from an [`OutputSource`]; the tone
//! synthesizer is the only source in this pipeline.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use log::error;

use super::input::{AudioDeviceInfo, AudioError};
use super::sink::OutputSource;

/// Audio output stream
pub struct AudioOutput {
    stream: Stream,
    device_info: AudioDeviceInfo,
}

impl AudioOutput {
    /// Create audio output from the default device, pulling frames from `source`.
    pub fn from_default_device(source: Box<dyn OutputSource>) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, source)
    }

    /// Create audio output from a specific device.
    pub fn from_device(
        device: Device,
        mut source: Box<dyn OutputSource>,
    ) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let device_info = AudioDeviceInfo {
            name,
            sample_rate,
            channels,
        };

        let stream_config: StreamConfig = config.into();

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    source.on_output_frames(data, channels);
                },
                move |err| {
                    error!("audio output error: {err}");
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        Ok(Self {
            stream,
            device_info,
        })
    }

    /// Start playing audio.
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause audio playback.
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information.
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

/// Query the default output device without opening a stream.
pub fn default_output_info() -> Result<AudioDeviceInfo, AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    let name = device
        .name()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;
    let config = device
        .default_output_config()
        .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

    Ok(AudioDeviceInfo {
        name,
        sample_rate: config.sample_rate().0,
        channels: config.channels(),
    })
}
