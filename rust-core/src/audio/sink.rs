//! Narrow interfaces between the analysis core and the audio device layer
//!
//! The core never touches a platform audio API; the device layer only ever
//! sees these two traits. Both are `Send` because the implementations move
//! into the device callback threads.

/// Receives captured frames from the input device callback.
///
/// Called on the real-time audio thread: implementations must not block
/// for long and must not allocate.
pub trait InputSink: Send {
    /// Consume exactly `samples.len() / channels` interleaved frames.
    fn on_input_frames(&mut self, samples: &[f32], channels: u16);
}

/// Fills outgoing frames for the output device callback.
///
/// Same real-time constraints as [`InputSink`]: every slot of `buffer`
/// must be written (silence is explicit zeros, never leftover garbage).
pub trait OutputSource: Send {
    fn on_output_frames(&mut self, buffer: &mut [f32], channels: u16);
}
