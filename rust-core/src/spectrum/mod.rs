//! Spectral analysis with FFT

pub mod fft;
pub mod frame;
pub mod windowing;

pub use fft::FftEngine;
pub use frame::FrameProducer;
pub use windowing::{generate_window, WindowType};
