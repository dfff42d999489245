//! Echo Sense - real-time spectral analysis and Doppler gesture core
//!
//! Turns a microphone stream into a dB-magnitude spectrum, the two loudest
//! tone estimates, and an approaching/receding gesture inferred from
//! Doppler asymmetry around a transmitted probe tone.

pub mod analysis;
pub mod audio;
pub mod pipeline;
pub mod spectrum;

pub use analysis::{note_for_frequency, GestureState, Peak};
pub use audio::LivePipeline;
pub use pipeline::{AnalysisPipeline, AnalysisSnapshot, ConfigError, PipelineConfig};
pub use spectrum::WindowType;
