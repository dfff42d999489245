//! Spectrum consumers: peak extraction, gesture classification, note lookup

pub mod doppler;
pub mod notes;
pub mod peaks;

pub use doppler::{DopplerClassifier, DopplerConfig, GestureState};
pub use notes::note_for_frequency;
pub use peaks::{Peak, PeakConfig, PeakExtractor};
