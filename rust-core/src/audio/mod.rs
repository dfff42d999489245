//! Audio device layer and real-time primitives

pub mod buffer;
pub mod driver;
pub mod input;
pub mod output;
pub mod sink;
pub mod tone;

pub use buffer::SampleBuffer;
pub use driver::LivePipeline;
pub use input::{AudioError, AudioInput};
pub use output::AudioOutput;
pub use sink::{InputSink, OutputSource};
pub use tone::{ToneControl, ToneGenerator};
