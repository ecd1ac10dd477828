//! Audio capture, block accumulation and spectral analysis.
//!
//! The audio callback owns a [`SampleFifo`] and publishes full blocks into a
//! shared [`BlockSlot`]; the UI timer owns a [`SpectralAnalyzer`] that takes
//! them and produces the display curve.

pub mod accumulator;
pub mod analyzer;
pub mod handoff;
pub mod player;
pub mod source;
mod system;
pub mod window;

// Re-export public types
pub use accumulator::SampleFifo;
pub use analyzer::SpectralAnalyzer;
pub use handoff::BlockSlot;
pub use source::WavClip;
pub use system::{list_input_devices, AudioSystem};
