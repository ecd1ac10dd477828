//! Parameter definitions with units and documented defaults.
//!
//! Presentation constants (dB window, skew, hue range) live here as
//! defaults rather than being baked into the pipeline.

mod analysis;
mod input;
mod render;

// Re-export all types
pub use analysis::{AnalysisConfig, WindowKind};
pub use input::{audio_constants, InputSource};
pub use render::{RecordingConfig, RenderConfig, ViewMode};
