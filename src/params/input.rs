//! Audio input selection.

use std::path::PathBuf;

/// Where analysed samples come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Capture from an input device (`None` = host default)
    Device(Option<String>),
    /// Play a WAV file through the default output and analyse it
    File { path: PathBuf, looping: bool },
}

impl Default for InputSource {
    fn default() -> Self {
        Self::Device(None)
    }
}

/// Audio constants
pub mod audio_constants {
    /// Channel fed to the accumulator; other channels are ignored
    pub const ANALYSED_CHANNEL: usize = 0;
}
