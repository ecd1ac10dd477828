//! Error type for setup paths (devices, streams, GPU, files, config).
//!
//! The real-time pieces (accumulator, handoff, analyzer, painter) never fail;
//! everything that can fail happens before or around them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Block slot holds {slot} samples but analysis expects {expected}")]
    BlockSize { slot: usize, expected: usize },
    #[error("No audio {0} device found")]
    NoDevice(&'static str),
    #[error("Audio device error: {0}")]
    Device(String),
    #[error("Audio stream error: {0}")]
    Stream(String),
    #[error("Unsupported sample format: {0}")]
    SampleFormat(String),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
