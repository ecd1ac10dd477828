//! Spectrogram tool library - real-time log-frequency spectrum display

pub mod audio;
pub mod cli;
pub mod curve;
pub mod error;
pub mod offline;
pub mod params;
pub mod rendering;
pub mod view;

pub use error::{Error, Result};
