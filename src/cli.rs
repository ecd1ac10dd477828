//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::params::{
    AnalysisConfig, InputSource, RecordingConfig, RenderConfig, ViewMode, WindowKind,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "spectrogram-tool")]
#[command(about = "Real-time spectrogram of an audio input", long_about = None)]
pub struct Args {
    /// Capture from this input device instead of the default
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Play a WAV file through the default output and analyse it
    #[arg(long, value_name = "WAV", conflicts_with = "device")]
    pub file: Option<PathBuf>,

    /// Loop the file given with --file
    #[arg(long = "loop", requires = "file")]
    pub looping: bool,

    /// List input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// log2 of the analysis block size (default 11 = 2048 samples)
    #[arg(long, value_name = "ORDER")]
    pub fft_order: Option<u32>,

    /// Display curve resolution (default 512)
    #[arg(long, value_name = "POINTS")]
    pub scope_size: Option<usize>,

    /// Log-frequency skew exponent (default 0.2)
    #[arg(long)]
    pub skew: Option<f32>,

    /// dB mapped to the bottom of the colour range (default -100)
    #[arg(long, value_name = "DB", allow_hyphen_values = true)]
    pub min_db: Option<f32>,

    /// dB mapped to the top of the colour range (default 0)
    #[arg(long, value_name = "DB", allow_hyphen_values = true)]
    pub max_db: Option<f32>,

    /// Window function: blackman-harris (default), hann, rect
    #[arg(long, value_name = "KIND")]
    pub window: Option<String>,

    /// View: spectrum (default), analyser, waterfall
    #[arg(long, value_name = "MODE")]
    pub view: Option<String>,

    /// Analysis and repaint rate in Hz (default 120)
    #[arg(long, value_name = "HZ")]
    pub refresh_hz: Option<f32>,

    /// Window / output image width in pixels (default 700)
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Window height in pixels (default 500)
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Record displayed frames as PNGs for this many seconds, then exit
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Render a WAV file offline to a waterfall PNG (needs --output)
    #[arg(long, value_name = "WAV", requires = "output", conflicts_with_all = ["file", "device", "record"])]
    pub render: Option<PathBuf>,

    /// Output PNG for --render
    #[arg(long, short, value_name = "PNG")]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Analysis configuration: defaults with command-line overrides applied
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = AnalysisConfig::default();
        if let Some(order) = self.fft_order {
            config.fft_order = order;
        }
        if let Some(size) = self.scope_size {
            config.scope_size = size;
        }
        if let Some(skew) = self.skew {
            config.skew = skew;
        }
        if let Some(db) = self.min_db {
            config.min_db = db;
        }
        if let Some(db) = self.max_db {
            config.max_db = db;
        }
        if let Some(name) = &self.window {
            config.window = WindowKind::from_name(name)
                .ok_or_else(|| Error::Config(format!("Unknown window function '{}'", name)))?;
        }
        if let Some(hz) = self.refresh_hz {
            config.refresh_hz = hz;
        }

        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    /// Render configuration: defaults with command-line overrides applied
    pub fn render_config(&self) -> Result<RenderConfig> {
        let mut config = RenderConfig::default();
        if let Some(width) = self.width {
            config.window_width = width;
        }
        if let Some(height) = self.height {
            config.window_height = height;
        }
        if let Some(name) = &self.view {
            config.view = ViewMode::from_name(name)
                .ok_or_else(|| Error::Config(format!("Unknown view '{}'", name)))?;
        }

        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    pub fn input_source(&self) -> InputSource {
        match &self.file {
            Some(path) => InputSource::File {
                path: path.clone(),
                looping: self.looping,
            },
            None => InputSource::Device(self.device.clone()),
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn create_recording_config(&self, fps: f32) -> Result<Option<RecordingConfig>> {
        let Some(duration) = self.record else {
            return Ok(None);
        };
        if !(duration > 0.0) {
            return Err(Error::Config(format!(
                "Recording duration must be > 0, got {}",
                duration
            )));
        }

        let config = RecordingConfig::new(duration, fps);
        // Create output directories
        std::fs::create_dir_all(config.frames_dir())?;
        Ok(Some(config))
    }
}
