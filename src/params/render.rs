//! Rendering and recording configuration.

use std::path::PathBuf;
use std::time::Duration;

/// What the window shows each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Full-height colour columns, one per x, coloured by level
    #[default]
    Spectrum,
    /// White line plot of the curve
    Analyser,
    /// Scrolling history, newest row on top
    Waterfall,
}

impl ViewMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "spectrum" | "spectrogram" => Some(Self::Spectrum),
            "analyser" | "analyzer" | "line" => Some(Self::Analyser),
            "waterfall" | "history" => Some(Self::Waterfall),
            _ => None,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Exponent spreading curve points across x; 2.0 widens the low end
    pub display_skew: f32,

    /// Hue at level 0.0 and 1.0 (turns, may be negative; wrapped into [0, 1))
    /// -0.35 ≈ blue, 0.12 ≈ orange-yellow
    pub hue_range: (f32, f32),

    /// View mode
    pub view: ViewMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 700,
            window_height: 500,
            display_skew: 2.0,
            hue_range: (-0.35, 0.12),
            view: ViewMode::Spectrum,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(format!(
                "Window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            ));
        }
        if !(self.display_skew > 0.0 && self.display_skew.is_finite()) {
            return Err(format!(
                "Display skew must be > 0, got {}",
                self.display_skew
            ));
        }
        Ok(())
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: PathBuf,

    /// Frame rate (FPS), normally the analyzer refresh rate
    pub fps: f32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32, fps: f32) -> Self {
        Self {
            duration_secs,
            output_dir: PathBuf::from("recording"),
            fps,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps).ceil() as usize
    }

    /// Time between captured frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.fps)
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }

    /// Path of a single frame
    pub fn frame_path(&self, frame_num: usize) -> PathBuf {
        self.frames_dir().join(format!("frame_{:05}.png", frame_num))
    }
}
