//! Analysis configuration: block size, display resolution and dB window.

/// Window function applied to each block before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    /// No tapering
    Rectangular,
    /// Raised cosine
    Hann,
    /// 4-term Blackman-Harris, ~92 dB sidelobe rejection
    #[default]
    BlackmanHarris,
}

impl WindowKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rect" | "rectangular" | "none" => Some(Self::Rectangular),
            "hann" | "hanning" => Some(Self::Hann),
            "blackman-harris" | "blackmanharris" | "bh" => Some(Self::BlackmanHarris),
            _ => None,
        }
    }
}

/// FFT analysis configuration with display-curve mapping
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// log2 of the block size (11 = 2048 samples, 46ms @ 44.1kHz)
    pub fft_order: u32,

    /// Display curve resolution (number of points handed to the renderer)
    pub scope_size: usize,

    /// Log-frequency skew exponent; smaller values give low frequencies more points
    pub skew: f32,

    /// Floor of the displayed dB window (maps to 0.0)
    pub min_db: f32,

    /// Ceiling of the displayed dB window (maps to 1.0)
    pub max_db: f32,

    /// Window function
    pub window: WindowKind,

    /// Scale the window so its sum equals the block size
    pub normalise_window: bool,

    /// Analyzer tick rate (Hz), also the repaint rate
    pub refresh_hz: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_order: 11,
            scope_size: 512,
            skew: 0.2,
            min_db: -100.0,
            max_db: 0.0,
            window: WindowKind::BlackmanHarris,
            normalise_window: true,
            refresh_hz: 120.0,
        }
    }
}

impl AnalysisConfig {
    /// Samples per analysis block
    pub fn block_size(&self) -> usize {
        1 << self.fft_order
    }

    /// Highest usable bin index (Nyquist)
    pub fn half_block(&self) -> usize {
        self.block_size() / 2
    }

    /// Frequency resolution of one FFT bin
    pub fn bin_hz(&self, sample_rate_hz: u32) -> f32 {
        sample_rate_hz as f32 / self.block_size() as f32
    }

    /// Analyzer tick period
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(1.0 / self.refresh_hz)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(4..=16).contains(&self.fft_order) {
            return Err(format!(
                "FFT order must be between 4 and 16, got {}",
                self.fft_order
            ));
        }
        if self.scope_size < 2 {
            return Err(format!(
                "Scope size must be at least 2, got {}",
                self.scope_size
            ));
        }
        if !(self.skew > 0.0 && self.skew.is_finite()) {
            return Err(format!("Skew must be > 0, got {}", self.skew));
        }
        if !(self.min_db < self.max_db) {
            return Err(format!(
                "dB floor ({}) must be below ceiling ({})",
                self.min_db, self.max_db
            ));
        }
        if !(self.refresh_hz > 0.0 && self.refresh_hz.is_finite()) {
            return Err(format!("Refresh rate must be > 0, got {}", self.refresh_hz));
        }
        Ok(())
    }
}
