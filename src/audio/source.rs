//! WAV decoding into interleaved `f32` for playback and offline analysis.

use std::path::Path;

use crate::error::Result;

/// Decoded audio file (interleaved samples, normalized to [-1, 1])
#[derive(Debug, Clone)]
pub struct WavClip {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl WavClip {
    /// Load and normalize a WAV file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = hound::WavReader::open(path.as_ref())?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: std::io::Read>(reader: hound::WavReader<R>) -> Result<Self> {
        let spec = reader.spec();

        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| s as f32 * scale))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        log::debug!(
            "Decoded {} samples ({} ch @ {} Hz, {}-bit {:?})",
            samples.len(),
            spec.channels,
            spec.sample_rate,
            spec.bits_per_sample,
            spec.sample_format
        );

        Ok(Self {
            samples,
            channels: spec.channels.max(1),
            sample_rate: spec.sample_rate,
        })
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Sample of channel `channel` at `frame`; channels past the last repeat it
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let channels = self.channels as usize;
        self.samples[frame * channels + channel.min(channels - 1)]
    }

    /// Iterator over the first channel
    pub fn first_channel(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().step_by(self.channels as usize).copied()
    }
}
