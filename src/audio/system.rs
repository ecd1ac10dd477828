//! Audio system: cpal streams feeding the sample accumulator.
//!
//! Two sources are supported. Live capture opens an input device and pushes
//! its first channel into the accumulator. File playback plays a decoded WAV
//! through the default output device and analyses the first channel as it
//! goes out, the way an insert effect sees its input.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::accumulator::SampleFifo;
use super::handoff::BlockSlot;
use super::player::ClipPlayer;
use super::source::WavClip;
use crate::error::{Error, Result};
use crate::params::InputSource;

/// Running audio stream plus the slot it publishes blocks into
pub struct AudioSystem {
    /// Shared block handoff (read by the analyzer)
    slot: Arc<BlockSlot>,

    /// Stream sample rate (Hz)
    sample_rate: u32,

    /// Set by the player when a non-looping file has played out
    playback_finished: Option<Arc<AtomicBool>>,

    /// Audio stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioSystem {
    /// Open `source` and start streaming blocks of `block_size` samples
    pub fn start(source: &InputSource, block_size: usize) -> Result<Self> {
        let slot = Arc::new(BlockSlot::new(block_size));

        let (stream, sample_rate, playback_finished) = match source {
            InputSource::Device(name) => {
                let (stream, rate) = start_capture(name.as_deref(), &slot)?;
                (stream, rate, None)
            }
            InputSource::File { path, looping } => {
                let (stream, rate, finished) = start_playback(path, *looping, &slot)?;
                (stream, rate, Some(finished))
            }
        };

        stream
            .play()
            .map_err(|e| Error::Stream(format!("Failed to start audio stream: {}", e)))?;

        Ok(Self {
            slot,
            sample_rate,
            playback_finished,
            _stream: stream,
        })
    }

    pub fn slot(&self) -> Arc<BlockSlot> {
        Arc::clone(&self.slot)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// True once a non-looping file source has played to the end
    pub fn playback_finished(&self) -> bool {
        self.playback_finished
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Names of the host's input devices
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| Error::Device(format!("Failed to enumerate input devices: {}", e)))?;
    Ok(devices
        .map(|d| d.name().unwrap_or_else(|_| "Unknown".to_string()))
        .collect())
}

fn find_input_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    match name {
        None => host.default_input_device().ok_or(Error::NoDevice("input")),
        Some(wanted) => {
            let mut devices = host
                .input_devices()
                .map_err(|e| Error::Device(format!("Failed to enumerate input devices: {}", e)))?;
            devices
                .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                .ok_or_else(|| Error::Device(format!("Input device '{}' not found", wanted)))
        }
    }
}

fn start_capture(name: Option<&str>, slot: &Arc<BlockSlot>) -> Result<(cpal::Stream, u32)> {
    let device = find_input_device(name)?;
    let supported = device
        .default_input_config()
        .map_err(|e| Error::Device(format!("Failed to get input config: {}", e)))?;

    log::info!(
        "Audio input: {} @ {}Hz, {} ch, {:?}",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        supported.sample_rate().0,
        supported.channels(),
        supported.sample_format()
    );

    let format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let stream = match format {
        SampleFormat::F32 => build_capture_stream::<f32>(&device, &config, slot),
        SampleFormat::I16 => build_capture_stream::<i16>(&device, &config, slot),
        SampleFormat::U16 => build_capture_stream::<u16>(&device, &config, slot),
        SampleFormat::I32 => build_capture_stream::<i32>(&device, &config, slot),
        other => return Err(Error::SampleFormat(format!("{:?}", other))),
    }?;

    Ok((stream, config.sample_rate.0))
}

fn build_capture_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    slot: &Arc<BlockSlot>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let mut fifo = SampleFifo::new(Arc::clone(slot));

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                fifo.push_interleaved(data, channels);
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| Error::Stream(format!("Failed to build input stream: {}", e)))
}

fn start_playback(
    path: &Path,
    looping: bool,
    slot: &Arc<BlockSlot>,
) -> Result<(cpal::Stream, u32, Arc<AtomicBool>)> {
    let clip = WavClip::load(path)?;
    log::info!(
        "Loaded {}: {} frames, {} Hz, {} ch, {:.2}s",
        path.display(),
        clip.frames(),
        clip.sample_rate,
        clip.channels,
        clip.duration_secs()
    );
    if clip.frames() == 0 {
        return Err(Error::Config(format!("{} contains no audio", path.display())));
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(Error::NoDevice("output"))?;
    let supported = device
        .default_output_config()
        .map_err(|e| Error::Device(format!("Failed to get output config: {}", e)))?;

    let format = supported.sample_format();
    let mut config: cpal::StreamConfig = supported.into();

    // Prefer the file's own rate so playback pitch is right
    let file_rate = cpal::SampleRate(clip.sample_rate);
    if supports_rate(&device, config.channels, file_rate) {
        config.sample_rate = file_rate;
    } else {
        log::warn!(
            "Output does not support {} Hz, playing at {} Hz",
            clip.sample_rate,
            config.sample_rate.0
        );
    }

    log::info!(
        "Audio output: {} @ {}Hz, {} ch, {:?}",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        config.sample_rate.0,
        config.channels,
        format
    );

    let player = ClipPlayer::new(Arc::new(clip), looping, SampleFifo::new(Arc::clone(slot)));
    let finished = player.finished_flag();
    let stream = match format {
        SampleFormat::F32 => build_playback_stream::<f32>(&device, &config, player),
        SampleFormat::I16 => build_playback_stream::<i16>(&device, &config, player),
        SampleFormat::U16 => build_playback_stream::<u16>(&device, &config, player),
        SampleFormat::I32 => build_playback_stream::<i32>(&device, &config, player),
        other => return Err(Error::SampleFormat(format!("{:?}", other))),
    }?;

    Ok((stream, config.sample_rate.0, finished))
}

fn supports_rate(device: &cpal::Device, channels: u16, rate: cpal::SampleRate) -> bool {
    device
        .supported_output_configs()
        .map(|mut configs| {
            configs.any(|c| {
                c.channels() == channels
                    && c.min_sample_rate() <= rate
                    && rate <= c.max_sample_rate()
            })
        })
        .unwrap_or(false)
}

fn build_playback_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut player: ClipPlayer,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let out_channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                player.fill(data, out_channels);
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| Error::Stream(format!("Failed to build output stream: {}", e)))
}
