//! Clip playback inside the output callback.

use cpal::FromSample;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::accumulator::SampleFifo;
use super::source::WavClip;
use crate::params::audio_constants::ANALYSED_CHANNEL;

/// Plays a decoded clip into interleaved output buffers and feeds the
/// analysed channel to the accumulator. Owned by the audio thread.
pub struct ClipPlayer {
    clip: Arc<WavClip>,
    position: usize,
    looping: bool,
    fifo: SampleFifo,
    /// Raised once a non-looping clip has played out
    finished: Arc<AtomicBool>,
}

impl ClipPlayer {
    pub fn new(clip: Arc<WavClip>, looping: bool, fifo: SampleFifo) -> Self {
        Self {
            clip,
            position: 0,
            looping,
            fifo,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag readable from other threads, set when `is_finished` becomes true
    pub fn finished_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }

    /// Fill one output buffer. Past the end of a non-looping clip the output
    /// is silence, which is still analysed so the display decays.
    pub fn fill<T>(&mut self, data: &mut [T], out_channels: usize)
    where
        T: FromSample<f32>,
    {
        let frames = self.clip.frames();

        for frame in data.chunks_mut(out_channels.max(1)) {
            if self.position >= frames && self.looping {
                self.position = 0;
            }

            if self.position >= frames {
                for out in frame.iter_mut() {
                    *out = T::from_sample_(0.0);
                }
                self.fifo.push(0.0);
                continue;
            }

            for (channel, out) in frame.iter_mut().enumerate() {
                *out = T::from_sample_(self.clip.sample(self.position, channel));
            }
            self.fifo
                .push(self.clip.sample(self.position, ANALYSED_CHANNEL));
            self.position += 1;
        }

        if self.is_finished() {
            self.finished.store(true, Ordering::Relaxed);
        }
    }

    pub fn is_finished(&self) -> bool {
        !self.looping && self.position >= self.clip.frames()
    }
}
