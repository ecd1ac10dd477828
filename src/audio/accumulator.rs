//! Sample accumulator: a fixed-capacity FIFO fed from the audio callback.
//!
//! Owned by the audio thread. Each time the FIFO fills, its contents are
//! offered to the shared [`BlockSlot`] and the write cursor wraps to zero.

use cpal::FromSample;
use std::sync::Arc;

use super::handoff::BlockSlot;
use crate::params::audio_constants::ANALYSED_CHANNEL;

pub struct SampleFifo {
    fifo: Box<[f32]>,
    cursor: usize,
    slot: Arc<BlockSlot>,
}

impl SampleFifo {
    /// Create an accumulator publishing into `slot`, sized to the slot's block size
    pub fn new(slot: Arc<BlockSlot>) -> Self {
        Self {
            fifo: vec![0.0; slot.block_size()].into_boxed_slice(),
            cursor: 0,
            slot,
        }
    }

    /// Append one sample. When this fills the FIFO the block is published
    /// (if the previous one was consumed) and the cursor resets either way.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.fifo[self.cursor] = sample;
        self.cursor += 1;

        if self.cursor == self.fifo.len() {
            self.slot.publish(&self.fifo);
            self.cursor = 0;
        }
    }

    pub fn push_slice(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.push(sample);
        }
    }

    /// Push the analysed channel of an interleaved buffer
    pub fn push_interleaved<T>(&mut self, data: &[T], channels: usize)
    where
        T: Copy,
        f32: FromSample<T>,
    {
        let channel = ANALYSED_CHANNEL.min(channels.max(1) - 1);
        for frame in data.chunks_exact(channels.max(1)) {
            self.push(f32::from_sample_(frame[channel]));
        }
    }

    /// Samples written since the last completed block
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.fifo.len()
    }

    pub fn slot(&self) -> &Arc<BlockSlot> {
        &self.slot
    }
}
