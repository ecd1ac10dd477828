//! Single-slot lock-free block handoff between the audio callback and the analyzer.
//!
//! The slot holds one analysis block (2 × block size, back half zero) and a
//! ready flag. The producer only writes while the flag is clear and sets it
//! with `Release` after the last sample store; the consumer only reads while
//! the flag is set (`Acquire`) and clears it once its copy is complete. A
//! block that fills while the previous one is still pending is dropped, never
//! waited on.
//!
//! Samples are stored as `f32` bit patterns in `AtomicU32`, so the buffer is
//! shareable without locks or `unsafe`.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

pub struct BlockSlot {
    ready: AtomicBool,
    block_size: usize,
    samples: Box<[AtomicU32]>,
    /// Blocks the producer discarded because the slot was still full
    dropped: AtomicUsize,
}

impl BlockSlot {
    /// Allocate a slot for blocks of `block_size` samples (zero-padded to twice that)
    pub fn new(block_size: usize) -> Self {
        let samples = (0..block_size * 2)
            .map(|_| AtomicU32::new(0.0f32.to_bits()))
            .collect();
        Self {
            ready: AtomicBool::new(false),
            block_size,
            samples,
            dropped: AtomicUsize::new(0),
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// True while a published block is waiting to be taken
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Producer side. Copies `block` (at most `block_size` samples) into the
    /// slot, zeroes the rest and raises the ready flag. Returns `false` and
    /// leaves the slot untouched if the previous block was not yet taken.
    ///
    /// Never blocks or allocates.
    pub fn publish(&self, block: &[f32]) -> bool {
        if self.ready.load(Ordering::Acquire) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let len = block.len().min(self.block_size);
        let (head, tail) = self.samples.split_at(len);
        for (slot, &sample) in head.iter().zip(&block[..len]) {
            slot.store(sample.to_bits(), Ordering::Relaxed);
        }
        for slot in tail {
            slot.store(0, Ordering::Relaxed);
        }

        self.ready.store(true, Ordering::Release);
        true
    }

    /// Consumer side. Copies the pending block into `dest` and clears the
    /// ready flag. Returns `false` if nothing was pending.
    pub fn take(&self, dest: &mut [f32]) -> bool {
        if !self.ready.load(Ordering::Acquire) {
            return false;
        }

        for (d, s) in dest.iter_mut().zip(self.samples.iter()) {
            *d = f32::from_bits(s.load(Ordering::Relaxed));
        }
        // Anything past the slot length stays zero-padded
        if dest.len() > self.samples.len() {
            dest[self.samples.len()..].fill(0.0);
        }

        self.ready.store(false, Ordering::Release);
        true
    }

    /// Number of blocks dropped since creation
    pub fn dropped_blocks(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for BlockSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockSlot")
            .field("block_size", &self.block_size)
            .field("ready", &self.is_ready())
            .field("dropped", &self.dropped_blocks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_publish_then_take() {
        let slot = BlockSlot::new(4);
        assert!(!slot.is_ready());
        assert!(slot.publish(&[1.0, 2.0, 3.0, 4.0]));
        assert!(slot.is_ready());

        let mut dest = vec![9.0; 8];
        assert!(slot.take(&mut dest));
        assert_eq!(dest, vec![1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(!slot.is_ready());
    }

    #[test]
    fn test_publish_while_full_is_dropped() {
        let slot = BlockSlot::new(2);
        assert!(slot.publish(&[1.0, 1.0]));
        assert!(!slot.publish(&[2.0, 2.0]));
        assert_eq!(slot.dropped_blocks(), 1);

        let mut dest = vec![0.0; 4];
        assert!(slot.take(&mut dest));
        // The first block survives, the second never overwrote it
        assert_eq!(&dest[..2], &[1.0, 1.0]);
    }

    #[test]
    fn test_take_when_empty() {
        let slot = BlockSlot::new(8);
        let mut dest = vec![5.0; 16];
        assert!(!slot.take(&mut dest));
        assert!(dest.iter().all(|&s| s == 5.0));
    }

    #[test]
    fn test_cross_thread_blocks_are_never_torn() {
        const BLOCK: usize = 64;
        const BLOCKS: usize = 2000;

        let slot = Arc::new(BlockSlot::new(BLOCK));
        let producer_slot = Arc::clone(&slot);

        // Every published block is constant-valued; a torn read would mix values
        let producer = thread::spawn(move || {
            let mut block = [0.0f32; BLOCK];
            for n in 1..=BLOCKS {
                block.fill(n as f32);
                producer_slot.publish(&block);
            }
        });

        let mut dest = vec![0.0f32; BLOCK * 2];
        let mut taken = 0;
        while !producer.is_finished() || slot.is_ready() {
            if slot.take(&mut dest) {
                let first = dest[0];
                assert!(dest[..BLOCK].iter().all(|&s| s == first));
                assert!(dest[BLOCK..].iter().all(|&s| s == 0.0));
                taken += 1;
            }
        }
        producer.join().unwrap();

        assert!(taken >= 1);
        assert_eq!(taken + slot.dropped_blocks(), BLOCKS);
    }
}
