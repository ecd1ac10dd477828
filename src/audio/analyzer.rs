//! Spectral analyzer: window, FFT and log-frequency/dB compression into a display curve.
//!
//! Runs on the UI timer, never on the audio thread. Each tick checks the
//! shared slot; when a block is pending it is copied out, windowed,
//! transformed to bin magnitudes in place, and resampled onto the display
//! curve.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::handoff::BlockSlot;
use super::window::make_window;
use crate::curve::DisplayCurve;
use crate::error::{Error, Result};
use crate::params::AnalysisConfig;

/// Convert a linear gain to decibels, floored at `floor_db` (0 and below map to the floor)
pub fn gain_to_db(gain: f32, floor_db: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(floor_db)
    } else {
        floor_db
    }
}

/// Fractional bin position of display index `i` out of `n`, over bins `0..=half`
pub fn skewed_bin_position(i: usize, n: usize, half: usize, skew: f32) -> f32 {
    let proportion = 1.0 - (1.0 - i as f32 / n as f32).powf(skew);
    (proportion * half as f32).clamp(0.0, half as f32)
}

pub struct SpectralAnalyzer {
    config: AnalysisConfig,
    slot: Arc<BlockSlot>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    /// Analysis block (2 × block size): samples in, bin magnitudes out
    block: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    curve: DisplayCurve,
    blocks_analysed: u64,
}

impl SpectralAnalyzer {
    /// Create an analyzer consuming from `slot`
    pub fn new(config: AnalysisConfig, slot: Arc<BlockSlot>) -> Result<Self> {
        config.validate().map_err(Error::Config)?;
        let block_size = config.block_size();
        if slot.block_size() != block_size {
            return Err(Error::BlockSize {
                slot: slot.block_size(),
                expected: block_size,
            });
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(block_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let window = make_window(config.window, block_size, config.normalise_window);

        Ok(Self {
            fft,
            window,
            block: vec![0.0; block_size * 2],
            spectrum: vec![Complex::new(0.0, 0.0); block_size],
            scratch,
            curve: DisplayCurve::new(config.scope_size),
            blocks_analysed: 0,
            config,
            slot,
        })
    }

    /// Timer callback. Returns `true` if a new block was analysed.
    pub fn tick(&mut self) -> bool {
        if !self.slot.take(&mut self.block) {
            return false;
        }
        self.analyse();
        true
    }

    /// Analyse an explicit block (at most block size samples, zero-padded)
    pub fn process_block(&mut self, samples: &[f32]) -> &DisplayCurve {
        let len = samples.len().min(self.config.block_size());
        self.block[..len].copy_from_slice(&samples[..len]);
        self.block[len..].fill(0.0);
        self.analyse();
        &self.curve
    }

    pub fn curve(&self) -> &DisplayCurve {
        &self.curve
    }

    /// Bin magnitudes of the last analysed block (bins 0..block size)
    pub fn magnitudes(&self) -> &[f32] {
        &self.block[..self.config.block_size()]
    }

    pub fn blocks_analysed(&self) -> u64 {
        self.blocks_analysed
    }

    fn analyse(&mut self) {
        let block_size = self.config.block_size();

        // Apply window
        for ((c, &s), &w) in self
            .spectrum
            .iter_mut()
            .zip(&self.block[..block_size])
            .zip(&self.window)
        {
            *c = Complex::new(s * w, 0.0);
        }

        // Perform FFT, magnitudes back into the block
        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);
        for (dst, c) in self.block[..block_size].iter_mut().zip(&self.spectrum) {
            *dst = c.norm();
        }
        self.block[block_size..].fill(0.0);

        self.update_curve();
        self.blocks_analysed += 1;
    }

    fn update_curve(&mut self) {
        let AnalysisConfig {
            min_db,
            max_db,
            skew,
            scope_size,
            ..
        } = self.config;
        let half = self.config.half_block();
        let reference_db = gain_to_db(self.config.block_size() as f32, min_db);

        for i in 0..scope_size {
            let pos = skewed_bin_position(i, scope_size, half, skew);
            let idx1 = pos as usize;
            let idx2 = idx1 + 1;
            let frac = pos - idx1 as f32;
            let mag = self.block[idx1] + frac * (self.block[idx2] - self.block[idx1]);

            let db = gain_to_db(mag, min_db) - reference_db;
            let level = (db.clamp(min_db, max_db) - min_db) / (max_db - min_db);
            self.curve.set(i, level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::accumulator::SampleFifo;
    use crate::params::WindowKind;
    use std::f32::consts::PI;

    fn analyzer(config: AnalysisConfig) -> SpectralAnalyzer {
        let slot = Arc::new(BlockSlot::new(config.block_size()));
        SpectralAnalyzer::new(config, slot).unwrap()
    }

    fn small_config() -> AnalysisConfig {
        AnalysisConfig {
            fft_order: 9,
            scope_size: 128,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_gain_to_db() {
        assert_eq!(gain_to_db(0.0, -100.0), -100.0);
        assert_eq!(gain_to_db(-1.0, -100.0), -100.0);
        assert!((gain_to_db(1.0, -100.0)).abs() < 1e-6);
        assert!((gain_to_db(10.0, -100.0) - 20.0).abs() < 1e-4);
        assert_eq!(gain_to_db(1e-9, -100.0), -100.0);
    }

    #[test]
    fn test_skewed_positions_are_monotonic_and_bounded() {
        let (n, half) = (512, 1024);
        let mut prev = -1.0;
        for i in 0..n {
            let pos = skewed_bin_position(i, n, half, 0.2);
            assert!(pos > prev);
            assert!(pos <= half as f32);
            prev = pos;
        }
        assert_eq!(skewed_bin_position(0, n, half, 0.2), 0.0);
    }

    #[test]
    fn test_zero_block_maps_to_floor() {
        let mut analyzer = analyzer(small_config());
        let curve = analyzer.process_block(&[0.0; 512]);
        assert_eq!(curve.len(), 128);
        assert!(curve.levels().iter().all(|&l| l == 0.0));
    }

    #[test]
    fn test_block_above_ceiling_maps_to_one() {
        let config = AnalysisConfig {
            window: WindowKind::Rectangular,
            normalise_window: false,
            ..small_config()
        };
        let block_size = config.block_size();
        let mut analyzer = analyzer(config);

        // An impulse of 2B has flat magnitude 2B in every bin: +6 dB over the reference
        let mut block = vec![0.0; block_size];
        block[0] = 2.0 * block_size as f32;
        let curve = analyzer.process_block(&block);
        assert!(curve.levels().iter().all(|&l| l == 1.0));
    }

    #[test]
    fn test_curve_length_and_range_for_arbitrary_input() {
        let mut analyzer = analyzer(small_config());
        let noise: Vec<f32> = (0..512u32)
            .map(|n| {
                let x = n.wrapping_mul(2654435761) >> 8;
                (x as f32 / (1u32 << 24) as f32) * 200.0 - 100.0
            })
            .collect();
        let curve = analyzer.process_block(&noise);
        assert_eq!(curve.len(), 128);
        assert!(curve.levels().iter().all(|&l| (0.0..=1.0).contains(&l)));

        let curve = analyzer.process_block(&[f32::MAX; 512]);
        assert_eq!(curve.len(), 128);
        assert!(curve.levels().iter().all(|&l| (0.0..=1.0).contains(&l)));
    }

    #[test]
    fn test_magnitudes_are_written_in_place() {
        let config = AnalysisConfig {
            window: WindowKind::Rectangular,
            normalise_window: false,
            ..small_config()
        };
        let mut analyzer = analyzer(config);
        analyzer.process_block(&[1.0; 512]);

        // DC of a constant block is B, every other bin is ~0
        let mags = analyzer.magnitudes();
        assert!((mags[0] - 512.0).abs() < 1e-2);
        assert!(mags[1..].iter().all(|&m| m < 1e-2));
    }

    #[test]
    fn test_tick_only_consumes_ready_blocks() {
        let config = small_config();
        let slot = Arc::new(BlockSlot::new(config.block_size()));
        let mut analyzer = SpectralAnalyzer::new(config, Arc::clone(&slot)).unwrap();

        assert!(!analyzer.tick());
        slot.publish(&[0.5; 512]);
        assert!(analyzer.tick());
        assert!(!slot.is_ready());
        assert!(!analyzer.tick());
        assert_eq!(analyzer.blocks_analysed(), 1);
    }

    #[test]
    fn test_rejects_mismatched_slot() {
        let slot = Arc::new(BlockSlot::new(256));
        assert!(matches!(
            SpectralAnalyzer::new(AnalysisConfig::default(), slot),
            Err(Error::BlockSize {
                slot: 256,
                expected: 2048
            })
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AnalysisConfig {
            scope_size: 0,
            ..AnalysisConfig::default()
        };
        let slot = Arc::new(BlockSlot::new(config.block_size()));
        assert!(matches!(
            SpectralAnalyzer::new(config, slot),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_sine_peak_lands_on_its_bin() {
        let config = AnalysisConfig::default();
        let block_size = config.block_size();
        let half = config.half_block();
        let scope_size = config.scope_size;
        let skew = config.skew;

        let slot = Arc::new(BlockSlot::new(block_size));
        let mut fifo = SampleFifo::new(Arc::clone(&slot));
        let mut analyzer = SpectralAnalyzer::new(config, slot).unwrap();

        // Bin-centred tone: 200 × 44100 / 2048 ≈ 4306.6 Hz
        let bin = 200.0;
        let sample_rate = 44100.0;
        let freq = bin * sample_rate / block_size as f32;
        for n in 0..block_size {
            fifo.push(0.5 * (2.0 * PI * freq * n as f32 / sample_rate).sin());
        }
        assert!(analyzer.tick());

        let expected = (0..scope_size)
            .min_by(|&a, &b| {
                let da = (skewed_bin_position(a, scope_size, half, skew) - bin).abs();
                let db = (skewed_bin_position(b, scope_size, half, skew) - bin).abs();
                da.total_cmp(&db)
            })
            .unwrap();
        let peak = analyzer.curve().peak_index();
        assert!(
            peak.abs_diff(expected) <= 1,
            "peak at {} expected {}",
            peak,
            expected
        );
        assert!(analyzer.curve().get(peak) > 0.8);
    }
}
