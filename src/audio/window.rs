//! Window functions for FFT analysis.

use std::f32::consts::PI;

use crate::params::WindowKind;

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// 4-term Blackman-Harris window
pub fn blackman_harris_window(index: usize, size: usize) -> f32 {
    let x = (2.0 * PI * index as f32) / (size as f32 - 1.0);
    0.35875 - 0.48829 * x.cos() + 0.14128 * (2.0 * x).cos() - 0.01168 * (3.0 * x).cos()
}

/// Precompute a window table of `size` coefficients.
///
/// With `normalise`, coefficients are scaled so they sum to `size`, which
/// keeps a windowed full-scale sinusoid at the same bin magnitude as an
/// unwindowed one.
pub fn make_window(kind: WindowKind, size: usize, normalise: bool) -> Vec<f32> {
    let mut table: Vec<f32> = (0..size)
        .map(|i| match kind {
            WindowKind::Rectangular => 1.0,
            WindowKind::Hann => hann_window(i, size),
            WindowKind::BlackmanHarris => blackman_harris_window(i, size),
        })
        .collect();

    if normalise {
        let sum: f32 = table.iter().sum();
        if sum > 0.0 {
            let factor = size as f32 / sum;
            table.iter_mut().for_each(|w| *w *= factor);
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window() {
        let size = 1024;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_blackman_harris_window() {
        let size = 2048;

        // Near-zero edges (0.00006), unity peak
        assert!(blackman_harris_window(0, size) < 1e-3);
        assert!(blackman_harris_window(size - 1, size) < 1e-3);
        assert!((blackman_harris_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_normalised_window_sums_to_size() {
        for kind in [WindowKind::Hann, WindowKind::BlackmanHarris] {
            let table = make_window(kind, 512, true);
            let sum: f32 = table.iter().sum();
            assert!((sum - 512.0).abs() < 0.05, "{:?} sums to {}", kind, sum);
        }
    }

    #[test]
    fn test_rectangular_is_flat() {
        let table = make_window(WindowKind::Rectangular, 64, false);
        assert!(table.iter().all(|&w| w == 1.0));
    }
}
