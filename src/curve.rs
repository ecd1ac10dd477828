//! Display curve: fixed-length normalized magnitudes handed to the renderer.

/// Log-frequency, dB-scaled view of the latest analysis block.
///
/// Length is fixed at construction; values are always within [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCurve {
    levels: Vec<f32>,
}

impl DisplayCurve {
    pub fn new(len: usize) -> Self {
        Self {
            levels: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    /// Level at index `i`, clamped into range (0 for an empty curve)
    pub fn get(&self, i: usize) -> f32 {
        match self.levels.len() {
            0 => 0.0,
            len => self.levels[i.min(len - 1)],
        }
    }

    /// Overwrite one point; the value is clamped to [0, 1], NaN becomes 0
    pub(crate) fn set(&mut self, i: usize, level: f32) {
        self.levels[i] = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        };
    }

    /// Linearly interpolated level at fractional position `pos` (in index units)
    pub fn sample(&self, pos: f32) -> f32 {
        let Some(last) = self.levels.len().checked_sub(1) else {
            return 0.0;
        };
        let pos = pos.clamp(0.0, last as f32);
        let idx1 = pos as usize;
        let idx2 = (idx1 + 1).min(last);
        let frac = pos - idx1 as f32;
        self.levels[idx1] + frac * (self.levels[idx2] - self.levels[idx1])
    }

    /// Index of the loudest point
    pub fn peak_index(&self) -> usize {
        self.levels
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &l)| if l > best.1 { (i, l) } else { best })
            .0
    }
}
