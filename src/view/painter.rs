//! CPU painter: draws the display curve into an RGBA frame.
//!
//! The curve is only read. The frame is what the GPU presenter uploads and
//! what recording mode writes to disk.

use image::{Rgba, RgbaImage};

use super::colour::level_to_rgba;
use crate::curve::DisplayCurve;
use crate::params::{RenderConfig, ViewMode};

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Curve level shown at column `x` of a `width`-pixel row.
///
/// Columns are spread with `(x / width)^display_skew`, so the low end of the
/// curve gets more pixels.
pub fn level_at_column(curve: &DisplayCurve, x: u32, width: u32, display_skew: f32) -> f32 {
    let proportion = (x as f32 / width as f32).powf(display_skew);
    curve.sample(proportion * curve.len().saturating_sub(1) as f32)
}

/// Paint one row of colours for the curve into `row` (RGBA, `row.len() / 4` pixels).
///
/// Column 0 would show the DC bin and is left black.
pub fn paint_row(curve: &DisplayCurve, row: &mut [u8], config: &RenderConfig) {
    let width = (row.len() / 4) as u32;
    for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
        if x == 0 {
            pixel.copy_from_slice(&BLACK.0);
            continue;
        }
        let level = level_at_column(curve, x as u32, width, config.display_skew);
        pixel.copy_from_slice(&level_to_rgba(level, config.hue_range));
    }
}

pub struct Painter {
    config: RenderConfig,
    frame: RgbaImage,
}

impl Painter {
    pub fn new(config: RenderConfig, width: u32, height: u32) -> Self {
        Self {
            config,
            frame: RgbaImage::from_pixel(width.max(1), height.max(1), BLACK),
        }
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn view(&self) -> ViewMode {
        self.config.view
    }

    /// Resize the frame; waterfall history is cleared
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if self.frame.dimensions() != (width, height) {
            self.frame = RgbaImage::from_pixel(width, height, BLACK);
        }
    }

    /// Draw the latest curve according to the view mode
    pub fn update(&mut self, curve: &DisplayCurve) {
        match self.config.view {
            ViewMode::Spectrum => self.paint_spectrum(curve),
            ViewMode::Analyser => self.paint_analyser(curve),
            ViewMode::Waterfall => self.push_waterfall_row(curve),
        }
    }

    /// Full-height colour columns
    fn paint_spectrum(&mut self, curve: &DisplayCurve) {
        let width = self.frame.width() as usize;
        let mut row = vec![0u8; width * 4];
        paint_row(curve, &mut row, &self.config);

        for line in self.frame.chunks_exact_mut(width * 4) {
            line.copy_from_slice(&row);
        }
    }

    /// White polyline, curve index linear in x, level up the y axis
    fn paint_analyser(&mut self, curve: &DisplayCurve) {
        for pixel in self.frame.pixels_mut() {
            *pixel = BLACK;
        }

        let (width, height) = (self.frame.width() as f32, self.frame.height() as f32);
        if curve.len() < 2 {
            return;
        }
        let last = (curve.len() - 1) as f32;
        let point = |i: usize| {
            (
                i as f32 / last * (width - 1.0),
                (1.0 - curve.get(i)) * (height - 1.0),
            )
        };

        for i in 1..curve.len() {
            draw_line(&mut self.frame, point(i - 1), point(i), WHITE);
        }
    }

    /// Scroll history down one row and paint the newest curve on top
    fn push_waterfall_row(&mut self, curve: &DisplayCurve) {
        let stride = self.frame.width() as usize * 4;
        let len = self.frame.len();
        self.frame.copy_within(0..len - stride, stride);
        paint_row(curve, &mut (*self.frame)[..stride], &self.config);
    }
}

/// Simple DDA line, clipped to the image
fn draw_line(image: &mut RgbaImage, from: (f32, f32), to: (f32, f32), colour: Rgba<u8>) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = (from.0 + dx * t).round();
        let y = (from.1 + dy * t).round();
        if x >= 0.0 && y >= 0.0 && (x as u32) < image.width() && (y as u32) < image.height() {
            image.put_pixel(x as u32, y as u32, colour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_with(levels: &[f32]) -> DisplayCurve {
        let mut curve = DisplayCurve::new(levels.len());
        for (i, &l) in levels.iter().enumerate() {
            curve.set(i, l);
        }
        curve
    }

    fn config(view: ViewMode) -> RenderConfig {
        RenderConfig {
            view,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_level_at_column_skews_towards_low_end() {
        let levels: Vec<f32> = (0..101).map(|i| i as f32 / 100.0).collect();
        let curve = curve_with(&levels);

        assert_eq!(level_at_column(&curve, 0, 100, 2.0), 0.0);
        // Halfway across the screen is a quarter of the way along the curve
        assert!((level_at_column(&curve, 50, 100, 2.0) - 0.25).abs() < 1e-4);
        assert!((level_at_column(&curve, 50, 100, 1.0) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_spectrum_columns_fill_full_height() {
        let mut painter = Painter::new(config(ViewMode::Spectrum), 64, 10);
        painter.update(&curve_with(&[1.0; 16]));

        let top = *painter.frame().get_pixel(32, 0);
        let bottom = *painter.frame().get_pixel(32, 9);
        assert_eq!(top, bottom);
        assert_ne!(top, BLACK);
    }

    #[test]
    fn test_dc_column_stays_black() {
        let mut painter = Painter::new(config(ViewMode::Spectrum), 16, 2);
        painter.update(&curve_with(&[1.0; 8]));
        assert_eq!(*painter.frame().get_pixel(0, 0), BLACK);
        assert_eq!(*painter.frame().get_pixel(0, 1), BLACK);
        assert_ne!(*painter.frame().get_pixel(1, 0), BLACK);
    }

    #[test]
    fn test_empty_curve_paints_without_panicking() {
        for view in [ViewMode::Spectrum, ViewMode::Analyser, ViewMode::Waterfall] {
            let mut painter = Painter::new(config(view), 8, 4);
            painter.update(&DisplayCurve::new(0));
            assert!(painter.frame().pixels().all(|p| *p == BLACK));
        }
    }

    #[test]
    fn test_silent_curve_paints_black() {
        let mut painter = Painter::new(config(ViewMode::Spectrum), 32, 4);
        painter.update(&DisplayCurve::new(16));
        assert!(painter.frame().pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_painting_does_not_touch_curve() {
        let curve = curve_with(&[0.2, 0.9, 0.4, 0.0]);
        let before = curve.clone();
        for view in [ViewMode::Spectrum, ViewMode::Analyser, ViewMode::Waterfall] {
            let mut painter = Painter::new(config(view), 40, 20);
            painter.update(&curve);
        }
        assert_eq!(curve, before);
    }

    #[test]
    fn test_analyser_draws_line_at_level() {
        let mut painter = Painter::new(config(ViewMode::Analyser), 50, 11);
        // Flat curve at 0.5 → horizontal line through the middle row
        painter.update(&curve_with(&[0.5; 8]));

        assert_eq!(*painter.frame().get_pixel(25, 5), WHITE);
        assert_eq!(*painter.frame().get_pixel(25, 0), BLACK);
        assert_eq!(*painter.frame().get_pixel(25, 10), BLACK);
    }

    #[test]
    fn test_waterfall_scrolls_down() {
        let mut painter = Painter::new(config(ViewMode::Waterfall), 16, 3);
        painter.update(&curve_with(&[1.0; 4]));
        let loud_row: Vec<_> = (0..16).map(|x| *painter.frame().get_pixel(x, 0)).collect();

        painter.update(&DisplayCurve::new(4));
        // New silent row on top, previous row pushed down
        assert_eq!(*painter.frame().get_pixel(8, 0), BLACK);
        let shifted: Vec<_> = (0..16).map(|x| *painter.frame().get_pixel(x, 1)).collect();
        assert_eq!(shifted, loud_row);
        assert_eq!(*painter.frame().get_pixel(8, 2), BLACK);
    }

    #[test]
    fn test_resize_resets_frame() {
        let mut painter = Painter::new(config(ViewMode::Waterfall), 8, 8);
        painter.update(&curve_with(&[1.0; 4]));
        painter.resize(12, 6);
        assert_eq!(painter.frame().dimensions(), (12, 6));
        assert!(painter.frame().pixels().all(|p| *p == BLACK));
    }
}
