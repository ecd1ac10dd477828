//! Offline rendering: run a whole WAV through the pipeline into a waterfall PNG.
//!
//! Uses the same accumulator, slot and analyzer as live mode, with the
//! analyzer ticked after every sample so no block is dropped.

use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;

use crate::audio::{BlockSlot, SampleFifo, SpectralAnalyzer, WavClip};
use crate::error::{Error, Result};
use crate::params::{AnalysisConfig, RenderConfig};
use crate::view::paint_row;

/// Analyse `samples` block by block; one image row per block, earliest at the top
pub fn render_waterfall<I>(
    samples: I,
    analysis: &AnalysisConfig,
    render: &RenderConfig,
) -> Result<RgbaImage>
where
    I: IntoIterator<Item = f32>,
{
    analysis.validate().map_err(Error::Config)?;
    render.validate().map_err(Error::Config)?;

    let slot = Arc::new(BlockSlot::new(analysis.block_size()));
    let mut fifo = SampleFifo::new(Arc::clone(&slot));
    let mut analyzer = SpectralAnalyzer::new(analysis.clone(), slot)?;

    let width = render.window_width as usize;
    let mut pixels: Vec<u8> = Vec::new();
    let mut rows = 0u32;

    for sample in samples {
        fifo.push(sample);
        if analyzer.tick() {
            let start = pixels.len();
            pixels.resize(start + width * 4, 0);
            paint_row(analyzer.curve(), &mut pixels[start..], render);
            rows += 1;
        }
    }

    if rows == 0 {
        return Err(Error::Config(format!(
            "Input is shorter than one analysis block ({} samples)",
            analysis.block_size()
        )));
    }

    RgbaImage::from_raw(render.window_width, rows, pixels)
        .ok_or_else(|| Error::Render("Waterfall buffer size mismatch".to_string()))
}

/// Render `input` (WAV) to `output` (PNG). Returns the number of rows written.
pub fn render_file(
    input: &Path,
    output: &Path,
    analysis: &AnalysisConfig,
    render: &RenderConfig,
) -> Result<u32> {
    let clip = WavClip::load(input)?;
    log::info!(
        "Rendering {} ({:.2}s, {} Hz, {} ch) with {}-sample blocks",
        input.display(),
        clip.duration_secs(),
        clip.sample_rate,
        clip.channels,
        analysis.block_size()
    );

    let image = render_waterfall(clip.first_channel(), analysis, render)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image.save(output)?;

    log::info!(
        "Wrote {} ({}x{})",
        output.display(),
        image.width(),
        image.height()
    );
    Ok(image.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn small_analysis() -> AnalysisConfig {
        AnalysisConfig {
            fft_order: 8,
            scope_size: 64,
            ..AnalysisConfig::default()
        }
    }

    fn narrow_render() -> RenderConfig {
        RenderConfig {
            window_width: 32,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_one_row_per_block() {
        let image = render_waterfall(
            std::iter::repeat(0.0).take(256 * 5 + 100),
            &small_analysis(),
            &narrow_render(),
        )
        .unwrap();
        assert_eq!(image.dimensions(), (32, 5));
        // Silence stays black
        assert!(image.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_too_short_input_is_an_error() {
        let result = render_waterfall(vec![0.0; 100], &small_analysis(), &narrow_render());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_tone_lights_up_rows() {
        let tone = (0..256 * 3).map(|n| 0.5 * (2.0 * PI * 32.0 * n as f32 / 256.0).sin());
        let image = render_waterfall(tone, &small_analysis(), &narrow_render()).unwrap();
        assert_eq!(image.height(), 3);
        for y in 0..3 {
            assert!((0..32).any(|x| image.get_pixel(x, y).0[..3] != [0, 0, 0]));
        }
    }

    #[test]
    fn test_render_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("spectrogram-tool-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("tone.wav");
        let output = dir.join("out/tone.png");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&input, spec).unwrap();
        for n in 0..256 * 4 {
            let s = (0.25 * (2.0 * PI * 1000.0 * n as f32 / 8000.0).sin() * i16::MAX as f32) as i16;
            writer.write_sample(s).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let rows = render_file(&input, &output, &small_analysis(), &narrow_render()).unwrap();
        assert_eq!(rows, 4);
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 4));

        std::fs::remove_dir_all(&dir).ok();
    }
}
