//! Spectrogram tool - real-time spectrum display of an audio input
//!
//! The audio callback fills analysis blocks; a 120 Hz timer on the event
//! loop turns the latest block into a log-frequency curve and repaints.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use spectrogram_tool::audio::{list_input_devices, AudioSystem, SpectralAnalyzer};
use spectrogram_tool::cli::Args;
use spectrogram_tool::offline::render_file;
use spectrogram_tool::params::*;
use spectrogram_tool::rendering::RenderSystem;
use spectrogram_tool::view::Painter;
use spectrogram_tool::Error;

/// Main application state
struct App {
    // Configuration
    analysis_config: AnalysisConfig,
    input: InputSource,
    recording_config: Option<RecordingConfig>,
    window_size: (u32, u32),

    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    painter: Painter,

    // Audio and analysis
    audio: Option<AudioSystem>,
    analyzer: Option<SpectralAnalyzer>,

    // Timing
    next_tick: Instant,
    frame_num: usize,
    reported_drops: usize,
    reported_end: bool,

    /// Fatal error raised inside the event loop
    error: Option<Error>,
}

impl App {
    fn new(
        analysis_config: AnalysisConfig,
        render_config: RenderConfig,
        input: InputSource,
        recording_config: Option<RecordingConfig>,
    ) -> Self {
        let window_size = (render_config.window_width, render_config.window_height);
        let painter = Painter::new(render_config, window_size.0, window_size.1);

        Self {
            analysis_config,
            input,
            recording_config,
            window_size,
            window: None,
            render_system: None,
            painter,
            audio: None,
            analyzer: None,
            next_tick: Instant::now(),
            frame_num: 0,
            reported_drops: 0,
            reported_end: false,
            error: None,
        }
    }

    /// Create window, renderer, audio stream and analyzer
    fn init(&mut self, event_loop: &ActiveEventLoop) -> spectrogram_tool::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Spectrogram Tool")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.window_size.0,
                self.window_size.1,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .map_err(|e| Error::Render(format!("Failed to create window: {}", e)))?,
        );

        let render_system = pollster::block_on(RenderSystem::new(Arc::clone(&window)))?;

        let audio = AudioSystem::start(&self.input, self.analysis_config.block_size())?;
        let analyzer = SpectralAnalyzer::new(self.analysis_config.clone(), audio.slot())?;

        log::info!(
            "Analysis: {} samples/block ({:.1} Hz per bin @ {} Hz), {} display points, {:?} window",
            self.analysis_config.block_size(),
            self.analysis_config.bin_hz(audio.sample_rate()),
            audio.sample_rate(),
            self.analysis_config.scope_size,
            self.analysis_config.window
        );
        log::info!("View: {:?} @ {} Hz. Press ESC to quit", self.painter.view(), self.analysis_config.refresh_hz);

        let size = window.inner_size();
        self.painter.resize(size.width, size.height);

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.audio = Some(audio);
        self.analyzer = Some(analyzer);
        self.next_tick = Instant::now();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    /// Analyzer timer: consume a pending block and repaint if one arrived.
    /// While recording every tick is presented, so frames track the refresh rate.
    fn tick(&mut self) {
        let Some(analyzer) = self.analyzer.as_mut() else {
            return;
        };

        let analysed = analyzer.tick();
        if analysed {
            self.painter.update(analyzer.curve());
        }
        if analysed || self.recording_config.is_some() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        if let Some(audio) = &self.audio {
            let dropped = audio.slot().dropped_blocks();
            if dropped > self.reported_drops {
                log::debug!("Dropped {} blocks so far", dropped);
                self.reported_drops = dropped;
            }
            if !self.reported_end && audio.playback_finished() {
                log::info!("End of file reached, analysing silence");
                self.reported_end = true;
            }
        }
    }

    /// Upload and present the painted frame (and capture it when recording)
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        render_system.upload_frame(self.painter.frame());
        match render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, Error::Render("GPU out of memory".to_string()));
                return;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if let Some(config) = &self.recording_config {
            let path = config.frame_path(self.frame_num);
            if let Err(e) = self.painter.frame().save(&path) {
                log::error!("Failed to save frame {}: {}", self.frame_num, e);
            }
            self.frame_num += 1;

            if self.frame_num >= config.total_frames() {
                log::info!(
                    "Recorded {} frames to {}",
                    self.frame_num,
                    config.frames_dir().display()
                );
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let interval = match &self.recording_config {
            Some(config) => config.frame_interval(),
            None => self.analysis_config.refresh_interval(),
        };
        let now = Instant::now();
        if now >= self.next_tick {
            self.tick();
            self.next_tick += interval;
            // Skip missed ticks rather than bursting to catch up
            if self.next_tick < now {
                self.next_tick = now + interval;
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
                self.painter.resize(size.width, size.height);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame(event_loop);
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_devices {
        for name in list_input_devices()? {
            println!("{}", name);
        }
        return Ok(());
    }

    let analysis_config = args.analysis_config()?;
    let render_config = args.render_config()?;

    if let Some(input) = &args.render {
        let output = args
            .output
            .as_deref()
            .context("--render needs --output")?;
        render_file(input, output, &analysis_config, &render_config)
            .with_context(|| format!("Failed to render {}", input.display()))?;
        return Ok(());
    }

    let recording_config = args.create_recording_config(analysis_config.refresh_hz)?;
    if let Some(config) = &recording_config {
        log::info!(
            "Recording {} frames to {}",
            config.total_frames(),
            config.frames_dir().display()
        );
    }

    let mut app = App::new(
        analysis_config,
        render_config,
        args.input_source(),
        recording_config,
    );
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
