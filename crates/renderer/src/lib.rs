//! Windowed renderer for the wireshade quad demo.
//!
//! [`Renderer::run`] drives the four initialization stages in order:
//! acquire the window and GPU context, invoke the caller's source loader,
//! build the quad program, then enter the redraw-paced render loop. Each
//! stage aborts the ones after it on failure; the loop is only entered
//! once every stage has completed.

mod clock;
mod gpu;

pub use clock::{FixedStepClock, FrameClock, SystemFrameClock};
pub use gpu::{BackendError, BuildError, StageKind};

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use gpu::context::GpuContext;
use gpu::state::RenderState;

/// Fetched shader text for both pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSources {
    pub vertex: String,
    pub fragment: String,
}

/// Window parameters for a renderer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    pub title: String,
    /// Initial window size in physical pixels (width, height).
    pub surface_size: (u32, u32),
}

pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and drives the `winit` event loop.
    ///
    /// `load_sources` runs after the GPU context is up but before the
    /// program is built, so a fetch failure never reaches the build stage
    /// and a build failure never schedules a frame. Returns once the
    /// window is closed.
    pub fn run<F>(&mut self, load_sources: F) -> Result<()>
    where
        F: FnOnce() -> Result<PipelineSources>,
    {
        let event_loop = EventLoop::new().context("failed to initialize event loop")?;
        let window_size = PhysicalSize::new(self.config.surface_size.0, self.config.surface_size.1);
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(window_size)
            .build(&event_loop)
            .context("failed to create window")?;
        let window = Arc::new(window);

        let context = GpuContext::new(window.as_ref(), window.inner_size())?;
        let sources = load_sources()?;
        let state = RenderState::new(context, &sources.vertex, &sources.fragment)?;
        drop(sources);

        let mut state = WindowState {
            window: window.clone(),
            state,
            clock: SystemFrameClock::new(),
        };
        state.window().request_redraw();

        event_loop
            .run(move |event, elwt| {
                // Drive redraws via vblank by waiting between events.
                elwt.set_control_flow(ControlFlow::Wait);

                match event {
                    Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                        match event {
                            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                                elwt.exit();
                            }
                            WindowEvent::Resized(new_size) => {
                                state.resize(new_size);
                            }
                            WindowEvent::ScaleFactorChanged {
                                mut inner_size_writer,
                                ..
                            } => {
                                // Keep the current logical size when the scale factor changes.
                                let _ = inner_size_writer.request_inner_size(state.size());
                            }
                            WindowEvent::RedrawRequested => match state.render_frame() {
                                Ok(()) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    state.resize(state.size());
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("surface out of memory; exiting");
                                    elwt.exit();
                                }
                                Err(other) => {
                                    tracing::warn!("surface error: {other:?}; retrying next frame");
                                }
                            },
                            _ => {}
                        }
                    }
                    Event::AboutToWait => {
                        // Schedule the next frame once winit is about to wait for events again.
                        state.window().request_redraw();
                    }
                    _ => {}
                }
            })
            .map_err(|err| anyhow!("event loop error: {err}"))
    }
}

/// Window handle plus the render state and frame clock the event loop
/// closure mutates per tick.
struct WindowState {
    window: Arc<Window>,
    state: RenderState,
    clock: SystemFrameClock,
}

impl WindowState {
    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.state.size()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.state.resize(new_size);
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let clock_millis = self.clock.now_millis();
        self.state.frame_tick(clock_millis)
    }
}
