use std::time::Duration;

use anyhow::{Context as _, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, Graphics};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::platform::{map_button_action, map_key, map_key_action, map_mouse_button};
use crate::render::backend::wgpu_device::{WgpuDevice, WgpuPass};
use crate::render::{Context, RenderFrame, ShaderLibrary};
use crate::time::{FrameStats, TickClock};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Fixed window size in logical pixels; the window is not resizable.
    pub size: LogicalSize<u32>,
    pub ticks_per_second: u32,
    /// Upper bound on the time a single frame may feed into the tick accumulator.
    pub max_frame_time: Duration,
    pub clear_color: wgpu::Color,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "deltawing".to_string(),
            size: LogicalSize::new(1280, 720),
            ticks_per_second: TickClock::DEFAULT_TICKS_PER_SECOND,
            max_frame_time: TickClock::DEFAULT_MAX_FRAME_TIME,
            clear_color: wgpu::Color { r: 0.1, g: 0.1, b: 0.1, a: 1.0 },
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and runs `app` until it exits or the window closes.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// GPU-side state that exists once the window does.
struct Live {
    entry: WindowEntry,
    shaders: ShaderLibrary<WgpuDevice>,
    context: Context,
}

struct AppState<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    live: Option<Live>,
    clock: TickClock,
    stats: FrameStats,
    /// Last cursor position, logical pixels.
    cursor: (f32, f32),
    exit_requested: bool,
}

impl<A: App> AppState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        let clock = TickClock::new(config.ticks_per_second, config.max_frame_time);
        Self {
            config,
            gpu_init,
            app,
            live: None,
            clock,
            stats: FrameStats::new(),
            cursor: (0.0, 0.0),
            exit_requested: false,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.size)
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;

        let shaders = ShaderLibrary::compile(entry.borrow_gpu().device());
        let (width, height) = entry.with_window(|w| logical_size(w, w.inner_size()));
        let mut live = Live { entry, shaders, context: Context::new(width, height) };

        {
            let Live { entry, shaders, context } = &mut live;
            let mut gfx = Graphics { device: entry.borrow_gpu().device(), shaders, context };
            self.app.init(&mut gfx).context("application init failed")?;
        }

        live.entry.with_window(|w| w.request_redraw());
        self.live = Some(live);
        self.clock.reset();
        Ok(())
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    /// Runs the frame's ticks, then renders and presents.
    fn redraw(&mut self) -> AppControl {
        let Some(Live { entry, shaders, context }) = self.live.as_mut() else {
            return AppControl::Continue;
        };
        let app = &mut self.app;

        let step = self.clock.advance();
        self.stats.record(step.ticks);

        for _ in 0..step.ticks {
            let mut gfx = Graphics {
                device: entry.borrow_gpu().device(),
                shaders: &*shaders,
                context: &mut *context,
            };
            if app.tick(&mut gfx) == AppControl::Exit {
                return AppControl::Exit;
            }
        }

        context.begin_frame(step.partial_ticks);
        let clear = self.config.clear_color;

        entry.with_mut(|fields| {
            let gpu = fields.gpu;
            let mut frame = match gpu.begin_frame() {
                Ok(f) => f,
                Err(err) => {
                    return match gpu.handle_surface_error(err) {
                        SurfaceErrorAction::Fatal => AppControl::Exit,
                        _ => AppControl::Continue,
                    };
                }
            };

            {
                let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("deltawing frame"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(clear),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
                let mut pass = WgpuPass::new(&mut rpass);
                let mut rf = RenderFrame::new(gpu.device(), context, &mut pass);
                app.render(&mut rf);
            }

            fields.window.pre_present_notify();
            gpu.submit(frame);
            AppControl::Continue
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(live) = self.live.as_mut() {
            live.entry.with_gpu_mut(|gpu| gpu.resize(size));
            let (width, height) = live.entry.with_window(|w| logical_size(w, size));
            live.context.resize(width, height);
        }
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.live.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            log::error!("failed to start: {e:#}");
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw; the tick clock decides how much simulation runs.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(live) = &self.live {
            live.entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let control = match event {
            WindowEvent::CloseRequested => AppControl::Exit,
            WindowEvent::Resized(size) => {
                self.resize(size);
                AppControl::Continue
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.live.as_ref().map(|l| l.entry.with_window(|w| w.inner_size()));
                if let Some(size) = size {
                    self.resize(size);
                }
                AppControl::Continue
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(live) = &self.live {
                    self.cursor = live.entry.with_window(|w| to_logical(w, position));
                }
                AppControl::Continue
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let key = map_key(event.physical_key);
                let action = map_key_action(event.state, event.repeat);
                self.with_graphics(|app, gfx| app.on_key(gfx, key, action))
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let (x, y) = self.cursor;
                let button = map_mouse_button(button);
                let action = map_button_action(state);
                self.with_graphics(|app, gfx| app.on_click(gfx, button, action, x, y))
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => AppControl::Continue,
        };

        if control == AppControl::Exit {
            self.request_exit(event_loop);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.app.exit();
        self.live = None;
        log::info!("shut down");
    }
}

impl<A: App> AppState<A> {
    fn with_graphics(&mut self, f: impl FnOnce(&mut A, &mut Graphics<'_>) -> AppControl) -> AppControl {
        let Some(Live { entry, shaders, context }) = self.live.as_mut() else {
            return AppControl::Continue;
        };
        let mut gfx = Graphics { device: entry.borrow_gpu().device(), shaders, context };
        f(&mut self.app, &mut gfx)
    }
}

fn logical_size(window: &Window, size: PhysicalSize<u32>) -> (u32, u32) {
    let logical: LogicalSize<u32> = size.to_logical(window.scale_factor());
    (logical.width, logical.height)
}

fn to_logical(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    (logical.x as f32, logical.y as f32)
}
