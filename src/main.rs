mod cli;
mod color;
mod cursor;
mod error;
mod floating;
mod form;
mod framepace;
mod gpu;
mod gui;
mod mobile;
mod page;
mod particle;
mod pointer;
mod render;
mod scroll;
mod text;
mod theme;
mod timer;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use cursor::CursorParticles;
use form::SimulatedTransport;
use framepace::Framepacer;
use glam::Vec2;
use gpu::GpuContext;
use gui::EguiIntegration;
use log::{error, info};
use page::PortfolioPage;
use rand::{rngs::StdRng, Rng, SeedableRng};
use render::RenderModule;
use theme::ColorScheme;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

/// How long the simulated contact form backend takes to answer.
const SUBMIT_DELAY: Duration = Duration::from_millis(2000);

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Collect Arguments
    let args = cli::Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(
        "Starting at {} fps{}",
        args.framerate,
        args.seed
            .map(|seed| format!(" with seed {seed}"))
            .unwrap_or_default()
    );

    let settings = args.particle_settings();
    let max_particles = settings.max_particles;
    let cursor = CursorParticles::start(
        args.motion_preference(),
        settings,
        StdRng::seed_from_u64(rng.gen()),
    );

    // Setup Winit
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    // State
    let mut app_state = AppState {
        tokio_rt: tokio::runtime::Runtime::new()?,
        gpu: None,
        gfx: None,
        page: None,
        cursor,
        rng,
        framepace: Framepacer::new(),
        occluded: false,

        mouse_position: Vec2::ZERO,

        framerate: args.framerate,
        max_particles,
        submit_success_rate: args.submit_success_rate,
    };

    event_loop.run_app(&mut app_state)?;
    Ok(())
}

struct GfxState {
    window: Arc<Window>,
    egui: EguiIntegration,

    render_module: RenderModule,
}

struct AppState<'a> {
    tokio_rt: tokio::runtime::Runtime,
    gpu: Option<GpuContext<'a>>,
    gfx: Option<GfxState>,
    page: Option<PortfolioPage>,
    cursor: Option<CursorParticles<StdRng>>,
    rng: StdRng,
    framepace: Framepacer,
    occluded: bool,

    mouse_position: Vec2,

    framerate: u32,
    max_particles: usize,
    submit_success_rate: f64,
}

impl<'a> AppState<'a> {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = Arc::new(
            event_loop.create_window(Window::default_attributes().with_title("Portfolio"))?,
        );
        let window_size = window.inner_size();

        let gpu = self.tokio_rt.block_on(GpuContext::new(window.clone()))?;
        let surface_format = gpu.config.format;
        info!(
            "Using {} with a {:?} surface",
            gpu.adapter.get_info().name,
            surface_format
        );

        let render_module = RenderModule::new(
            &gpu.device,
            surface_format,
            gpu.is_srgb(),
            self.max_particles,
        );
        render_module.update_size(&gpu.queue, window_size.width, window_size.height);

        let mut egui = EguiIntegration::new(&gpu.device, surface_format);
        egui.resize(window_size.width, window_size.height);

        let scheme = window
            .theme()
            .map(ColorScheme::from)
            .unwrap_or(ColorScheme::Dark);
        let cores = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let transport = SimulatedTransport::new(
            SUBMIT_DELAY,
            self.submit_success_rate,
            StdRng::seed_from_u64(self.rng.gen()),
        );

        self.page = Some(PortfolioPage::new(
            Vec2::new(window_size.width as f32, window_size.height as f32),
            scheme,
            cores,
            StdRng::seed_from_u64(self.rng.gen()),
            Box::new(transport),
        ));
        self.gfx = Some(GfxState {
            window,
            egui,

            render_module,
        });
        self.gpu = Some(gpu);
        Ok(())
    }

    /// Advances every effect and draws one frame. Returns whether another
    /// frame is wanted right away.
    fn redraw(&mut self) -> anyhow::Result<bool> {
        let (Some(gpu), Some(gfx), Some(page)) =
            (self.gpu.as_mut(), self.gfx.as_mut(), self.page.as_mut())
        else {
            return Ok(false);
        };

        let delta_time = self.framepace.begin_frame();
        page.advance(delta_time);

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure_surface();
                return Ok(true);
            }
            Err(err) => return Err(err.into()),
        };

        gfx.egui.run(|ctx| page.ui(ctx));

        if let Some(cursor) = &mut self.cursor {
            cursor.frame(&mut gfx.render_module);
        }
        let particles_running = self
            .cursor
            .as_ref()
            .is_some_and(CursorParticles::is_running);
        gfx.render_module.upload(&gpu.queue);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        gfx.egui.pre_render(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            self.framepace.frametime(),
        );

        // Render
        {
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            let clear = page.scheme().clear_color(gpu.is_srgb());

            let mut rpass = render::begin_pass(&mut encoder, &view, clear);
            gfx.egui.render(&mut rpass);
            gfx.render_module.draw(&mut rpass);
        }

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();

        self.framepace.end_frame(self.framerate);
        Ok(particles_running || page.is_animating() || gfx.egui.wants_repaint())
    }
}

impl<'a> ApplicationHandler for AppState<'a> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }

        if let Err(err) = self.init_graphics(event_loop) {
            error!("Failed to start: {err:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let (Some(gpu), Some(gfx), Some(page)) =
            (self.gpu.as_mut(), self.gfx.as_mut(), self.page.as_mut())
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
                gfx.render_module
                    .update_size(&gpu.queue, new_size.width, new_size.height);
                gfx.egui.resize(new_size.width, new_size.height);
                page.on_resize(Vec2::new(new_size.width as f32, new_size.height as f32));
            }
            WindowEvent::Occluded(occluded) => {
                if occluded != self.occluded {
                    info!(
                        "Window {}, {} animations",
                        if occluded { "hidden" } else { "visible" },
                        if occluded { "pausing" } else { "resuming" }
                    );
                }
                self.occluded = occluded;
            }
            WindowEvent::ThemeChanged(theme) => {
                page.set_scheme(theme.into());
            }
            WindowEvent::KeyboardInput { event, .. } => match (event.state, event.physical_key) {
                (ElementState::Pressed, PhysicalKey::Code(KeyCode::F11)) => {
                    if gfx.window.fullscreen().is_none() {
                        gfx.window
                            .set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
                    } else {
                        gfx.window.set_fullscreen(None);
                    }
                }
                (ElementState::Pressed, PhysicalKey::Code(KeyCode::Escape)) => {
                    page.on_escape();
                    gfx.egui.key_event(event);
                }
                _ => gfx.egui.key_event(event),
            },
            WindowEvent::ModifiersChanged(modifiers) => {
                gfx.egui.modifiers_event(modifiers);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                gfx.egui.mouse_wheel(delta);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                gfx.egui.mouse_event(self.mouse_position, state, button);

                if state == ElementState::Pressed && button == MouseButton::Left {
                    if let Some(cursor) = &mut self.cursor {
                        cursor.clicked(self.mouse_position);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                gfx.egui.mouse_motion(position);
                page.pointer_moved(position);
                if let Some(cursor) = &mut self.cursor {
                    cursor.pointer_moved(position);
                }

                self.mouse_position = position;
            }
            WindowEvent::CursorLeft { .. } => {
                gfx.egui.mouse_left();
                page.pointer_left();
            }
            WindowEvent::Touch(touch) => {
                let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                gfx.egui.touch_event(position, touch.phase);

                match touch.phase {
                    TouchPhase::Started => {
                        page.touch_start(position);
                        if let Some(cursor) = &mut self.cursor {
                            cursor.clicked(position);
                        }
                    }
                    TouchPhase::Moved => {
                        if let Some(cursor) = &mut self.cursor {
                            cursor.pointer_moved(position);
                        }
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => page.touch_end(position),
                }
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_none() {
            return;
        }

        // nothing advances while the window can't be seen
        let animating = !self.occluded
            && match self.redraw() {
                Ok(animating) => animating,
                Err(err) => {
                    error!("Frame failed: {err:#}");
                    false
                }
            };

        let ticking = self.page.as_ref().is_some_and(PortfolioPage::wants_tick);
        event_loop.set_control_flow(control_flow(
            self.occluded,
            animating,
            ticking,
            Instant::now(),
        ));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(cursor) = &self.cursor {
            info!("Drew {} particle frames", cursor.frames());
        }
    }
}

/// Polls while something animates, wakes on the clamped frame delta while
/// only the background shapes morph, and otherwise sleeps until input.
/// A hidden window always sleeps.
fn control_flow(occluded: bool, animating: bool, ticking: bool, now: Instant) -> ControlFlow {
    if occluded {
        ControlFlow::Wait
    } else if animating {
        ControlFlow::Poll
    } else if ticking {
        ControlFlow::WaitUntil(now + Framepacer::MAX_DELTA)
    } else {
        ControlFlow::Wait
    }
}
