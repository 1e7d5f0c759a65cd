use std::time::Duration;

use glam::Vec2;

/// Feeds winit input into egui and paints its output with `egui_wgpu`.
pub struct EguiIntegration {
    pub ctx: egui::Context,
    raw_input: egui::RawInput,
    modifiers: egui::Modifiers,

    renderer: egui_wgpu::Renderer,
    clipped_shapes: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    repaint_delay: Duration,
}

impl EguiIntegration {
    pub fn new(device: &wgpu::Device, swapchain_format: wgpu::TextureFormat) -> Self {
        let renderer = egui_wgpu::Renderer::new(device, swapchain_format, None, 1);

        Self {
            ctx: egui::Context::default(),
            raw_input: egui::RawInput::default(),
            modifiers: Default::default(),

            renderer,
            clipped_shapes: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            repaint_delay: Duration::MAX,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.raw_input.screen_rect = Some(egui::Rect::from_min_size(
            Default::default(),
            egui::Vec2::new(width as f32, height as f32),
        ));
    }

    pub fn run<F: FnOnce(&egui::Context)>(&mut self, run_ui: F) {
        let raw_input = std::mem::take(&mut self.raw_input);
        self.ctx.begin_frame(raw_input);
        run_ui(&self.ctx);

        let output = self.ctx.end_frame();
        self.repaint_delay = output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map_or(Duration::MAX, |viewport| viewport.repaint_delay);
        self.clipped_shapes = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.textures_delta = output.textures_delta;
    }

    /// Whether egui asked to be drawn again right away, e.g. while a text
    /// cursor blinks or a widget animates.
    pub fn wants_repaint(&self) -> bool {
        self.repaint_delay.is_zero() || !self.raw_input.events.is_empty()
    }

    pub fn pre_render<'a>(
        &mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        encoder: &'a mut wgpu::CommandEncoder,
        delta_time: f32,
    ) {
        self.raw_input.predicted_dt = delta_time;

        let screen_descriptor = self.screen_descriptor();
        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &self.clipped_shapes,
            &screen_descriptor,
        );

        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    pub fn render<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        let screen_descriptor = self.screen_descriptor();
        self.renderer
            .render(rpass, &self.clipped_shapes, &screen_descriptor);
    }

    fn screen_descriptor(&self) -> egui_wgpu::ScreenDescriptor {
        let screen_rect = self.ctx.screen_rect();
        egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_rect.width() as u32, screen_rect.height() as u32],
            pixels_per_point: self.ctx.pixels_per_point(),
        }
    }

    pub fn modifiers_event(&mut self, event: winit::event::Modifiers) {
        let state = event.state();
        self.modifiers.alt = state.alt_key();
        self.modifiers.ctrl = state.control_key();
        self.modifiers.shift = state.shift_key();
        self.modifiers.mac_cmd = state.super_key();
        self.modifiers.command = state.control_key() | state.super_key();
    }

    pub fn key_event(&mut self, event: winit::event::KeyEvent) {
        let pressed = matches!(event.state, winit::event::ElementState::Pressed);
        let key = match event.logical_key {
            winit::keyboard::Key::Named(key) => match named_key_to_egui_key(key) {
                Some(key) => key,
                None => {
                    // space arrives as a named key but still types
                    if pressed && key == winit::keyboard::NamedKey::Space {
                        self.raw_input.events.push(egui::Event::Text(" ".into()));
                    }
                    return;
                }
            },
            winit::keyboard::Key::Character(char) => {
                if pressed && !self.modifiers.command {
                    self.raw_input
                        .events
                        .push(egui::Event::Text(char.to_string()));
                }
                return;
            }
            winit::keyboard::Key::Unidentified(_) | winit::keyboard::Key::Dead(_) => return,
        };

        self.raw_input.events.push(egui::Event::Key {
            key,
            physical_key: None,
            pressed,
            repeat: event.repeat,
            modifiers: self.modifiers,
        });
    }

    pub fn mouse_event(
        &mut self,
        position: Vec2,
        state: winit::event::ElementState,
        button: winit::event::MouseButton,
    ) {
        let pressed = matches!(state, winit::event::ElementState::Pressed);
        let button = match button {
            winit::event::MouseButton::Left => egui::PointerButton::Primary,
            winit::event::MouseButton::Right => egui::PointerButton::Secondary,
            winit::event::MouseButton::Middle => egui::PointerButton::Middle,
            winit::event::MouseButton::Back => egui::PointerButton::Extra1,
            winit::event::MouseButton::Forward => egui::PointerButton::Extra2,
            winit::event::MouseButton::Other(_) => return,
        };

        self.raw_input.events.push(egui::Event::PointerButton {
            pos: egui::Pos2::new(position.x, position.y),
            button,
            pressed,
            modifiers: self.modifiers,
        });
    }

    pub fn mouse_motion(&mut self, position: Vec2) {
        self.raw_input
            .events
            .push(egui::Event::PointerMoved(egui::Pos2::new(
                position.x, position.y,
            )));
    }

    pub fn mouse_left(&mut self) {
        self.raw_input.events.push(egui::Event::PointerGone);
    }

    pub fn mouse_wheel(&mut self, delta: winit::event::MouseScrollDelta) {
        let (unit, delta) = match delta {
            winit::event::MouseScrollDelta::LineDelta(x, y) => {
                (egui::MouseWheelUnit::Line, egui::vec2(x, y))
            }
            winit::event::MouseScrollDelta::PixelDelta(pos) => (
                egui::MouseWheelUnit::Point,
                egui::vec2(pos.x as f32, pos.y as f32),
            ),
        };

        self.raw_input.events.push(egui::Event::MouseWheel {
            unit,
            delta,
            modifiers: self.modifiers,
        });
    }

    /// Touches drive egui as a primary pointer so taps press buttons and
    /// drags scroll the page.
    pub fn touch_event(&mut self, position: Vec2, phase: winit::event::TouchPhase) {
        use winit::event::TouchPhase;

        let pos = egui::Pos2::new(position.x, position.y);
        match phase {
            TouchPhase::Started => {
                self.raw_input.events.push(egui::Event::PointerMoved(pos));
                self.raw_input.events.push(egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: true,
                    modifiers: self.modifiers,
                });
            }
            TouchPhase::Moved => {
                self.raw_input.events.push(egui::Event::PointerMoved(pos));
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.raw_input.events.push(egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: false,
                    modifiers: self.modifiers,
                });
                self.raw_input.events.push(egui::Event::PointerGone);
            }
        }
    }
}

fn named_key_to_egui_key(key: winit::keyboard::NamedKey) -> Option<egui::Key> {
    use winit::keyboard::NamedKey;
    Some(match key {
        NamedKey::Backspace => egui::Key::Backspace,
        NamedKey::Enter => egui::Key::Enter,
        NamedKey::Tab => egui::Key::Tab,
        NamedKey::Delete => egui::Key::Delete,
        NamedKey::End => egui::Key::End,
        NamedKey::Home => egui::Key::Home,
        NamedKey::PageDown => egui::Key::PageDown,
        NamedKey::PageUp => egui::Key::PageUp,
        NamedKey::ArrowDown => egui::Key::ArrowDown,
        NamedKey::ArrowLeft => egui::Key::ArrowLeft,
        NamedKey::ArrowRight => egui::Key::ArrowRight,
        NamedKey::ArrowUp => egui::Key::ArrowUp,
        NamedKey::Escape => egui::Key::Escape,
        _ => return None,
    })
}
