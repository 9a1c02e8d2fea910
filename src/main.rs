use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glass_sketch::cli::Cli;
use glass_sketch::frame::FrameClock;
use glass_sketch::sketch::Sketch;

type Result<T> = anyhow::Result<T>;

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    sketch: Option<Sketch>,
    clock: FrameClock,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            sketch: None,
            clock: FrameClock::new(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window = match event_loop.create_window(
                Window::default_attributes()
                    .with_title("Glass Sketch")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        self.cli.width,
                        self.cli.height,
                    )),
            ) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let sketch = match pollster::block_on(Sketch::new(window.clone(), &self.cli)) {
                Ok(s) => s,
                Err(e) => {
                    log::error!("Failed to initialize sketch: {:#}", e);
                    event_loop.exit();
                    return;
                }
            };

            self.window = Some(window);
            self.sketch = Some(sketch);
            self.clock = FrameClock::new();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let the panel handle the event first
        if let (Some(sketch), Some(window)) = (&mut self.sketch, &self.window) {
            if sketch.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                if let Some(sketch) = &mut self.sketch {
                    sketch.unload();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(sketch), Some(window)) = (&mut self.sketch, &self.window) {
                    sketch.resize((size.width, size.height), window.scale_factor());
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let (Some(sketch), Some(window)) = (&mut self.sketch, &self.window) {
                    let size = window.inner_size();
                    sketch.resize((size.width, size.height), scale_factor);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(sketch) = &mut self.sketch {
                    sketch.controls_mut().process_mouse_button(button, state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(sketch) = &mut self.sketch {
                    sketch.controls_mut().process_cursor(position.x, position.y);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(sketch) = &mut self.sketch {
                    sketch.controls_mut().process_scroll(delta);
                }
            }
            WindowEvent::RedrawRequested => {
                let frame = self.clock.tick();
                if let (Some(sketch), Some(window)) = (&mut self.sketch, &self.window) {
                    if let Err(e) = sketch.render(window, &frame) {
                        log::error!("Render error: {}", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(sketch) = &mut self.sketch {
            sketch.unload();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);

    log::info!("Glass Sketch - drag to orbit, scroll to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
