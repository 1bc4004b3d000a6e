//! Application window and event loop management.

use std::sync::Arc;

use pollster::FutureExt;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use viewfinder_core::Rotation;
use viewfinder_render::PresentEngine;

use crate::error::Result;
use crate::source::FrameSource;

/// Notifications marshaled onto the event-loop thread.
///
/// The engine's geometry is render-thread-exclusive, so anything originating
/// on another thread goes through the event-loop proxy instead of mutating
/// engine state in place.
#[derive(Debug, Clone, Copy)]
pub enum HostEvent {
    /// The frame source negotiated its sensor-native resolution.
    SourceResolution {
        /// Stream width in sensor-native orientation.
        width: u32,
        /// Stream height in sensor-native orientation.
        height: u32,
    },
}

/// The viewfinder application state.
struct App {
    proxy: EventLoopProxy<HostEvent>,
    rotation: Rotation,
    window: Option<Arc<Window>>,
    engine: Option<PresentEngine>,
    source: Option<FrameSource>,
}

impl App {
    fn new(proxy: EventLoopProxy<HostEvent>, rotation: Rotation) -> Self {
        Self {
            proxy,
            rotation,
            window: None,
            engine: None,
            source: None,
        }
    }
}

impl ApplicationHandler<HostEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("viewfinder")
            .with_inner_size(LogicalSize::new(540.0, 1200.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let proxy = self.proxy.clone();
        let mut source = None;
        let engine = PresentEngine::new_windowed(window.clone(), self.rotation, |sender| {
            // The engine hands out the producer handle exactly once; bind
            // the synthetic capture stream to it. The stream reports its
            // negotiated resolution from its own thread, so that comes back
            // through the proxy.
            source = Some(FrameSource::spawn(sender, move |width, height| {
                let _ = proxy.send_event(HostEvent::SourceResolution { width, height });
            }));
        })
        .block_on();

        match engine {
            Ok(engine) => {
                self.engine = Some(engine);
                self.source = source;
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("presentation engine setup failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: HostEvent) {
        match event {
            HostEvent::SourceResolution { width, height } => {
                if let Some(engine) = &mut self.engine {
                    engine.set_source_extent(width, height);
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(engine) = &mut self.engine {
                    if let Err(e) = engine.draw() {
                        log::error!("draw failed: {e}");
                    }
                }
                // Continuous rendering: one draw per refresh, independent of
                // frame arrival.
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CloseRequested => {
                if let Some(source) = &mut self.source {
                    source.stop();
                }
                event_loop.exit();
            }
            _ => {}
        }
    }
}

/// Runs the viewfinder window until it is closed.
pub fn run_app(rotation: Rotation) -> Result<()> {
    let event_loop = EventLoop::<HostEvent>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();
    let mut app = App::new(proxy, rotation);
    event_loop.run_app(&mut app)?;
    Ok(())
}
