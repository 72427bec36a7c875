use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use super::WindowHost;
use crate::core::{AppControl, WindowEvents};
use crate::gfx::{GfxError, GraphicsContext};
use crate::input::platform::winit::{map_key, map_key_state};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Main Camera".to_string(),
            initial_size: LogicalSize::new(2000.0, 1000.0),
        }
    }
}

/// One winit window whose event loop is pumped by the caller.
pub struct WinitHost {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    close_requested: bool,
}

impl WinitHost {
    /// Opens the window. Blocks until the platform has created it.
    pub fn new(config: WindowConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let mut opener = Opener {
            config,
            window: None,
        };
        // Windows can only be created once the loop reports `resumed`.
        let window = loop {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::from_millis(16)), &mut opener)
            {
                return Err(anyhow!("event loop exited with code {code} before the window opened"));
            }
            if let Some(result) = opener.window.take() {
                break result?;
            }
        };

        Ok(Self {
            event_loop,
            window,
            close_requested: false,
        })
    }

    /// Shared handle for surface creation.
    pub fn window(&self) -> Arc<Window> {
        Arc::clone(&self.window)
    }
}

impl WindowHost for WinitHost {
    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn poll_events(&mut self, events: &mut dyn WindowEvents) {
        let mut pump = Pump {
            window_id: self.window.id(),
            events,
            exit: false,
        };
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut pump);

        if pump.exit || matches!(status, PumpStatus::Exit(_)) {
            self.close_requested = true;
        }
    }

    fn swap_buffers(&mut self, ctx: &dyn GraphicsContext) -> Result<(), GfxError> {
        self.window.pre_present_notify();
        ctx.present()
    }
}

struct Opener {
    config: WindowConfig,
    window: Option<Result<Arc<Window>>>,
}

impl ApplicationHandler for Opener {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        self.window = Some(
            event_loop
                .create_window(attrs)
                .map(Arc::new)
                .context("failed to create window"),
        );
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

struct Pump<'a> {
    window_id: WindowId,
    events: &'a mut dyn WindowEvents,
    exit: bool,
}

impl ApplicationHandler for Pump<'_> {
    fn resumed(&mut self, _: &ActiveEventLoop) {}

    fn window_event(&mut self, _: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if window_id != self.window_id || self.exit {
            return;
        }

        let control = match event {
            WindowEvent::CloseRequested => self.events.on_close_request(),
            WindowEvent::Resized(size) => self.events.on_resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => self.events.on_key(
                map_key(event.physical_key),
                map_key_state(event.state),
                event.repeat,
            ),
            _ => AppControl::Continue,
        };

        if control == AppControl::Exit {
            self.exit = true;
        }
    }
}
