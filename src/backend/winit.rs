//! Platform backend over winit's message pump.
//!
//! winit 0.30 only allows window creation while its loop is active, so
//! creation requests are queued and fulfilled from `resumed` /
//! `about_to_wait` while the pump runs. Signals are queued by the
//! handler and drained by [`WinitBackend::pump`].

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use log::{debug, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize as WinitLogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop as WinitEventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as WinitWindow, WindowId as WinitWindowId};

use super::{Backend, PumpMode, Signal, WindowConfig, WindowInit};
use crate::error::{Error, Result};
use crate::window::{WindowCommand, WindowId};

/// Pumps needed before giving up on a creation request. The platform
/// services requests on the first pump in practice; the bound only
/// guards against a wedged loop.
const CREATE_PUMP_ATTEMPTS: usize = 8;

/// Backend driving a winit event loop in pump (run-and-return) mode
pub struct WinitBackend {
    event_loop: WinitEventLoop<()>,
    handler: PumpHandler,
}

impl WinitBackend {
    /// Allocate the platform message pump. Fails when no display is
    /// available.
    pub fn new() -> Result<Self> {
        let event_loop = WinitEventLoop::new().map_err(|err| Error::Platform(err.to_string()))?;
        Ok(Self {
            event_loop,
            handler: PumpHandler::new(),
        })
    }

    fn pump_inner(&mut self, timeout: Option<Duration>) -> Result<()> {
        match self.event_loop.pump_app_events(timeout, &mut self.handler) {
            PumpStatus::Continue => Ok(()),
            PumpStatus::Exit(code) => Err(Error::Platform(format!(
                "platform loop exited with code {}",
                code
            ))),
        }
    }
}

impl Backend for WinitBackend {
    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowInit> {
        let request = self.handler.queue_create(config.clone());
        for _ in 0..CREATE_PUMP_ATTEMPTS {
            self.pump_inner(Some(Duration::ZERO))?;
            if let Some(result) = self.handler.take_created(request) {
                return result;
            }
        }
        Err(Error::Platform(
            "window creation was not serviced by the platform loop".into(),
        ))
    }

    fn destroy_window(&mut self, id: WindowId) -> Result<()> {
        let window = self
            .handler
            .windows
            .remove(&id)
            .ok_or(Error::WindowNotFound(id))?;
        self.handler.ids.remove(&window.id());
        debug!("destroyed window {:?}", id);
        Ok(())
    }

    fn apply(&mut self, id: WindowId, command: &WindowCommand) -> Result<()> {
        let window = self
            .handler
            .windows
            .get(&id)
            .ok_or(Error::WindowNotFound(id))?;
        match command {
            WindowCommand::SetTitle(title) => window.set_title(title),
            WindowCommand::SetVisible(visible) => window.set_visible(*visible),
            WindowCommand::RequestInnerSize(size) => {
                let _ = window.request_inner_size(WinitLogicalSize::new(size.width, size.height));
            }
            WindowCommand::RequestRedraw => window.request_redraw(),
        }
        Ok(())
    }

    fn pump(&mut self, mode: PumpMode) -> Result<Vec<Signal>> {
        let timeout = match mode {
            PumpMode::Wait => None,
            PumpMode::Poll => Some(Duration::ZERO),
        };
        self.pump_inner(timeout)?;
        Ok(self.handler.signals.drain(..).collect())
    }
}

struct PumpHandler {
    next_id: u64,
    next_request: u64,
    pending: VecDeque<(u64, WindowConfig)>,
    created: HashMap<u64, Result<WindowInit>>,
    windows: HashMap<WindowId, WinitWindow>,
    ids: HashMap<WinitWindowId, WindowId>,
    signals: VecDeque<Signal>,
}

impl PumpHandler {
    fn new() -> Self {
        Self {
            next_id: 1,
            next_request: 1,
            pending: VecDeque::new(),
            created: HashMap::new(),
            windows: HashMap::new(),
            ids: HashMap::new(),
            signals: VecDeque::new(),
        }
    }

    fn queue_create(&mut self, config: WindowConfig) -> u64 {
        let request = self.next_request;
        self.next_request += 1;
        self.pending.push_back((request, config));
        request
    }

    fn take_created(&mut self, request: u64) -> Option<Result<WindowInit>> {
        self.created.remove(&request)
    }

    fn fulfil_pending(&mut self, event_loop: &ActiveEventLoop) {
        while let Some((request, config)) = self.pending.pop_front() {
            let result = self.build_window(event_loop, &config);
            self.created.insert(request, result);
        }
    }

    fn build_window(
        &mut self,
        event_loop: &ActiveEventLoop,
        config: &WindowConfig,
    ) -> Result<WindowInit> {
        let mut attributes = WinitWindow::default_attributes()
            .with_title(&config.title)
            .with_visible(config.visible)
            .with_resizable(config.resizable)
            .with_decorations(config.decorations);
        if let Some(size) = config.logical_size {
            attributes = attributes.with_inner_size(WinitLogicalSize::new(size.width, size.height));
        }

        let window = event_loop
            .create_window(attributes)
            .map_err(|err| Error::Platform(err.to_string()))?;

        let id = WindowId::new(self.next_id);
        self.next_id += 1;

        let size = window.inner_size();
        let init = WindowInit {
            id,
            physical_size: crate::geometry::PhysicalSize::new(size.width, size.height),
            scale_factor: window.scale_factor(),
        };

        self.ids.insert(window.id(), id);
        self.windows.insert(id, window);
        debug!("created window {:?}", id);
        Ok(init)
    }
}

impl ApplicationHandler for PumpHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.fulfil_pending(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.fulfil_pending(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WinitWindowId,
        event: WindowEvent,
    ) {
        let Some(&id) = self.ids.get(&window_id) else {
            warn!("signal for unknown platform window {:?}", window_id);
            return;
        };

        let signal = match event {
            WindowEvent::CloseRequested => Signal::CloseRequested { window: id },
            WindowEvent::Resized(size) => Signal::Resized {
                window: id,
                width: size.width,
                height: size.height,
            },
            WindowEvent::Moved(position) => Signal::Moved {
                window: id,
                x: position.x,
                y: position.y,
            },
            WindowEvent::CursorMoved { position, .. } => Signal::CursorMoved {
                window: id,
                x: position.x,
                y: position.y,
            },
            WindowEvent::CursorEntered { .. } => Signal::CursorEntered { window: id },
            WindowEvent::CursorLeft { .. } => Signal::CursorLeft { window: id },
            WindowEvent::Focused(focused) => Signal::Focused {
                window: id,
                focused,
            },
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                // The recomputed size is read back from the window so the
                // signal carries both pieces in one place.
                let size = self
                    .windows
                    .get(&id)
                    .map(|window| window.inner_size())
                    .unwrap_or_default();
                Signal::ScaleFactorChanged {
                    window: id,
                    scale_factor,
                    width: size.width,
                    height: size.height,
                }
            }
            WindowEvent::RedrawRequested => Signal::RedrawRequested { window: id },
            WindowEvent::Destroyed => Signal::Destroyed { window: id },
            _ => Signal::Unknown,
        };
        self.signals.push_back(signal);
    }
}
