//! Synthetic backend for tests and embedders without a display.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Backend, PumpMode, Signal, WindowConfig, WindowInit};
use crate::error::{Error, Result};
use crate::geometry::LogicalSize;
use crate::window::{WindowCommand, WindowId};

const DEFAULT_LOGICAL_SIZE: LogicalSize = LogicalSize::new(800.0, 600.0);

type SignalQueue = Arc<Mutex<VecDeque<Signal>>>;

/// A backend whose "platform" is an injectable signal queue.
///
/// `pump(Wait)` on an exhausted queue fails with
/// [`Error::EventsExhausted`] instead of blocking forever, since no
/// further signal can ever arrive.
#[derive(Debug)]
pub struct HeadlessBackend {
    next_id: u64,
    scale_factor: f64,
    refuse_creation: bool,
    windows: HashMap<WindowId, WindowConfig>,
    queue: SignalQueue,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::with_scale_factor(1.0)
    }

    /// A headless display reporting the given scale factor
    pub fn with_scale_factor(scale_factor: f64) -> Self {
        Self {
            next_id: 1,
            scale_factor,
            refuse_creation: false,
            windows: HashMap::new(),
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Make every subsequent `create_window` fail, as a display-less
    /// platform would
    pub fn refuse_window_creation(&mut self) {
        self.refuse_creation = true;
    }

    /// Queue a synthetic platform signal for the next pump
    pub fn inject(&mut self, signal: Signal) {
        self.queue.lock().push_back(signal);
    }

    /// A handle that can keep injecting signals after the backend has
    /// been moved into an event loop
    pub fn injector(&self) -> SignalInjector {
        SignalInjector {
            queue: self.queue.clone(),
        }
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle feeding synthetic signals into a `HeadlessBackend`
#[derive(Clone, Debug)]
pub struct SignalInjector {
    queue: SignalQueue,
}

impl SignalInjector {
    pub fn inject(&self, signal: Signal) {
        self.queue.lock().push_back(signal);
    }
}

impl Backend for HeadlessBackend {
    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowInit> {
        if self.refuse_creation {
            return Err(Error::Platform("no display available".into()));
        }

        let id = WindowId::new(self.next_id);
        self.next_id += 1;

        let logical = config.logical_size.unwrap_or(DEFAULT_LOGICAL_SIZE);
        let physical_size = logical.to_physical(self.scale_factor);
        self.windows.insert(id, config.clone());

        Ok(WindowInit {
            id,
            physical_size,
            scale_factor: self.scale_factor,
        })
    }

    fn destroy_window(&mut self, id: WindowId) -> Result<()> {
        self.windows
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::WindowNotFound(id))
    }

    fn apply(&mut self, id: WindowId, command: &WindowCommand) -> Result<()> {
        let config = self
            .windows
            .get_mut(&id)
            .ok_or(Error::WindowNotFound(id))?;
        match command {
            WindowCommand::SetTitle(title) => config.title = title.clone(),
            WindowCommand::SetVisible(visible) => config.visible = *visible,
            WindowCommand::RequestInnerSize(size) => config.logical_size = Some(*size),
            WindowCommand::RequestRedraw => {}
        }
        Ok(())
    }

    fn pump(&mut self, mode: PumpMode) -> Result<Vec<Signal>> {
        let mut queue = self.queue.lock();
        if queue.is_empty() && mode == PumpMode::Wait {
            return Err(Error::EventsExhausted);
        }
        Ok(queue.drain(..).collect())
    }
}
