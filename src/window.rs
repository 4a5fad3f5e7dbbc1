//! Window handles and their shared state.
//!
//! A `Window` is a move-only handle to a platform surface owned by the
//! `EventLoop` that created it. Size and scale state is shared with the
//! loop so resize and DPI signals keep the handle's view current before
//! the callback observes them. Mutations are queued as commands the
//! backend applies on its next pump.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::WindowConfig;
use crate::error::{Error, Result};
use crate::geometry::{LogicalSize, PhysicalSize};

/// Opaque identity of a window, assigned by the backend
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A deferred mutation applied by the backend on its next pump
#[derive(Clone, Debug, PartialEq)]
pub enum WindowCommand {
    SetTitle(String),
    SetVisible(bool),
    RequestInnerSize(LogicalSize),
    RequestRedraw,
}

#[derive(Debug)]
pub(crate) struct WindowState {
    pub title: String,
    pub physical_size: PhysicalSize,
    pub scale_factor: f64,
    pub visible: bool,
    pub destroyed: bool,
    pub commands: VecDeque<WindowCommand>,
}

/// State shared between a `Window` handle and the owning event loop
#[derive(Debug)]
pub(crate) struct WindowShared {
    id: WindowId,
    state: Mutex<WindowState>,
}

impl WindowShared {
    pub(crate) fn new(
        id: WindowId,
        config: &WindowConfig,
        physical_size: PhysicalSize,
        scale_factor: f64,
    ) -> Self {
        Self {
            id,
            state: Mutex::new(WindowState {
                title: config.title.clone(),
                physical_size,
                scale_factor,
                visible: config.visible,
                destroyed: false,
                commands: VecDeque::new(),
            }),
        }
    }

    pub(crate) fn id(&self) -> WindowId {
        self.id
    }

    pub(crate) fn set_physical_size(&self, size: PhysicalSize) {
        self.state.lock().physical_size = size;
    }

    pub(crate) fn set_scale_factor(&self, scale_factor: f64) {
        self.state.lock().scale_factor = scale_factor;
    }

    pub(crate) fn take_commands(&self) -> Vec<WindowCommand> {
        self.state.lock().commands.drain(..).collect()
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    pub(crate) fn queue_redraw(&self) {
        self.push_command(WindowCommand::RequestRedraw);
    }

    fn push_command(&self, command: WindowCommand) {
        self.state.lock().commands.push_back(command);
    }
}

/// Handle to a single platform surface.
///
/// Valid between creation and destruction; dropping the handle marks the
/// surface for destruction, which the owning loop performs on its next
/// dispatch cycle.
#[derive(Debug)]
pub struct Window {
    shared: Arc<WindowShared>,
}

impl Window {
    pub(crate) fn from_shared(shared: Arc<WindowShared>) -> Self {
        Self { shared }
    }

    pub fn id(&self) -> WindowId {
        self.shared.id()
    }

    pub fn title(&self) -> String {
        self.shared.state.lock().title.clone()
    }

    /// Current size in device pixels
    pub fn inner_size(&self) -> PhysicalSize {
        self.shared.state.lock().physical_size
    }

    /// Current size independent of the display scale factor
    pub fn logical_size(&self) -> LogicalSize {
        let state = self.shared.state.lock();
        state.physical_size.to_logical(state.scale_factor)
    }

    pub fn scale_factor(&self) -> f64 {
        self.shared.state.lock().scale_factor
    }

    pub fn is_visible(&self) -> bool {
        self.shared.state.lock().visible
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.shared.state.lock().title = title.clone();
        self.shared.push_command(WindowCommand::SetTitle(title));
    }

    pub fn set_visible(&self, visible: bool) {
        self.shared.state.lock().visible = visible;
        self.shared.push_command(WindowCommand::SetVisible(visible));
    }

    /// Ask the platform to resize the surface. The new size becomes
    /// observable through a later `Resized` event, not immediately.
    pub fn request_inner_size(&self, size: LogicalSize) -> Result<()> {
        if !size.width.is_finite()
            || !size.height.is_finite()
            || size.width <= 0.0
            || size.height <= 0.0
        {
            return Err(Error::InvalidArgument(format!(
                "window size must be positive, got {} x {}",
                size.width, size.height
            )));
        }
        self.shared
            .push_command(WindowCommand::RequestInnerSize(size));
        Ok(())
    }

    pub fn request_redraw(&self) {
        self.shared.push_command(WindowCommand::RequestRedraw);
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.shared.state.lock().destroyed = true;
    }
}
