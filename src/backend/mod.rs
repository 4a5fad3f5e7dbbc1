//! Platform seam between the dispatch loop and the windowing system.
//!
//! A [`Backend`] owns the native message pump. It turns platform
//! activity into raw [`Signal`]s, which the event loop normalizes into
//! [`Event`](crate::Event)s. Two implementations exist: the winit-backed
//! [`WinitBackend`](winit::WinitBackend) and the synthetic
//! [`HeadlessBackend`](headless::HeadlessBackend) for driving the
//! dispatch machinery without a display.

pub mod headless;
pub mod winit;

use crate::error::Result;
use crate::geometry::{LogicalSize, PhysicalSize};
use crate::window::{WindowCommand, WindowId};

/// Initial window properties, produced by a consumed `WindowBuilder`
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub logical_size: Option<LogicalSize>,
    pub visible: bool,
    pub resizable: bool,
    pub decorations: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            logical_size: None,
            visible: true,
            resizable: true,
            decorations: true,
        }
    }
}

/// Initial state of a freshly created platform window
#[derive(Copy, Clone, Debug)]
pub struct WindowInit {
    pub id: WindowId,
    pub physical_size: PhysicalSize,
    pub scale_factor: f64,
}

/// How a pump call should treat an empty signal queue
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PumpMode {
    /// Block until at least one signal arrives
    Wait,
    /// Return immediately with whatever is pending
    Poll,
}

/// A raw platform signal, prior to normalization.
///
/// `Unknown` stands for anything the backend saw but does not model;
/// the dispatch loop drops it instead of surfacing it.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    CloseRequested {
        window: WindowId,
    },
    Resized {
        window: WindowId,
        width: u32,
        height: u32,
    },
    Moved {
        window: WindowId,
        x: i32,
        y: i32,
    },
    CursorMoved {
        window: WindowId,
        x: f64,
        y: f64,
    },
    CursorEntered {
        window: WindowId,
    },
    CursorLeft {
        window: WindowId,
    },
    Focused {
        window: WindowId,
        focused: bool,
    },
    ScaleFactorChanged {
        window: WindowId,
        scale_factor: f64,
        width: u32,
        height: u32,
    },
    RedrawRequested {
        window: WindowId,
    },
    Destroyed {
        window: WindowId,
    },
    Unknown,
}

impl Signal {
    /// The window this signal concerns, if any
    pub fn window(&self) -> Option<WindowId> {
        match self {
            Signal::CloseRequested { window }
            | Signal::Resized { window, .. }
            | Signal::Moved { window, .. }
            | Signal::CursorMoved { window, .. }
            | Signal::CursorEntered { window }
            | Signal::CursorLeft { window }
            | Signal::Focused { window, .. }
            | Signal::ScaleFactorChanged { window, .. }
            | Signal::RedrawRequested { window }
            | Signal::Destroyed { window } => Some(*window),
            Signal::Unknown => None,
        }
    }
}

/// Owns the native message pump and the platform windows
pub trait Backend {
    /// Instantiate a platform window from the given configuration
    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowInit>;

    /// Destroy a platform window
    fn destroy_window(&mut self, id: WindowId) -> Result<()>;

    /// Apply a deferred window mutation
    fn apply(&mut self, id: WindowId, command: &WindowCommand) -> Result<()>;

    /// Drive the message pump once and return the signals it produced
    fn pump(&mut self, mode: PumpMode) -> Result<Vec<Signal>>;
}
