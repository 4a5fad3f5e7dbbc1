//! Casement: a small event-loop and window-lifecycle layer with a
//! C-callable surface.
//!
//! A [`WindowBuilder`] accumulates initial window properties, an
//! [`EventLoop`] owns the platform pump and the windows created through
//! it, and [`run`](EventLoop::run) dispatches normalized [`Event`]s to
//! a callback until it returns [`ControlFlow::Exit`]; at that point
//! control returns to the caller rather than exiting the process.
//!
//! ```no_run
//! use casement::{ControlFlow, Event, EventLoop, WindowBuilder};
//!
//! # fn main() -> casement::Result<()> {
//! let mut event_loop = EventLoop::new()?;
//! let window = event_loop.create_window(
//!     WindowBuilder::new()
//!         .with_title("Hello World")
//!         .with_dimensions(600.0, 400.0)?,
//! )?;
//! event_loop.run(|event| match event {
//!     Event::CloseRequested { .. } => ControlFlow::Exit,
//!     _ => ControlFlow::Wait,
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod ffi;
pub mod geometry;
pub mod window;
pub mod window_builder;

pub use error::{Error, Result};
pub use event::{ControlFlow, Event};
pub use event_loop::{EventLoop, LoopState};
pub use geometry::{LogicalSize, PhysicalPosition, PhysicalSize};
pub use window::{Window, WindowId};
pub use window_builder::WindowBuilder;
