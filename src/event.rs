//! Normalized events and the callback control-flow directive.

use crate::backend::Signal;
use crate::geometry::{PhysicalPosition, PhysicalSize};
use crate::window::WindowId;

/// A normalized platform event, handed to the callback for the duration
/// of one dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The user asked the window to close
    CloseRequested { window: WindowId },
    /// The window surface changed size, in device pixels
    Resized { window: WindowId, size: PhysicalSize },
    /// The window moved, position in device pixels
    Moved {
        window: WindowId,
        position: PhysicalPosition,
    },
    /// The cursor moved inside the window, coordinates in device pixels
    CursorMoved { window: WindowId, x: f64, y: f64 },
    CursorEntered { window: WindowId },
    CursorLeft { window: WindowId },
    Focused { window: WindowId, focused: bool },
    /// The display scale factor changed. Carries both the new factor and
    /// the recomputed physical size so consumers never see the old size.
    ScaleFactorChanged {
        window: WindowId,
        scale_factor: f64,
        size: PhysicalSize,
    },
    RedrawRequested { window: WindowId },
    /// The platform surface is gone; the handle must not be used afterward
    Destroyed { window: WindowId },
    /// Idle marker, delivered after a drained batch when polling.
    /// The conventional point to schedule redraws.
    MainEventsCleared,
}

impl Event {
    /// The window this event concerns, if any
    pub fn window(&self) -> Option<WindowId> {
        match self {
            Event::CloseRequested { window }
            | Event::Resized { window, .. }
            | Event::Moved { window, .. }
            | Event::CursorMoved { window, .. }
            | Event::CursorEntered { window }
            | Event::CursorLeft { window }
            | Event::Focused { window, .. }
            | Event::ScaleFactorChanged { window, .. }
            | Event::RedrawRequested { window }
            | Event::Destroyed { window } => Some(*window),
            Event::MainEventsCleared => None,
        }
    }

    /// Normalize a raw platform signal. Unrecognized signals map to
    /// `None` and are dropped instead of reaching the callback.
    pub(crate) fn from_signal(signal: Signal) -> Option<Event> {
        let event = match signal {
            Signal::CloseRequested { window } => Event::CloseRequested { window },
            Signal::Resized {
                window,
                width,
                height,
            } => Event::Resized {
                window,
                size: PhysicalSize::new(width, height),
            },
            Signal::Moved { window, x, y } => Event::Moved {
                window,
                position: PhysicalPosition::new(x, y),
            },
            Signal::CursorMoved { window, x, y } => Event::CursorMoved { window, x, y },
            Signal::CursorEntered { window } => Event::CursorEntered { window },
            Signal::CursorLeft { window } => Event::CursorLeft { window },
            Signal::Focused { window, focused } => Event::Focused { window, focused },
            Signal::ScaleFactorChanged {
                window,
                scale_factor,
                width,
                height,
            } => Event::ScaleFactorChanged {
                window,
                scale_factor,
                size: PhysicalSize::new(width, height),
            },
            Signal::RedrawRequested { window } => Event::RedrawRequested { window },
            Signal::Destroyed { window } => Event::Destroyed { window },
            Signal::Unknown => return None,
        };
        Some(event)
    }
}

/// Directive returned by the callback after each dispatch
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ControlFlow {
    /// Begin a new iteration immediately, whether or not signals are pending
    Poll,
    /// Suspend the thread until the next platform signal arrives
    #[default]
    Wait,
    /// Terminate the loop and return control to the caller of `run`
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_signal_normalizes_to_none() {
        assert_eq!(Event::from_signal(Signal::Unknown), None);
    }

    #[test]
    fn test_resized_signal_carries_physical_size() {
        let event = Event::from_signal(Signal::Resized {
            window: WindowId::new(1),
            width: 800,
            height: 600,
        });
        assert_eq!(
            event,
            Some(Event::Resized {
                window: WindowId::new(1),
                size: PhysicalSize::new(800, 600),
            })
        );
    }

    #[test]
    fn test_scale_change_keeps_factor_and_size_together() {
        let event = Event::from_signal(Signal::ScaleFactorChanged {
            window: WindowId::new(3),
            scale_factor: 2.0,
            width: 1200,
            height: 800,
        })
        .unwrap();
        match event {
            Event::ScaleFactorChanged {
                scale_factor, size, ..
            } => {
                assert_eq!(scale_factor, 2.0);
                assert_eq!(size, PhysicalSize::new(1200, 800));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_main_events_cleared_has_no_window() {
        assert_eq!(Event::MainEventsCleared.window(), None);
    }

    #[test]
    fn test_default_control_flow_is_wait() {
        assert_eq!(ControlFlow::default(), ControlFlow::Wait);
    }
}
