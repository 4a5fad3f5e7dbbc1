//! The dispatch loop: owns the platform pump and the windows created
//! through it, normalizes raw signals into events, and drives the user
//! callback until it asks to exit.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::headless::HeadlessBackend;
use crate::backend::winit::WinitBackend;
use crate::backend::{Backend, PumpMode, Signal};
use crate::error::{Error, Result};
use crate::event::{ControlFlow, Event};
use crate::geometry::PhysicalSize;
use crate::window::{Window, WindowId, WindowShared};
use crate::window_builder::WindowBuilder;

/// Where the dispatch state machine currently stands
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the next platform signal
    Idle,
    /// The callback is executing
    Dispatching,
    /// The callback returned `Exit`; the loop will never dispatch again
    Terminated,
}

/// Owns the platform message pump and every window created through it.
///
/// Single-threaded by contract: create, run and destroy all happen on
/// the thread that owns the loop. `run` blocks until the callback
/// returns [`ControlFlow::Exit`], then returns control to the caller
/// instead of exiting the process. Exactly one `run` is supported; a
/// later call fails with [`Error::Terminated`].
pub struct EventLoop {
    backend: Box<dyn Backend>,
    windows: HashMap<WindowId, Arc<WindowShared>>,
    state: LoopState,
    redraw_on_idle: bool,
}

impl EventLoop {
    /// Allocate the platform message pump. Fails with
    /// [`Error::Platform`] when no display is available.
    pub fn new() -> Result<Self> {
        Ok(Self::with_backend(Box::new(WinitBackend::new()?)))
    }

    /// An event loop over a synthetic signal queue, for tests and
    /// display-less embedders
    pub fn headless(backend: HeadlessBackend) -> Self {
        Self::with_backend(Box::new(backend))
    }

    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            windows: HashMap::new(),
            state: LoopState::Idle,
            redraw_on_idle: false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Request a redraw of every live window at the idle marker.
    /// Off by default.
    pub fn set_redraw_on_idle(&mut self, enabled: bool) {
        self.redraw_on_idle = enabled;
    }

    /// Consume the builder and instantiate a platform window bound to
    /// this loop
    pub fn create_window(&mut self, builder: WindowBuilder) -> Result<Window> {
        let config = builder.into_config();
        let init = self.backend.create_window(&config)?;
        let shared = Arc::new(WindowShared::new(
            init.id,
            &config,
            init.physical_size,
            init.scale_factor,
        ));
        self.windows.insert(init.id, shared.clone());
        info!("created window {:?}", init.id);
        Ok(Window::from_shared(shared))
    }

    /// Destroy a window explicitly. Dropping the handle has the same
    /// effect at the next dispatch cycle.
    pub fn destroy_window(&mut self, window: Window) -> Result<()> {
        let id = window.id();
        drop(window);
        self.windows
            .remove(&id)
            .ok_or(Error::WindowNotFound(id))?;
        self.backend.destroy_window(id)?;
        info!("closed window {:?}", id);
        Ok(())
    }

    /// Run the dispatch loop with a stateless callback
    pub fn run<F>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(Event) -> ControlFlow,
    {
        self.run_with(&mut (), move |_, event| callback(event))
    }

    /// Run the dispatch loop, threading caller-owned state through each
    /// dispatch unchanged.
    ///
    /// Blocks until the callback returns [`ControlFlow::Exit`]. A panic
    /// inside the callback propagates out of this call and aborts the
    /// loop. Signals still queued when the callback exits are released
    /// without being dispatched.
    pub fn run_with<T, F>(&mut self, data: &mut T, mut callback: F) -> Result<()>
    where
        F: FnMut(&mut T, Event) -> ControlFlow,
    {
        if self.state == LoopState::Terminated {
            return Err(Error::Terminated);
        }

        let mut flow = ControlFlow::Wait;
        loop {
            self.flush_windows();

            let mode = match flow {
                ControlFlow::Poll => PumpMode::Poll,
                _ => PumpMode::Wait,
            };
            let signals = self.backend.pump(mode)?;

            for signal in signals {
                let Some(event) = self.normalize(signal) else {
                    continue;
                };
                flow = self.dispatch_one(data, &mut callback, event);
                if flow == ControlFlow::Exit {
                    return Ok(());
                }
            }

            // Idle marker, only meaningful when polling
            if flow == ControlFlow::Poll {
                if self.redraw_on_idle {
                    for shared in self.windows.values() {
                        shared.queue_redraw();
                    }
                }
                flow = self.dispatch_one(data, &mut callback, Event::MainEventsCleared);
                if flow == ControlFlow::Exit {
                    return Ok(());
                }
            }
        }
    }

    /// One non-blocking pump-and-dispatch step, for embedders that own
    /// their outer loop. Returns the state the machine ended in.
    pub fn dispatch_pending<T, F>(&mut self, data: &mut T, mut callback: F) -> Result<LoopState>
    where
        F: FnMut(&mut T, Event) -> ControlFlow,
    {
        if self.state == LoopState::Terminated {
            return Err(Error::Terminated);
        }

        self.flush_windows();
        let signals = self.backend.pump(PumpMode::Poll)?;
        for signal in signals {
            let Some(event) = self.normalize(signal) else {
                continue;
            };
            if self.dispatch_one(data, &mut callback, event) == ControlFlow::Exit {
                break;
            }
        }
        Ok(self.state)
    }

    fn dispatch_one<T, F>(&mut self, data: &mut T, callback: &mut F, event: Event) -> ControlFlow
    where
        F: FnMut(&mut T, Event) -> ControlFlow,
    {
        self.state = LoopState::Dispatching;
        let flow = callback(data, event);
        self.state = if flow == ControlFlow::Exit {
            LoopState::Terminated
        } else {
            LoopState::Idle
        };
        flow
    }

    /// Update shared window state ahead of dispatch and turn the raw
    /// signal into an event. Signals for unknown windows and signals the
    /// backend could not model are dropped here.
    fn normalize(&mut self, signal: Signal) -> Option<Event> {
        if let Some(id) = signal.window() {
            let Some(shared) = self.windows.get(&id) else {
                debug!("dropping signal for unknown window {:?}", id);
                return None;
            };
            match &signal {
                Signal::Resized { width, height, .. } => {
                    shared.set_physical_size(PhysicalSize::new(*width, *height));
                }
                Signal::ScaleFactorChanged {
                    scale_factor,
                    width,
                    height,
                    ..
                } => {
                    shared.set_physical_size(PhysicalSize::new(*width, *height));
                    shared.set_scale_factor(*scale_factor);
                }
                _ => {}
            }
        }
        Event::from_signal(signal)
    }

    /// Apply queued window commands and reap dropped handles
    fn flush_windows(&mut self) {
        let ids: Vec<WindowId> = self.windows.keys().copied().collect();
        for id in ids {
            let Some(shared) = self.windows.get(&id) else {
                continue;
            };
            let commands = shared.take_commands();
            let destroyed = shared.is_destroyed();

            for command in commands {
                if let Err(err) = self.backend.apply(id, &command) {
                    warn!("could not apply {:?} to window {:?}: {}", command, id, err);
                }
            }

            if destroyed {
                if let Err(err) = self.backend.destroy_window(id) {
                    warn!("could not destroy window {:?}: {}", id, err);
                }
                self.windows.remove(&id);
                info!("closed window {:?}", id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{HeadlessBackend, SignalInjector};

    fn headless_loop() -> (EventLoop, SignalInjector) {
        let backend = HeadlessBackend::new();
        let injector = backend.injector();
        (EventLoop::headless(backend), injector)
    }

    fn window(event_loop: &mut EventLoop) -> Window {
        event_loop
            .create_window(WindowBuilder::new().with_title("test"))
            .unwrap()
    }

    #[test]
    fn test_close_requested_terminates_after_one_dispatch() {
        let (mut event_loop, injector) = headless_loop();
        let window = window(&mut event_loop);
        injector.inject(Signal::CloseRequested {
            window: window.id(),
        });

        let mut dispatches = 0u32;
        let result = event_loop.run_with(&mut dispatches, |count, event| {
            *count += 1;
            assert!(matches!(event, Event::CloseRequested { .. }));
            ControlFlow::Exit
        });

        assert!(result.is_ok());
        assert_eq!(dispatches, 1);
        assert_eq!(event_loop.state(), LoopState::Terminated);
    }

    #[test]
    fn test_wait_keeps_loop_idle_until_source_exhausts() {
        let (mut event_loop, injector) = headless_loop();
        let window = window(&mut event_loop);
        injector.inject(Signal::Resized {
            window: window.id(),
            width: 800,
            height: 600,
        });

        let mut seen = Vec::new();
        let result = event_loop.run_with(&mut seen, |seen, event| {
            seen.push(event);
            ControlFlow::Wait
        });

        // The synthetic source dried up while waiting; a real platform
        // would have blocked here instead.
        assert!(matches!(result, Err(Error::EventsExhausted)));
        assert_eq!(event_loop.state(), LoopState::Idle);
        assert_eq!(seen.len(), 1);
        assert_eq!(window.inner_size(), PhysicalSize::new(800, 600));
    }

    #[test]
    fn test_exit_releases_queued_signals_undispatched() {
        let (mut event_loop, injector) = headless_loop();
        let window = window(&mut event_loop);
        let id = window.id();
        injector.inject(Signal::CloseRequested { window: id });
        injector.inject(Signal::Resized {
            window: id,
            width: 100,
            height: 100,
        });

        let mut dispatches = 0u32;
        event_loop
            .run_with(&mut dispatches, |count, _| {
                *count += 1;
                ControlFlow::Exit
            })
            .unwrap();

        assert_eq!(dispatches, 1);
    }

    #[test]
    fn test_second_run_fails_after_termination() {
        let (mut event_loop, injector) = headless_loop();
        let window = window(&mut event_loop);
        injector.inject(Signal::CloseRequested {
            window: window.id(),
        });
        event_loop.run(|_| ControlFlow::Exit).unwrap();

        let result = event_loop.run(|_| ControlFlow::Exit);
        assert!(matches!(result, Err(Error::Terminated)));
    }

    #[test]
    fn test_scale_change_updates_window_before_dispatch() {
        let (mut event_loop, injector) = headless_loop();
        let window = event_loop
            .create_window(
                WindowBuilder::new()
                    .with_dimensions(600.0, 400.0)
                    .unwrap(),
            )
            .unwrap();
        injector.inject(Signal::ScaleFactorChanged {
            window: window.id(),
            scale_factor: 2.0,
            width: 1200,
            height: 800,
        });

        let mut observed = None;
        let _ = event_loop.run_with(&mut observed, |observed, event| {
            *observed = Some(event);
            ControlFlow::Exit
        });

        assert_eq!(
            observed,
            Some(Event::ScaleFactorChanged {
                window: window.id(),
                scale_factor: 2.0,
                size: PhysicalSize::new(1200, 800),
            })
        );
        assert_eq!(window.scale_factor(), 2.0);
        assert_eq!(window.inner_size(), PhysicalSize::new(1200, 800));
    }

    #[test]
    fn test_unknown_signals_never_reach_the_callback() {
        let (mut event_loop, injector) = headless_loop();
        let window = window(&mut event_loop);
        injector.inject(Signal::Unknown);
        injector.inject(Signal::CloseRequested {
            window: window.id(),
        });

        let mut dispatches = 0u32;
        event_loop
            .run_with(&mut dispatches, |count, _| {
                *count += 1;
                ControlFlow::Exit
            })
            .unwrap();

        assert_eq!(dispatches, 1);
    }

    #[test]
    fn test_signals_for_destroyed_windows_are_dropped() {
        let (mut event_loop, injector) = headless_loop();
        let window = window(&mut event_loop);
        let id = window.id();
        event_loop.destroy_window(window).unwrap();

        injector.inject(Signal::Resized {
            window: id,
            width: 100,
            height: 100,
        });

        let mut dispatches = 0u32;
        let state = event_loop
            .dispatch_pending(&mut dispatches, |count, _| {
                *count += 1;
                ControlFlow::Wait
            })
            .unwrap();

        assert_eq!(dispatches, 0);
        assert_eq!(state, LoopState::Idle);
    }

    #[test]
    fn test_poll_mode_emits_idle_marker() {
        let (mut event_loop, injector) = headless_loop();
        let window = window(&mut event_loop);
        injector.inject(Signal::Resized {
            window: window.id(),
            width: 640,
            height: 480,
        });

        let mut seen = Vec::new();
        event_loop
            .run_with(&mut seen, |seen, event| {
                seen.push(event.clone());
                match event {
                    Event::MainEventsCleared => ControlFlow::Exit,
                    _ => ControlFlow::Poll,
                }
            })
            .unwrap();

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], Event::MainEventsCleared);
        assert_eq!(event_loop.state(), LoopState::Terminated);
    }

    #[test]
    fn test_dropped_handle_is_reaped_on_next_cycle() {
        let (mut event_loop, injector) = headless_loop();
        let window = window(&mut event_loop);
        let id = window.id();
        drop(window);

        injector.inject(Signal::Resized {
            window: id,
            width: 100,
            height: 100,
        });

        let mut dispatches = 0u32;
        let _ = event_loop.dispatch_pending(&mut dispatches, |count, _: Event| {
            *count += 1;
            ControlFlow::Wait
        });

        // The handle was reaped before the pump, so its signal is stale
        assert_eq!(dispatches, 0);
        assert!(event_loop.windows.is_empty());
    }

    #[test]
    fn test_platform_refusal_surfaces_from_create_window() {
        let mut backend = HeadlessBackend::new();
        backend.refuse_window_creation();
        let mut event_loop = EventLoop::headless(backend);

        let result = event_loop.create_window(WindowBuilder::new());
        assert!(matches!(result, Err(Error::Platform(_))));
    }
}
