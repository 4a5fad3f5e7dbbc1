//! C-callable surface over the event loop, builder and window types.
//!
//! Handles cross the boundary as opaque boxed pointers. Every entry
//! point null-checks its arguments, logs the misuse and returns an
//! error default instead of crashing. Events are flattened into a
//! single `#[repr(C)]` struct owned by Rust for the duration of the
//! callback.

use std::ffi::{c_char, c_void, CStr};

use log::{error, warn};

use crate::event::{ControlFlow, Event};
use crate::event_loop::EventLoop;
use crate::window::Window;
use crate::window_builder::WindowBuilder;

/// Discriminant of a [`CasementEvent`]
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CasementEventKind {
    CloseRequested = 0,
    Resized = 1,
    Moved = 2,
    CursorMoved = 3,
    CursorEntered = 4,
    CursorLeft = 5,
    Focused = 6,
    ScaleFactorChanged = 7,
    RedrawRequested = 8,
    Destroyed = 9,
    MainEventsCleared = 10,
}

/// Directive a C callback returns after each dispatch
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CasementControlFlow {
    Poll = 0,
    Wait = 1,
    Exit = 2,
}

impl From<CasementControlFlow> for ControlFlow {
    fn from(flow: CasementControlFlow) -> Self {
        match flow {
            CasementControlFlow::Poll => ControlFlow::Poll,
            CasementControlFlow::Wait => ControlFlow::Wait,
            CasementControlFlow::Exit => ControlFlow::Exit,
        }
    }
}

/// Flattened event record passed to C callbacks.
///
/// Only the fields relevant to `kind` are meaningful; the rest are
/// zeroed. `window_id` is 0 for [`CasementEventKind::MainEventsCleared`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CasementEvent {
    pub kind: CasementEventKind,
    pub window_id: u64,
    pub width: u32,
    pub height: u32,
    pub x: f64,
    pub y: f64,
    pub scale_factor: f64,
    pub focused: bool,
}

impl CasementEvent {
    fn empty(kind: CasementEventKind) -> Self {
        Self {
            kind,
            window_id: 0,
            width: 0,
            height: 0,
            x: 0.0,
            y: 0.0,
            scale_factor: 0.0,
            focused: false,
        }
    }
}

fn event_to_c(event: &Event) -> CasementEvent {
    let mut out = match event {
        Event::CloseRequested { .. } => CasementEvent::empty(CasementEventKind::CloseRequested),
        Event::Resized { size, .. } => {
            let mut out = CasementEvent::empty(CasementEventKind::Resized);
            out.width = size.width;
            out.height = size.height;
            out
        }
        Event::Moved { position, .. } => {
            let mut out = CasementEvent::empty(CasementEventKind::Moved);
            out.x = position.x as f64;
            out.y = position.y as f64;
            out
        }
        Event::CursorMoved { x, y, .. } => {
            let mut out = CasementEvent::empty(CasementEventKind::CursorMoved);
            out.x = *x;
            out.y = *y;
            out
        }
        Event::CursorEntered { .. } => CasementEvent::empty(CasementEventKind::CursorEntered),
        Event::CursorLeft { .. } => CasementEvent::empty(CasementEventKind::CursorLeft),
        Event::Focused { focused, .. } => {
            let mut out = CasementEvent::empty(CasementEventKind::Focused);
            out.focused = *focused;
            out
        }
        Event::ScaleFactorChanged {
            scale_factor, size, ..
        } => {
            let mut out = CasementEvent::empty(CasementEventKind::ScaleFactorChanged);
            out.scale_factor = *scale_factor;
            out.width = size.width;
            out.height = size.height;
            out
        }
        Event::RedrawRequested { .. } => CasementEvent::empty(CasementEventKind::RedrawRequested),
        Event::Destroyed { .. } => CasementEvent::empty(CasementEventKind::Destroyed),
        Event::MainEventsCleared => CasementEvent::empty(CasementEventKind::MainEventsCleared),
    };
    if let Some(id) = event.window() {
        out.window_id = id.as_u64();
    }
    out
}

/// Callback invoked once per dispatched event
pub type CasementEventCallback = extern "C" fn(*const CasementEvent) -> CasementControlFlow;

/// Callback variant threading a caller-owned pointer through dispatch
pub type CasementEventDataCallback =
    extern "C" fn(*mut c_void, *const CasementEvent) -> CasementControlFlow;

macro_rules! bail_if_null {
    ($ptr:expr, $what:literal, $ret:expr) => {
        if $ptr.is_null() {
            error!(concat!($what, " called with a null pointer"));
            return $ret;
        }
    };
    ($ptr:expr, $what:literal) => {
        if $ptr.is_null() {
            error!(concat!($what, " called with a null pointer"));
            return;
        }
    };
}

// === Event loop ===

/// Allocate the platform event loop. Returns null when no display is
/// available.
#[no_mangle]
pub extern "C" fn casement_event_loop_new() -> *mut EventLoop {
    match EventLoop::new() {
        Ok(event_loop) => Box::into_raw(Box::new(event_loop)),
        Err(err) => {
            error!("could not create event loop: {}", err);
            std::ptr::null_mut()
        }
    }
}

/// Run the dispatch loop until the callback returns
/// [`CasementControlFlow::Exit`]. Returns false on failure.
///
/// # Safety
/// `event_loop` must be a live pointer from [`casement_event_loop_new`].
#[no_mangle]
pub unsafe extern "C" fn casement_event_loop_run(
    event_loop: *mut EventLoop,
    callback: CasementEventCallback,
) -> bool {
    bail_if_null!(event_loop, "casement_event_loop_run", false);
    let event_loop = &mut *event_loop;
    let result = event_loop.run(|event| {
        let c_event = event_to_c(&event);
        callback(&c_event).into()
    });
    report("casement_event_loop_run", result)
}

/// Like [`casement_event_loop_run`], additionally passing `data` through
/// to every callback invocation unchanged.
///
/// # Safety
/// `event_loop` must be a live pointer from [`casement_event_loop_new`].
/// `data` is forwarded as-is and may be null if the callback tolerates
/// it.
#[no_mangle]
pub unsafe extern "C" fn casement_event_loop_run_with_data(
    event_loop: *mut EventLoop,
    data: *mut c_void,
    callback: CasementEventDataCallback,
) -> bool {
    bail_if_null!(event_loop, "casement_event_loop_run_with_data", false);
    let event_loop = &mut *event_loop;
    let mut data = data;
    let result = event_loop.run_with(&mut data, |data, event| {
        let c_event = event_to_c(&event);
        callback(*data, &c_event).into()
    });
    report("casement_event_loop_run_with_data", result)
}

/// Release an event loop. Windows created from it must be dropped
/// first.
///
/// # Safety
/// `event_loop` must be a pointer from [`casement_event_loop_new`], not
/// previously dropped.
#[no_mangle]
pub unsafe extern "C" fn casement_event_loop_drop(event_loop: *mut EventLoop) {
    bail_if_null!(event_loop, "casement_event_loop_drop");
    drop(Box::from_raw(event_loop));
}

// === Window builder ===

#[no_mangle]
pub extern "C" fn casement_window_builder_new() -> *mut WindowBuilder {
    Box::into_raw(Box::new(WindowBuilder::new()))
}

/// Release an unconsumed builder.
///
/// # Safety
/// `builder` must be a live pointer from [`casement_window_builder_new`].
#[no_mangle]
pub unsafe extern "C" fn casement_window_builder_drop(builder: *mut WindowBuilder) {
    bail_if_null!(builder, "casement_window_builder_drop");
    drop(Box::from_raw(builder));
}

/// # Safety
/// `builder` must be live; `title` must be a nul-terminated string.
#[no_mangle]
pub unsafe extern "C" fn casement_window_builder_with_title(
    builder: *mut WindowBuilder,
    title: *const c_char,
) {
    bail_if_null!(builder, "casement_window_builder_with_title");
    bail_if_null!(title, "casement_window_builder_with_title");
    let title = CStr::from_ptr(title).to_string_lossy().into_owned();
    (*builder).set_title(title);
}

/// Returns false and leaves the builder unmodified when the dimensions
/// are not positive and finite.
///
/// # Safety
/// `builder` must be a live pointer from [`casement_window_builder_new`].
#[no_mangle]
pub unsafe extern "C" fn casement_window_builder_with_dimensions(
    builder: *mut WindowBuilder,
    width: f64,
    height: f64,
) -> bool {
    bail_if_null!(builder, "casement_window_builder_with_dimensions", false);
    match (*builder).set_dimensions(width, height) {
        Ok(()) => true,
        Err(err) => {
            warn!("rejected window dimensions: {}", err);
            false
        }
    }
}

/// # Safety
/// `builder` must be a live pointer from [`casement_window_builder_new`].
#[no_mangle]
pub unsafe extern "C" fn casement_window_builder_with_visible(
    builder: *mut WindowBuilder,
    visible: bool,
) {
    bail_if_null!(builder, "casement_window_builder_with_visible");
    (*builder).set_visible(visible);
}

/// # Safety
/// `builder` must be a live pointer from [`casement_window_builder_new`].
#[no_mangle]
pub unsafe extern "C" fn casement_window_builder_with_resizable(
    builder: *mut WindowBuilder,
    resizable: bool,
) {
    bail_if_null!(builder, "casement_window_builder_with_resizable");
    (*builder).set_resizable(resizable);
}

/// # Safety
/// `builder` must be a live pointer from [`casement_window_builder_new`].
#[no_mangle]
pub unsafe extern "C" fn casement_window_builder_with_decorations(
    builder: *mut WindowBuilder,
    decorations: bool,
) {
    bail_if_null!(builder, "casement_window_builder_with_decorations");
    (*builder).set_decorations(decorations);
}

// === Window ===

/// Instantiate a window from a builder. The builder pointer is consumed
/// whether creation succeeds or not; returns null on failure.
///
/// # Safety
/// `event_loop` and `builder` must be live pointers from their
/// respective constructors. `builder` must not be used afterward.
#[no_mangle]
pub unsafe extern "C" fn casement_create_window(
    event_loop: *mut EventLoop,
    builder: *mut WindowBuilder,
) -> *mut Window {
    bail_if_null!(event_loop, "casement_create_window", std::ptr::null_mut());
    bail_if_null!(builder, "casement_create_window", std::ptr::null_mut());
    let builder = *Box::from_raw(builder);
    match (*event_loop).create_window(builder) {
        Ok(window) => Box::into_raw(Box::new(window)),
        Err(err) => {
            error!("could not create window: {}", err);
            std::ptr::null_mut()
        }
    }
}

/// Release a window handle, marking the surface for destruction on the
/// owning loop's next dispatch cycle.
///
/// # Safety
/// `window` must be a live pointer from [`casement_create_window`].
#[no_mangle]
pub unsafe extern "C" fn casement_window_drop(window: *mut Window) {
    bail_if_null!(window, "casement_window_drop");
    drop(Box::from_raw(window));
}

/// # Safety
/// `window` must be a live pointer from [`casement_create_window`].
#[no_mangle]
pub unsafe extern "C" fn casement_window_id(window: *const Window) -> u64 {
    bail_if_null!(window, "casement_window_id", 0);
    (*window).id().as_u64()
}

/// Write the current size in device pixels to the out parameters.
///
/// # Safety
/// All three pointers must be live and writable.
#[no_mangle]
pub unsafe extern "C" fn casement_window_inner_size(
    window: *const Window,
    width: *mut u32,
    height: *mut u32,
) {
    bail_if_null!(window, "casement_window_inner_size");
    bail_if_null!(width, "casement_window_inner_size");
    bail_if_null!(height, "casement_window_inner_size");
    let size = (*window).inner_size();
    *width = size.width;
    *height = size.height;
}

/// # Safety
/// `window` must be a live pointer from [`casement_create_window`].
#[no_mangle]
pub unsafe extern "C" fn casement_window_scale_factor(window: *const Window) -> f64 {
    bail_if_null!(window, "casement_window_scale_factor", 0.0);
    (*window).scale_factor()
}

/// # Safety
/// `window` must be live; `title` must be a nul-terminated string.
#[no_mangle]
pub unsafe extern "C" fn casement_window_set_title(window: *const Window, title: *const c_char) {
    bail_if_null!(window, "casement_window_set_title");
    bail_if_null!(title, "casement_window_set_title");
    let title = CStr::from_ptr(title).to_string_lossy().into_owned();
    (*window).set_title(title);
}

/// # Safety
/// `window` must be a live pointer from [`casement_create_window`].
#[no_mangle]
pub unsafe extern "C" fn casement_window_request_redraw(window: *const Window) {
    bail_if_null!(window, "casement_window_request_redraw");
    (*window).request_redraw();
}

// === Support ===

/// Initialize env_logger. Safe to call more than once; later calls are
/// ignored.
#[no_mangle]
pub extern "C" fn casement_init_logger() {
    let _ = env_logger::try_init();
}

#[no_mangle]
pub extern "C" fn casement_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Smoke entry point for binding checks
#[no_mangle]
pub extern "C" fn casement_test() -> bool {
    true
}

fn report(what: &str, result: crate::error::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            error!("{} failed: {}", what, err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessBackend;
    use crate::backend::Signal;
    use crate::geometry::{PhysicalPosition, PhysicalSize};
    use crate::window::WindowId;
    use std::ffi::CString;

    #[test]
    fn test_event_to_c_flattens_resize() {
        let event = Event::Resized {
            window: WindowId::new(7),
            size: PhysicalSize::new(800, 600),
        };
        let c_event = event_to_c(&event);
        assert_eq!(c_event.kind, CasementEventKind::Resized);
        assert_eq!(c_event.window_id, 7);
        assert_eq!(c_event.width, 800);
        assert_eq!(c_event.height, 600);
    }

    #[test]
    fn test_event_to_c_keeps_scale_and_size_together() {
        let event = Event::ScaleFactorChanged {
            window: WindowId::new(1),
            scale_factor: 2.0,
            size: PhysicalSize::new(1200, 800),
        };
        let c_event = event_to_c(&event);
        assert_eq!(c_event.kind, CasementEventKind::ScaleFactorChanged);
        assert_eq!(c_event.scale_factor, 2.0);
        assert_eq!(c_event.width, 1200);
        assert_eq!(c_event.height, 800);
    }

    #[test]
    fn test_event_to_c_idle_marker_has_no_window() {
        let c_event = event_to_c(&Event::MainEventsCleared);
        assert_eq!(c_event.kind, CasementEventKind::MainEventsCleared);
        assert_eq!(c_event.window_id, 0);
    }

    #[test]
    fn test_event_to_c_position_fields() {
        let c_event = event_to_c(&Event::Moved {
            window: WindowId::new(2),
            position: PhysicalPosition::new(10, -20),
        });
        assert_eq!(c_event.kind, CasementEventKind::Moved);
        assert_eq!(c_event.x, 10.0);
        assert_eq!(c_event.y, -20.0);
    }

    #[test]
    fn test_builder_null_arguments_are_rejected() {
        unsafe {
            casement_window_builder_with_title(std::ptr::null_mut(), std::ptr::null());
            assert!(!casement_window_builder_with_dimensions(
                std::ptr::null_mut(),
                600.0,
                400.0
            ));
        }
    }

    #[test]
    fn test_builder_round_trip_through_the_c_surface() {
        let builder = casement_window_builder_new();
        let title = CString::new("Hello World").unwrap();
        unsafe {
            casement_window_builder_with_title(builder, title.as_ptr());
            assert!(casement_window_builder_with_dimensions(builder, 600.0, 400.0));
            assert!(!casement_window_builder_with_dimensions(builder, -1.0, 400.0));
            assert_eq!((*builder).title(), "Hello World");
            casement_window_builder_drop(builder);
        }
    }

    extern "C" fn count_and_exit(
        data: *mut c_void,
        event: *const CasementEvent,
    ) -> CasementControlFlow {
        unsafe {
            *(data as *mut u32) += 1;
            assert_eq!((*event).kind, CasementEventKind::CloseRequested);
        }
        CasementControlFlow::Exit
    }

    #[test]
    fn test_run_with_data_threads_a_counter() {
        let mut backend = HeadlessBackend::new();
        let injector = backend.injector();
        let event_loop = Box::into_raw(Box::new(EventLoop::headless(backend)));

        let builder = casement_window_builder_new();
        let window = unsafe { casement_create_window(event_loop, builder) };
        assert!(!window.is_null());

        injector.inject(Signal::CloseRequested {
            window: WindowId::new(unsafe { casement_window_id(window) }),
        });

        let mut dispatches: u32 = 0;
        let ok = unsafe {
            casement_event_loop_run_with_data(
                event_loop,
                &mut dispatches as *mut u32 as *mut c_void,
                count_and_exit,
            )
        };
        assert!(ok);
        assert_eq!(dispatches, 1);

        unsafe {
            casement_window_drop(window);
            casement_event_loop_drop(event_loop);
        }
    }

    #[test]
    fn test_version_is_nul_terminated() {
        let version = unsafe { CStr::from_ptr(casement_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
        assert!(casement_test());
    }
}
