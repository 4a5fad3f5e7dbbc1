use thiserror::Error;

use crate::window::WindowId;

/// Errors reported by the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("window with id {0:?} not found")]
    WindowNotFound(WindowId),

    #[error("event loop already terminated")]
    Terminated,

    #[error("event source exhausted while waiting for the next signal")]
    EventsExhausted,
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, Error>;
