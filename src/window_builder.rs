//! Window configuration accumulated before creation.

use crate::backend::WindowConfig;
use crate::error::{Error, Result};
use crate::geometry::LogicalSize;

/// Accumulates desired initial window properties and is consumed by
/// [`EventLoop::create_window`](crate::EventLoop::create_window).
///
/// Consumption is by-value, so a builder cannot be reused after the
/// window exists. An unconsumed builder is released by normal drop glue.
#[derive(Clone, Debug, Default)]
pub struct WindowBuilder {
    config: WindowConfig,
}

impl WindowBuilder {
    /// New builder with defaults: empty title, platform-defined size,
    /// visible, resizable, decorated.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.set_title(title);
        self
    }

    /// Set the requested logical size. Non-positive or non-finite
    /// dimensions are rejected.
    pub fn with_dimensions(mut self, width: f64, height: f64) -> Result<Self> {
        self.set_dimensions(width, height)?;
        Ok(self)
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.set_visible(visible);
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.set_resizable(resizable);
        self
    }

    pub fn with_decorations(mut self, decorations: bool) -> Self {
        self.set_decorations(decorations);
        self
    }

    /// In-place title setter, used by the C API
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
    }

    /// In-place dimension setter, used by the C API. On error the
    /// builder is left unmodified.
    pub fn set_dimensions(&mut self, width: f64, height: f64) -> Result<()> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "window dimensions must be positive, got {} x {}",
                width, height
            )));
        }
        self.config.logical_size = Some(LogicalSize::new(width, height));
        Ok(())
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.config.visible = visible;
    }

    pub fn set_resizable(&mut self, resizable: bool) {
        self.config.resizable = resizable;
    }

    pub fn set_decorations(&mut self, decorations: bool) {
        self.config.decorations = decorations;
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn dimensions(&self) -> Option<LogicalSize> {
        self.config.logical_size
    }

    pub(crate) fn into_config(self) -> WindowConfig {
        self.config
    }
}
