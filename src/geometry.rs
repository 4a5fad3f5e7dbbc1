//! Logical and physical window geometry.
//!
//! Logical sizes are independent of the display scale factor, physical
//! sizes are device pixels. The scale factor is the ratio between them.

/// Window dimensions independent of display scale factor
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert to device pixels at the given scale factor
    pub fn to_physical(&self, scale_factor: f64) -> PhysicalSize {
        PhysicalSize {
            width: (self.width * scale_factor).round() as u32,
            height: (self.height * scale_factor).round() as u32,
        }
    }
}

/// Window dimensions in device pixels
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Convert to scale-independent dimensions at the given scale factor
    pub fn to_logical(&self, scale_factor: f64) -> LogicalSize {
        LogicalSize {
            width: self.width as f64 / scale_factor,
            height: self.height as f64 / scale_factor,
        }
    }
}

/// Window position in device pixels
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PhysicalPosition {
    pub x: i32,
    pub y: i32,
}

impl PhysicalPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_to_physical_identity_scale() {
        let logical = LogicalSize::new(600.0, 400.0);
        assert_eq!(logical.to_physical(1.0), PhysicalSize::new(600, 400));
    }

    #[test]
    fn test_logical_to_physical_hidpi() {
        let logical = LogicalSize::new(600.0, 400.0);
        assert_eq!(logical.to_physical(2.0), PhysicalSize::new(1200, 800));
    }

    #[test]
    fn test_physical_to_logical_round_trip() {
        let physical = PhysicalSize::new(1200, 800);
        let logical = physical.to_logical(2.0);
        assert_eq!(logical, LogicalSize::new(600.0, 400.0));
    }

    #[test]
    fn test_fractional_scale_rounds() {
        let logical = LogicalSize::new(100.0, 100.0);
        assert_eq!(logical.to_physical(1.25), PhysicalSize::new(125, 125));
        assert_eq!(logical.to_physical(1.333), PhysicalSize::new(133, 133));
    }
}
