//! Render views
//!
//! A view is a viewport rectangle onto the scene with its own clear color
//! and shadowing switch. Which camera it looks through is decided by the
//! scene's active camera at draw time.

use crate::config::ViewConfig;
use crate::foundation::math::Vec4;
use slotmap::new_key_type;

new_key_type! {
    /// Opaque handle of a view in the scene's view table
    pub struct ViewHandle;
}

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Width / height, or 1.0 for a degenerate viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// View onto the scene
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// Viewport rectangle
    pub viewport: Viewport,
    /// RGBA clear color
    pub clear_color: Vec4,
    /// Whether shadow passes run
    pub shadowing: bool,
}

impl View {
    /// View covering `viewport` with configured defaults
    pub fn new(viewport: Viewport, config: &ViewConfig) -> Self {
        Self {
            viewport,
            clear_color: Vec4::from(config.clear_color),
            shadowing: config.shadowing,
        }
    }

    /// Resize the viewport
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_defaults_from_config() {
        let config = ViewConfig {
            clear_color: [0.1, 0.2, 0.3, 1.0],
            shadowing: false,
        };
        let view = View::new(Viewport::new(0, 0, 640, 480), &config);
        assert_eq!(view.clear_color, Vec4::new(0.1, 0.2, 0.3, 1.0));
        assert!(!view.shadowing);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(Viewport::new(0, 0, 800, 400).aspect_ratio(), 2.0);
        assert_eq!(Viewport::new(0, 0, 800, 0).aspect_ratio(), 1.0);
    }
}
