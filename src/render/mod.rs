pub mod camera;
pub mod pick;

pub use camera::ViewerCamera;
pub use pick::{HitObject, HoverObjectChanged, PickHit, PickingService};

/// Drawable area of the window in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor: if scale_factor > 0.0 { scale_factor } else { 1.0 },
        }
    }

    /// Width in logical (device independent) pixels.
    pub fn logical_width(&self) -> f64 {
        self.width as f64 / self.scale_factor
    }

    /// Small-screen predicate used to pick the alternate camera framing.
    pub fn is_narrow(&self, max_width: f64) -> bool {
        self.logical_width() <= max_width
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;

    #[test]
    fn narrow_uses_logical_width() {
        assert!(Viewport::new(700, 900, 1.0).is_narrow(768.0));
        assert!(Viewport::new(768, 900, 1.0).is_narrow(768.0));
        assert!(!Viewport::new(1280, 720, 1.0).is_narrow(768.0));
        // 1400 physical pixels at 2x is a 700px wide logical window.
        assert!(Viewport::new(1400, 2000, 2.0).is_narrow(768.0));
    }

    #[test]
    fn invalid_scale_factor_falls_back_to_one() {
        assert_eq!(Viewport::new(100, 100, 0.0).scale_factor, 1.0);
    }
}
