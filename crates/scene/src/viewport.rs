//! Logical viewport and its physical drawing buffer.

/// Window size in logical pixels plus the capped device pixel ratio.
///
/// Pointer coordinates and the camera aspect use the logical size; render
/// targets use [`Viewport::drawing_buffer_size`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    /// Create a viewport, clamping the device pixel ratio to `max_pixel_ratio`.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: device_pixel_ratio.min(max_pixel_ratio),
        }
    }

    /// A minimized window reports a zero dimension; nothing can be drawn then.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// Size of the draw buffer in physical pixels, never below 1x1
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).floor().max(1.0);
        let h = (self.height * self.pixel_ratio).floor().max(1.0);
        (w as u32, h as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        let viewport = Viewport::new(800.0, 600.0, 3.0, 2.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (1600, 1200));
    }

    #[test]
    fn low_ratio_passes_through() {
        let viewport = Viewport::new(1024.0, 768.0, 1.25, 2.0);
        assert_eq!(viewport.pixel_ratio, 1.25);
        assert_eq!(viewport.drawing_buffer_size(), (1280, 960));
    }

    #[test]
    fn zero_height_is_empty() {
        assert!(Viewport::new(800.0, 0.0, 1.0, 2.0).is_empty());
        assert!(!Viewport::new(1.0, 1.0, 1.0, 2.0).is_empty());
    }
}
