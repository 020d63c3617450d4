//! Pointer position to model tilt

use glam::Vec2;

use crate::viewport::Viewport;

/// Map logical client coordinates to normalized device coordinates.
///
/// `x` runs from -1 at the left edge to 1 at the right edge, `y` from 1 at the
/// top edge to -1 at the bottom edge.
pub fn normalized_pointer(client_x: f64, client_y: f64, viewport: &Viewport) -> Vec2 {
    let x = (client_x / viewport.width) * 2.0 - 1.0;
    let y = -(client_y / viewport.height) * 2.0 + 1.0;
    Vec2::new(x as f32, y as f32)
}

/// Model rotation derived from a single pointer position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTilt {
    /// Rotation about Y in radians
    pub yaw: f32,
    /// Rotation about X in radians
    pub pitch: f32,
}

impl ModelTilt {
    pub fn from_pointer(client_x: f64, client_y: f64, viewport: &Viewport, range: f32) -> Self {
        let ndc = normalized_pointer(client_x, client_y, viewport);
        Self {
            yaw: ndc.x * range,
            pitch: -ndc.y * range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, 1.0, 2.0)
    }

    #[test]
    fn corners_map_to_unit_square() {
        let vp = viewport();
        assert_eq!(normalized_pointer(0.0, 0.0, &vp), Vec2::new(-1.0, 1.0));
        assert_eq!(normalized_pointer(800.0, 600.0, &vp), Vec2::new(1.0, -1.0));
        assert_eq!(normalized_pointer(400.0, 300.0, &vp), Vec2::ZERO);
    }

    #[test]
    fn top_left_tilts_back_and_left() {
        let tilt = ModelTilt::from_pointer(0.0, 0.0, &viewport(), FRAC_PI_4);
        assert!((tilt.yaw + FRAC_PI_4).abs() < 1e-6);
        assert!((tilt.pitch + FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn bottom_right_is_the_mirror() {
        let tilt = ModelTilt::from_pointer(800.0, 600.0, &viewport(), FRAC_PI_4);
        assert!((tilt.yaw - FRAC_PI_4).abs() < 1e-6);
        assert!((tilt.pitch - FRAC_PI_4).abs() < 1e-6);
    }
}
