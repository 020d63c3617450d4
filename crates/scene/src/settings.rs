//! Fixed tunables of the viewer.

use std::f32::consts::FRAC_PI_4;

use glam::Vec3;

/// Camera, renderer and input constants applied once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial camera position, looking at [`ViewerSettings::target`]
    pub camera_position: Vec3,
    pub target: Vec3,
    /// Upper bound for the device pixel ratio
    pub max_pixel_ratio: f64,
    pub tone_mapping_exposure: f32,
    /// Fraction of the pending orbit motion applied per frame
    pub damping_factor: f32,
    /// Model tilt at the viewport edge, in radians
    pub tilt_range: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 40.0,
            near: 0.1,
            far: 100.0,
            camera_position: Vec3::new(0.0, 0.0, 4.0),
            target: Vec3::ZERO,
            max_pixel_ratio: 2.0,
            tone_mapping_exposure: 1.0,
            damping_factor: 0.05,
            tilt_range: FRAC_PI_4,
        }
    }
}
