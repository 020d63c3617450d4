//! Perspective camera
//!
//! The projection matrix is cached and only refreshed by
//! [`PerspectiveCamera::update_projection_matrix`], so callers that change the
//! aspect ratio must refresh it explicitly.

use glam::{Mat4, Vec3};

use crate::settings::ViewerSettings;

/// Perspective camera looking at a target point
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera is looking at
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Render target aspect ratio
    pub aspect: f32,
    /// Vertical field of view in radians
    pub fovy: f32,
    /// Near clipping plane distance
    pub znear: f32,
    /// Far clipping plane distance
    pub zfar: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(settings: &ViewerSettings, aspect: f32) -> Self {
        let mut camera = Self {
            position: settings.camera_position,
            target: settings.target,
            up: Vec3::Y,
            aspect,
            fovy: settings.fov_degrees.to_radians(),
            znear: settings.near,
            zfar: settings.far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the cached projection from `fovy`, `aspect` and the clip planes.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Computes a view projection matrix from the camera parameters
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_stale_until_refreshed() {
        let mut camera = PerspectiveCamera::new(&ViewerSettings::default(), 1.0);
        let before = camera.projection_matrix();

        camera.aspect = 2.0;
        assert_eq!(camera.projection_matrix(), before);

        camera.update_projection_matrix();
        assert_ne!(camera.projection_matrix(), before);
        // x scale halves when the aspect doubles
        let ratio = before.x_axis.x / camera.projection_matrix().x_axis.x;
        assert!((ratio - 2.0).abs() < 1e-5);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let camera = PerspectiveCamera::new(&ViewerSettings::default(), 16.0 / 9.0);
        let clip = camera.build_view_projection_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
