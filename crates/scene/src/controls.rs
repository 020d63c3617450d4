//! Orbit controls with damping
//!
//! Input handlers only accumulate pending motion. [`OrbitControls::update`]
//! applies a damped share of it to the camera once per frame, which is what
//! gives the camera its inertia after the pointer is released.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::PerspectiveCamera;

const EPS: f32 = 1e-6;

/// Mouse buttons the controls care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Rotate,
    Pan,
}

/// Azimuth (`theta`, around +Y) and polar angle (`phi`, from +Y)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

/// Camera orbit around a target point
pub struct OrbitControls {
    /// Point the camera orbits around and looks at
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    drag: DragState,
    last_pointer: Option<Vec2>,
    spherical_delta: SphericalDelta,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    /// Create controls orbiting the camera's current target
    pub fn new(camera: &PerspectiveCamera, damping_factor: f32) -> Self {
        Self {
            target: camera.target,
            enable_damping: true,
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            drag: DragState::Idle,
            last_pointer: None,
            spherical_delta: SphericalDelta::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    /// Start a drag; the primary button rotates, the secondary button pans.
    pub fn pointer_down(&mut self, button: PointerButton) {
        self.drag = match button {
            PointerButton::Primary => DragState::Rotate,
            PointerButton::Secondary => DragState::Pan,
            PointerButton::Other => self.drag,
        };
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        let released = match button {
            PointerButton::Primary => self.drag == DragState::Rotate,
            PointerButton::Secondary => self.drag == DragState::Pan,
            PointerButton::Other => false,
        };
        if released {
            self.drag = DragState::Idle;
        }
    }

    /// Feed a pointer position in logical pixels.
    ///
    /// The pointer is tracked even when no button is held so the first drag
    /// delta is measured from the real last position.
    pub fn pointer_moved(&mut self, position: Vec2, viewport_height: f32, camera: &PerspectiveCamera) {
        let delta = self.last_pointer.map_or(Vec2::ZERO, |last| position - last);
        self.last_pointer = Some(position);
        if viewport_height <= 0.0 {
            return;
        }

        match self.drag {
            DragState::Idle => {}
            DragState::Rotate => {
                self.rotate_left(TAU * delta.x / viewport_height * self.rotate_speed);
                self.rotate_up(TAU * delta.y / viewport_height * self.rotate_speed);
            }
            DragState::Pan => self.pan(delta * self.pan_speed, viewport_height, camera),
        }
    }

    /// Wheel input; positive steps move the camera closer to the target.
    pub fn wheel(&mut self, steps: f32) {
        let zoom_scale = 0.95_f32.powf(self.zoom_speed);
        if steps > 0.0 {
            self.scale *= zoom_scale;
        } else if steps < 0.0 {
            self.scale /= zoom_scale;
        }
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Screen-space pan scaled so the target tracks the pointer
    fn pan(&mut self, delta: Vec2, viewport_height: f32, camera: &PerspectiveCamera) {
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fovy / 2.0).tan();

        let forward = (self.target - camera.position).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);

        let left = -right * (2.0 * delta.x * target_distance / viewport_height);
        let upward = up * (2.0 * delta.y * target_distance / viewport_height);
        self.pan_offset += left + upward;
    }

    /// Apply pending motion to `camera`. Returns `true` when the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        let share = if self.enable_damping { self.damping_factor } else { 1.0 };
        theta += self.spherical_delta.theta * share;
        phi += self.spherical_delta.phi * share;

        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * share;

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        let previous = camera.position;
        camera.position = self.target + new_offset;
        camera.target = self.target;

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = SphericalDelta::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        previous.distance_squared(camera.position) > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ViewerSettings;

    fn setup() -> (PerspectiveCamera, OrbitControls) {
        let settings = ViewerSettings::default();
        let camera = PerspectiveCamera::new(&settings, 1.0);
        let controls = OrbitControls::new(&camera, settings.damping_factor);
        (camera, controls)
    }

    #[test]
    fn idle_update_keeps_camera_in_place() {
        let (mut camera, mut controls) = setup();
        let start = camera.position;
        assert!(!controls.update(&mut camera));
        assert!(camera.position.distance(start) < 1e-5);
    }

    #[test]
    fn drag_rotation_keeps_distance_and_coasts() {
        let (mut camera, mut controls) = setup();
        controls.pointer_moved(Vec2::new(100.0, 100.0), 600.0, &camera);
        controls.pointer_down(PointerButton::Primary);
        controls.pointer_moved(Vec2::new(160.0, 100.0), 600.0, &camera);
        controls.pointer_up(PointerButton::Primary);

        let mut moved_frames = 0;
        let mut last_step = f32::MAX;
        for _ in 0..200 {
            let before = camera.position;
            if controls.update(&mut camera) {
                moved_frames += 1;
            }
            let step = before.distance(camera.position);
            assert!(step <= last_step + 1e-6, "damped motion must not speed up");
            last_step = step;
            assert!((camera.position.length() - 4.0).abs() < 1e-4);
        }

        assert!(moved_frames > 10, "damping should spread motion over frames");
        assert!(last_step < 1e-4, "motion should decay, last step {last_step}");
        // dragging right orbits the camera towards -x
        assert!(camera.position.x < 0.0);
    }

    #[test]
    fn wheel_moves_closer() {
        let (mut camera, mut controls) = setup();
        controls.wheel(1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 4.0 * 0.95).abs() < 1e-4);

        controls.wheel(-1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_reaches_the_pole() {
        let (mut camera, mut controls) = setup();
        controls.enable_damping = false;
        controls.pointer_moved(Vec2::ZERO, 100.0, &camera);
        controls.pointer_down(PointerButton::Primary);
        controls.pointer_moved(Vec2::new(0.0, 1000.0), 100.0, &camera);
        controls.update(&mut camera);

        let offset = camera.position - controls.target;
        assert!(offset.is_finite());
        assert!((offset.length() - 4.0).abs() < 1e-4);
        assert!(offset.y > 3.99, "camera should sit just off the top pole");
    }

    #[test]
    fn hover_without_button_does_nothing() {
        let (mut camera, mut controls) = setup();
        controls.pointer_moved(Vec2::new(10.0, 10.0), 600.0, &camera);
        controls.pointer_moved(Vec2::new(300.0, 200.0), 600.0, &camera);
        assert!(!controls.update(&mut camera));
    }
}
