//! The viewer session
//!
//! One scene, one camera, one set of orbit controls and the viewport, created
//! once at startup. The event loop calls into it for every input event and
//! once per frame; the GPU side reads the resulting [`FrameState`].

use glam::{Mat4, Vec2, Vec3};
use thiserror::Error;

use crate::camera::PerspectiveCamera;
use crate::controls::{OrbitControls, PointerButton};
use crate::environment::EnvironmentMap;
use crate::model::Model;
use crate::pointer::ModelTilt;
use crate::settings::ViewerSettings;
use crate::viewport::Viewport;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("model arrived before the environment was assigned")]
    ModelBeforeEnvironment,
    #[error("a model is already attached")]
    ModelAlreadyAttached,
}

/// How far the asset sequence has progressed in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Empty,
    EnvironmentSet,
    ModelAttached,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub frame: u64,
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    /// Root transform of the loaded model, if any
    pub model_matrix: Option<Mat4>,
    pub has_environment: bool,
    pub exposure: f32,
}

pub struct ViewerSession {
    settings: ViewerSettings,
    viewport: Viewport,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    environment: Option<EnvironmentMap>,
    model: Option<Model>,
    frames: u64,
}

impl ViewerSession {
    /// Build the session for a window of `width` x `height` logical pixels.
    pub fn new(settings: ViewerSettings, width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let viewport = Viewport::new(width, height, device_pixel_ratio, settings.max_pixel_ratio);
        let aspect = if viewport.is_empty() { 1.0 } else { viewport.aspect() };
        let camera = PerspectiveCamera::new(&settings, aspect);
        let controls = OrbitControls::new(&camera, settings.damping_factor);

        tracing::info!(
            "Viewer session {}x{} @{}x, fov {} deg",
            width,
            height,
            viewport.pixel_ratio,
            settings.fov_degrees
        );

        Self {
            settings,
            viewport,
            camera,
            controls,
            environment: None,
            model: None,
            frames: 0,
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn environment(&self) -> Option<&EnvironmentMap> {
        self.environment.as_ref()
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn phase(&self) -> LoadPhase {
        match (&self.environment, &self.model) {
            (_, Some(_)) => LoadPhase::ModelAttached,
            (Some(_), None) => LoadPhase::EnvironmentSet,
            (None, None) => LoadPhase::Empty,
        }
    }

    /// Assign the scene's ambient lighting source.
    pub fn set_environment(&mut self, environment: EnvironmentMap) {
        tracing::info!(
            "Environment assigned ({} reflection mips)",
            environment.reflection_mip_count()
        );
        self.environment = Some(environment);
    }

    /// Attach the loaded model root. Only valid once, after the environment.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ModelBeforeEnvironment`] when no environment
    /// has been assigned yet, and [`SessionError::ModelAlreadyAttached`] when
    /// a model is already in the scene. The session is unchanged either way.
    pub fn attach_model(&mut self, model: Model) -> Result<&Model, SessionError> {
        match self.phase() {
            LoadPhase::Empty => Err(SessionError::ModelBeforeEnvironment),
            LoadPhase::ModelAttached => Err(SessionError::ModelAlreadyAttached),
            LoadPhase::EnvironmentSet => {
                tracing::info!(
                    "Model attached: {} primitives, {} triangles",
                    model.meshes.len(),
                    model.triangle_count()
                );
                Ok(&*self.model.insert(model))
            }
        }
    }

    /// Pointer moved to logical client coordinates.
    ///
    /// Feeds the orbit controls and, once a model is attached, overwrites its
    /// tilt. Returns the tilt that was applied, or `None` while there is no
    /// model or the viewport is empty.
    pub fn pointer_moved(&mut self, client_x: f64, client_y: f64) -> Option<ModelTilt> {
        self.controls.pointer_moved(
            Vec2::new(client_x as f32, client_y as f32),
            self.viewport.height as f32,
            &self.camera,
        );

        let model = self.model.as_mut()?;
        if self.viewport.is_empty() {
            return None;
        }
        let tilt = ModelTilt::from_pointer(client_x, client_y, &self.viewport, self.settings.tilt_range);
        model.set_tilt(tilt.yaw, tilt.pitch);
        Some(tilt)
    }

    pub fn pointer_button(&mut self, button: PointerButton, pressed: bool) {
        if pressed {
            self.controls.pointer_down(button);
        } else {
            self.controls.pointer_up(button);
        }
    }

    pub fn wheel(&mut self, steps: f32) {
        self.controls.wheel(steps);
    }

    /// Track a new window size in logical pixels.
    ///
    /// Updates the camera aspect and projection. Returns the new viewport so the
    /// caller can resize the renderer and the effect composer with it, or
    /// `None` for a zero-sized window.
    pub fn resize(&mut self, width: f64, height: f64) -> Option<Viewport> {
        let viewport = Viewport {
            width,
            height,
            pixel_ratio: self.viewport.pixel_ratio,
        };
        if viewport.is_empty() {
            return None;
        }
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
        self.camera.update_projection_matrix();
        Some(viewport)
    }

    /// Advance the controls by one frame and snapshot what should be drawn.
    pub fn tick(&mut self) -> FrameState {
        self.controls.update(&mut self.camera);
        self.frames += 1;
        FrameState {
            frame: self.frames,
            view_proj: self.camera.build_view_projection_matrix(),
            camera_position: self.camera.position,
            model_matrix: self.model.as_ref().map(Model::root_matrix),
            has_environment: self.environment.is_some(),
            exposure: self.settings.tone_mapping_exposure,
        }
    }
}
