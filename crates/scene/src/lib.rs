#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::must_use_candidate
)]
//! # Viewer Scene Model
//!
//! The GPU-free half of the helmet viewer. Everything the viewer decides per
//! event or per frame lives here, so it can be exercised without a window or an
//! adapter.
//!
//! ## Key Components
//!
//! -   **Session:** [`ViewerSession`] owns the scene, the camera, the orbit
//!     controls and the viewport. All mutation goes through its methods:
//!     [`ViewerSession::set_environment`], [`ViewerSession::attach_model`],
//!     [`ViewerSession::pointer_moved`] and [`ViewerSession::resize`].
//! -   **Camera and controls:** [`PerspectiveCamera`] with a cached projection
//!     and [`OrbitControls`] with damping, both in the [`camera`] and
//!     [`controls`] modules.
//! -   **Assets:** [`Model`] holds the flattened meshes and materials of a glTF
//!     scene, [`EnvironmentMap`] the baked reflection and irradiance maps
//!     derived from an equirectangular [`HdrImage`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scene::{ViewerSession, ViewerSettings};
//!
//! let mut session = ViewerSession::new(ViewerSettings::default(), 1280.0, 720.0, 1.0);
//! session.pointer_moved(640.0, 360.0); // no model yet, ignored
//! let frame = session.tick();
//! ```

pub mod camera;
pub mod controls;
pub mod environment;
pub mod model;
pub mod pointer;
pub mod session;
pub mod settings;
pub mod viewport;

pub use camera::PerspectiveCamera;
pub use controls::{OrbitControls, PointerButton};
pub use environment::{BakeSettings, EnvironmentBaker, EnvironmentMap, EquirectLevel, HdrImage};
pub use model::{Material, MeshPrimitive, Model, TextureImage, Vertex};
pub use pointer::{normalized_pointer, ModelTilt};
pub use session::{FrameState, LoadPhase, SessionError, ViewerSession};
pub use settings::ViewerSettings;
pub use viewport::Viewport;
