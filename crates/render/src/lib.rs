//! GPU side of the viewer.
//!
//! [`Renderer`] owns the surface and device. [`SceneResources`] mirrors the
//! scene (camera, environment, model) into GPU buffers and textures, and the
//! [`EffectComposer`] draws it through an ordered list of passes: the scene
//! [`RenderPass`] followed by the [`RgbShiftPass`].

pub mod composer;
pub mod gpu_types;
pub mod mesh;
pub mod passes;
pub mod pipeline;
pub mod renderer;
pub mod resources;
pub mod textures;

pub use composer::{EffectComposer, Pass, PassContext, PassOutput, TARGET_FORMAT};
pub use passes::{RenderPass, RgbShiftPass, RgbShiftSettings};
pub use renderer::{Renderer, RendererSettings, ToneMapping};
pub use resources::SceneResources;
