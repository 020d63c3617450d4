//! Passes composed by the [`EffectComposer`](crate::composer::EffectComposer).

pub mod render_pass;
pub mod rgb_shift;

pub use render_pass::RenderPass;
pub use rgb_shift::{RgbShiftPass, RgbShiftSettings};
