//! Translation of winit input into session units.

use scene::PointerButton;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{MouseButton, MouseScrollDelta};

pub fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        _ => PointerButton::Other,
    }
}

/// Wheel steps, positive when scrolling towards the target.
pub fn wheel_steps(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
    }
}

/// Logical client coordinates of a physical cursor position.
pub fn logical_position(position: PhysicalPosition<f64>, scale_factor: f64) -> (f64, f64) {
    let logical = position.to_logical::<f64>(scale_factor);
    (logical.x, logical.y)
}

pub fn logical_size(size: PhysicalSize<u32>, scale_factor: f64) -> (f64, f64) {
    let logical = size.to_logical::<f64>(scale_factor);
    (logical.width, logical.height)
}
