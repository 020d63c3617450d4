//! GPU-compatible type definitions for rendering
//!
//! This module contains the uniform structures passed to the WGSL shaders.
//! All types must be Pod and match the std140-style layout the shaders expect.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use scene::{FrameState, Material, Vertex};

/// Per-frame camera data shared by every draw in the scene pass
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view projection matrix used for rendering
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world coordinates
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub fn from_frame(frame: &FrameState) -> Self {
        Self {
            view_proj: frame.view_proj.to_cols_array_2d(),
            eye: frame.camera_position.extend(1.0).to_array(),
        }
    }
}

/// Tone mapping and environment switches read by the scene fragment shader
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub exposure: f32,
    /// 0 = none, 1 = ACES filmic
    pub tone_mapping: u32,
    pub has_environment: u32,
    pub encode_srgb: u32,
    /// Highest mip level of the reflection texture
    pub reflection_lod_max: f32,
    pub _pad: [f32; 3],
}

impl FrameUniform {
    /// Byte offset of `encode_srgb`, rewritten when the scene pass changes output.
    pub const ENCODE_SRGB_OFFSET: u64 = 12;
}

/// World and normal matrices for one mesh primitive
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl NodeUniform {
    pub fn new(world: Mat4) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal: world.inverse().transpose().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub emissive: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub _pad: [f32; 2],
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        Self {
            base_color: material.base_color_factor,
            emissive: [
                material.emissive_factor[0],
                material.emissive_factor[1],
                material.emissive_factor[2],
                0.0,
            ],
            metallic: material.metallic_factor,
            roughness: material.roughness_factor,
            _pad: [0.0; 2],
        }
    }
}

/// Parameters of the RGB shift post pass
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ShiftUniform {
    /// Offset in texture coordinates, applied `+` to red and `-` to blue
    pub offset: [f32; 2],
    pub encode_srgb: u32,
    pub _pad: u32,
}

/// Vertex buffer layout matching `scene::Vertex`
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}
