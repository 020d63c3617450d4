//! CPU-side model data
//!
//! A glTF scene flattened into drawable primitives. Node hierarchy transforms
//! are baked into [`MeshPrimitive::transform`]; the only transform that changes
//! at runtime is the root rotation.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Interleaved vertex as uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// RGBA8 texture decoded from the model
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// glTF metallic-roughness material
///
/// Texture fields index into [`Model::textures`].
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub base_color_factor: [f32; 4],
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub emissive_factor: [f32; 3],
    pub base_color_texture: Option<usize>,
    pub metallic_roughness_texture: Option<usize>,
    pub emissive_texture: Option<usize>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            emissive_factor: [0.0; 3],
            base_color_texture: None,
            metallic_roughness_texture: None,
            emissive_texture: None,
        }
    }
}

/// Indexed triangle list with its transform relative to the model root
#[derive(Debug, Clone)]
pub struct MeshPrimitive {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub transform: Mat4,
    pub material: usize,
}

/// Root node of a loaded model
#[derive(Debug, Clone)]
pub struct Model {
    pub name: Option<String>,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vec3,
    pub meshes: Vec<MeshPrimitive>,
    pub materials: Vec<Material>,
    pub textures: Vec<TextureImage>,
}

impl Model {
    pub fn new(
        name: Option<String>,
        meshes: Vec<MeshPrimitive>,
        materials: Vec<Material>,
        textures: Vec<TextureImage>,
    ) -> Self {
        Self {
            name,
            rotation: Vec3::ZERO,
            meshes,
            materials,
            textures,
        }
    }

    /// Overwrite yaw (Y) and pitch (X); roll is left alone.
    pub fn set_tilt(&mut self, yaw: f32, pitch: f32) {
        self.rotation.x = pitch;
        self.rotation.y = yaw;
    }

    pub fn root_matrix(&self) -> Mat4 {
        Mat4::from_quat(Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        ))
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn yaw_turns_forward_towards_plus_x() {
        let mut model = Model::new(None, Vec::new(), Vec::new(), Vec::new());
        model.set_tilt(FRAC_PI_2, 0.0);
        let forward = model.root_matrix().transform_vector3(Vec3::Z);
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn triangle_count_follows_indices() {
        let model = Model::new(
            None,
            vec![MeshPrimitive {
                vertices: Vec::new(),
                indices: vec![0, 1, 2],
                transform: Mat4::IDENTITY,
                material: 7,
            }],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(model.triangle_count(), 1);
    }
}
