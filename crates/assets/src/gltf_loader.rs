//! glTF model import
//!
//! Loads a `.gltf`/`.glb` document and flattens its default scene into
//! [`scene::Model`]:
//! - every triangle primitive becomes a [`MeshPrimitive`] with its node's
//!   world transform baked in
//! - materials keep the metallic-roughness factors and texture slots
//! - images are converted to RGBA8, unsupported pixel formats fall back to
//!   an untextured slot

use std::path::Path;

use glam::{Mat4, Vec3};
use gltf::image::Format;
use scene::{Material, MeshPrimitive, Model, TextureImage, Vertex};

use crate::error::AssetError;

/// Import a model from the bytes of a glTF document.
///
/// External buffers and images are resolved relative to `base_dir`.
///
/// # Errors
///
/// Fails when the document, one of its buffers or one of its images cannot
/// be read, and with [`AssetError::EmptyModel`] when it holds no triangles.
pub fn load_model_from_bytes(bytes: &[u8], base_dir: Option<&Path>) -> Result<Model, AssetError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base_dir, blob)?;
    let images = gltf::import_images(&document, base_dir, &buffers)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::EmptyModel)?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        process_node(&node, Mat4::IDENTITY, &buffers, &mut meshes);
    }
    if meshes.is_empty() {
        return Err(AssetError::EmptyModel);
    }

    let materials = document.materials().map(|m| convert_material(&m)).collect();
    let textures = images.iter().map(convert_image).collect();

    let model = Model::new(scene.name().map(str::to_owned), meshes, materials, textures);
    tracing::info!(
        "Loaded glTF model: {} primitives, {} triangles, {} textures",
        model.meshes.len(),
        model.triangle_count(),
        model.textures.len()
    );
    Ok(model)
}

/// Process a glTF node and its children recursively.
fn process_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    meshes: &mut Vec<MeshPrimitive>,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!(
                    "Skipping {:?} primitive in mesh {}",
                    primitive.mode(),
                    mesh.name().unwrap_or("unnamed")
                );
                continue;
            }
            if let Some(converted) = read_primitive(&primitive, buffers, world) {
                meshes.push(converted);
            }
        }
    }

    for child in node.children() {
        process_node(&child, world, buffers, meshes);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    transform: Mat4,
) -> Option<MeshPrimitive> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect())
        .unwrap_or_default();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    if positions.is_empty() || indices.len() < 3 {
        return None;
    }
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => vertex_normals(&positions, &indices),
    };

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, position)| Vertex {
            position: *position,
            normal: normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]),
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect();

    Some(MeshPrimitive {
        vertices,
        indices,
        transform,
        material: primitive.material().index().unwrap_or(usize::MAX),
    })
}

/// Area-weighted smooth normals for primitives that ship without them
fn vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vec3::from(positions[a]),
            Vec3::from(positions[b]),
            Vec3::from(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Z).to_array())
        .collect()
}

fn convert_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    Material {
        base_color_factor: pbr.base_color_factor(),
        metallic_factor: pbr.metallic_factor(),
        roughness_factor: pbr.roughness_factor(),
        emissive_factor: material.emissive_factor(),
        base_color_texture: pbr.base_color_texture().map(|t| t.texture().source().index()),
        metallic_roughness_texture: pbr
            .metallic_roughness_texture()
            .map(|t| t.texture().source().index()),
        emissive_texture: material.emissive_texture().map(|t| t.texture().source().index()),
    }
}

fn convert_image(image: &gltf::image::Data) -> TextureImage {
    let pixels = &image.pixels;
    let rgba: Vec<u8> = match image.format {
        Format::R8G8B8A8 => pixels.clone(),
        Format::R8G8B8 => pixels.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect(),
        Format::R8G8 => pixels.chunks_exact(2).flat_map(|p| [p[0], p[1], 0, 255]).collect(),
        Format::R8 => pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            tracing::warn!("Unsupported texture format {:?}, using white", other);
            return TextureImage {
                width: 1,
                height: 1,
                rgba: vec![255; 4],
            };
        }
    };
    TextureImage {
        width: image.width,
        height: image.height,
        rgba,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_normals_face_the_winding() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = vertex_normals(&positions, &[0, 1, 2]);
        for n in normals {
            assert_eq!(n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn rgb_images_gain_opaque_alpha() {
        let data = gltf::image::Data {
            pixels: vec![1, 2, 3, 4, 5, 6],
            format: Format::R8G8B8,
            width: 2,
            height: 1,
        };
        assert_eq!(convert_image(&data).rgba, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
