use std::mem::size_of;

use glam::{Mat4, Vec3};
use render::gpu_types::{CameraUniform, FrameUniform, MaterialUniform, NodeUniform, ShiftUniform};
use scene::{FrameState, Material, Vertex};

#[test]
fn uniform_sizes_match_wgsl_structs() {
    assert_eq!(size_of::<CameraUniform>(), 80);
    assert_eq!(size_of::<FrameUniform>(), 32);
    assert_eq!(size_of::<MaterialUniform>(), 48);
    assert_eq!(size_of::<NodeUniform>(), 128);
    assert_eq!(size_of::<ShiftUniform>(), 16);
    assert_eq!(size_of::<Vertex>(), 32);
}

#[test]
fn encode_flag_offset_points_at_field() {
    let uniform = FrameUniform {
        exposure: 1.0,
        tone_mapping: 1,
        has_environment: 1,
        encode_srgb: 7,
        reflection_lod_max: 0.0,
        _pad: [0.0; 3],
    };
    let bytes = bytemuck::bytes_of(&uniform);
    let offset = FrameUniform::ENCODE_SRGB_OFFSET as usize;
    assert_eq!(&bytes[offset..offset + 4], &7u32.to_ne_bytes());
}

#[test]
fn camera_uniform_copies_frame() {
    let frame = FrameState {
        frame: 3,
        view_proj: Mat4::from_scale(Vec3::splat(2.0)),
        camera_position: Vec3::new(0.0, 0.0, 4.0),
        model_matrix: None,
        has_environment: false,
        exposure: 1.0,
    };
    let uniform = CameraUniform::from_frame(&frame);
    assert_eq!(uniform.view_proj[0][0], 2.0);
    assert_eq!(uniform.eye, [0.0, 0.0, 4.0, 1.0]);
}

#[test]
fn normal_matrix_undoes_non_uniform_scale() {
    let uniform = NodeUniform::new(Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)));
    assert_eq!(uniform.model[0][0], 2.0);
    assert!((uniform.normal[0][0] - 0.5).abs() < 1e-6);
    assert!((uniform.normal[1][1] - 1.0).abs() < 1e-6);
}

#[test]
fn material_uniform_pads_emissive() {
    let material = Material {
        base_color_factor: [0.5, 0.5, 0.5, 1.0],
        emissive_factor: [1.0, 0.5, 0.25],
        metallic_factor: 0.25,
        roughness_factor: 0.75,
        ..Material::default()
    };
    let uniform = MaterialUniform::from(&material);
    assert_eq!(uniform.base_color, [0.5, 0.5, 0.5, 1.0]);
    assert_eq!(uniform.emissive, [1.0, 0.5, 0.25, 0.0]);
    assert_eq!((uniform.metallic, uniform.roughness), (0.25, 0.75));
}
