//! Everything the scene pass binds: camera and frame uniforms, the
//! environment and the uploaded model.

use bytemuck::Zeroable;
use scene::{EnvironmentMap, FrameState, Model};
use wgpu::util::DeviceExt;

use crate::gpu_types::{CameraUniform, FrameUniform};
use crate::mesh::{GpuModel, ModelBindings};
use crate::pipeline;
use crate::renderer::RendererSettings;
use crate::textures::EnvironmentTextures;

pub struct SceneResources {
    frame_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    node_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    frame_buffer: wgpu::Buffer,
    environment_sampler: wgpu::Sampler,
    material_sampler: wgpu::Sampler,
    environment: EnvironmentTextures,
    frame_bind_group: wgpu::BindGroup,
    model: Option<GpuModel>,
}

fn create_frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    camera_buffer: &wgpu::Buffer,
    frame_buffer: &wgpu::Buffer,
    environment: &EnvironmentTextures,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Scene Frame Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: frame_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&environment.reflection.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&environment.irradiance.view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

impl SceneResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let frame_layout = pipeline::create_frame_layout(device);
        let material_layout = pipeline::create_material_layout(device);
        let node_layout = pipeline::create_node_layout(device);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Buffer"),
            contents: bytemuck::bytes_of(&FrameUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let environment_sampler = pipeline::create_environment_sampler(device);
        let material_sampler =
            pipeline::create_linear_sampler(device, "Material Sampler", wgpu::AddressMode::Repeat);
        let environment = EnvironmentTextures::placeholder(device, queue);
        let frame_bind_group = create_frame_bind_group(
            device,
            &frame_layout,
            &camera_buffer,
            &frame_buffer,
            &environment,
            &environment_sampler,
        );

        Self {
            frame_layout,
            material_layout,
            node_layout,
            camera_buffer,
            frame_buffer,
            environment_sampler,
            material_sampler,
            environment,
            frame_bind_group,
            model: None,
        }
    }

    /// Bind group layouts in group order, for building the scene pipeline.
    pub fn layouts(&self) -> [&wgpu::BindGroupLayout; 3] {
        [&self.frame_layout, &self.material_layout, &self.node_layout]
    }

    /// Replace the placeholder environment with a baked one.
    pub fn set_environment(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        map: &EnvironmentMap,
    ) {
        self.environment = EnvironmentTextures::upload(device, queue, map);
        self.frame_bind_group = create_frame_bind_group(
            device,
            &self.frame_layout,
            &self.camera_buffer,
            &self.frame_buffer,
            &self.environment,
            &self.environment_sampler,
        );
    }

    pub fn set_model(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, model: &Model) {
        let bindings = ModelBindings {
            material_layout: &self.material_layout,
            node_layout: &self.node_layout,
            sampler: &self.material_sampler,
        };
        self.model = Some(GpuModel::upload(device, queue, model, &bindings));
    }

    /// Write this frame's camera, switches and model transforms.
    pub fn update(&self, queue: &wgpu::Queue, frame: &FrameState, settings: &RendererSettings) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_frame(frame)),
        );
        let uniform = FrameUniform {
            exposure: settings.exposure,
            tone_mapping: settings.tone_mapping.shader_flag(),
            has_environment: u32::from(frame.has_environment && self.environment.present),
            encode_srgb: 0,
            reflection_lod_max: self.environment.lod_max,
            _pad: [0.0; 3],
        };
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));

        if let (Some(model), Some(root)) = (&self.model, frame.model_matrix) {
            model.update_transforms(queue, root);
        }
    }

    /// Set whether the scene shader applies the sRGB transfer itself.
    pub fn set_output_encoding(&self, queue: &wgpu::Queue, encode_srgb: bool) {
        queue.write_buffer(
            &self.frame_buffer,
            FrameUniform::ENCODE_SRGB_OFFSET,
            bytemuck::bytes_of(&u32::from(encode_srgb)),
        );
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        let Some(model) = &self.model else { return };
        rpass.set_bind_group(0, &self.frame_bind_group, &[]);
        model.draw(rpass);
    }
}
