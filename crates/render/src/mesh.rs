//! GPU copies of a loaded model: geometry buffers, material bind groups and
//! per-primitive transforms.

use std::collections::HashMap;

use glam::Mat4;
use scene::{Material, Model};
use wgpu::util::DeviceExt;

use crate::gpu_types::{MaterialUniform, NodeUniform};
use crate::textures::GpuTexture;

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    local: Mat4,
    node_buffer: wgpu::Buffer,
    node_bind_group: wgpu::BindGroup,
    material: usize,
}

pub struct GpuModel {
    primitives: Vec<GpuPrimitive>,
    /// One bind group per model material, plus the default material last
    materials: Vec<wgpu::BindGroup>,
}

/// Layouts and sampler a model upload binds against.
pub struct ModelBindings<'a> {
    pub material_layout: &'a wgpu::BindGroupLayout,
    pub node_layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
}

/// Uploads each referenced image once per color space.
struct TextureCache<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    model: &'a Model,
    uploaded: HashMap<(usize, bool), GpuTexture>,
    white_srgb: GpuTexture,
    white_linear: GpuTexture,
}

impl<'a> TextureCache<'a> {
    fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue, model: &'a Model) -> Self {
        Self {
            device,
            queue,
            model,
            uploaded: HashMap::new(),
            white_srgb: GpuTexture::solid(
                device,
                queue,
                "White sRGB",
                [255; 4],
                wgpu::TextureFormat::Rgba8UnormSrgb,
            ),
            white_linear: GpuTexture::solid(
                device,
                queue,
                "White Linear",
                [255; 4],
                wgpu::TextureFormat::Rgba8Unorm,
            ),
        }
    }

    fn prepare(&mut self, index: Option<usize>, srgb: bool) {
        let Some(index) = index else { return };
        let model = self.model;
        let Some(image) = model.textures.get(index) else {
            tracing::warn!("Material references missing texture {}", index);
            return;
        };
        let (device, queue) = (self.device, self.queue);
        self.uploaded.entry((index, srgb)).or_insert_with(|| {
            let format = if srgb {
                wgpu::TextureFormat::Rgba8UnormSrgb
            } else {
                wgpu::TextureFormat::Rgba8Unorm
            };
            GpuTexture::from_image(device, queue, &format!("Model Texture {index}"), image, format)
        });
    }

    fn view(&self, index: Option<usize>, srgb: bool) -> &wgpu::TextureView {
        index
            .and_then(|i| self.uploaded.get(&(i, srgb)))
            .map_or_else(
                || {
                    if srgb {
                        &self.white_srgb.view
                    } else {
                        &self.white_linear.view
                    }
                },
                |texture| &texture.view,
            )
    }
}

fn material_bind_group(
    device: &wgpu::Device,
    bindings: &ModelBindings<'_>,
    cache: &mut TextureCache<'_>,
    material: &Material,
    label: &str,
) -> wgpu::BindGroup {
    cache.prepare(material.base_color_texture, true);
    cache.prepare(material.metallic_roughness_texture, false);
    cache.prepare(material.emissive_texture, true);

    let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(&MaterialUniform::from(material)),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: bindings.material_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(
                    cache.view(material.base_color_texture, true),
                ),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(
                    cache.view(material.metallic_roughness_texture, false),
                ),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(
                    cache.view(material.emissive_texture, true),
                ),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(bindings.sampler),
            },
        ],
    })
}

impl GpuModel {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        model: &Model,
        bindings: &ModelBindings<'_>,
    ) -> Self {
        let mut cache = TextureCache::new(device, queue, model);
        let mut materials: Vec<wgpu::BindGroup> = model
            .materials
            .iter()
            .enumerate()
            .map(|(i, material)| {
                material_bind_group(device, bindings, &mut cache, material, &format!("Material {i}"))
            })
            .collect();
        let default_material = materials.len();
        materials.push(material_bind_group(
            device,
            bindings,
            &mut cache,
            &Material::default(),
            "Default Material",
        ));

        let root = model.root_matrix();
        let primitives = model
            .meshes
            .iter()
            .enumerate()
            .filter(|(_, mesh)| !mesh.indices.is_empty())
            .map(|(i, mesh)| {
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Primitive {i} Vertices")),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Primitive {i} Indices")),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let node_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Primitive {i} Transform")),
                    contents: bytemuck::bytes_of(&NodeUniform::new(root * mesh.transform)),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let node_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Primitive {i} Bind Group")),
                    layout: bindings.node_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: node_buffer.as_entire_binding(),
                    }],
                });
                GpuPrimitive {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    local: mesh.transform,
                    node_buffer,
                    node_bind_group,
                    material: mesh.material.min(default_material),
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(
            "Model uploaded: {} primitives, {} materials, {} textures",
            primitives.len(),
            model.materials.len(),
            cache.uploaded.len()
        );

        Self {
            primitives,
            materials,
        }
    }

    /// Rewrite the world matrices after the model root moved.
    pub fn update_transforms(&self, queue: &wgpu::Queue, root: Mat4) {
        for primitive in &self.primitives {
            let uniform = NodeUniform::new(root * primitive.local);
            queue.write_buffer(&primitive.node_buffer, 0, bytemuck::bytes_of(&uniform));
        }
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        for primitive in &self.primitives {
            rpass.set_bind_group(1, &self.materials[primitive.material], &[]);
            rpass.set_bind_group(2, &primitive.node_bind_group, &[]);
            rpass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
            rpass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..primitive.index_count, 0, 0..1);
        }
    }
}
