//! Texture uploads for material images and the baked environment.

use scene::{EnvironmentMap, EquirectLevel, TextureImage};

pub const ENVIRONMENT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    fn create(
        device: &wgpu::Device,
        label: &str,
        size: (u32, u32),
        mip_level_count: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    fn write_level(
        &self,
        queue: &wgpu::Queue,
        mip_level: u32,
        size: (u32, u32),
        bytes_per_texel: u32,
        data: &[u8],
    ) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size.0 * bytes_per_texel),
                rows_per_image: Some(size.1),
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// 1x1 texture of a single color, used where a material has no image.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        rgba: [u8; 4],
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = Self::create(device, label, (1, 1), 1, format);
        texture.write_level(queue, 0, (1, 1), 4, &rgba);
        texture
    }

    /// Upload an RGBA8 image; falls back to white when the pixel buffer does
    /// not match the declared size.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &TextureImage,
        format: wgpu::TextureFormat,
    ) -> Self {
        let expected = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.rgba.len() != expected {
            tracing::warn!(
                "{}: {}x{} image has {} bytes, using white",
                label,
                image.width,
                image.height,
                image.rgba.len()
            );
            return Self::solid(device, queue, label, [255; 4], format);
        }
        let texture = Self::create(device, label, (image.width, image.height), 1, format);
        texture.write_level(queue, 0, (image.width, image.height), 4, &image.rgba);
        texture
    }

    /// Upload a chain of equirect levels as the mips of one float texture.
    pub fn from_equirect_levels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        levels: &[EquirectLevel],
    ) -> Self {
        let Some(base) = levels.first() else {
            return Self::from_texels(device, queue, label, &[[0.0; 4]], (1, 1));
        };
        let texture = Self::create(
            device,
            label,
            (base.width, base.height),
            levels.len() as u32,
            ENVIRONMENT_FORMAT,
        );
        for (mip, level) in levels.iter().enumerate() {
            texture.write_level(
                queue,
                mip as u32,
                (level.width, level.height),
                16,
                bytemuck::cast_slice(&level.texels),
            );
        }
        texture
    }

    fn from_texels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        texels: &[[f32; 4]],
        size: (u32, u32),
    ) -> Self {
        let texture = Self::create(device, label, size, 1, ENVIRONMENT_FORMAT);
        texture.write_level(queue, 0, size, 16, bytemuck::cast_slice(texels));
        texture
    }
}

/// GPU side of the scene environment: the reflection mip chain and the
/// irradiance map, or black placeholders before an environment is assigned.
pub struct EnvironmentTextures {
    pub reflection: GpuTexture,
    pub irradiance: GpuTexture,
    /// Highest sampled reflection mip
    pub lod_max: f32,
    pub present: bool,
}

impl EnvironmentTextures {
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            reflection: GpuTexture::from_texels(device, queue, "Reflection Placeholder", &[[0.0; 4]], (1, 1)),
            irradiance: GpuTexture::from_texels(device, queue, "Irradiance Placeholder", &[[0.0; 4]], (1, 1)),
            lod_max: 0.0,
            present: false,
        }
    }

    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, map: &EnvironmentMap) -> Self {
        let reflection =
            GpuTexture::from_equirect_levels(device, queue, "Environment Reflection", &map.reflection);
        let irradiance = GpuTexture::from_equirect_levels(
            device,
            queue,
            "Environment Irradiance",
            std::slice::from_ref(&map.irradiance),
        );
        let bytes: usize = map.reflection.iter().map(EquirectLevel::byte_len).sum::<usize>()
            + map.irradiance.byte_len();
        tracing::info!(
            "Environment uploaded: {} reflection mips, {} KiB",
            map.reflection_mip_count(),
            bytes / 1024
        );
        Self {
            reflection,
            irradiance,
            lod_max: map.reflection_mip_count().saturating_sub(1) as f32,
            present: true,
        }
    }
}
