//! Chromatic aberration style channel offset.

use crate::composer::{Pass, PassContext, PassOutput, TARGET_FORMAT};
use crate::gpu_types::ShiftUniform;
use crate::pipeline;

/// Offset of the red and blue channels, in texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbShiftSettings {
    pub amount: f32,
    /// Direction of the red offset in radians, counter-clockwise from +x
    pub angle: f32,
}

impl Default for RgbShiftSettings {
    fn default() -> Self {
        Self {
            amount: 0.005,
            angle: 0.0,
        }
    }
}

impl RgbShiftSettings {
    /// Offset in top-left-origin texture space, so positive angles point up.
    pub fn uv_offset(&self) -> [f32; 2] {
        [
            self.amount * self.angle.cos(),
            -self.amount * self.angle.sin(),
        ]
    }

    pub fn uniform(&self, encode_srgb: bool) -> ShiftUniform {
        ShiftUniform {
            offset: self.uv_offset(),
            encode_srgb: u32::from(encode_srgb),
            _pad: 0,
        }
    }
}

pub struct RgbShiftPass {
    settings: RgbShiftSettings,
    layout: wgpu::BindGroupLayout,
    target_pipeline: wgpu::RenderPipeline,
    screen_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
}

impl RgbShiftPass {
    pub fn new(
        device: &wgpu::Device,
        settings: RgbShiftSettings,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = pipeline::create_rgb_shift_layout(device);
        Self {
            settings,
            target_pipeline: pipeline::create_rgb_shift_pipeline(device, &layout, TARGET_FORMAT),
            screen_pipeline: pipeline::create_rgb_shift_pipeline(device, &layout, surface_format),
            layout,
            sampler: pipeline::create_linear_sampler(
                device,
                "RGB Shift Sampler",
                wgpu::AddressMode::ClampToEdge,
            ),
            uniform_buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("RGB Shift Uniform"),
                size: std::mem::size_of::<ShiftUniform>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        }
    }
}

impl Pass for RgbShiftPass {
    fn name(&self) -> &'static str {
        "rgb-shift"
    }

    fn render(&mut self, ctx: &mut PassContext<'_>, input: &wgpu::TextureView, output: PassOutput<'_>) {
        let uniform = self
            .settings
            .uniform(output.is_screen() && ctx.manual_srgb);
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("RGB Shift Bind Group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline = if output.is_screen() {
            &self.screen_pipeline
        } else {
            &self.target_pipeline
        };
        let mut rpass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("RGB Shift Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shift_is_horizontal() {
        let settings = RgbShiftSettings::default();
        assert_eq!(settings.amount, 0.005);
        assert_eq!(settings.uv_offset(), [0.005, -0.0]);
    }

    #[test]
    fn quarter_turn_points_up_the_screen() {
        let settings = RgbShiftSettings {
            amount: 0.01,
            angle: std::f32::consts::FRAC_PI_2,
        };
        let [x, y] = settings.uv_offset();
        assert!(x.abs() < 1e-6);
        assert!((y + 0.01).abs() < 1e-6);
    }

    #[test]
    fn uniform_carries_encoding_flag() {
        let settings = RgbShiftSettings::default();
        assert_eq!(settings.uniform(true).encode_srgb, 1);
        assert_eq!(settings.uniform(false).encode_srgb, 0);
    }
}
