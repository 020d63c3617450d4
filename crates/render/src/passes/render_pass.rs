//! Draws the scene into the composer chain.

use crate::composer::{Pass, PassContext, PassOutput, TARGET_FORMAT};
use crate::pipeline::{self, DEPTH_FORMAT};
use crate::resources::SceneResources;

pub struct RenderPass {
    target_pipeline: wgpu::RenderPipeline,
    screen_pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    clear_color: wgpu::Color,
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

impl RenderPass {
    /// `transparent` clears to zero alpha so the page behind shows through.
    pub fn new(
        device: &wgpu::Device,
        scene: &SceneResources,
        surface_format: wgpu::TextureFormat,
        transparent: bool,
    ) -> Self {
        let layouts = scene.layouts();
        Self {
            target_pipeline: pipeline::create_scene_pipeline(device, &layouts, TARGET_FORMAT),
            screen_pipeline: pipeline::create_scene_pipeline(device, &layouts, surface_format),
            depth_view: create_depth_view(device, 1, 1),
            clear_color: if transparent {
                wgpu::Color::TRANSPARENT
            } else {
                wgpu::Color::BLACK
            },
        }
    }
}

impl Pass for RenderPass {
    fn name(&self) -> &'static str {
        "render"
    }

    fn needs_swap(&self) -> bool {
        false
    }

    fn set_size(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_depth_view(device, width, height);
    }

    fn render(&mut self, ctx: &mut PassContext<'_>, _input: &wgpu::TextureView, output: PassOutput<'_>) {
        let pipeline = if output.is_screen() {
            &self.screen_pipeline
        } else {
            &self.target_pipeline
        };
        ctx.scene
            .set_output_encoding(ctx.queue, output.is_screen() && ctx.manual_srgb);

        let scene = ctx.scene;
        let mut rpass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(pipeline);
        scene.draw(&mut rpass);
    }
}
