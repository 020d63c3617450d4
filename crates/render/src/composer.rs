//! Ordered post-processing chain over a pair of offscreen HDR targets.

use crate::renderer::Renderer;
use crate::resources::SceneResources;

/// Format of the intermediate targets between passes
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    pub fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Shared state handed to every pass while a frame is encoded.
pub struct PassContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub scene: &'a SceneResources,
    /// The surface needs the sRGB transfer applied in the shader
    pub manual_srgb: bool,
}

/// Where a pass writes: an intermediate target or the surface.
#[derive(Clone, Copy)]
pub enum PassOutput<'a> {
    Target(&'a wgpu::TextureView),
    Screen(&'a wgpu::TextureView),
}

impl<'a> PassOutput<'a> {
    pub fn view(&self) -> &'a wgpu::TextureView {
        match *self {
            PassOutput::Target(view) | PassOutput::Screen(view) => view,
        }
    }

    pub fn is_screen(&self) -> bool {
        matches!(self, PassOutput::Screen(_))
    }
}

pub trait Pass {
    fn name(&self) -> &'static str;

    /// Whether the read and write targets swap after this pass. A pass that
    /// does not swap renders into the read target.
    fn needs_swap(&self) -> bool {
        true
    }

    fn set_size(&mut self, _device: &wgpu::Device, _width: u32, _height: u32) {}

    fn render(&mut self, ctx: &mut PassContext<'_>, input: &wgpu::TextureView, output: PassOutput<'_>);
}

pub struct EffectComposer {
    /// `[read, write]`
    targets: [RenderTarget; 2],
    passes: Vec<Box<dyn Pass>>,
    size: (u32, u32),
}

impl EffectComposer {
    pub fn new(device: &wgpu::Device, size: (u32, u32)) -> Self {
        Self {
            targets: Self::create_targets(device, size),
            passes: Vec::new(),
            size,
        }
    }

    fn create_targets(device: &wgpu::Device, (width, height): (u32, u32)) -> [RenderTarget; 2] {
        [
            RenderTarget::new(device, "Composer Read Target", width, height),
            RenderTarget::new(device, "Composer Write Target", width, height),
        ]
    }

    pub fn add_pass(&mut self, device: &wgpu::Device, mut pass: impl Pass + 'static) {
        pass.set_size(device, self.size.0, self.size.1);
        tracing::debug!("Composer pass #{}: {}", self.passes.len(), pass.name());
        self.passes.push(Box::new(pass));
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Resize the intermediate targets and every pass to a new drawing buffer.
    pub fn set_size(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        if size == self.size {
            return;
        }
        self.size = size;
        self.targets = Self::create_targets(device, size);
        for pass in &mut self.passes {
            pass.set_size(device, size.0, size.1);
        }
    }

    /// Run every pass in order; the last one writes to the surface.
    pub fn render(
        &mut self,
        renderer: &Renderer,
        scene: &SceneResources,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = renderer.current_frame()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = renderer
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Composer Encoder"),
            });

        {
            let mut ctx = PassContext {
                device: renderer.device(),
                queue: renderer.queue(),
                encoder: &mut encoder,
                scene,
                manual_srgb: renderer.needs_manual_srgb(),
            };
            let last = self.passes.len().saturating_sub(1);
            for (i, pass) in self.passes.iter_mut().enumerate() {
                let swap = pass.needs_swap();
                let [read, write] = &self.targets;
                let output = if i == last {
                    PassOutput::Screen(&surface_view)
                } else if swap {
                    PassOutput::Target(&write.view)
                } else {
                    PassOutput::Target(&read.view)
                };
                pass.render(&mut ctx, &read.view, output);
                if swap && i != last {
                    self.targets.swap(0, 1);
                }
            }
        }

        renderer.queue().submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
