//! Surface, device and the output settings fixed at startup.

use std::sync::Arc;

use anyhow::{Context, Result};
use scene::{ViewerSettings, Viewport};
use winit::window::Window;

/// Tone mapping operator applied at the end of the scene shader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMapping {
    None,
    AcesFilmic,
}

impl ToneMapping {
    pub fn shader_flag(self) -> u32 {
        match self {
            ToneMapping::None => 0,
            ToneMapping::AcesFilmic => 1,
        }
    }
}

/// Output configuration applied once when the renderer is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererSettings {
    /// Clear to transparent and prefer a premultiplied composite mode
    pub alpha: bool,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    /// Encode the final image as sRGB
    pub srgb_output: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            alpha: true,
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.0,
            srgb_output: true,
        }
    }
}

impl RendererSettings {
    pub fn from_viewer(settings: &ViewerSettings) -> Self {
        Self {
            exposure: settings.tone_mapping_exposure,
            ..Self::default()
        }
    }
}

/// Pick an sRGB surface format when one is offered, else the preferred one.
pub fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    srgb_output: bool,
) -> Option<wgpu::TextureFormat> {
    if srgb_output {
        if let Some(format) = formats.iter().copied().find(wgpu::TextureFormat::is_srgb) {
            return Some(format);
        }
    }
    formats.first().copied()
}

pub fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    transparent: bool,
) -> wgpu::CompositeAlphaMode {
    if transparent {
        for preferred in [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ] {
            if modes.contains(&preferred) {
                return preferred;
            }
        }
    }
    modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Opaque)
}

pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    settings: RendererSettings,
}

impl Renderer {
    /// Bind a renderer to the window. Any failure here is fatal for the viewer.
    pub async fn new(
        window: Arc<Window>,
        viewport: Viewport,
        settings: RendererSettings,
    ) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to get adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to request device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats, settings.srgb_output)
            .context("surface reports no supported formats")?;
        let (width, height) = viewport.drawing_buffer_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: choose_alpha_mode(&caps.alpha_modes, settings.alpha),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        tracing::info!(
            "Renderer on {} ({:?}): {}x{} {:?}, alpha {:?}, pixel ratio {}",
            adapter.get_info().name,
            adapter.get_info().backend,
            width,
            height,
            format,
            config.alpha_mode,
            viewport.pixel_ratio
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            settings,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Whether the last pass has to apply the sRGB transfer function itself.
    pub fn needs_manual_srgb(&self) -> bool {
        self.settings.srgb_output && !self.config.format.is_srgb()
    }

    pub fn set_size(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        let (width, height) = viewport.drawing_buffer_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        tracing::debug!("Surface resized to {}x{}", width, height);
    }

    /// Reconfigure with the current size after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn current_frame(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_srgb_format() {
        let formats = [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&formats, false),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
        assert_eq!(choose_surface_format(&[], true), None);
    }

    #[test]
    fn transparent_output_prefers_premultiplied() {
        let modes = [
            wgpu::CompositeAlphaMode::Opaque,
            wgpu::CompositeAlphaMode::PreMultiplied,
        ];
        assert_eq!(
            choose_alpha_mode(&modes, true),
            wgpu::CompositeAlphaMode::PreMultiplied
        );
        assert_eq!(choose_alpha_mode(&modes, false), wgpu::CompositeAlphaMode::Opaque);
        assert_eq!(
            choose_alpha_mode(&[wgpu::CompositeAlphaMode::Opaque], true),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn settings_follow_viewer_exposure() {
        let viewer = ViewerSettings {
            tone_mapping_exposure: 1.5,
            ..ViewerSettings::default()
        };
        let settings = RendererSettings::from_viewer(&viewer);
        assert_eq!(settings.exposure, 1.5);
        assert_eq!(settings.tone_mapping, ToneMapping::AcesFilmic);
        assert!(settings.alpha && settings.srgb_output);
    }
}
