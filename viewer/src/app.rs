//! # Viewer Application Logic
//!
//! Creates the window, the session and the GPU side, starts the asset loader
//! thread, and drives everything from the winit event loop.
//!
//! Loader results arrive as user events through an [`EventLoopProxy`], in
//! the order the loader produced them. Each one is applied to the session
//! first and mirrored to the GPU only when the session accepted it.
//!
//! [`EventLoopProxy`]: winit::event_loop::EventLoopProxy

use std::sync::Arc;

use anyhow::{Context, Result};
use assets::{AssetLocations, LoadEvent, RemoteAssetSource};
use render::{
    EffectComposer, RenderPass, Renderer, RendererSettings, RgbShiftPass, RgbShiftSettings,
    SceneResources,
};
use scene::{BakeSettings, ViewerSession, ViewerSettings};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{EventLoopBuilder, EventLoopWindowTarget};
use winit::window::WindowBuilder;

use crate::input;

struct Viewer {
    session: ViewerSession,
    renderer: Renderer,
    scene: SceneResources,
    composer: EffectComposer,
}

impl Viewer {
    fn new(window: Arc<winit::window::Window>, settings: ViewerSettings) -> Result<Self> {
        let scale_factor = window.scale_factor();
        let (width, height) = input::logical_size(window.inner_size(), scale_factor);
        let session = ViewerSession::new(settings, width, height, scale_factor);

        let renderer = pollster::block_on(Renderer::new(
            window,
            session.viewport(),
            RendererSettings::from_viewer(session.settings()),
        ))?;
        let device = renderer.device();
        let scene = SceneResources::new(device, renderer.queue());

        let mut composer = EffectComposer::new(device, renderer.drawing_buffer_size());
        composer.add_pass(
            device,
            RenderPass::new(
                device,
                &scene,
                renderer.surface_format(),
                renderer.settings().alpha,
            ),
        );
        composer.add_pass(
            device,
            RgbShiftPass::new(device, RgbShiftSettings::default(), renderer.surface_format()),
        );
        tracing::info!("Composer passes: {:?}", composer.pass_names());

        Ok(Self {
            session,
            renderer,
            scene,
            composer,
        })
    }

    fn apply_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::EnvironmentReady(environment) => {
                self.scene
                    .set_environment(self.renderer.device(), self.renderer.queue(), &environment);
                self.session.set_environment(environment);
            }
            LoadEvent::ModelReady(model) => match self.session.attach_model(model) {
                Ok(model) => {
                    self.scene
                        .set_model(self.renderer.device(), self.renderer.queue(), model);
                }
                Err(e) => tracing::warn!("Discarding loaded model: {e}"),
            },
            LoadEvent::Failed(e) => {
                tracing::warn!("Continuing without the failed asset: {e}");
            }
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (width, height) = input::logical_size(size, self.renderer.window().scale_factor());
        if let Some(viewport) = self.session.resize(width, height) {
            self.renderer.set_size(viewport);
            self.composer
                .set_size(self.renderer.device(), self.renderer.drawing_buffer_size());
        }
    }

    fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        let (x, y) = input::logical_position(position, self.renderer.window().scale_factor());
        if let Some(tilt) = self.session.pointer_moved(x, y) {
            tracing::trace!("Model tilt yaw {:.3} pitch {:.3}", tilt.yaw, tilt.pitch);
        }
    }

    fn redraw(&mut self, elwt: &EventLoopWindowTarget<LoadEvent>) {
        if self.session.viewport().is_empty() {
            return;
        }
        let frame = self.session.tick();
        self.scene
            .update(self.renderer.queue(), &frame, self.renderer.settings());
        match self.composer.render(&self.renderer, &self.scene) {
            Ok(()) => {}
            // Reconfigure the surface if lost
            Err(wgpu::SurfaceError::Lost) => self.renderer.reconfigure(),
            // The system is out of memory, we should probably quit
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("Surface out of memory, exiting");
                elwt.exit();
            }
            // All other errors (Outdated, Timeout) should be resolved by the next frame
            Err(e) => tracing::warn!("Frame {} skipped: {e:?}", frame.frame),
        }
    }
}

/// Run the viewer until the window is closed.
///
/// # Errors
///
/// Returns an error when the window, the GPU device or the loader thread
/// cannot be created. Asset failures are logged and never end the program.
pub fn run(locations: AssetLocations) -> Result<()> {
    let event_loop = EventLoopBuilder::<LoadEvent>::with_user_event()
        .build()
        .context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("HDR Viewer")
            .with_transparent(true)
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut viewer = Viewer::new(window, ViewerSettings::default())?;

    tracing::info!(
        "Loading environment from {} then model from {}",
        locations.hdr_url,
        locations.model_path.display()
    );
    let source = RemoteAssetSource::new(locations).context("failed to create asset source")?;
    let proxy = event_loop.create_proxy();
    let _loader = assets::spawn_loader(source, BakeSettings::default(), move |event| {
        if proxy.send_event(event).is_err() {
            tracing::debug!("Event loop closed before the asset was delivered");
        }
    })
    .context("failed to start asset loader")?;

    event_loop.run(move |event, elwt| match event {
        Event::UserEvent(load) => viewer.apply_load_event(load),
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == viewer.renderer.window().id() => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(physical_size) => viewer.resize(*physical_size),
            WindowEvent::CursorMoved { position, .. } => viewer.pointer_moved(*position),
            WindowEvent::MouseInput { state, button, .. } => viewer.session.pointer_button(
                input::pointer_button(*button),
                *state == ElementState::Pressed,
            ),
            WindowEvent::MouseWheel { delta, .. } => {
                viewer.session.wheel(input::wheel_steps(*delta));
            }
            WindowEvent::RedrawRequested => viewer.redraw(elwt),
            _ => {}
        },
        Event::AboutToWait => viewer.renderer.window().request_redraw(),
        _ => {}
    })?;
    Ok(())
}
