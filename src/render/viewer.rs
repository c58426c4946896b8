use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam_channel::{self as xchan, Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wgpu::SurfaceError;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

use crate::config::Configuration;
use crate::events::{InputEvent, WheelDelta};
use crate::gallery::GalleryEngine;
use crate::layout::{ColumnLayout, LayoutElement};
use crate::render::loader::{LoaderMsg, PreparedPlaneImage, spawn_loader};
use crate::render::planes::PlaneRenderer;
use crate::scan::MediaLibrary;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.025,
    a: 1.0,
};

#[derive(Debug)]
enum ViewerEvent {
    Cancelled,
}

/// Winit reports positive `y` when the wheel moves away from the user;
/// the engine expects positive toward the end of the page.
pub fn wheel_from_winit(delta: MouseScrollDelta) -> WheelDelta {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => WheelDelta::Lines(-f64::from(y)),
        MouseScrollDelta::PixelDelta(pos) => WheelDelta::Pixels(-pos.y),
    }
}

/// Turns mouse and touch events into pointer events. Only one pointer drags
/// at a time; other touches are ignored until it lifts.
#[derive(Debug, Default)]
pub struct PointerTracker {
    /// Unknown until the first `CursorMoved`.
    cursor_y: Option<f64>,
    mouse_down: bool,
    touch: Option<u64>,
}

impl PointerTracker {
    pub fn cursor_moved(&mut self, y: f64) -> Option<InputEvent> {
        self.cursor_y = Some(y);
        self.mouse_down.then_some(InputEvent::PointerMove { y })
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) -> Option<InputEvent> {
        if button != MouseButton::Left || self.touch.is_some() {
            return None;
        }
        match (state, self.mouse_down) {
            (ElementState::Pressed, false) => {
                let y = self.cursor_y?;
                self.mouse_down = true;
                Some(InputEvent::PointerDown { y })
            }
            (ElementState::Released, true) => {
                self.mouse_down = false;
                Some(InputEvent::PointerUp)
            }
            _ => None,
        }
    }

    pub fn touch(&mut self, id: u64, phase: TouchPhase, y: f64) -> Option<InputEvent> {
        match phase {
            TouchPhase::Started if self.touch.is_none() && !self.mouse_down => {
                self.touch = Some(id);
                Some(InputEvent::PointerDown { y })
            }
            TouchPhase::Moved if self.touch == Some(id) => Some(InputEvent::PointerMove { y }),
            TouchPhase::Ended | TouchPhase::Cancelled if self.touch == Some(id) => {
                self.touch = None;
                Some(InputEvent::PointerUp)
            }
            _ => None,
        }
    }
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    planes: PlaneRenderer,
}

impl GpuState {
    fn reconfigure(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        debug!(
            width = self.config.width,
            height = self.config.height,
            "viewer surface resized",
        );
    }
}

struct ViewerApp {
    cfg: Configuration,
    cancel: CancellationToken,
    library: Option<MediaLibrary>,
    layout: ColumnLayout,
    engine: Option<GalleryEngine>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    pointer: PointerTracker,
    input_tx: Sender<InputEvent>,
    input_rx: Receiver<InputEvent>,
    loader_tx: Option<Sender<LoaderMsg>>,
    loader_rx: Option<Receiver<PreparedPlaneImage>>,
}

impl ViewerApp {
    fn new(cfg: Configuration, cancel: CancellationToken, library: Option<MediaLibrary>) -> Self {
        let layout = cfg.layout_for(library.as_ref());
        let (input_tx, input_rx) = xchan::unbounded();
        Self {
            cfg,
            cancel,
            library,
            layout,
            engine: None,
            window: None,
            gpu: None,
            pointer: PointerTracker::default(),
            input_tx,
            input_rx,
            loader_tx: None,
            loader_rx: None,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(window) = self.window.as_ref() {
            return Some(window.clone());
        }

        let mut attrs = WindowAttributes::default()
            .with_title(self.cfg.window.title.clone())
            .with_inner_size(PhysicalSize::new(self.cfg.window.width, self.cfg.window.height));
        if self.cfg.window.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.window = Some(window.clone());
                Some(window)
            }
            Err(err) => {
                error!(error = %err, "failed to create viewer window");
                None
            }
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<()> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to acquire GPU adapter")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|fmt| fmt.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no texture formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("viewer-device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .context("failed to acquire GPU device")?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "viewer surface configured",
        );

        let planes = PlaneRenderer::new(
            &device,
            &queue,
            format,
            self.layout.elements().len(),
            self.cfg.camera.distance,
        );

        self.gpu = Some(GpuState {
            surface,
            config,
            device,
            queue,
            planes,
        });
        self.start_loader();
        self.ensure_engine(size);
        Ok(())
    }

    fn start_loader(&mut self) {
        let Some(library) = self.library.as_ref() else {
            return;
        };
        let (tx_req, rx_req) = xchan::unbounded::<LoaderMsg>();
        let (tx_res, rx_res) = xchan::unbounded::<PreparedPlaneImage>();
        spawn_loader(rx_req, tx_res, self.cfg.texture_max_dim);
        for (index, entry) in library.entries().iter().enumerate() {
            if entry.element == LayoutElement::Missing {
                continue;
            }
            let _ = tx_req.send(LoaderMsg::Decode {
                index,
                path: entry.path.clone(),
            });
        }
        self.loader_tx = Some(tx_req);
        self.loader_rx = Some(rx_res);
    }

    /// The engine needs a real screen; a minimized window postpones it.
    fn ensure_engine(&mut self, size: PhysicalSize<u32>) {
        if self.engine.is_some() || size.width == 0 || size.height == 0 {
            return;
        }
        match GalleryEngine::init(
            &self.layout,
            size.width,
            size.height,
            self.cfg.gallery_settings(),
        ) {
            Ok(engine) => self.engine = Some(engine),
            Err(err) => error!(error = %err, "failed to initialize gallery"),
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.reconfigure(new_size);

        match self.engine.as_mut() {
            Some(engine) => {
                if let Err(err) = engine.on_resize(&self.layout, new_size.width, new_size.height) {
                    warn!(error = %err, "gallery resize skipped");
                }
            }
            None => self.ensure_engine(new_size),
        }
        self.request_redraw();
    }

    fn forward(&self, event: Option<InputEvent>) {
        if let Some(event) = event {
            let _ = self.input_tx.send(event);
        }
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(window)) = (self.gpu.as_mut(), self.window.as_ref()) else {
            return;
        };

        if let Some(rx) = self.loader_rx.as_ref() {
            for prepared in rx.try_iter() {
                gpu.planes.set_texture(&gpu.device, &gpu.queue, &prepared);
            }
        }

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Outdated) | Err(SurfaceError::Lost) => {
                info!("viewer surface lost; reconfiguring");
                gpu.reconfigure(window.inner_size());
                window.request_redraw();
                return;
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("viewer surface out of memory; exiting event loop");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                warn!("viewer surface acquisition timed out");
                window.request_redraw();
                return;
            }
            Err(SurfaceError::Other) => {
                warn!("viewer surface reported an unknown error; retrying");
                gpu.reconfigure(window.inner_size());
                window.request_redraw();
                return;
            }
        };

        if let Some(engine) = self.engine.as_mut() {
            engine.drain_input(&mut self.input_rx);
            engine.tick(&mut gpu.planes);
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("viewer-encoder"),
            });
        gpu.planes.render(&gpu.queue, &mut encoder, &view, CLEAR);
        gpu.queue.submit(std::iter::once(encoder.finish()));
        window.pre_present_notify();
        frame.present();

        // the wall never rests: autoplay keeps every frame moving
        window.request_redraw();
    }

    fn request_redraw(&self) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.loader_tx.take() {
            let _ = tx.send(LoaderMsg::Quit);
        }
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }

        let Some(window) = self.ensure_window(event_loop) else {
            event_loop.exit();
            return;
        };

        if self.gpu.is_none() {
            if let Err(err) = self.init_gpu(window) {
                error!(error = ?err, "failed to initialize GPU state");
                event_loop.exit();
                return;
            }
        }

        self.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("viewer window close requested");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.logical_key {
                    Key::Named(NamedKey::Escape) => event_loop.exit(),
                    Key::Character(ref c) if c.eq_ignore_ascii_case("q") => event_loop.exit(),
                    _ => {}
                }
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
            }
            WindowEvent::ScaleFactorChanged {
                mut inner_size_writer,
                ..
            } => {
                let size = window.inner_size();
                let _ = inner_size_writer.request_inner_size(size);
                self.handle_resize(size);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let event = self.pointer.cursor_moved(position.y);
                self.forward(event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.pointer.mouse_button(button, state);
                self.forward(event);
            }
            WindowEvent::Touch(Touch {
                id, phase, location, ..
            }) => {
                let event = self.pointer.touch(id, phase, location.y);
                self.forward(event);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.forward(Some(InputEvent::Wheel(wheel_from_winit(delta))));
            }
            WindowEvent::RedrawRequested => {
                self.draw(event_loop);
            }
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Cancelled => {
                info!("viewer received cancellation event");
                event_loop.exit();
            }
        }
    }
}

/// Open the gallery window and run it until it is closed or `cancel` fires.
/// Must be called on the main thread from inside a tokio runtime.
pub fn run_windowed(
    cfg: Configuration,
    library: Option<MediaLibrary>,
    cancel: CancellationToken,
) -> Result<()> {
    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build viewer event loop")?;
    let proxy = event_loop.create_proxy();

    let cancel_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            let _ = proxy.send_event(ViewerEvent::Cancelled);
        })
    };

    let mut app = ViewerApp::new(cfg, cancel, library);
    let run_result = event_loop.run_app(&mut app);
    app.shutdown();
    cancel_task.abort();

    run_result.context("viewer event loop failed")
}
