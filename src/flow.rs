//! Flow control and application event loop.
//!
//! The [`App`] owns the scene state, the animation driver and (once the window
//! exists) the GPU [`Context`]. Everything runs on the winit event-loop thread;
//! async work (GPU setup on the web, the font fetch everywhere) resolves
//! elsewhere and comes back as a [`FlowEvent`].
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and the context, then starts the driver
//!    and kicks off the font future
//! 2. keyboard events update the key map
//! 3. every `RedrawRequested` schedules the next frame, ticks the driver,
//!    uploads uniforms and new meshes, and renders
//! 4. `FontLoaded` attaches the glyph meshes (or logs why it could not)
//! 5. once the driver is stopped the loop exits

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::SceneConfig,
    context::{Context, SurfaceErrorAction},
    driver::{AnimationDriver, SceneState},
    render::{render_frame, GpuScene},
    resources::font::{Font, FontSource, RemoteFont},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

const FRAME_LOG_INTERVAL: Duration = Duration::from_secs(5);

pub enum FlowEvent {
    /// The GPU context finished setting up (web only, native blocks on it).
    Initialized(anyhow::Result<Context>),
    FontLoaded(anyhow::Result<Font>),
}

impl std::fmt::Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowEvent::Initialized(ctx) => f
                .debug_tuple("Initialized")
                .field(&ctx.as_ref().map(|_| "Context"))
                .finish(),
            FlowEvent::FontLoaded(font) => f
                .debug_tuple("FontLoaded")
                .field(&font.as_ref().map(|font| &font.family_name))
                .finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    ctx: Option<Context>,
    gpu_scene: GpuScene,
    state: SceneState,
    driver: AnimationDriver,
    font_source: Option<Box<dyn FontSource>>,
    frames_since_log: u32,
    last_log: Instant,
    /// Why the loop gave up, reported by `run_with` once it returns.
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        config: SceneConfig,
        font_source: Box<dyn FontSource>,
        driver: AnimationDriver,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            ctx: None,
            gpu_scene: GpuScene::new(),
            state: SceneState::new(config),
            driver,
            font_source: Some(font_source),
            frames_since_log: 0,
            last_log: Instant::now(),
            fatal: None,
        })
    }

    /// The context is up: start animating and fetch the font.
    fn on_initialized(&mut self, ctx: Context) {
        ctx.window.request_redraw();
        self.ctx = Some(ctx);
        self.driver.start();
        self.load_font();
    }

    fn load_font(&mut self) {
        let Some(source) = self.font_source.take() else {
            return;
        };
        let future = source.load();
        let proxy = self.proxy.clone();
        let deliver = async move {
            let font = future.await;
            if proxy.send_event(FlowEvent::FontLoaded(font)).is_err() {
                log::warn!("event loop closed before the font arrived");
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(deliver);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(deliver);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        if !self.driver.is_running() {
            event_loop.exit();
            return;
        }

        ctx.window.request_redraw();
        self.driver.tick(&mut self.state);
        ctx.write_uniforms(&self.state);
        self.gpu_scene.sync(&ctx.device, &ctx.queue, &self.state.scene);

        if let Err(e) = render_frame(ctx, &self.gpu_scene) {
            match ctx.handle_surface_error(e.clone()) {
                SurfaceErrorAction::Reconfigured => log::warn!("surface reconfigured: {e}"),
                SurfaceErrorAction::SkipFrame => log::debug!("skipping frame: {e}"),
                SurfaceErrorAction::Fatal => {
                    log::error!("unable to render: {e}");
                    self.fatal = Some(anyhow::anyhow!("unable to render: {e}"));
                    self.driver.stop();
                    event_loop.exit();
                    return;
                }
            }
        }

        self.frames_since_log += 1;
        let elapsed = self.last_log.elapsed();
        if elapsed >= FRAME_LOG_INTERVAL {
            log::debug!(
                "{:.1} fps over the last {:?}",
                self.frames_since_log as f32 / elapsed.as_secs_f32(),
                elapsed
            );
            self.frames_since_log = 0;
            self.last_log = Instant::now();
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("glow-glyphs");

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;
            // winit creates the canvas and hangs it off the document body
            window_attributes = window_attributes.with_append(true);
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fatal = Some(anyhow::Error::new(e).context("could not create a window"));
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(Context::new(window, &self.state)) {
                Ok(ctx) => self.on_initialized(ctx),
                Err(e) => {
                    self.fatal = Some(e.context("cannot create the main context"));
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            // the state only lends its startup values; the context is built off-loop
            let state = SceneState::new(self.state.config.clone());
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = Context::new(window, &state).await;
                if proxy.send_event(FlowEvent::Initialized(ctx)).is_err() {
                    log::warn!("event loop closed during initialization");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        log::debug!("{event:?}");
        match event {
            FlowEvent::Initialized(Ok(ctx)) => {
                let mut ctx = ctx;
                // the canvas has its real size by now
                let size = ctx.window.inner_size();
                ctx.resize(size.width, size.height);
                self.on_initialized(ctx);
            }
            FlowEvent::Initialized(Err(e)) => {
                log::error!("App initialization failed. Cannot create the main context: {e:#}");
                self.fatal = Some(e);
                event_loop.exit();
            }
            FlowEvent::FontLoaded(font) => self.state.on_font_loaded(font),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        self.state.keys.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.driver.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(ctx) = self.ctx.as_mut() {
                    if ctx.resize(size.width, size.height) {
                        log::debug!("resized to {}x{}", size.width, size.height);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

fn init_logger() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        // only fails when a logger is already installed
        console_log::init_with_level(log::Level::Info).ok();
    }
}

/// Run the scene with its default settings, fetching the font from
/// [`crate::config::DEFAULT_FONT_URL`].
pub fn run() -> anyhow::Result<()> {
    let config = SceneConfig::default();
    let font = Box::new(RemoteFont::new(config.font_source.clone()));
    run_with(config, font, AnimationDriver::new())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

/// Run the scene with custom settings.
///
/// Take a [`AnimationDriver::stop_handle`] before passing the driver in to
/// stop the loop from elsewhere. The driver is started once the GPU context
/// exists; a stop issued before that still ends the loop on its first redraw.
pub fn run_with(
    config: SceneConfig,
    font_source: Box<dyn FontSource>,
    driver: AnimationDriver,
) -> anyhow::Result<()> {
    init_logger();

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config, font_source, driver)?;

    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
