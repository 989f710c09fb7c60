use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{CameraResources, Projection},
    data_structures::texture,
    driver::SceneState,
    pipelines::{
        basic::UniformResources,
        glow::{GlowPipeline, GlowUniform},
        surface::{SurfacePipeline, SurfaceUniform},
    },
};

#[derive(Debug)]
pub struct Pipelines {
    pub glow: GlowPipeline,
    pub surface: SurfacePipeline,
}

/// Material bind groups, one per shaded look in the scene.
#[derive(Debug)]
pub struct Materials {
    pub glow: UniformResources<GlowUniform>,
    pub text: UniformResources<SurfaceUniform>,
    pub number: UniformResources<SurfaceUniform>,
}

/// What to do after the surface refused to hand out a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceErrorAction {
    Reconfigured,
    SkipFrame,
    Fatal,
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub pipelines: Pipelines,
    pub materials: Materials,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, state: &SceneState) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        log::info!("Surface");
        let surface_caps = surface.get_capabilities(&adapter);
        // Shader colours go to the screen unconverted, so avoid sRGB formats.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("no supported surface formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera_config = &state.config.camera;
        let projection = Projection::new(
            config.width,
            config.height,
            cgmath::Deg(camera_config.fovy_degrees),
            camera_config.znear,
            camera_config.zfar,
        );
        let camera = CameraResources::new(&device, &state.camera, &projection);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let pipelines = Pipelines {
            glow: GlowPipeline::new(&device, &config, &camera.bind_group_layout),
            surface: SurfacePipeline::new(&device, &config, &camera.bind_group_layout),
        };
        let materials = Materials {
            glow: pipelines.glow.material(&device, state.glow),
            text: pipelines
                .surface
                .material(&device, state.text_surface, "Text Surface"),
            number: pipelines
                .surface
                .material(&device, state.number_surface, "Number Surface"),
        };

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            pipelines,
            materials,
            clear_colour: state.config.clear_colour,
        })
    }

    /// Follow a new window size.
    ///
    /// Surface and depth buffer are only rebuilt when the projection accepted
    /// the size, i.e. it is non-zero and differs from the current one.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.projection.resize(width, height) {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.configure_surface();
        true
    }

    /// (Re)apply the current surface configuration and matching depth buffer.
    pub fn configure_surface(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = texture::Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
    }

    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                self.configure_surface();
                SurfaceErrorAction::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }

    /// Copy the driver's latest camera and uniforms to the GPU.
    pub fn write_uniforms(&mut self, state: &SceneState) {
        self.camera
            .write_to_buffer(&self.queue, &state.camera, &self.projection);
        self.materials.glow.uniform = state.glow;
        self.materials.text.uniform = state.text_surface;
        self.materials.number.uniform = state.number_surface;
        for material in [&self.materials.text, &self.materials.number] {
            material.write_to_buffer(&self.queue);
        }
        self.materials.glow.write_to_buffer(&self.queue);
    }
}
