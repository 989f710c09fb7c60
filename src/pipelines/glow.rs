use crate::pipelines::basic::{mk_scene_pipeline, mk_uniform_layout, UniformResources};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlowUniform {
    pub glow_intensity: [f32; 3],
    _padding: u32,
}

impl GlowUniform {
    pub fn new(glow_intensity: [f32; 3]) -> Self {
        Self {
            glow_intensity,
            _padding: 0,
        }
    }
}

#[derive(Debug)]
pub struct GlowPipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl GlowPipeline {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let bind_group_layout = mk_uniform_layout(device, "glow_bind_group_layout");
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Glow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("glow.wgsl").into()),
        };
        let render_pipeline = mk_scene_pipeline(
            device,
            config,
            camera_bind_group_layout,
            &bind_group_layout,
            "Glow",
            shader,
        );
        Self {
            render_pipeline,
            bind_group_layout,
        }
    }

    pub fn material(&self, device: &wgpu::Device, uniform: GlowUniform) -> UniformResources<GlowUniform> {
        UniformResources::new(device, &self.bind_group_layout, uniform, "Glow")
    }
}
