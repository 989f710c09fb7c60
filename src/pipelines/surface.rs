use crate::{
    config::SurfaceConfig,
    pipelines::basic::{mk_scene_pipeline, mk_uniform_layout, UniformResources},
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniform {
    pub light_position: [f32; 3],
    pub shininess: f32,
    pub viewer_position: [f32; 3],
    pub ambient_strength: f32,
    pub base_color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    pub specular_color: [f32; 3],
    _padding2: u32,
}

impl SurfaceUniform {
    pub fn new(surface: &SurfaceConfig) -> Self {
        Self {
            light_position: [0.0; 3],
            shininess: surface.shininess,
            viewer_position: [0.0; 3],
            ambient_strength: surface.ambient_strength,
            base_color: surface.base_color,
            _padding: 0,
            specular_color: surface.specular_color,
            _padding2: 0,
        }
    }

    pub fn set_light_position<V: Into<[f32; 3]>>(&mut self, position: V) {
        self.light_position = position.into();
    }

    pub fn set_viewer_position<V: Into<[f32; 3]>>(&mut self, position: V) {
        self.viewer_position = position.into();
    }
}

/// Pipeline and bind group layout shared by the text and number surfaces.
#[derive(Debug)]
pub struct SurfacePipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl SurfacePipeline {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let bind_group_layout = mk_uniform_layout(device, "surface_bind_group_layout");
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Surface Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("surface.wgsl").into()),
        };
        let render_pipeline = mk_scene_pipeline(
            device,
            config,
            camera_bind_group_layout,
            &bind_group_layout,
            "Surface",
            shader,
        );
        Self {
            render_pipeline,
            bind_group_layout,
        }
    }

    pub fn material(
        &self,
        device: &wgpu::Device,
        uniform: SurfaceUniform,
        label: &str,
    ) -> UniformResources<SurfaceUniform> {
        UniformResources::new(device, &self.bind_group_layout, uniform, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    #[test]
    fn uniform_is_four_vec4s() {
        assert_eq!(std::mem::size_of::<SurfaceUniform>(), 64);
    }

    #[test]
    fn uniform_carries_material_and_positions() {
        let config = SceneConfig::default();
        let mut uniform = SurfaceUniform::new(&config.number.surface);
        uniform.set_light_position(cgmath::Vector3::new(0.0, 0.05, 0.0));
        uniform.set_viewer_position([1.0, 0.0, 5.0]);
        assert_eq!(uniform.shininess, 64.0);
        assert_eq!(uniform.base_color, [0.0, 0.5, 0.5]);
        assert_eq!(uniform.specular_color, uniform.base_color);
        assert_eq!(uniform.light_position, [0.0, 0.05, 0.0]);
        assert_eq!(uniform.viewer_position, [1.0, 0.0, 5.0]);
    }
}
