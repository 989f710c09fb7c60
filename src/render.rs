//! Render composition and pipeline batching.
//!
//! Scene nodes are uploaded lazily into a [`GpuScene`]: a node gets its vertex,
//! index and instance buffers the first frame it is seen, and only its
//! instance buffer is rewritten afterwards. Each frame the uploaded nodes are
//! described as [`Render`] values, sorted into one batch per pipeline and
//! drawn in a single pass.
//!
//! # Key types
//!
//! - [`Render<'a>`] describes what to draw and with which pipeline
//! - [`Instanced<'a>`] is one mesh with its instance buffer and material
//!

use std::iter;

use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        model::{DrawMesh, GpuMesh},
        scene_graph::{MaterialKind, Scene, SurfaceSlot},
    },
};

/// One mesh drawn with a single instance and its material bind group.
pub struct Instanced<'a> {
    pub mesh: &'a GpuMesh,
    pub instance: &'a wgpu::Buffer,
    pub material: &'a wgpu::BindGroup,
}

/// Specifies how a scene object should be rendered.
///
/// - `None` renders nothing
/// - `Glow(Instanced)` renders with the unlit glow pipeline
/// - `Surface(Instanced)` renders with the lit surface pipeline
/// - `Composed(Vec<Render>)` recursively renders several of the above
pub enum Render<'a> {
    None,
    Glow(Instanced<'a>),
    Surface(Instanced<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(
        self,
        glows: &mut Vec<Instanced<'a>>,
        surfaces: &mut Vec<Instanced<'a>>,
    ) {
        match self {
            Render::Glow(instanced) => glows.push(instanced),
            Render::Surface(instanced) => surfaces.push(instanced),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(glows, surfaces)),
            Render::None => (),
        }
    }
}

struct GpuNode {
    mesh: GpuMesh,
    instance: wgpu::Buffer,
    material: MaterialKind,
}

/// GPU copies of the scene's nodes, in scene order.
#[derive(Default)]
pub struct GpuScene {
    nodes: Vec<GpuNode>,
}

impl GpuScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Upload nodes added since the last call and refresh every transform.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        for (id, node) in scene.iter() {
            let raw = node.instance.to_raw();
            match self.nodes.get(id.index()) {
                Some(gpu) => queue.write_buffer(&gpu.instance, 0, bytemuck::cast_slice(&[raw])),
                None => {
                    log::info!(
                        "uploading {:?}: {} triangles",
                        node.name,
                        node.geometry.triangle_count()
                    );
                    let instance = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{:?} Instance Buffer", node.name)),
                        contents: bytemuck::cast_slice(&[raw]),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    });
                    self.nodes.push(GpuNode {
                        mesh: GpuMesh::from_geometry(device, &node.name, &node.geometry),
                        instance,
                        material: node.material,
                    });
                }
            }
        }
    }

    pub fn get_render<'a>(&'a self, ctx: &'a Context) -> Render<'a> {
        Render::Composed(
            self.nodes
                .iter()
                .map(|node| match node.material {
                    MaterialKind::Glow => Render::Glow(Instanced {
                        mesh: &node.mesh,
                        instance: &node.instance,
                        material: &ctx.materials.glow.bind_group,
                    }),
                    MaterialKind::Surface(slot) => Render::Surface(Instanced {
                        mesh: &node.mesh,
                        instance: &node.instance,
                        material: match slot {
                            SurfaceSlot::Text => &ctx.materials.text.bind_group,
                            SurfaceSlot::Number => &ctx.materials.number.bind_group,
                        },
                    }),
                })
                .collect(),
        )
    }
}

fn draw_batch<'a>(
    render_pass: &mut wgpu::RenderPass<'a>,
    pipeline: &'a wgpu::RenderPipeline,
    camera_bind_group: &'a wgpu::BindGroup,
    batch: Vec<Instanced<'a>>,
) {
    if batch.is_empty() {
        return;
    }
    render_pass.set_pipeline(pipeline);
    for instanced in batch {
        if instanced.mesh.num_elements == 0 {
            log::warn!("skipping empty mesh {:?}", instanced.mesh.name);
            continue;
        }
        render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
        render_pass.draw_mesh_instanced(instanced.mesh, 0..1, camera_bind_group, instanced.material);
    }
}

/// Record and present one frame of `scene`.
pub fn render_frame(ctx: &Context, scene: &GpuScene) -> Result<(), wgpu::SurfaceError> {
    let output = ctx.surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        let mut glows = Vec::new();
        let mut surfaces = Vec::new();
        scene.get_render(ctx).set_pipelines(&mut glows, &mut surfaces);

        let camera = &ctx.camera.bind_group;
        draw_batch(&mut render_pass, &ctx.pipelines.glow.render_pipeline, camera, glows);
        draw_batch(&mut render_pass, &ctx.pipelines.surface.render_pipeline, camera, surfaces);
    }

    ctx.queue.submit(iter::once(encoder.finish()));
    output.present();
    Ok(())
}
