//! Per-frame animation driver.
//!
//! All mutable scene state lives in [`SceneState`]; the [`AnimationDriver`]
//! advances it once per redraw. Nothing here touches the GPU, the window
//! code uploads whatever the driver left behind.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use cgmath::Vector3;

use crate::{
    camera::Camera,
    config::{GlyphConfig, SceneConfig},
    data_structures::{
        model::Geometry,
        scene_graph::{MaterialKind, NodeId, Scene, SceneNode, SurfaceSlot},
    },
    input::KeyStates,
    pipelines::{glow::GlowUniform, surface::SurfaceUniform},
    resources::{
        font::Font,
        text::{text_geometry, TextOptions},
    },
};

pub struct SceneState {
    pub config: SceneConfig,
    pub scene: Scene,
    pub camera: Camera,
    pub keys: KeyStates,
    pub cube: NodeId,
    /// Text and number nodes, once the font has arrived.
    pub glyphs: Option<(NodeId, NodeId)>,
    pub text_surface: SurfaceUniform,
    pub number_surface: SurfaceUniform,
    pub glow: GlowUniform,
}

fn glyph_node(
    font: &Font,
    glyph: &GlyphConfig,
    options: TextOptions,
    slot: SurfaceSlot,
) -> anyhow::Result<SceneNode> {
    let geometry = text_geometry(font, &glyph.text, options)?;
    Ok(
        SceneNode::new(glyph.text.clone(), geometry, MaterialKind::Surface(slot))
            .at(glyph.position.into()),
    )
}

impl SceneState {
    /// Startup scene: just the glowing cube at the origin.
    pub fn new(config: SceneConfig) -> Self {
        let mut scene = Scene::new();
        let size = config.cube_size;
        let cube = scene.add(SceneNode::new(
            "cube",
            Geometry::cuboid(size, size, size),
            MaterialKind::Glow,
        ));

        let mut state = Self {
            camera: Camera::new(config.camera.position),
            text_surface: SurfaceUniform::new(&config.text.surface),
            number_surface: SurfaceUniform::new(&config.number.surface),
            glow: GlowUniform::new(config.glow_intensity),
            keys: KeyStates::new(),
            glyphs: None,
            scene,
            cube,
            config,
        };
        state.sync_uniforms();
        state
    }

    pub fn cube_position(&self) -> Vector3<f32> {
        self.scene
            .get(self.cube)
            .map(|node| node.instance.position)
            .unwrap_or(Vector3::new(0.0, 0.0, 0.0))
    }

    fn text_options(&self) -> TextOptions {
        TextOptions {
            size: self.config.text_size,
            depth: self.config.text_depth,
            curve_segments: self.config.curve_segments,
        }
    }

    /// Build the text and number meshes from `font` and add them to the scene.
    ///
    /// Both meshes are built before either is added, so a failure leaves the
    /// scene as it was. Calling this again once the glyphs exist does nothing.
    pub fn attach_glyphs(&mut self, font: &Font) -> anyhow::Result<()> {
        if self.glyphs.is_some() {
            log::warn!("glyphs already attached, ignoring font {:?}", font.family_name);
            return Ok(());
        }
        let options = self.text_options();
        let text = glyph_node(font, &self.config.text, options, SurfaceSlot::Text)?;
        let number = glyph_node(font, &self.config.number, options, SurfaceSlot::Number)?;

        let text = self.scene.add(text);
        let number = self.scene.add(number);
        self.glyphs = Some((text, number));
        log::info!("glyph meshes attached using font {:?}", font.family_name);
        Ok(())
    }

    /// Outcome of the asynchronous font load. Failures are logged and the
    /// scene carries on with the cube alone.
    pub fn on_font_loaded(&mut self, font: anyhow::Result<Font>) {
        let result = font.and_then(|font| self.attach_glyphs(&font));
        if let Err(e) = result {
            log::error!("could not build text meshes: {e:#}");
        }
    }

    /// Feed the cube position (light) and camera position (viewer) to both
    /// lit surfaces.
    pub fn sync_uniforms(&mut self) {
        let light = self.cube_position();
        let viewer = self.camera.position;
        for surface in [&mut self.text_surface, &mut self.number_surface] {
            surface.set_light_position(light);
            surface.set_viewer_position(viewer);
        }
    }
}

#[derive(Debug, Default)]
struct DriverFlags {
    running: AtomicBool,
    /// Set by a [`StopHandle`]; `start` never clears it.
    stop_requested: AtomicBool,
}

/// Stops an [`AnimationDriver`] from outside the event loop.
///
/// A stop issued before the driver was started sticks: the later `start`
/// leaves the driver stopped.
#[derive(Clone, Debug)]
pub struct StopHandle(Arc<DriverFlags>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.stop_requested.store(true, Ordering::SeqCst);
        self.0.running.store(false, Ordering::SeqCst);
    }
}

/// The frame loop as an explicit task. It is created stopped.
#[derive(Debug, Default)]
pub struct AnimationDriver {
    flags: Arc<DriverFlags>,
    frames: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.flags.running.store(true, Ordering::SeqCst);
        if self.flags.stop_requested.load(Ordering::SeqCst) {
            self.flags.running.store(false, Ordering::SeqCst);
            log::info!("animation driver was stopped before it started");
            return;
        }
        log::info!("animation driver started");
    }

    pub fn stop(&mut self) {
        log::info!("animation driver stopped after {} frames", self.frames);
        self.flags.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.flags.running.load(Ordering::SeqCst)
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.flags.clone())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance the scene by one frame.
    ///
    /// Applies held keys to the cube and camera, then pushes the new positions
    /// into the surface uniforms. Returns `false` (and changes nothing) when
    /// the driver is stopped.
    pub fn tick(&mut self, state: &mut SceneState) -> bool {
        if !self.is_running() {
            return false;
        }
        let step = state.config.step;

        if let Some(cube) = state.scene.get_mut(state.cube) {
            let position = &mut cube.instance.position;
            if state.keys.is_pressed("w") {
                position.y += step;
            }
            if state.keys.is_pressed("s") {
                position.y -= step;
            }
        }
        if state.keys.is_pressed("a") {
            state.camera.position.x -= step;
        }
        if state.keys.is_pressed("d") {
            state.camera.position.x += step;
        }

        state.sync_uniforms();
        self.frames += 1;
        true
    }
}
