//! glow-glyphs
//!
//! A small cross-platform scene: a glowing cube steered with the keyboard that
//! lights two extruded glyphs ("Z" and "8"). The glyph meshes are built from a
//! typeface fetched at startup and join the scene whenever the fetch resolves.
//! Runs natively and in the browser (WebGL through wgpu).
//!
//! High-level modules
//! - `camera`: camera, perspective projection and the camera uniform
//! - `config`: every constant of the scene in one place
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: geometry, instances, depth texture and the scene graph
//! - `driver`: the per-frame animation driver and its start/stop control
//! - `flow`: the winit application and event loop
//! - `input`: keyboard state tracking
//! - `pipelines`: glow and surface render pipelines and their uniforms
//! - `resources`: font fetching, typeface parsing and text extrusion
//! - `render`: render composition for pipeline batching
//! - `shading`: CPU reference of the shader lighting model
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod driver;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod shading;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::WindowEvent;
