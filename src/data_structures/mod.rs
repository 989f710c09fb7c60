//! Scene data: geometry, per-object transforms, the depth buffer and the
//! scene graph that ties them together.
//!
//! - `model` holds CPU geometry, its GPU upload and the vertex layout
//! - `instance` holds an object's transform and its raw GPU form
//! - `texture` wraps the depth texture
//! - `scene_graph` is the flat list of objects the driver animates

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
