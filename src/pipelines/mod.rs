//! Render pipelines.
//!
//! Both pipelines share the vertex layout (model vertex + per-instance model
//! matrix) and the bind group order: camera at group 0, material at group 1.

pub mod basic;
pub mod glow;
pub mod surface;
