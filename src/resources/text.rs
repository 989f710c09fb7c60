//! Extruded text geometry.
//!
//! Each glyph shape becomes a front cap at `z = depth`, a back cap at `z = 0`
//! and one flat-shaded quad per outline edge. Nothing is bevelled and no
//! vertex is shared between faces, so every face keeps its own normal.

use anyhow::ensure;

use crate::{
    data_structures::model::{Geometry, ModelVertex},
    resources::{
        font::{Font, Shape},
        triangulate::{self, Point},
    },
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextOptions {
    /// Glyph height in scene units (font size per em).
    pub size: f32,
    /// Extrusion depth along +Z.
    pub depth: f32,
    pub curve_segments: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 1.0,
            depth: 0.2,
            curve_segments: 12,
        }
    }
}

/// Build the extruded mesh for `text`.
///
/// Fails when a character is missing from the font or the text yields no
/// triangles at all.
pub fn text_geometry(font: &Font, text: &str, options: TextOptions) -> anyhow::Result<Geometry> {
    let shapes = font.generate_shapes(text, options.size, options.curve_segments)?;
    let mut geometry = Geometry::default();
    for shape in &shapes {
        geometry.append(extrude_shape(shape, options.depth));
    }
    ensure!(!geometry.is_empty(), "text {text:?} produced no geometry");
    Ok(geometry)
}

pub fn extrude_shape(shape: &Shape, depth: f32) -> Geometry {
    let mut geometry = Geometry::default();
    let points: Vec<Point> = shape
        .outer
        .iter()
        .chain(shape.holes.iter().flatten())
        .copied()
        .collect();
    let triangles = triangulate::triangulate_shape(&shape.outer, &shape.holes);

    // caps
    for (z, normal, flip) in [(depth, [0.0, 0.0, 1.0], false), (0.0, [0.0, 0.0, -1.0], true)] {
        let base = geometry.vertices.len() as u32;
        geometry.vertices.extend(points.iter().map(|p| ModelVertex {
            position: [p.x, p.y, z],
            normal,
        }));
        for &[a, b, c] in &triangles {
            let (b, c) = if flip { (c, b) } else { (b, c) };
            geometry
                .indices
                .extend([a, b, c].map(|i| base + i as u32));
        }
    }

    // walls
    for contour in std::iter::once(&shape.outer).chain(shape.holes.iter()) {
        let n = contour.len();
        for i in 0..n {
            let (p, q) = (contour[i], contour[(i + 1) % n]);
            let (dx, dy) = (q.x - p.x, q.y - p.y);
            let len = (dx * dx + dy * dy).sqrt();
            if len == 0.0 {
                continue;
            }
            // outward for counter-clockwise outlines and clockwise holes
            let normal = [dy / len, -dx / len, 0.0];
            let base = geometry.vertices.len() as u32;
            geometry.vertices.extend(
                [[p.x, p.y, 0.0], [q.x, q.y, 0.0], [q.x, q.y, depth], [p.x, p.y, depth]]
                    .map(|position| ModelVertex { position, normal }),
            );
            geometry
                .indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
    }
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    fn square_ring() -> Shape {
        Shape {
            outer: vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(2.0, 2.0),
                Point::new(0.0, 2.0),
            ],
            holes: vec![vec![
                Point::new(0.5, 0.5),
                Point::new(0.5, 1.5),
                Point::new(1.5, 1.5),
                Point::new(1.5, 0.5),
            ]],
        }
    }

    #[test]
    fn extrusion_spans_the_requested_depth() {
        let geometry = extrude_shape(&square_ring(), 0.2);
        let (lo, hi) = geometry.bounds().unwrap();
        assert_eq!(lo, [0.0, 0.0, 0.0]);
        assert_eq!(hi, [2.0, 2.0, 0.2]);
    }

    #[test]
    fn every_triangle_faces_along_its_normal() {
        let geometry = extrude_shape(&square_ring(), 0.2);
        for tri in geometry.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vector3::from(geometry.vertices[tri[i] as usize].position));
            let winding = (b - a).cross(c - a);
            let normal = Vector3::from(geometry.vertices[tri[0] as usize].normal);
            assert!(winding.dot(normal) > 0.0, "triangle {tri:?} is inside out");
        }
    }

    #[test]
    fn wall_count_matches_outline_edges() {
        let geometry = extrude_shape(&square_ring(), 0.2);
        // 8 cap triangles per side, 2 per edge on 8 edges
        assert_eq!(geometry.triangle_count(), 8 * 2 + 8 * 2);
    }
}
