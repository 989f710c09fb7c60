//! CPU reference of the lighting model in `pipelines/surface.wgsl` and
//! `pipelines/glow.wgsl`.
//!
//! The GPU never calls into this module. It exists so the lighting equations
//! can be checked without a device, and it must be kept in step with the
//! shaders.

use cgmath::{InnerSpace, Vector3, Zero};

use crate::config::SurfaceConfig;

/// Lighting terms of one shaded fragment, kept apart for inspection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceTerms {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl SurfaceTerms {
    /// Final fragment colour, always opaque.
    pub fn color(&self) -> [f32; 4] {
        let c = self.ambient + self.diffuse + self.specular;
        [c.x, c.y, c.z, 1.0]
    }
}

fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() == 0.0 {
        Vector3::zero()
    } else {
        v.normalize()
    }
}

/// Ambient + diffuse + Blinn-Phong specular for a text or number surface.
///
/// `normal` and `frag_pos` are in view space, `light_pos` and `viewer_pos`
/// are fed straight from the uniforms.
pub fn shade_surface(
    surface: &SurfaceConfig,
    normal: Vector3<f32>,
    frag_pos: Vector3<f32>,
    light_pos: Vector3<f32>,
    viewer_pos: Vector3<f32>,
) -> SurfaceTerms {
    let base: Vector3<f32> = surface.base_color.into();
    let spec_color: Vector3<f32> = surface.specular_color.into();

    let ambient = base * surface.ambient_strength;

    let light_dir = normalize_or_zero(light_pos - frag_pos);
    let diffuse = base * normal.dot(light_dir).max(0.0);

    let view_dir = normalize_or_zero(viewer_pos - frag_pos);
    let half_vec = normalize_or_zero(light_dir + view_dir);
    let specular = spec_color * normal.dot(half_vec).max(0.0).powf(surface.shininess);

    SurfaceTerms {
        ambient,
        diffuse,
        specular,
    }
}

/// Radial glow mask: 1 at the local origin, 0 from distance 0.5 outwards.
pub fn glow_factor(local_pos: Vector3<f32>) -> f32 {
    (1.0 - local_pos.magnitude() * 2.0).clamp(0.0, 1.0)
}

pub fn shade_glow(local_pos: Vector3<f32>, glow_intensity: [f32; 3]) -> [f32; 4] {
    let c = Vector3::from(glow_intensity) * glow_factor(local_pos);
    [c.x, c.y, c.z, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-6
    }

    #[test]
    fn ambient_ignores_light_and_viewer() {
        let config = SceneConfig::default();
        let surface = &config.text.surface;
        let normal = Vector3::unit_z();
        let frag = Vector3::new(0.1, 0.2, -4.0);
        let expected = Vector3::from(surface.base_color) * surface.ambient_strength;
        for (light, viewer) in [
            (Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 5.0)),
            (Vector3::new(10.0, -3.0, 2.0), Vector3::new(-7.0, 1.0, 0.5)),
            (Vector3::new(0.0, 100.0, -50.0), Vector3::new(0.0, 0.0, 0.0)),
        ] {
            let terms = shade_surface(surface, normal, frag, light, viewer);
            assert!(close(terms.ambient, expected));
        }
    }

    #[test]
    fn diffuse_vanishes_when_light_is_behind_or_grazing() {
        let config = SceneConfig::default();
        let surface = &config.number.surface;
        let normal = Vector3::unit_z();
        let frag = Vector3::zero();
        let viewer = Vector3::new(0.0, 0.0, 5.0);

        let behind = shade_surface(surface, normal, frag, Vector3::new(0.0, 0.0, -3.0), viewer);
        assert_eq!(behind.diffuse, Vector3::zero());

        let grazing = shade_surface(surface, normal, frag, Vector3::new(2.0, 0.0, 0.0), viewer);
        assert!(close(grazing.diffuse, Vector3::zero()));
    }

    #[test]
    fn light_facing_the_surface_gives_full_diffuse() {
        let config = SceneConfig::default();
        let surface = &config.text.surface;
        let terms = shade_surface(
            surface,
            Vector3::unit_z(),
            Vector3::zero(),
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::new(0.0, 0.0, 2.0),
        );
        assert!(close(terms.diffuse, surface.base_color.into()));
        // light and viewer coincide with the normal: full highlight
        assert!(close(terms.specular, surface.specular_color.into()));
    }

    #[test]
    fn number_highlight_is_tinted_by_its_base_color() {
        let config = SceneConfig::default();
        let surface = &config.number.surface;
        let terms = shade_surface(
            surface,
            Vector3::unit_z(),
            Vector3::zero(),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 1.0),
        );
        assert_eq!(terms.specular.x, 0.0);
        assert!((terms.specular.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn higher_shininess_narrows_the_highlight() {
        let config = SceneConfig::default();
        let mut text = config.text.surface.clone();
        text.specular_color = [1.0; 3];
        let mut number = config.number.surface.clone();
        number.specular_color = [1.0; 3];
        let normal = Vector3::new(0.3, 0.0, 1.0).normalize();
        let light = Vector3::new(0.0, 0.0, 3.0);
        let viewer = Vector3::new(0.0, 0.0, 3.0);
        let wide = shade_surface(&text, normal, Vector3::zero(), light, viewer);
        let narrow = shade_surface(&number, normal, Vector3::zero(), light, viewer);
        assert!(narrow.specular.x < wide.specular.x);
    }

    #[test]
    fn output_is_opaque() {
        let config = SceneConfig::default();
        let terms = shade_surface(
            &config.text.surface,
            Vector3::unit_y(),
            Vector3::zero(),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, 0.0, 5.0),
        );
        assert_eq!(terms.color()[3], 1.0);
    }

    #[test]
    fn glow_is_full_at_center_and_black_past_half_unit() {
        assert_eq!(shade_glow(Vector3::zero(), [1.0, 1.0, 1.0]), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(
            shade_glow(Vector3::new(0.5, 0.0, 0.0), [1.0, 1.0, 1.0]),
            [0.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(
            shade_glow(Vector3::new(0.4, 0.4, 0.0), [1.0, 1.0, 1.0]),
            [0.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(glow_factor(Vector3::new(3.0, -2.0, 1.0)), 0.0);
    }

    #[test]
    fn glow_falls_off_linearly() {
        let f = glow_factor(Vector3::new(0.0, 0.125, 0.0));
        assert!((f - 0.75).abs() < 1e-6);
        let c = shade_glow(Vector3::new(0.0, 0.125, 0.0), [0.2, 0.4, 1.0]);
        assert!((c[2] - 0.75).abs() < 1e-6);
        assert!((c[0] - 0.15).abs() < 1e-6);
    }
}
