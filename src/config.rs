//! Scene constants.
//!
//! There is no config file: every number the scene uses lives in
//! [`SceneConfig::default`]. Embedding code and tests may build their own
//! `SceneConfig` and hand it to [`crate::flow::run_with`].

/// Parameters of one lit glyph surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceConfig {
    pub base_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub shininess: f32,
    pub ambient_strength: f32,
}

/// A glyph mesh: which text to extrude and where to put it.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphConfig {
    pub text: String,
    pub position: [f32; 3],
    pub surface: SurfaceConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    /// Edge length of the glowing cube.
    pub cube_size: f32,
    pub glow_intensity: [f32; 3],
    /// Distance the cube or camera travels per frame while a key is held.
    pub step: f32,
    /// `http(s)://` URL or a path relative to the assets directory.
    pub font_source: String,
    pub text_size: f32,
    pub text_depth: f32,
    pub curve_segments: usize,
    pub text: GlyphConfig,
    pub number: GlyphConfig,
    pub clear_colour: wgpu::Color,
}

pub const DEFAULT_FONT_URL: &str =
    "https://threejs.org/examples/fonts/helvetiker_regular.typeface.json";

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                position: [0.0, 0.0, 5.0],
                fovy_degrees: 75.0,
                znear: 0.1,
                zfar: 1000.0,
            },
            cube_size: 0.5,
            glow_intensity: [1.0, 1.0, 1.0],
            step: 0.05,
            font_source: DEFAULT_FONT_URL.to_string(),
            text_size: 1.0,
            text_depth: 0.2,
            curve_segments: 12,
            text: GlyphConfig {
                text: "Z".to_string(),
                position: [-2.0, 0.0, 0.0],
                surface: SurfaceConfig {
                    base_color: [0.75, 0.75, 0.75],
                    specular_color: [0.5, 0.5, 0.5],
                    shininess: 32.0,
                    ambient_strength: 0.938,
                },
            },
            number: GlyphConfig {
                text: "8".to_string(),
                position: [2.0, 0.0, 0.0],
                surface: SurfaceConfig {
                    base_color: [0.0, 0.5, 0.5],
                    // numbers highlight in their own colour
                    specular_color: [0.0, 0.5, 0.5],
                    shininess: 64.0,
                    ambient_strength: 0.938,
                },
            },
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_specular_follows_base_color() {
        let config = SceneConfig::default();
        assert_eq!(
            config.number.surface.specular_color,
            config.number.surface.base_color
        );
        assert_eq!(config.text.surface.specular_color, [0.5; 3]);
    }

    #[test]
    fn glyphs_sit_on_either_side_of_the_cube() {
        let config = SceneConfig::default();
        assert_eq!(config.text.position[0], -2.0);
        assert_eq!(config.number.position[0], 2.0);
    }
}
