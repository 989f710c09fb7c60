use std::path::PathBuf;

use glow_glyphs::{
    config::SceneConfig,
    driver::{AnimationDriver, SceneState},
    resources::font::{Font, FontFuture, FontSource},
};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn mini_font() -> Font {
    let json = std::fs::read_to_string(fixture_path("mini.typeface.json"))
        .expect("fixture font is readable");
    Font::from_json(&json).expect("fixture font parses")
}

/// Reads a typeface from the fixtures directory when polled.
pub struct FixtureFont(pub &'static str);

impl FontSource for FixtureFont {
    fn load(&self) -> FontFuture {
        let path = fixture_path(self.0);
        Box::pin(async move {
            let json = std::fs::read_to_string(&path)?;
            Font::from_json(&json)
        })
    }
}

/// A source that never delivers a font.
pub struct BrokenFont;

impl FontSource for BrokenFont {
    fn load(&self) -> FontFuture {
        Box::pin(async { Err(anyhow::anyhow!("connection refused")) })
    }
}

/// A running driver on the default startup scene.
pub fn running_scene() -> (AnimationDriver, SceneState) {
    let mut driver = AnimationDriver::new();
    driver.start();
    (driver, SceneState::new(SceneConfig::default()))
}
