//! Typeface fonts: JSON parsing, glyph outlines and shape generation.
//!
//! The typeface format stores every glyph as a string of outline commands in
//! font units:
//!
//! - `m x y` starts a contour
//! - `l x y` draws a line
//! - `q x y cx cy` draws a quadratic curve (end point first, then control point)
//! - `b x y c1x c1y c2x c2y` draws a cubic curve (end point first)
//! - `z` closes the contour
//!
//! [`Font::generate_shapes`] lays a string out, flattens the curves and sorts
//! contours into solid outlines and the holes they contain.

use std::{collections::HashMap, future::Future, pin::Pin};

use anyhow::{Context, bail, ensure};
use cgmath::{MetricSpace, Point2};
use serde::Deserialize;

use crate::resources::{
    load_string,
    triangulate::{self, Point},
};

#[derive(Debug, Deserialize)]
struct TypefaceData {
    glyphs: HashMap<String, GlyphData>,
    resolution: f32,
    #[serde(rename = "boundingBox")]
    bounding_box: BoundingBox,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
    #[serde(rename = "familyName", default)]
    family_name: String,
}

#[derive(Debug, Deserialize)]
struct BoundingBox {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

#[derive(Debug, Deserialize)]
struct GlyphData {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutlineCommand {
    MoveTo(Point2<f32>),
    LineTo(Point2<f32>),
    QuadTo {
        to: Point2<f32>,
        ctrl: Point2<f32>,
    },
    CubicTo {
        to: Point2<f32>,
        ctrl1: Point2<f32>,
        ctrl2: Point2<f32>,
    },
    Close,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub advance: f32,
    pub outline: Vec<OutlineCommand>,
}

/// A solid outline (counter-clockwise) and the holes it contains (clockwise).
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub outer: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

#[derive(Clone, Debug)]
pub struct Font {
    pub family_name: String,
    resolution: f32,
    /// Line advance in font units.
    line_height: f32,
    glyphs: HashMap<char, Glyph>,
}

impl Font {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let data: TypefaceData =
            serde_json::from_str(json).context("font is not a valid typeface description")?;
        ensure!(
            data.resolution > 0.0,
            "typeface resolution must be positive, got {}",
            data.resolution
        );

        let mut glyphs = HashMap::with_capacity(data.glyphs.len());
        for (key, glyph) in data.glyphs {
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                log::debug!("skipping multi-character glyph key {key:?}");
                continue;
            };
            let outline = match &glyph.o {
                Some(o) => parse_outline(o).with_context(|| format!("bad outline for {c:?}"))?,
                None => Vec::new(),
            };
            glyphs.insert(
                c,
                Glyph {
                    advance: glyph.ha,
                    outline,
                },
            );
        }

        Ok(Self {
            family_name: data.family_name,
            resolution: data.resolution,
            line_height: data.bounding_box.y_max - data.bounding_box.y_min
                + data.underline_thickness,
            glyphs,
        })
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Lay out `text` at `size` units per em and return its filled shapes.
    ///
    /// Curves are flattened into `curve_segments` line segments each. Every
    /// character must exist in the font.
    pub fn generate_shapes(
        &self,
        text: &str,
        size: f32,
        curve_segments: usize,
    ) -> anyhow::Result<Vec<Shape>> {
        let scale = size / self.resolution;
        let segments = curve_segments.max(1);
        let mut offset = (0.0_f32, 0.0_f32);
        let mut shapes = Vec::new();

        for c in text.chars() {
            if c == '\n' {
                offset = (0.0, offset.1 - self.line_height * scale);
                continue;
            }
            let Some(glyph) = self.glyph(c) else {
                bail!("character {c:?} is missing from font {:?}", self.family_name);
            };
            let contours = flatten(&glyph.outline, scale, offset, segments);
            shapes.extend(classify_contours(contours));
            offset.0 += glyph.advance * scale;
        }
        Ok(shapes)
    }
}

fn parse_outline(outline: &str) -> anyhow::Result<Vec<OutlineCommand>> {
    let tokens: Vec<&str> = outline.split_whitespace().collect();
    let mut commands = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let (command, arity) = match tokens[i] {
            "m" => (OutlineCommand::MoveTo(point_at(&tokens, i + 1)?), 2),
            "l" => (OutlineCommand::LineTo(point_at(&tokens, i + 1)?), 2),
            "q" => (
                OutlineCommand::QuadTo {
                    to: point_at(&tokens, i + 1)?,
                    ctrl: point_at(&tokens, i + 3)?,
                },
                4,
            ),
            "b" => (
                OutlineCommand::CubicTo {
                    to: point_at(&tokens, i + 1)?,
                    ctrl1: point_at(&tokens, i + 3)?,
                    ctrl2: point_at(&tokens, i + 5)?,
                },
                6,
            ),
            "z" => (OutlineCommand::Close, 0),
            other => bail!("unknown outline command {other:?}"),
        };
        commands.push(command);
        i += 1 + arity;
    }
    Ok(commands)
}

fn point_at(tokens: &[&str], at: usize) -> anyhow::Result<Point2<f32>> {
    let coord = |i: usize| -> anyhow::Result<f32> {
        let token = tokens
            .get(i)
            .with_context(|| format!("outline ends before coordinate {i}"))?;
        token
            .parse::<f32>()
            .with_context(|| format!("'{token}' is not a number"))
    };
    Ok(Point2::new(coord(at)?, coord(at + 1)?))
}

fn quadratic(p0: Point, ctrl: Point, p1: Point, t: f32) -> Point {
    let k = 1.0 - t;
    Point::new(
        k * k * p0.x + 2.0 * k * t * ctrl.x + t * t * p1.x,
        k * k * p0.y + 2.0 * k * t * ctrl.y + t * t * p1.y,
    )
}

fn cubic(p0: Point, c1: Point, c2: Point, p1: Point, t: f32) -> Point {
    let k = 1.0 - t;
    let (a, b, c, d) = (k * k * k, 3.0 * k * k * t, 3.0 * k * t * t, t * t * t);
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}

/// Turn an outline into closed polylines in scene units.
fn flatten(
    outline: &[OutlineCommand],
    scale: f32,
    offset: (f32, f32),
    segments: usize,
) -> Vec<Vec<Point>> {
    let place = |p: Point2<f32>| Point::new(p.x * scale + offset.0, p.y * scale + offset.1);
    let mut contours = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for command in outline {
        match *command {
            OutlineCommand::MoveTo(p) => {
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
                current.push(place(p));
            }
            OutlineCommand::LineTo(p) => current.push(place(p)),
            OutlineCommand::QuadTo { to, ctrl } => {
                let Some(&start) = current.last() else {
                    continue;
                };
                let (ctrl, to) = (place(ctrl), place(to));
                current.extend(
                    (1..=segments).map(|s| quadratic(start, ctrl, to, s as f32 / segments as f32)),
                );
            }
            OutlineCommand::CubicTo { to, ctrl1, ctrl2 } => {
                let Some(&start) = current.last() else {
                    continue;
                };
                let (ctrl1, ctrl2, to) = (place(ctrl1), place(ctrl2), place(to));
                current.extend(
                    (1..=segments)
                        .map(|s| cubic(start, ctrl1, ctrl2, to, s as f32 / segments as f32)),
                );
            }
            OutlineCommand::Close => {
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        contours.push(current);
    }

    contours.into_iter().filter_map(clean_contour).collect()
}

/// Points closer than this (in scene units) are merged.
const MERGE_DISTANCE: f32 = 1e-5;

fn coincident(a: Point, b: Point) -> bool {
    a.distance2(b) <= MERGE_DISTANCE * MERGE_DISTANCE
}

/// Drop repeated points and the closing duplicate; reject degenerate contours.
fn clean_contour(contour: Vec<Point>) -> Option<Vec<Point>> {
    let mut cleaned: Vec<Point> = Vec::with_capacity(contour.len());
    for p in contour {
        if !cleaned.last().is_some_and(|&last| coincident(last, p)) {
            cleaned.push(p);
        }
    }
    while cleaned.len() > 1 && coincident(cleaned[0], cleaned[cleaned.len() - 1]) {
        cleaned.pop();
    }
    (cleaned.len() >= 3 && triangulate::signed_area(&cleaned) != 0.0).then_some(cleaned)
}

/// Sort contours into solid outlines and holes by nesting depth.
///
/// A contour inside an odd number of others is a hole of the innermost one
/// containing it. Winding in the font file is ignored; solids come out
/// counter-clockwise and holes clockwise.
pub fn classify_contours(contours: Vec<Vec<Point>>) -> Vec<Shape> {
    let inside = |inner: &[Point], outer: &[Point]| triangulate::contains(outer, inner[0]);
    let parents: Vec<Vec<usize>> = (0..contours.len())
        .map(|i| {
            (0..contours.len())
                .filter(|&j| j != i && inside(&contours[i], &contours[j]))
                .collect()
        })
        .collect();

    let mut shapes: Vec<Shape> = Vec::new();
    let mut shape_of: HashMap<usize, usize> = HashMap::new();
    for (i, contour) in contours.iter().enumerate() {
        if parents[i].len() % 2 == 0 {
            let mut outer = contour.clone();
            if triangulate::signed_area(&outer) < 0.0 {
                outer.reverse();
            }
            shape_of.insert(i, shapes.len());
            shapes.push(Shape {
                outer,
                holes: Vec::new(),
            });
        }
    }
    for (i, contour) in contours.iter().enumerate() {
        if parents[i].len() % 2 == 1 {
            // the innermost parent is the one with the most parents of its own
            let owner = parents[i]
                .iter()
                .copied()
                .filter(|j| parents[*j].len() % 2 == 0)
                .max_by_key(|&j| parents[j].len());
            let Some(shape) = owner.and_then(|j| shape_of.get(&j)) else {
                continue;
            };
            let mut hole = contour.clone();
            if triangulate::signed_area(&hole) > 0.0 {
                hole.reverse();
            }
            shapes[*shape].holes.push(hole);
        }
    }
    shapes
}

#[cfg(not(target_arch = "wasm32"))]
pub type FontFuture = Pin<Box<dyn Future<Output = anyhow::Result<Font>> + Send>>;
#[cfg(target_arch = "wasm32")]
pub type FontFuture = Pin<Box<dyn Future<Output = anyhow::Result<Font>>>>;

/// Where the scene gets its font from.
///
/// The application only sees the returned future; tests hand in sources that
/// resolve immediately.
pub trait FontSource {
    fn load(&self) -> FontFuture;
}

/// Fetches a typeface by URL or from the assets directory.
#[derive(Clone, Debug)]
pub struct RemoteFont {
    pub source: String,
}

impl RemoteFont {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl FontSource for RemoteFont {
    fn load(&self) -> FontFuture {
        let source = self.source.clone();
        Box::pin(async move {
            let json = load_string(&source)
                .await
                .with_context(|| format!("could not fetch font {source}"))?;
            Font::from_json(&json)
        })
    }
}

/// An already parsed font, handed out as-is.
#[derive(Clone, Debug)]
pub struct LoadedFont(pub Font);

impl FontSource for LoadedFont {
    fn load(&self) -> FontFuture {
        let font = self.0.clone();
        Box::pin(async move { Ok(font) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_WITH_HOLE: &str = r#"{
        "glyphs": {
            "o": { "ha": 1000, "x_min": 0, "x_max": 1000,
                   "o": "m 0 0 l 0 1000 l 1000 1000 l 1000 0 l 0 0 z m 250 250 l 750 250 l 750 750 l 250 750 z" },
            " ": { "ha": 500, "x_min": 0, "x_max": 0 }
        },
        "familyName": "Test",
        "resolution": 1000,
        "boundingBox": { "yMin": -200, "xMin": 0, "yMax": 1000, "xMax": 1000 },
        "underlineThickness": 50
    }"#;

    #[test]
    fn parses_outline_commands() {
        let commands = parse_outline("m 1 2 l 3 4 q 5 6 7 8 b 1 1 2 2 3 3 z").unwrap();
        assert_eq!(
            commands,
            vec![
                OutlineCommand::MoveTo(Point2::new(1.0, 2.0)),
                OutlineCommand::LineTo(Point2::new(3.0, 4.0)),
                OutlineCommand::QuadTo {
                    to: Point2::new(5.0, 6.0),
                    ctrl: Point2::new(7.0, 8.0)
                },
                OutlineCommand::CubicTo {
                    to: Point2::new(1.0, 1.0),
                    ctrl1: Point2::new(2.0, 2.0),
                    ctrl2: Point2::new(3.0, 3.0)
                },
                OutlineCommand::Close,
            ]
        );
    }

    #[test]
    fn rejects_truncated_and_unknown_commands() {
        assert!(parse_outline("m 1").is_err());
        assert!(parse_outline("m 1 2 x 3 4").is_err());
        assert!(parse_outline("l 1 two").is_err());
    }

    #[test]
    fn reads_typeface_json() {
        let font = Font::from_json(SQUARE_WITH_HOLE).unwrap();
        assert_eq!(font.family_name, "Test");
        assert_eq!(font.glyph_count(), 2);
        assert_eq!(font.glyph('o').unwrap().advance, 1000.0);
        assert!(font.glyph(' ').unwrap().outline.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Font::from_json("{ not json").is_err());
        assert!(Font::from_json(r#"{"glyphs": {}}"#).is_err());
    }

    #[test]
    fn inner_contour_becomes_a_hole() {
        let font = Font::from_json(SQUARE_WITH_HOLE).unwrap();
        let shapes = font.generate_shapes("o", 1.0, 12).unwrap();
        assert_eq!(shapes.len(), 1);
        let shape = &shapes[0];
        assert_eq!(shape.outer.len(), 4);
        assert_eq!(shape.holes.len(), 1);
        assert!(triangulate::signed_area(&shape.outer) > 0.0);
        assert!(triangulate::signed_area(&shape.holes[0]) < 0.0);
        assert!((triangulate::signed_area(&shape.outer) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn layout_advances_and_breaks_lines() {
        let font = Font::from_json(SQUARE_WITH_HOLE).unwrap();
        let shapes = font.generate_shapes("o o\no", 2.0, 12).unwrap();
        assert_eq!(shapes.len(), 3);
        let min_x = |s: &Shape| s.outer.iter().map(|p| p.x).fold(f32::MAX, f32::min);
        let min_y = |s: &Shape| s.outer.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert_eq!(min_x(&shapes[0]), 0.0);
        // one glyph plus one space: (1000 + 500) * 2 / 1000
        assert_eq!(min_x(&shapes[1]), 3.0);
        assert_eq!(min_x(&shapes[2]), 0.0);
        // (1000 + 200 + 50) * 2 / 1000
        assert!((min_y(&shapes[2]) + 2.5).abs() < 1e-5);
    }

    #[test]
    fn missing_glyph_is_an_error() {
        let font = Font::from_json(SQUARE_WITH_HOLE).unwrap();
        assert!(font.generate_shapes("Z", 1.0, 12).is_err());
    }

    #[test]
    fn curves_are_flattened_into_segments() {
        let outline = parse_outline("m 0 0 l 1000 0 q 0 0 1000 1000 z").unwrap();
        let contours = flatten(&outline, 0.001, (0.0, 0.0), 12);
        assert_eq!(contours.len(), 1);
        // start, line end, then 12 curve samples ending on the start point (dropped)
        assert_eq!(contours[0].len(), 2 + 12 - 1);
        let last = contours[0][contours[0].len() - 1];
        assert!(last.x > 0.0 && last.y > 0.0);
    }

    #[test]
    fn near_duplicate_closing_point_is_merged() {
        let ring: Vec<Point> = (0..=96)
            .map(|i| {
                let a = i as f32 / 96.0 * std::f32::consts::TAU;
                Point::new(0.3 * a.cos(), 0.3 * a.sin())
            })
            .collect();
        let mut nudged = ring.clone();
        let last = nudged.len() - 1;
        nudged[last].x += 6e-8;
        nudged[last].y -= 6e-8;

        let cleaned = clean_contour(nudged).unwrap();
        assert_eq!(cleaned.len(), 96);
        assert_eq!(cleaned, clean_contour(ring).unwrap());

        let triangles = triangulate::triangulate_shape(&cleaned, &[]);
        let covered: f32 = triangles
            .iter()
            .map(|t| triangulate::signed_area(&[cleaned[t[0]], cleaned[t[1]], cleaned[t[2]]]))
            .inspect(|&area| assert!(area > -1e-9))
            .sum();
        assert!((covered - triangulate::signed_area(&cleaned)).abs() < 1e-4);

        let stutter = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0 + 1e-7, 0.0),
            Point::new(1.0, 1.0),
        ];
        assert_eq!(clean_contour(stutter).unwrap().len(), 3);
    }

    #[test]
    fn loaded_font_resolves_immediately() {
        let font = Font::from_json(SQUARE_WITH_HOLE).unwrap();
        let loaded = futures::executor::block_on(LoadedFont(font).load()).unwrap();
        assert_eq!(loaded.glyph_count(), 2);
    }
}
