//! 2D rendering
//!
//! The scene is drawn through the [`Surface`] trait so the simulation never
//! depends on a browser. The wasm build implements it over a
//! `CanvasRenderingContext2d`; tests use [`RecordingSurface`].

pub mod scene;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use glam::Vec2;

use crate::sim::Rect;

/// RGBA colour, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From 0xRRGGBB
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xFF) as f32 / 255.0,
            ((rgb >> 8) & 0xFF) as f32 / 255.0,
            (rgb & 0xFF) as f32 / 255.0,
        )
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba(...)` string for canvas fill/stroke styles
    pub fn to_css(&self) -> String {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "rgba({}, {}, {}, {})",
            channel(self.r),
            channel(self.g),
            channel(self.b),
            self.a.clamp(0.0, 1.0)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Abstract 2D drawing surface (y grows downward).
///
/// `save`/`restore` bracket transform and alpha changes, like canvas.
pub trait Surface {
    fn size(&self) -> Vec2;

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, angle: f32);
    /// Multiplied into every subsequent draw until `restore`
    fn set_alpha(&mut self, alpha: f32);

    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);
    /// Closed polygon
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    /// Open polyline
    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color);
    /// Vertical gradient with stops at 0..=1 of the rect height
    fn fill_vertical_gradient(&mut self, rect: Rect, stops: &[(f32, Color)]);
    fn fill_text(&mut self, text: &str, pos: Vec2, px: f32, align: TextAlign, color: Color);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Alpha(f32),
    Rect(Rect, Color),
    Circle { center: Vec2, radius: f32, color: Color },
    Ring { center: Vec2, radius: f32, color: Color },
    Ellipse { center: Vec2, radii: Vec2, color: Color },
    Polygon(Vec<Vec2>, Color),
    Polyline(Vec<Vec2>, Color),
    Gradient(Rect, Vec<(f32, Color)>),
    Text(String, Vec2),
}

/// Surface that only records calls (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub size: Vec2,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            calls: Vec::new(),
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text(text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn save(&mut self) {
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        self.calls.push(DrawCall::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.calls.push(DrawCall::Translate(offset));
    }

    fn rotate(&mut self, angle: f32) {
        self.calls.push(DrawCall::Rotate(angle));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.calls.push(DrawCall::Alpha(alpha));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::Rect(rect, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.calls.push(DrawCall::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, _width: f32, color: Color) {
        self.calls.push(DrawCall::Ring {
            center,
            radius,
            color,
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.calls.push(DrawCall::Ellipse {
            center,
            radii,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.calls.push(DrawCall::Polygon(points.to_vec(), color));
    }

    fn stroke_polyline(&mut self, points: &[Vec2], _width: f32, color: Color) {
        self.calls.push(DrawCall::Polyline(points.to_vec(), color));
    }

    fn fill_vertical_gradient(&mut self, rect: Rect, stops: &[(f32, Color)]) {
        self.calls.push(DrawCall::Gradient(rect, stops.to_vec()));
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, _px: f32, _align: TextAlign, _color: Color) {
        self.calls.push(DrawCall::Text(text.to_string(), pos));
    }
}
