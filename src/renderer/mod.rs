//! Rendering module
//!
//! The simulation never draws. Each frame the host captures an immutable
//! [`Scene`] from the session and hands it, together with a [`Renderer`]
//! backend, to [`render_scene`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use scene::{BallShape, Hud, Scene, render_background, render_scene};

use glam::Vec2;

/// Linear RGBA color (components in 0..=1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// CSS `rgba()` string for canvas/DOM styles
    pub fn to_css(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("rgba({},{},{},{})", c(self.r), c(self.g), c(self.b), self.a.clamp(0.0, 1.0))
    }
}

/// Soft shadow around a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Color,
    pub blur: f32,
}

/// How a primitive is painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub line_width: f32,
    /// Global opacity multiplier
    pub alpha: f32,
    pub glow: Option<Glow>,
}

impl Style {
    pub const fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            line_width: 1.0,
            alpha: 1.0,
            glow: None,
        }
    }

    pub const fn stroke(color: Color, line_width: f32) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            line_width,
            alpha: 1.0,
            glow: None,
        }
    }

    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub const fn with_glow(mut self, color: Color, blur: f32) -> Self {
        self.glow = Some(Glow { color, blur });
        self
    }
}

/// Drawing backend used once per frame
pub trait Renderer {
    fn clear_frame(&mut self);
    fn draw_circle(&mut self, center: Vec2, radius: f32, style: &Style);
    fn draw_rect(&mut self, pos: Vec2, size: Vec2, style: &Style);
    /// Optional; backends without line support skip connections
    fn draw_line(&mut self, _from: Vec2, _to: Vec2, _style: &Style) {}
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Circle { center: Vec2, radius: f32 },
    Rect { pos: Vec2, size: Vec2 },
    Line { from: Vec2, to: Vec2 },
}

/// Renderer that only records calls (headless runs and tests)
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub ops: Vec<DrawOp>,
}

impl RecordingRenderer {
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    pub fn circles(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Circle { .. }))
    }

    pub fn rects(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Rect { .. }))
    }

    pub fn lines(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Line { .. }))
    }
}

impl Renderer for RecordingRenderer {
    fn clear_frame(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, _style: &Style) {
        self.ops.push(DrawOp::Circle { center, radius });
    }

    fn draw_rect(&mut self, pos: Vec2, size: Vec2, _style: &Style) {
        self.ops.push(DrawOp::Rect { pos, size });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, _style: &Style) {
        self.ops.push(DrawOp::Line { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_css() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.5).to_css(), "rgba(255,0,128,1)");
        assert_eq!(Color::rgba(2.0, -1.0, 0.0, 0.25).to_css(), "rgba(255,0,0,0.25)");
    }
}
