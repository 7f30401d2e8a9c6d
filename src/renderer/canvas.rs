//! Canvas 2D backend

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Renderer, Style};

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    /// Wrap a canvas; `None` if the 2D context is unavailable
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        ctx.set_image_smoothing_enabled(false);
        Some(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to the displayed size
    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn paint(&self, style: &Style) {
        self.ctx.set_global_alpha(f64::from(style.alpha));
        match style.glow {
            Some(glow) => {
                self.ctx.set_shadow_color(&glow.color.to_css());
                self.ctx.set_shadow_blur(f64::from(glow.blur));
            }
            None => self.ctx.set_shadow_blur(0.0),
        }
        if let Some(fill) = style.fill {
            self.ctx.set_fill_style_str(&fill.to_css());
            self.ctx.fill();
        }
        if let Some(stroke) = style.stroke {
            self.ctx.set_stroke_style_str(&stroke.to_css());
            self.ctx.set_line_width(f64::from(style.line_width));
            self.ctx.stroke();
        }
    }
}

impl Renderer for CanvasRenderer {
    fn clear_frame(&mut self) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, style: &Style) {
        self.ctx.save();
        self.ctx.begin_path();
        if self
            .ctx
            .arc(
                f64::from(center.x),
                f64::from(center.y),
                f64::from(radius),
                0.0,
                std::f64::consts::TAU,
            )
            .is_ok()
        {
            self.paint(style);
        }
        self.ctx.restore();
    }

    fn draw_rect(&mut self, pos: Vec2, size: Vec2, style: &Style) {
        self.ctx.save();
        self.ctx.begin_path();
        self.ctx.rect(
            f64::from(pos.x),
            f64::from(pos.y),
            f64::from(size.x),
            f64::from(size.y),
        );
        self.paint(style);
        self.ctx.restore();
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, style: &Style) {
        self.ctx.save();
        self.ctx.begin_path();
        self.ctx.move_to(f64::from(from.x), f64::from(from.y));
        self.ctx.line_to(f64::from(to.x), f64::from(to.y));
        self.paint(style);
        self.ctx.restore();
    }
}
