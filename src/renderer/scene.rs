//! Per-frame scene snapshot and the draw order for it

use glam::Vec2;

use super::{Color, Renderer, Style};
use crate::Rect;
use crate::sim::{Field, GameSession, ParticleField, PresentationTarget, SessionPhase};

const PADDLE_STYLE: Style = Style::fill(Color::rgb(1.0, 0.70, 0.28))
    .with_glow(Color::rgb(1.0, 0.37, 0.38), 8.0);
const BALL_STYLE: Style = Style::fill(Color::rgb(1.0, 0.37, 0.38))
    .with_glow(Color::rgb(1.0, 0.70, 0.28), 12.0);

const PARTICLE_COLOR: Color = Color::rgba(1.0, 0.70, 0.28, 0.4);
const HOVER_COLOR: Color = Color::rgba(1.0, 0.37, 0.38, 0.6);
const CONNECTION_COLOR: Color = Color::rgba(1.0, 0.70, 0.28, 0.1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallShape {
    pub center: Vec2,
    pub radius: f32,
}

/// Counter/outcome data for the DOM overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub broken: usize,
    pub total: usize,
    pub phase: SessionPhase,
}

impl Hud {
    pub fn counter_text(&self) -> String {
        format!("BROKEN: {}/{}", self.broken, self.total)
    }
}

/// Immutable view of one frame of the mini-game
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub field: Field,
    pub paddle: Rect,
    pub balls: Vec<BallShape>,
    pub hud: Hud,
}

impl Scene {
    pub fn capture<T: PresentationTarget>(session: &GameSession<T>) -> Self {
        Self {
            field: session.field(),
            paddle: session.paddle().bounds(),
            balls: session
                .balls()
                .iter()
                .map(|b| BallShape {
                    center: b.center(),
                    radius: b.radius,
                })
                .collect(),
            hud: Hud {
                broken: session.broken_count(),
                total: session.target_count(),
                phase: session.phase(),
            },
        }
    }
}

/// Clear, then paddle, then balls
pub fn render_scene(scene: &Scene, renderer: &mut dyn Renderer) {
    renderer.clear_frame();
    if scene.hud.phase == SessionPhase::Idle {
        return;
    }
    renderer.draw_rect(scene.paddle.origin(), scene.paddle.size(), &PADDLE_STYLE);
    for ball in &scene.balls {
        renderer.draw_circle(ball.center, ball.radius, &BALL_STYLE);
    }
}

/// Connections first, particles on top
pub fn render_background(bg: &ParticleField, renderer: &mut dyn Renderer) {
    renderer.clear_frame();
    for c in bg.connections() {
        let style = Style::stroke(CONNECTION_COLOR, 0.5).with_alpha(c.strength * 0.3);
        renderer.draw_line(c.from, c.to, &style);
    }
    for p in bg.particles() {
        let color = if bg.near_pointer(p) {
            HOVER_COLOR
        } else {
            PARTICLE_COLOR
        };
        renderer.draw_circle(p.pos, p.size, &Style::fill(color).with_alpha(p.opacity));
    }
}
