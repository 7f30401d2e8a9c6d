//! Ball integration and collision response
//!
//! One call to [`step`] advances a single free ball by one frame: integrate,
//! resolve the reflecting walls (left/right/top), resolve the paddle, then
//! report whether the ball fell out through the open bottom edge.
//!
//! Integration is scaled by the frame time normalized to a nominal 60 Hz
//! frame, so a ball moving `(3, -3)` moves exactly that far per nominal frame
//! regardless of the display refresh rate. Nothing here is random.

use super::state::{Ball, Field, Paddle};
use crate::consts::{MAX_FRAME_MS, MAX_FRAME_SCALE, NOMINAL_FRAME_MS};

/// Which side wall a ball touched this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
}

/// Result of one physics step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// Horizontal wall hit (left or right), if any
    pub side_wall: Option<Wall>,
    /// Whether the top wall was hit
    pub top_wall: bool,
    /// Whether the ball bounced off the paddle
    pub paddle_hit: bool,
    /// Ball crossed the open bottom edge and is out of play
    pub exited: bool,
}

impl StepResult {
    pub fn hit_wall(&self) -> bool {
        self.side_wall.is_some() || self.top_wall
    }
}

/// Paddle response parameters
#[derive(Debug, Clone, Copy)]
pub struct PaddleResponse {
    /// Horizontal speed given to a ball hitting the very edge of the paddle
    pub steer_factor: f32,
    /// Tolerance below the paddle face that still counts as a hit
    pub band_slack: f32,
}

/// Convert a frame's elapsed milliseconds into an integration scale
///
/// A nominal frame is 1.0. Frames longer than `MAX_FRAME_MS` are cut short;
/// callers split the result with [`substeps`].
pub fn frame_scale(elapsed_ms: f32) -> f32 {
    if !elapsed_ms.is_finite() {
        return 0.0;
    }
    (elapsed_ms.min(MAX_FRAME_MS) / NOMINAL_FRAME_MS).max(0.0)
}

/// Split a frame scale into substeps of at most `MAX_FRAME_SCALE`
pub fn substeps(scale: f32) -> impl Iterator<Item = f32> {
    let mut remaining = scale.max(0.0);
    std::iter::from_fn(move || {
        if remaining <= f32::EPSILON {
            return None;
        }
        let s = remaining.min(MAX_FRAME_SCALE);
        remaining -= s;
        Some(s)
    })
}

/// Advance a free ball by one frame
pub fn step(
    ball: &mut Ball,
    field: &Field,
    paddle: &Paddle,
    response: PaddleResponse,
    scale: f32,
) -> StepResult {
    let mut result = StepResult::default();

    ball.pos += ball.vel * scale;

    let size = ball.size();

    // Side walls: reflect toward the interior and clamp onto the boundary
    let max_x = (field.width - size).max(0.0);
    if ball.pos.x <= 0.0 {
        ball.vel.x = ball.vel.x.abs();
        ball.pos.x = 0.0;
        result.side_wall = Some(Wall::Left);
    } else if ball.pos.x >= max_x {
        ball.vel.x = -ball.vel.x.abs();
        ball.pos.x = max_x;
        result.side_wall = Some(Wall::Right);
    }

    if ball.pos.y <= 0.0 {
        ball.vel.y = ball.vel.y.abs();
        ball.pos.y = 0.0;
        result.top_wall = true;
    }

    if ball_paddle_collision(ball, paddle, response.band_slack) {
        ball.vel.y = -ball.vel.y.abs();
        ball.pos.y = paddle.pos.y - size;
        ball.vel.x = steer_velocity(ball, paddle, response.steer_factor);
        result.paddle_hit = true;
    }

    if ball.pos.y + size > field.height {
        result.exited = true;
    }

    result
}

/// Whether the ball's lower edge sits in the paddle's vertical band while
/// horizontally overlapping the paddle
pub fn ball_paddle_collision(ball: &Ball, paddle: &Paddle, band_slack: f32) -> bool {
    let bottom = ball.pos.y + ball.size();
    bottom >= paddle.pos.y
        && bottom <= paddle.pos.y + paddle.height + band_slack
        && ball.pos.x + ball.size() >= paddle.pos.x
        && ball.pos.x <= paddle.pos.x + paddle.width
}

/// Horizontal velocity after a paddle hit, proportional to the impact offset
/// from the paddle center (-1 at the left edge, +1 at the right edge)
pub fn steer_velocity(ball: &Ball, paddle: &Paddle, steer_factor: f32) -> f32 {
    let half = paddle.width / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    let offset = ((ball.center().x - paddle.center_x()) / half).clamp(-1.0, 1.0);
    steer_factor * offset
}

/// Bounce off a breakable target
#[inline]
pub fn reflect_vertical(ball: &mut Ball) {
    ball.vel.y = -ball.vel.y;
}

/// Bounce off the underside of a solid overlay (always pushed downward)
#[inline]
pub fn push_down(ball: &mut Ball) {
    ball.vel.y = ball.vel.y.abs();
}
