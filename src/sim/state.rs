//! Mini-game entities and session state types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::settings::GameTuning;

/// Play field dimensions (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Ball state - riding the paddle or free-moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Rendered on the paddle, not yet subject to physics
    Held,
    Free,
}

/// A ball entity
///
/// `pos` is the top-left corner of the ball's bounding square, so the ball
/// occupies `[pos, pos + 2 * radius]` on both axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: BallState,
}

impl Ball {
    pub fn new(id: u32, radius: f32) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            state: BallState::Held,
        }
    }

    /// Edge length of the bounding square
    #[inline]
    pub fn size(&self) -> f32 {
        self.radius * 2.0
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.radius)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size(), self.size())
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.state == BallState::Held
    }

    /// Pin a held ball just above the paddle center
    pub fn follow(&mut self, paddle: &Paddle, gap: f32) {
        if self.is_held() {
            self.pos = Vec2::new(
                paddle.center_x() - self.radius,
                paddle.pos.y - self.size() - gap,
            );
        }
    }

    /// Release a held ball with the given velocity
    pub fn release(&mut self, vel: Vec2) {
        if self.is_held() {
            self.vel = vel;
            self.state = BallState::Free;
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    /// Paddle centered horizontally, `bottom_offset` above the field bottom
    pub fn centered(field: &Field, tuning: &GameTuning) -> Self {
        Self {
            pos: Vec2::new(
                field.width / 2.0 - tuning.paddle_width / 2.0,
                field.height - tuning.paddle_bottom_offset,
            ),
            width: tuning.paddle_width,
            height: tuning.paddle_height,
        }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Center the paddle on a pointer x, clamped inside the field
    pub fn track_pointer(&mut self, pointer_x: f32, field: &Field) {
        let max_x = (field.width - self.width).max(0.0);
        self.pos.x = (pointer_x - self.width / 2.0).clamp(0.0, max_x);
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    /// Label the trigger control shows after the session ends
    pub fn banner(&self) -> &'static str {
        match self {
            Outcome::Won => "🎉 You Win! Click to Play Again",
            Outcome::Lost => "Try Again?",
        }
    }

    /// How long the banner stays before the trigger label is restored
    pub fn banner_ms(&self) -> u32 {
        match self {
            Outcome::Won => 3000,
            Outcome::Lost => 2000,
        }
    }
}

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    Active,
    Paused,
    Ended(Outcome),
}

/// Something that happened during a frame tick (for sound/HUD/logging hooks)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Released,
    WallHit,
    PaddleHit,
    SolidHit,
    TargetBroken { index: usize },
    BallLost { id: u32 },
    BallSplit { id: u32 },
    Ended(Outcome),
}
