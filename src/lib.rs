//! Folio - a book-style portfolio front end
//!
//! Core modules:
//! - `sim`: Deterministic mini-game simulation (physics, breakables, session) and the particle background
//! - `book`: Page navigator and the gesture/keyboard input that drives it
//! - `transition`: One-shot cover sequence, presentation effects, transition backends
//! - `renderer`: Renderer trait and per-frame scene model
//! - `platform`: Input event model and browser adapters
//! - `app`: Composition root that owns every controller

pub mod app;
pub mod book;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod transition;

pub use app::App;
pub use settings::Settings;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Front-end configuration constants
pub mod consts {
    /// Nominal frame duration the physics step is normalized against (60 Hz)
    pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest scale a single physics substep integrates (longer frames are split)
    pub const MAX_FRAME_SCALE: f32 = 1.0;
    /// Longest frame simulated; anything past this (tab switch, debugger) is dropped
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 80.0;
    pub const PADDLE_HEIGHT: f32 = 10.0;
    /// Distance from the field bottom to the paddle's top edge
    pub const PADDLE_BOTTOM_OFFSET: f32 = 30.0;
    /// Extra tolerance below the paddle face that still counts as a paddle hit
    pub const PADDLE_BAND_SLACK: f32 = 5.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 4.0;
    /// Gap between a held ball and the paddle face
    pub const HELD_BALL_GAP: f32 = 2.0;
    pub const LAUNCH_SPEED_Y: f32 = 3.0;
    /// Launch horizontal velocity is drawn from [-spread/2, spread/2)
    pub const LAUNCH_SPREAD_X: f32 = 4.0;
    /// Horizontal speed at the paddle edge (center hits go straight up)
    pub const STEER_FACTOR: f32 = 3.0;
    pub const MAX_BALLS: usize = 3;

    /// How long a broken target plays its shatter transition before hiding
    pub const BREAK_TRANSITION_MS: u32 = 400;
    /// Delay between "try again" and the next session starting
    pub const RESTART_DELAY_MS: u32 = 300;

    /// Minimum horizontal swipe/drag displacement that counts as a page turn
    pub const SWIPE_THRESHOLD: f32 = 40.0;
}

/// Axis-aligned rectangle in field coordinates (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap test (touching edges don't count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Zero-area rectangles are treated as not rendered
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Shared edge only
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(20.0, 20.0, 1.0, 1.0)));
    }

    #[test]
    fn test_rect_empty() {
        assert!(Rect::new(3.0, 3.0, 0.0, 5.0).is_empty());
        assert!(!Rect::new(3.0, 3.0, 1.0, 5.0).is_empty());
    }
}
