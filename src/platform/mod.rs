//! Platform abstraction layer
//!
//! Input arrives as [`InputEvent`]s and everything the app needs from the page
//! goes through [`Host`]. The browser implementation lives in `web`; tests use
//! in-memory hosts.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::Rect;
use crate::book::PageNavigator;
use crate::sim::{PresentationTarget, SessionOverlay};
use crate::transition::Effect;

/// Clickable things the app reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Cover,
    PrevButton,
    NextButton,
    NavLink(usize),
    /// The "BE CREATIVE" button that starts the mini-game
    GameTrigger,
    /// The mini-game canvas (releases a held ball)
    GameCanvas,
    /// The broken-count badge (restarts after a finished game)
    Counter,
    PauseButton,
    /// Abandons a running game and puts the page back
    ExitButton,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer position in viewport coordinates
    PointerMove { x: f32, y: f32 },
    Click(ClickTarget),
    KeyDown(String),
    /// Press on the book (touch or mouse button), horizontal position only
    DragStart { x: f32 },
    DragEnd { x: f32 },
    VisibilityChanged { hidden: bool },
    Blur,
    Resize { width: f32, height: f32 },
}

/// Page services the composition root depends on
pub trait Host {
    type Target: PresentationTarget;

    /// Breakable elements currently on the about page, in document order
    fn breakable_targets(&mut self) -> Vec<Self::Target>;

    /// Indestructible rectangles in field coordinates
    fn solid_rects(&mut self) -> Vec<Rect>;

    /// Mini-game field in viewport coordinates
    fn game_area(&self) -> Rect;

    /// Overlay handed to the game session (counter, pause button)
    fn session_overlay(&mut self) -> Box<dyn SessionOverlay>;

    fn apply_effect(&mut self, effect: &Effect);

    /// Reflect page states, boundary controls, indicator and nav links
    fn sync_book(&mut self, navigator: &PageNavigator);

    fn set_trigger_label(&mut self, text: &str);
}
