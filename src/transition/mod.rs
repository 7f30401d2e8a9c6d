//! Timed presentation sequences
//!
//! - `scheduler`: one-shot `(action, delay)` sequencer
//! - `effect`: what a step does to the page
//! - `backend`: rich/basic producers of cover and page-intro sequences

pub mod backend;
pub mod effect;
pub mod scheduler;

pub use backend::{BasicTransitions, RichTransitions, TransitionBackend, select_backend};
pub use effect::{Cue, Display, Ease, Effect, Element, Pose, Tween};
pub use scheduler::{Step, TransitionScheduler, total_ms};
