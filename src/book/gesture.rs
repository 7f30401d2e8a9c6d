//! Keyboard and swipe input mapped to navigation commands

use crate::consts::SWIPE_THRESHOLD;

/// Discrete navigation request, whatever the input source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Previous,
    Next,
    Goto(usize),
}

/// Arrow keys flip pages; everything else is ignored
pub fn key_command(key: &str) -> Option<NavCommand> {
    match key {
        "ArrowLeft" => Some(NavCommand::Previous),
        "ArrowRight" => Some(NavCommand::Next),
        _ => None,
    }
}

/// Horizontal swipe detector
///
/// A swipe to the right (finger moves right) goes back a page, a swipe to the
/// left goes forward. Movements at or under the threshold are taps.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    start_x: Option<f32>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(SWIPE_THRESHOLD)
    }
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.abs(),
            start_x: None,
        }
    }

    pub fn begin(&mut self, x: f32) {
        self.start_x = Some(x);
    }

    /// Finish the gesture; `None` without a matching `begin` or under threshold
    pub fn end(&mut self, x: f32) -> Option<NavCommand> {
        let dx = x - self.start_x.take()?;
        if dx > self.threshold {
            Some(NavCommand::Previous)
        } else if dx < -self.threshold {
            Some(NavCommand::Next)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.start_x = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.start_x.is_some()
    }
}
