//! Breakable targets
//!
//! At session start every eligible element is snapshotted: its on-screen
//! rectangle is frozen in field coordinates and its original presentation is
//! saved. Hit-testing then runs against the frozen rectangles, never against
//! live layout, and a broken target never comes back until the snapshot is
//! restored.

use super::state::Ball;
use crate::Rect;
use crate::consts::BREAK_TRANSITION_MS;

/// Presentation collaborator failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// The element no longer exists
    #[error("presentation target is detached")]
    Detached,

    #[error("presentation backend error: {0}")]
    Backend(String),
}

/// Short-lived style a target animates into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientStyle {
    pub scale: f32,
    pub rotate_deg: f32,
    pub opacity: f32,
}

impl TransientStyle {
    /// Shrink, twist and fade out
    pub const SHATTER: TransientStyle = TransientStyle {
        scale: 0.2,
        rotate_deg: 20.0,
        opacity: 0.0,
    };
}

/// What the registry needs from each breakable element
pub trait PresentationTarget {
    /// Current rectangle in field coordinates, `None` if not rendered
    fn rect(&self) -> Option<Rect>;
    /// Remember the current presentation so it can be restored later
    fn save_original_style(&mut self) -> Result<(), TargetError>;
    fn set_visible(&mut self, visible: bool) -> Result<(), TargetError>;
    fn apply_transient_style(
        &mut self,
        style: TransientStyle,
        duration_ms: u32,
    ) -> Result<(), TargetError>;
    fn restore_original_style(&mut self) -> Result<(), TargetError>;
}

#[derive(Debug)]
struct Entry<T> {
    target: T,
    rect: Rect,
    broken: bool,
    /// Session clock time at which the shatter finishes and the target hides
    hide_at_ms: Option<f64>,
}

/// Snapshot of breakable targets for one session
#[derive(Debug)]
pub struct BreakableRegistry<T> {
    entries: Vec<Entry<T>>,
    broken_count: usize,
}

impl<T> Default for BreakableRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            broken_count: 0,
        }
    }
}

impl<T: PresentationTarget> BreakableRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture geometry and original style of every rendered target
    ///
    /// Targets without a rectangle (not rendered, detached) are skipped. A
    /// registry that already holds a snapshot ignores the call. Returns the
    /// number of targets captured.
    pub fn snapshot<I>(&mut self, targets: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        if !self.entries.is_empty() {
            log::debug!("snapshot ignored: registry already holds {} targets", self.entries.len());
            return 0;
        }

        for (i, mut target) in targets.into_iter().enumerate() {
            let Some(rect) = target.rect().filter(|r| !r.is_empty()) else {
                log::warn!("Skipping breakable #{}: not rendered", i);
                continue;
            };
            if let Err(e) = target.save_original_style() {
                log::warn!("Skipping breakable #{}: {}", i, e);
                continue;
            }
            self.entries.push(Entry {
                target,
                rect,
                broken: false,
                hide_at_ms: None,
            });
        }

        self.broken_count = 0;
        self.entries.len()
    }

    /// Indices of unbroken targets overlapping the ball's bounding box
    pub fn hit_test(&self, ball: &Ball) -> Vec<usize> {
        let bounds = ball.bounds();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.broken && e.rect.intersects(&bounds))
            .map(|(i, _)| i)
            .collect()
    }

    /// Flag a target broken and start its shatter transition
    ///
    /// Returns `false` if the target was already broken or doesn't exist.
    pub fn mark_broken(&mut self, index: usize, now_ms: f64) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        if entry.broken {
            return false;
        }

        entry.broken = true;
        entry.hide_at_ms = Some(now_ms + f64::from(BREAK_TRANSITION_MS));
        self.broken_count += 1;

        if let Err(e) = entry
            .target
            .apply_transient_style(TransientStyle::SHATTER, BREAK_TRANSITION_MS)
        {
            log::warn!("Breakable #{} transition failed: {}", index, e);
        }
        true
    }

    /// Hide targets whose shatter transition has finished
    pub fn advance(&mut self, now_ms: f64) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if entry.hide_at_ms.is_some_and(|t| now_ms >= t) {
                entry.hide_at_ms = None;
                if let Err(e) = entry.target.set_visible(false) {
                    log::warn!("Breakable #{} hide failed: {}", i, e);
                }
            }
        }
    }

    /// Write back every saved presentation and drop the snapshot
    ///
    /// Missing targets are skipped. Returns how many were restored; a second
    /// call restores nothing.
    pub fn restore_all(&mut self) -> usize {
        let mut restored = 0;
        for (i, mut entry) in self.entries.drain(..).enumerate() {
            match entry.target.restore_original_style() {
                Ok(()) => restored += 1,
                Err(e) => log::warn!("Breakable #{} not restored: {}", i, e),
            }
        }
        self.broken_count = 0;
        restored
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn broken_count(&self) -> usize {
        self.broken_count
    }

    /// Every captured target has been broken (false for an empty snapshot)
    pub fn all_broken(&self) -> bool {
        !self.entries.is_empty() && self.broken_count == self.entries.len()
    }

    pub fn is_broken(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| e.broken)
    }

    pub fn rect(&self, index: usize) -> Option<Rect> {
        self.entries.get(index).map(|e| e.rect)
    }
}
