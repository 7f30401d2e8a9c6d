//! One-shot chained step sequencer
//!
//! A schedule is plain data: an ordered list of `(action, delay)` steps. Each
//! delay counts from the moment the previous step fired (the first one from
//! `trigger`). The host feeds frame time through `advance` and performs
//! whatever actions come out, in order.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct Step<A> {
    pub action: A,
    /// Wait after the previous step before this one fires
    pub delay_ms: f64,
}

impl<A> Step<A> {
    pub fn new(delay_ms: f64, action: A) -> Self {
        Self { action, delay_ms }
    }

    /// Fires together with the previous step
    pub fn now(action: A) -> Self {
        Self::new(0.0, action)
    }

    /// Build chained steps from absolute start offsets
    ///
    /// Offsets need not be sorted; equal offsets keep their input order.
    pub fn timeline<I>(entries: I) -> Vec<Step<A>>
    where
        I: IntoIterator<Item = (f64, A)>,
    {
        let mut entries: Vec<(f64, A)> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut last = 0.0;
        entries
            .into_iter()
            .map(|(at, action)| {
                let at = at.max(last);
                let step = Step::new(at - last, action);
                last = at;
                step
            })
            .collect()
    }
}

/// Total time from trigger to the last step
pub fn total_ms<A>(steps: &[Step<A>]) -> f64 {
    steps.iter().map(|s| s.delay_ms.max(0.0)).sum()
}

#[derive(Debug)]
pub struct TransitionScheduler<A> {
    pending: VecDeque<Step<A>>,
    waited_ms: f64,
    triggered: bool,
}

impl<A> TransitionScheduler<A> {
    pub fn new(steps: Vec<Step<A>>) -> Self {
        Self {
            pending: steps.into(),
            waited_ms: 0.0,
            triggered: false,
        }
    }

    /// Start the sequence; a second trigger is ignored
    pub fn trigger(&mut self) -> bool {
        if self.triggered {
            log::debug!("Transition already triggered");
            return false;
        }
        self.triggered = true;
        self.waited_ms = 0.0;
        log::info!("Transition started ({} steps)", self.pending.len());
        true
    }

    /// Let `elapsed_ms` pass; returns every step that came due, in order
    ///
    /// Time left over after a step fires counts toward the next one, so a
    /// long frame can release several steps at once.
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<A> {
        let mut fired = Vec::new();
        if !self.triggered || self.pending.is_empty() {
            return fired;
        }

        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.waited_ms += elapsed_ms;
        }

        while let Some(step) = self.pending.front() {
            let delay = step.delay_ms.max(0.0);
            if self.waited_ms < delay {
                break;
            }
            self.waited_ms -= delay;
            if let Some(step) = self.pending.pop_front() {
                fired.push(step.action);
            }
        }

        if self.pending.is_empty() {
            self.waited_ms = 0.0;
            log::info!("Transition complete");
        }
        fired
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Triggered and every step has fired
    pub fn is_done(&self) -> bool {
        self.triggered && self.pending.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}
