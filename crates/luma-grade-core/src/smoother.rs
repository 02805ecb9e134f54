//! Temporal smoothing of the per-frame label stream.
//!
//! Raw per-frame classifications jitter at category boundaries; the smoother
//! keeps a bounded FIFO window of recent raw labels and reports the majority
//! label instead. One smoother instance belongs to one logical video stream
//! and calls must be serialized; there is no hidden global history.

use std::collections::VecDeque;

use crate::label::BrightnessLabel;

/// Default number of recent raw labels the majority vote runs over.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Sliding-window majority voter over raw brightness labels.
#[derive(Clone, Debug)]
pub struct LabelSmoother {
    window: VecDeque<BrightnessLabel>,
    capacity: usize,
}

impl Default for LabelSmoother {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelSmoother {
    /// Smoother with the default window of [`DEFAULT_SMOOTHING_WINDOW`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SMOOTHING_WINDOW)
    }

    /// Smoother with a custom window. A zero capacity is clamped to 1, which
    /// degenerates into pass-through.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record `raw` and return the majority label of the current window.
    ///
    /// When the window is full the oldest entry is evicted first (strict
    /// FIFO). Ties resolve to the tied label whose first occurrence in the
    /// window is earliest; the rule is deliberate and pinned by tests, not
    /// an accident of map iteration order.
    pub fn smooth(&mut self, raw: BrightnessLabel) -> BrightnessLabel {
        self.window.push_back(raw);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        // Counts in first-seen order; at most three distinct labels.
        let mut counts: Vec<(BrightnessLabel, usize)> =
            Vec::with_capacity(BrightnessLabel::ALL.len());
        for &label in &self.window {
            match counts.iter_mut().find(|(seen, _)| *seen == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label, 1)),
            }
        }

        let mut best = counts[0];
        for &(label, n) in &counts[1..] {
            if n > best.1 {
                best = (label, n);
            }
        }
        best.0
    }

    /// Forget the window, e.g. between unrelated video sessions.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Number of raw labels currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Configured window capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BrightnessLabel::{High, Low, Optimal};

    #[test]
    fn majority_wins_before_eviction() {
        let mut smoother = LabelSmoother::new();
        let mut last = None;
        for raw in [Low, Low, Optimal, Low, High] {
            last = Some(smoother.smooth(raw));
        }
        assert_eq!(last, Some(Low));
        assert_eq!(smoother.len(), 5);
    }

    /// The sixth frame evicts the oldest `Low`, leaving a 2-2 tie between
    /// `Low` and `High`; `Low` appears first in the window and wins.
    #[test]
    fn tie_resolves_to_first_seen_label() {
        let mut smoother = LabelSmoother::new();
        for raw in [Low, Low, Optimal, Low, High] {
            smoother.smooth(raw);
        }
        assert_eq!(smoother.smooth(High), Low);
        assert_eq!(smoother.len(), 5);
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let mut smoother = LabelSmoother::with_capacity(5);
        for _ in 0..6 {
            smoother.smooth(Optimal);
        }
        assert_eq!(smoother.len(), 5);
        for _ in 0..100 {
            smoother.smooth(High);
        }
        assert_eq!(smoother.len(), 5);
    }

    #[test]
    fn stale_majority_ages_out() {
        let mut smoother = LabelSmoother::new();
        for raw in [Low, Low, Low, High, High] {
            smoother.smooth(raw);
        }
        assert_eq!(smoother.smooth(High), High);
        assert_eq!(smoother.smooth(High), High);
    }

    #[test]
    fn reset_clears_the_window() {
        let mut smoother = LabelSmoother::new();
        for raw in [High, High, High] {
            smoother.smooth(raw);
        }
        smoother.reset();
        assert!(smoother.is_empty());
        // A fresh session is not influenced by the previous one.
        assert_eq!(smoother.smooth(Low), Low);
    }

    #[test]
    fn capacity_one_is_pass_through() {
        let mut smoother = LabelSmoother::with_capacity(0);
        assert_eq!(smoother.capacity(), 1);
        assert_eq!(smoother.smooth(High), High);
        assert_eq!(smoother.smooth(Low), Low);
    }
}
