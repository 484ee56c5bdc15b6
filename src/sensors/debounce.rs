//! Consecutive-sample debouncer for boolean signals.
//!
//! The stable value flips only after `threshold` samples in a row disagree
//! with it.  A single agreeing sample resets the count, so chatter around a
//! transition never produces a flip.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounced {
    stable: bool,
    count: u8,
    threshold: u8,
}

impl Debounced {
    /// `threshold` is clamped to at least 1.
    pub fn new(threshold: u8, initial: bool) -> Self {
        Self {
            stable: initial,
            count: 0,
            threshold: threshold.max(1),
        }
    }

    /// Feed one sample.  Returns `true` if the stable value flipped.
    pub fn update(&mut self, sample: bool) -> bool {
        if sample == self.stable {
            self.count = 0;
            return false;
        }
        self.count = self.count.saturating_add(1);
        if self.count >= self.threshold {
            self.stable = sample;
            self.count = 0;
            return true;
        }
        false
    }

    pub fn stable(&self) -> bool {
        self.stable
    }
}
