//! Interrupt-side LED edge timer.
//!
//! The machine's status LED is wired through an optocoupler to a GPIO
//! configured for any-edge interrupts.  On every edge the ISR calls
//! [`PulseTimer::on_edge`], which records timing into word-sized atomics and
//! returns.  No classification happens here; the poll loop reads a
//! [`PulseSnapshot`] and hands it to the
//! [`LedClassifier`](super::led_classifier::LedClassifier).
//!
//! ## Shared-state contract
//!
//! Single writer (ISR), single reader (poll loop), no locks.  The edge
//! counter is published last with `Release` and read first with `Acquire`;
//! the remaining fields are individually atomic, so a read racing an edge
//! yields values at most one edge stale.
//!
//! ## Glitch rejection
//!
//! An edge arriving less than `min_width_ms` after the previous one means
//! the two edges bracket a spurious pulse.  The second edge restores the
//! timing the first one overwrote (one level of undo, O(1)), so a single
//! noise spike leaves the period/width history untouched.
//!
//! Timestamps are milliseconds since boot truncated to `u32`; all arithmetic
//! is wrapping.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

const SEEN_RISE: u8 = 0b01;
const SEEN_FALL: u8 = 0b10;

/// A point-in-time copy of the edge timing, taken by the poll loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PulseSnapshot {
    /// Committed (non-glitch) edges since boot.
    pub edges: u32,
    /// Current LED level; `true` = lit.
    pub lit: bool,
    /// Timestamp of the last committed edge (or the boot seed).
    pub last_edge_ms: u32,
    /// Duration of the level that the last edge ended.
    pub last_width_ms: u32,
    /// Time between the last edge and the previous edge of the same
    /// polarity.  `0` until two same-polarity edges have been seen.
    pub last_period_ms: u32,
    /// Spurious pulses rejected so far.
    pub glitches: u32,
}

/// ISR-owned edge timing.  `const`-constructible so the hardware instance
/// can be a `static`; tests build their own.
pub struct PulseTimer {
    edges: AtomicU32,
    lit: AtomicBool,
    last_edge_ms: AtomicU32,
    last_rise_ms: AtomicU32,
    last_fall_ms: AtomicU32,
    seen: AtomicU8,
    last_width_ms: AtomicU32,
    last_period_ms: AtomicU32,
    min_width_ms: AtomicU32,
    glitches: AtomicU32,

    // One level of undo for the most recent committed edge.
    undo_armed: AtomicBool,
    undo_was_rise: AtomicBool,
    undo_edge_ms: AtomicU32,
    undo_same_ms: AtomicU32,
    undo_seen: AtomicU8,
    undo_width_ms: AtomicU32,
    undo_period_ms: AtomicU32,
}

impl PulseTimer {
    pub const fn new(min_width_ms: u32) -> Self {
        Self {
            edges: AtomicU32::new(0),
            lit: AtomicBool::new(false),
            last_edge_ms: AtomicU32::new(0),
            last_rise_ms: AtomicU32::new(0),
            last_fall_ms: AtomicU32::new(0),
            seen: AtomicU8::new(0),
            last_width_ms: AtomicU32::new(0),
            last_period_ms: AtomicU32::new(0),
            min_width_ms: AtomicU32::new(min_width_ms),
            glitches: AtomicU32::new(0),
            undo_armed: AtomicBool::new(false),
            undo_was_rise: AtomicBool::new(false),
            undo_edge_ms: AtomicU32::new(0),
            undo_same_ms: AtomicU32::new(0),
            undo_seen: AtomicU8::new(0),
            undo_width_ms: AtomicU32::new(0),
            undo_period_ms: AtomicU32::new(0),
        }
    }

    /// Retune the noise filter (applied from the next edge on).
    pub fn set_min_width(&self, ms: u32) {
        self.min_width_ms.store(ms, Ordering::Relaxed);
    }

    /// Record the LED level sampled at boot, before interrupts are enabled.
    /// Starts the quiescence clock without counting an edge.
    pub fn seed_level(&self, lit: bool, now_ms: u32) {
        self.lit.store(lit, Ordering::Relaxed);
        self.last_edge_ms.store(now_ms, Ordering::Release);
    }

    /// ISR entry point.  O(1), lock-free, never blocks.
    pub fn on_edge(&self, lit: bool, now_ms: u32) {
        let prev_edge = self.last_edge_ms.load(Ordering::Relaxed);
        let width = now_ms.wrapping_sub(prev_edge);

        if width < self.min_width_ms.load(Ordering::Relaxed)
            && self.undo_armed.swap(false, Ordering::Relaxed)
        {
            self.rollback(lit);
            return;
        }

        let (slot, bit) = if lit {
            (&self.last_rise_ms, SEEN_RISE)
        } else {
            (&self.last_fall_ms, SEEN_FALL)
        };
        let prev_same = slot.load(Ordering::Relaxed);
        let seen = self.seen.load(Ordering::Relaxed);

        self.undo_was_rise.store(lit, Ordering::Relaxed);
        self.undo_edge_ms.store(prev_edge, Ordering::Relaxed);
        self.undo_same_ms.store(prev_same, Ordering::Relaxed);
        self.undo_seen.store(seen, Ordering::Relaxed);
        self.undo_width_ms
            .store(self.last_width_ms.load(Ordering::Relaxed), Ordering::Relaxed);
        self.undo_period_ms
            .store(self.last_period_ms.load(Ordering::Relaxed), Ordering::Relaxed);
        self.undo_armed.store(true, Ordering::Relaxed);

        let period = if seen & bit != 0 {
            now_ms.wrapping_sub(prev_same)
        } else {
            0
        };

        slot.store(now_ms, Ordering::Relaxed);
        self.seen.store(seen | bit, Ordering::Relaxed);
        self.last_width_ms.store(width, Ordering::Relaxed);
        self.last_period_ms.store(period, Ordering::Relaxed);
        self.last_edge_ms.store(now_ms, Ordering::Relaxed);
        self.lit.store(lit, Ordering::Relaxed);
        self.edges.fetch_add(1, Ordering::Release);
    }

    /// Read the current timing.  Called once per poll.
    pub fn snapshot(&self) -> PulseSnapshot {
        let edges = self.edges.load(Ordering::Acquire);
        PulseSnapshot {
            edges,
            lit: self.lit.load(Ordering::Relaxed),
            last_edge_ms: self.last_edge_ms.load(Ordering::Relaxed),
            last_width_ms: self.last_width_ms.load(Ordering::Relaxed),
            last_period_ms: self.last_period_ms.load(Ordering::Relaxed),
            glitches: self.glitches.load(Ordering::Relaxed),
        }
    }

    /// Undo the previous edge: it and the current one were a single spike.
    fn rollback(&self, lit: bool) {
        let slot = if self.undo_was_rise.load(Ordering::Relaxed) {
            &self.last_rise_ms
        } else {
            &self.last_fall_ms
        };
        slot.store(self.undo_same_ms.load(Ordering::Relaxed), Ordering::Relaxed);
        self.seen
            .store(self.undo_seen.load(Ordering::Relaxed), Ordering::Relaxed);
        self.last_width_ms
            .store(self.undo_width_ms.load(Ordering::Relaxed), Ordering::Relaxed);
        self.last_period_ms
            .store(self.undo_period_ms.load(Ordering::Relaxed), Ordering::Relaxed);
        self.last_edge_ms
            .store(self.undo_edge_ms.load(Ordering::Relaxed), Ordering::Relaxed);
        self.lit.store(lit, Ordering::Relaxed);
        self.glitches.fetch_add(1, Ordering::Relaxed);
        self.edges.fetch_sub(1, Ordering::Release);
    }
}
