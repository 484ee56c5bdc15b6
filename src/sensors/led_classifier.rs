//! LED blink-pattern classifier.
//!
//! Turns the raw edge timing captured by the
//! [`PulseTimer`](super::pulse_timer::PulseTimer) into one of four LED
//! states.  Called once per poll, before the appliance FSM.
//!
//! | Evidence                                         | State       |
//! |--------------------------------------------------|-------------|
//! | no edge for `quiescent_window`, LED dark         | `Off`       |
//! | no edge for `quiescent_window`, LED lit          | `On`        |
//! | same-polarity period `< fast_blink_max_period`   | `FastBlink` |
//! | same-polarity period `>= fast_blink_max_period`  | `SlowBlink` |
//! | anything else (single edge, stale period)        | unchanged   |
//!
//! A period only counts as evidence while it is shorter than two quiescent
//! windows; otherwise the last "blink" was really a steady level changing
//! once, and the classifier waits for quiescence to decide.

use serde::{Deserialize, Serialize};

use super::pulse_timer::PulseSnapshot;
use crate::config::SystemConfig;

/// What the status LED is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedState {
    Off,
    SlowBlink,
    FastBlink,
    On,
}

impl LedState {
    pub const ALL: [LedState; 4] = [Self::Off, Self::SlowBlink, Self::FastBlink, Self::On];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "LED_OFF",
            Self::SlowBlink => "LED_SLOW",
            Self::FastBlink => "LED_FAST",
            Self::On => "LED_ON",
        }
    }
}

pub struct LedClassifier {
    state: LedState,
    changed: bool,
    last_pulse_ms: u32,
    quiescent_window_ms: u32,
    fast_blink_max_period_ms: u32,
}

impl LedClassifier {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            state: LedState::Off,
            changed: false,
            last_pulse_ms: 0,
            quiescent_window_ms: config.led_quiescent_window_ms,
            fast_blink_max_period_ms: config.led_fast_blink_max_period_ms,
        }
    }

    /// Classify the latest timing.  Returns the (possibly unchanged) state.
    pub fn update(&mut self, pulses: &PulseSnapshot, now_ms: u32) -> LedState {
        let next = self.classify(pulses, now_ms).unwrap_or(self.state);
        self.changed = next != self.state;
        self.state = next;
        self.last_pulse_ms = pulses.last_width_ms;
        next
    }

    pub fn state(&self) -> LedState {
        self.state
    }

    /// `true` only for the poll in which the state flipped.
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Width of the most recently completed LED pulse (diagnostics).
    pub fn last_pulse_ms(&self) -> u32 {
        self.last_pulse_ms
    }

    fn classify(&self, pulses: &PulseSnapshot, now_ms: u32) -> Option<LedState> {
        let quiet_for = now_ms.wrapping_sub(pulses.last_edge_ms);
        if quiet_for >= self.quiescent_window_ms {
            return Some(if pulses.lit { LedState::On } else { LedState::Off });
        }

        let period = pulses.last_period_ms;
        if period == 0 || period >= self.quiescent_window_ms.saturating_mul(2) {
            return None;
        }

        if period < self.fast_blink_max_period_ms {
            Some(LedState::FastBlink)
        } else {
            Some(LedState::SlowBlink)
        }
    }
}
