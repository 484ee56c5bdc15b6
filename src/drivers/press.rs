//! Simulated front-panel button presses.
//!
//! Each button is an open-collector output wired in parallel with the
//! machine's own tactile switch.  `press` drives it active and records a
//! deadline; `release_if_due` (called once per poll) lets it go.  Nothing
//! here blocks or sleeps, and no machine-state validation happens at this
//! layer.

use embedded_hal::digital::OutputPin;
use heapless::Vec;
use log::{debug, warn};

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Power,
    /// One cup.
    Left,
    /// Two cups.
    Right,
}

impl Button {
    pub const ALL: [Button; 3] = [Self::Power, Self::Left, Self::Right];

    const fn index(self) -> usize {
        match self {
            Self::Power => 0,
            Self::Left => 1,
            Self::Right => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

struct Channel<P> {
    pin: P,
    /// `Some(asserted_at_ms)` while held.
    held_since: Option<u32>,
}

pub struct ButtonPresser<P: OutputPin> {
    channels: [Channel<P>; 3],
    press_ms: u32,
}

impl<P: OutputPin> ButtonPresser<P> {
    pub fn new(power: P, left: P, right: P, press_ms: u32) -> Self {
        let idle = |pin| Channel { pin, held_since: None };
        Self {
            channels: [idle(power), idle(left), idle(right)],
            press_ms,
        }
    }

    /// Assert `button`.  Pressing an already-held button restarts its hold.
    pub fn press(&mut self, button: Button, now_ms: u32) -> Result<(), ActuatorError> {
        let ch = &mut self.channels[button.index()];
        ch.pin.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        ch.held_since = Some(now_ms);
        debug!("press: {} down", button.as_str());
        Ok(())
    }

    /// Release every button held for at least the press duration.
    /// Returns the buttons released on this call.
    pub fn release_if_due(&mut self, now_ms: u32) -> Vec<Button, 3> {
        let mut released = Vec::new();
        for button in Button::ALL {
            let ch = &mut self.channels[button.index()];
            let Some(since) = ch.held_since else {
                continue;
            };
            if now_ms.wrapping_sub(since) < self.press_ms {
                continue;
            }
            if ch.pin.set_low().is_err() {
                // Stay held; the next poll retries the release.
                warn!("press: failed to release {}", button.as_str());
                continue;
            }
            ch.held_since = None;
            debug!("press: {} up", button.as_str());
            let _ = released.push(button);
        }
        released
    }

    pub fn is_pressing(&self) -> bool {
        self.channels.iter().any(|ch| ch.held_since.is_some())
    }
}
