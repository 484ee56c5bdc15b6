//! Shared context threaded through every FSM handler.
//!
//! The poll loop writes the classified LED state and the current time into
//! `MachineContext` before each tick.  Handlers never touch hardware; they
//! push [`MachineAction`]s into a bounded outbox that the orchestrator
//! drains and turns into events, melodies and cup bookkeeping.

use heapless::Vec;
use log::warn;

use super::brew::BrewSize;
use crate::config::SystemConfig;
use crate::drivers::buzzer::Melody;
use crate::sensors::led_classifier::LedState;

/// Outbox capacity.  The busiest transition (Brewing → NoWater) pushes five.
pub const ACTION_CAPACITY: usize = 8;

// ---------------------------------------------------------------------------
// Actions (written by state handlers; consumed by the orchestrator)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineAction {
    /// Machine switched on (`true`) or off.
    Power(bool),
    /// A brew started or finished.
    Brewing(bool),
    /// The cup under the spout received a brew.
    CupFilled,
    /// Size inferred from the finished brew.
    BrewedSize(BrewSize),
    /// Water tank empty (`true`) or refilled.
    OutOfWater(bool),
    /// Audible cue, subject to the buzzer setting.
    Play(Melody),
}

// ---------------------------------------------------------------------------
// MachineContext
// ---------------------------------------------------------------------------

pub struct MachineContext {
    // -- Inputs (set before each tick) --
    pub now_ms: u32,
    pub led: LedState,

    // -- Timing (set by the engine) --
    /// Time spent in the state that was just left.  Valid in exit/enter
    /// actions of the transition that set it.
    pub ms_in_last_state: u32,

    pub config: SystemConfig,

    // -- Outputs --
    pub actions: Vec<MachineAction, ACTION_CAPACITY>,
}

impl MachineContext {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            now_ms: 0,
            led: LedState::Off,
            ms_in_last_state: 0,
            config,
            actions: Vec::new(),
        }
    }

    /// Queue an action.  Overflow drops the action with a warning.
    pub fn emit(&mut self, action: MachineAction) {
        if self.actions.push(action).is_err() {
            warn!("FSM outbox full, dropped {action:?}");
        }
    }

    /// Take every queued action, oldest first.
    pub fn drain(&mut self) -> Vec<MachineAction, ACTION_CAPACITY> {
        core::mem::take(&mut self.actions)
    }
}
