//! Function-pointer finite state machine for the appliance's operating state.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  StateTable                                                │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐   │
//! │  │ StateId  │ on_enter  │ on_exit  │ on_update         │   │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤   │
//! │  │ Off      │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ Heating  │ —         │ —        │ fn(ctx)->Option<> │   │
//! │  │ Ready    │ fn(ctx)   │ —        │ fn(ctx)->Option<> │   │
//! │  │ Brewing  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ NoWater  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  └──────────┴───────────┴──────────┴───────────────────┘   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state with
//! the freshly classified LED state in the context.  If it returns
//! `Some(next)`, the transition is committed first (dwell time, previous,
//! current, entry timestamp) and only then are `on_exit(previous)` and
//! `on_enter(next)` run, so actions always observe the finished bookkeeping.

pub mod brew;
pub mod context;
pub mod states;

use context::MachineContext;
use log::info;
use serde::Serialize;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Operating state of the coffee machine.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum StateId {
    Off = 0,
    Heating = 1,
    Ready = 2,
    Brewing = 3,
    NoWater = 4,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 5;

    pub const ALL: [StateId; Self::COUNT] = [
        Self::Off,
        Self::Heating,
        Self::Ready,
        Self::Brewing,
        Self::NoWater,
    ];

    /// Convert an index back to `StateId`.  Out-of-range asserts in debug
    /// builds and falls back to `Off` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Off,
            1 => Self::Heating,
            2 => Self::Ready,
            3 => Self::Brewing,
            4 => Self::NoWater,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Off
            }
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "SENSEO_OFF",
            Self::Heating => "SENSEO_HEATING",
            Self::Ready => "SENSEO_READY",
            Self::Brewing => "SENSEO_BREWING",
            Self::NoWater => "SENSEO_NOWATER",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut MachineContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut MachineContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    previous: usize,
    /// `now_ms` at which the current state was entered.
    entered_at_ms: u32,
    /// Dwell time of the state left by the most recent transition.
    ms_in_last_state: u32,
    changed: bool,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            previous: initial as usize,
            entered_at_ms: 0,
            ms_in_last_state: 0,
            changed: false,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut MachineContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        self.entered_at_ms = ctx.now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one poll.  `ctx.led` and `ctx.now_ms` must be
    /// current.
    pub fn tick(&mut self, ctx: &mut MachineContext) {
        self.changed = false;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            if next_id as usize != self.current {
                self.transition(next_id, ctx);
            }
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn previous_state(&self) -> StateId {
        StateId::from_index(self.previous)
    }

    /// `true` only for the tick in which a transition committed.
    pub fn state_changed(&self) -> bool {
        self.changed
    }

    pub fn ms_in_last_state(&self) -> u32 {
        self.ms_in_last_state
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut MachineContext) {
        let next_idx = next_id as usize;

        // Commit before any action runs.
        self.ms_in_last_state = ctx.now_ms.wrapping_sub(self.entered_at_ms);
        self.previous = self.current;
        self.current = next_idx;
        self.entered_at_ms = ctx.now_ms;
        self.changed = true;
        ctx.ms_in_last_state = self.ms_in_last_state;

        info!(
            "FSM transition: {} -> {} after {} ms",
            self.table[self.previous].name, self.table[self.current].name, self.ms_in_last_state
        );

        if let Some(exit) = self.table[self.previous].on_exit {
            exit(ctx);
        }
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
