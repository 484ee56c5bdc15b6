//! Concrete state handler functions and table builder.
//!
//! Each state is three plain `fn` pointers.  Transitions are driven purely
//! by the classified LED state:
//!
//! ```text
//!            ┌──────── LED on ────────┐
//!            │                        ▼
//!  OFF ──slow──▶ HEATING ──on──▶ READY ──slow──▶ BREWING
//!   ▲                              ▲                │
//!   │                              └──────on────────┘
//!   └────────── LED off (from any state) ──────────
//!
//!  any ──fast──▶ NOWATER ──slow──▶ HEATING
//!                   └─────on─────▶ READY
//! ```
//!
//! A blink pattern that means "stay" (e.g. slow blink while brewing) is
//! not a transition and fires no actions.

use log::info;

use super::brew::BrewSize;
use super::context::{MachineAction, MachineContext};
use super::{StateDescriptor, StateId};
use crate::drivers::buzzer::Melody;
use crate::sensors::led_classifier::LedState;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Off
        StateDescriptor {
            id: StateId::Off,
            name: "SENSEO_OFF",
            on_enter: Some(off_enter),
            on_exit: Some(off_exit),
            on_update: off_update,
        },
        // Index 1: Heating
        StateDescriptor {
            id: StateId::Heating,
            name: "SENSEO_HEATING",
            on_enter: None,
            on_exit: None,
            on_update: heating_update,
        },
        // Index 2: Ready
        StateDescriptor {
            id: StateId::Ready,
            name: "SENSEO_READY",
            on_enter: Some(ready_enter),
            on_exit: None,
            on_update: ready_update,
        },
        // Index 3: Brewing
        StateDescriptor {
            id: StateId::Brewing,
            name: "SENSEO_BREWING",
            on_enter: Some(brewing_enter),
            on_exit: Some(brewing_exit),
            on_update: brewing_update,
        },
        // Index 4: NoWater
        StateDescriptor {
            id: StateId::NoWater,
            name: "SENSEO_NOWATER",
            on_enter: Some(no_water_enter),
            on_exit: Some(no_water_exit),
            on_update: no_water_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &mut MachineContext) {
    ctx.emit(MachineAction::Power(false));
}

fn off_exit(ctx: &mut MachineContext) {
    ctx.emit(MachineAction::Power(true));
}

fn off_update(ctx: &mut MachineContext) -> Option<StateId> {
    match ctx.led {
        LedState::SlowBlink => Some(StateId::Heating),
        LedState::FastBlink => Some(StateId::NoWater),
        LedState::On => Some(StateId::Ready),
        LedState::Off => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  HEATING
// ═══════════════════════════════════════════════════════════════════════════

fn heating_update(ctx: &mut MachineContext) -> Option<StateId> {
    match ctx.led {
        LedState::Off => Some(StateId::Off),
        LedState::FastBlink => Some(StateId::NoWater),
        LedState::On => Some(StateId::Ready),
        LedState::SlowBlink => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  READY
// ═══════════════════════════════════════════════════════════════════════════

fn ready_enter(ctx: &mut MachineContext) {
    ctx.emit(MachineAction::Play(Melody::Ready));
}

fn ready_update(ctx: &mut MachineContext) -> Option<StateId> {
    match ctx.led {
        LedState::Off => Some(StateId::Off),
        LedState::SlowBlink => Some(StateId::Brewing),
        LedState::FastBlink => Some(StateId::NoWater),
        LedState::On => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  BREWING
// ═══════════════════════════════════════════════════════════════════════════

fn brewing_enter(ctx: &mut MachineContext) {
    ctx.emit(MachineAction::Brewing(true));
}

fn brewing_exit(ctx: &mut MachineContext) {
    let size = BrewSize::classify(ctx.ms_in_last_state, &ctx.config);
    info!(
        "BREWING: done after {} ms, size code {}",
        ctx.ms_in_last_state,
        size.code()
    );
    ctx.emit(MachineAction::Brewing(false));
    ctx.emit(MachineAction::CupFilled);
    ctx.emit(MachineAction::BrewedSize(size));
}

fn brewing_update(ctx: &mut MachineContext) -> Option<StateId> {
    match ctx.led {
        LedState::Off => Some(StateId::Off),
        LedState::FastBlink => Some(StateId::NoWater),
        LedState::On => Some(StateId::Ready),
        LedState::SlowBlink => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  NOWATER
// ═══════════════════════════════════════════════════════════════════════════

fn no_water_enter(ctx: &mut MachineContext) {
    ctx.emit(MachineAction::OutOfWater(true));
    ctx.emit(MachineAction::Play(Melody::NoWater));
}

fn no_water_exit(ctx: &mut MachineContext) {
    ctx.emit(MachineAction::OutOfWater(false));
}

fn no_water_update(ctx: &mut MachineContext) -> Option<StateId> {
    match ctx.led {
        LedState::Off => Some(StateId::Off),
        LedState::SlowBlink => Some(StateId::Heating),
        LedState::On => Some(StateId::Ready),
        LedState::FastBlink => None,
    }
}
