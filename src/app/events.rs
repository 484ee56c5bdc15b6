//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port, on confirmed change only.
//! Adapters on the other side decide what to do with them: log to serial,
//! publish to the gateway, etc.

use crate::error::CommandError;
use crate::fsm::StateId;
use crate::fsm::brew::BrewSize;
use crate::sensors::led_classifier::LedState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// Classified LED pattern changed.
    LedChanged(LedState),

    /// The FSM transitioned between states.
    StateChanged {
        from: StateId,
        to: StateId,
        secs_in_previous: u32,
    },

    /// Machine power as observed (or re-asserted after a no-op command).
    Power(bool),

    /// A brew started (`true`), finished, or a brew request was refused.
    Brewing(bool),

    /// Size inferred from a finished brew; `size.code()` is 1, 2 or 0.
    BrewedSize { size: BrewSize, dwell_ms: u32 },

    /// Diagnostic: the brew matched neither size band.
    UnexpectedBrewDuration { dwell_ms: u32 },

    CupAvailable(bool),
    CupFull(bool),
    OutOfWater(bool),

    /// Diagnostic LED timing, only while debugging is enabled.
    PulseDiagnostic { last_pulse_ms: u32, glitches: u32 },

    /// A gateway command was refused.
    CommandRejected(CommandError),

    /// Full status, republished when the gateway reconnects.
    Status {
        state: StateId,
        led: LedState,
        cup_available: bool,
        cup_full: bool,
    },
}
