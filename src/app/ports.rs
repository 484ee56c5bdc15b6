//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (LED sense, cup detector, button outputs, buzzer, event
//! sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.

use heapless::Vec;

use crate::drivers::buzzer::Melody;
use crate::drivers::press::Button;
use crate::error::{ActuatorError, SensorError};
use crate::sensors::cup::CupReading;
use crate::sensors::pulse_timer::PulseSnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Latest LED edge timing captured by the ISR.
    fn led_pulses(&self) -> PulseSnapshot;

    /// One raw sample from the cup detector.
    fn read_cup(&mut self) -> Result<CupReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the machine's buttons
/// and the buzzer.
pub trait ActuatorPort {
    /// Start a simulated press.  Must not block.
    fn press(&mut self, button: Button, now_ms: u32) -> Result<(), ActuatorError>;

    /// Release every press whose hold time has elapsed.
    fn release_if_due(&mut self, now_ms: u32) -> Vec<Button, 3>;

    /// Whether any simulated press is still held.
    fn is_pressing(&self) -> bool;

    /// Start a melody, interrupting any current one.
    fn play(&mut self, melody: Melody, now_ms: u32);

    /// Advance the current melody by deadline.
    fn tick_buzzer(&mut self, now_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / gateway)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, gateway
/// publish, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
