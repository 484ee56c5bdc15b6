//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A gateway publisher would implement the same trait.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(v: bool) -> &'static str {
    if v { "ON" } else { "OFF" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state.as_str());
            }
            AppEvent::LedChanged(led) => {
                info!("LED   | {}", led.as_str());
            }
            AppEvent::StateChanged { from, to, secs_in_previous } => {
                info!(
                    "STATE | {} -> {} | time in last state: {}s",
                    from.as_str(),
                    to.as_str(),
                    secs_in_previous
                );
            }
            AppEvent::Power(on) => {
                info!("POWER | {}", on_off(*on));
            }
            AppEvent::Brewing(active) => {
                info!("BREW  | {}", active);
            }
            AppEvent::BrewedSize { size, dwell_ms } => {
                info!("BREW  | size={} dwell={}ms", size.code(), dwell_ms);
            }
            AppEvent::UnexpectedBrewDuration { dwell_ms } => {
                warn!("DEBUG | unexpected time in SENSEO_BREWING state: {}ms", dwell_ms);
            }
            AppEvent::CupAvailable(v) => {
                info!("CUP   | available={}", v);
            }
            AppEvent::CupFull(v) => {
                info!("CUP   | full={}", v);
            }
            AppEvent::OutOfWater(v) => {
                info!("WATER | out_of_water={}", v);
            }
            AppEvent::PulseDiagnostic { last_pulse_ms, glitches } => {
                debug!("PULSE | last={}ms glitches={}", last_pulse_ms, glitches);
            }
            AppEvent::CommandRejected(e) => {
                warn!("CMD   | rejected: {} ({})", e.code(), e);
            }
            AppEvent::Status { state, led, cup_available, cup_full } => {
                info!(
                    "STATUS| state={} led={} cup_available={} cup_full={}",
                    state.as_str(),
                    led.as_str(),
                    cup_available,
                    cup_full
                );
            }
        }
    }
}
