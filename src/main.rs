//! Senseo Bridge Firmware: Main Entry Point
//!
//! Hexagonal architecture with a fixed-period poll loop and one ISR.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   Esp32Time   Gateway inbox   │
//! │  (Sensor+Actuator)  (EventSink)    (clock)     (commands)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  LED classifier · FSM · cup detector · guards          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  LED-sense ISR ──▶ PulseTimer atomics ──▶ poll loop            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::hal::delay::FreeRtos;

use senseo_bridge::adapters::gateway::{COMMAND_INBOX, GatewayReceiver};
use senseo_bridge::adapters::hardware::HardwareAdapter;
use senseo_bridge::adapters::log_sink::LogEventSink;
use senseo_bridge::adapters::time::Esp32TimeAdapter;
use senseo_bridge::app::commands::CommandOutcome;
use senseo_bridge::app::ports::ActuatorPort;
use senseo_bridge::app::service::AppService;
use senseo_bridge::config::SystemConfig;
use senseo_bridge::drivers::hw_init;
use senseo_bridge::sensors::LED_PULSES;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Senseo Bridge v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    if let Err(e) = config.validate() {
        error!("built-in config invalid: {}", e);
        anyhow::bail!("config: {}", e);
    }

    // ── 3. Peripherals + LED-sense ISR ────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Without GPIO/ADC the bridge can do nothing.
        error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    LED_PULSES.set_min_width(config.led_min_pulse_width_ms);
    if let Err(e) = hw_init::init_isr_service() {
        error!("LED-sense ISR init failed: {}, machine state will stay LED_OFF", e);
    }

    // ── 4. Adapters + app service ─────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut hw = HardwareAdapter::new(&LED_PULSES, config.button_press_ms);
    let mut sink = LogEventSink::new();
    let inbox = GatewayReceiver::new(&COMMAND_INBOX);
    let poll_ms = config.poll_interval_ms;

    let mut app = AppService::new(config);
    app.start(clock.uptime_ms(), &mut hw, &mut sink);

    info!("System ready. Polling every {} ms.", poll_ms);

    // ── 5. Poll loop ──────────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();
        app.tick(now_ms, &mut hw, &mut sink);

        while let Some(req) = inbox.poll() {
            let outcome = app.handle_request(&req, now_ms, &mut hw, &mut sink);
            if outcome == CommandOutcome::ResetRequested {
                restart(&clock, &mut hw);
            }
        }

        FreeRtos::delay_ms(poll_ms);
    }
}

/// Let the reset melody finish, then reboot.
fn restart(clock: &Esp32TimeAdapter, hw: &mut HardwareAdapter) -> ! {
    warn!("Restarting on gateway request");
    while hw.is_buzzing() {
        hw.tick_buzzer(clock.uptime_ms());
        FreeRtos::delay_ms(10);
    }
    // SAFETY: plain ROM call; does not return.
    unsafe { esp_idf_svc::sys::esp_restart() }
}
