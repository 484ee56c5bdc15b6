//! End-to-end flow tests: scripted LED patterns → FSM → events.
//!
//! The LED is driven edge by edge through the mock's `PulseTimer`, the
//! service is polled every 20 ms exactly as the firmware loop does, and the
//! resulting event stream is checked.

use senseo_bridge::app::commands::{CommandKind, CommandOutcome};
use senseo_bridge::app::events::AppEvent;
use senseo_bridge::config::SystemConfig;
use senseo_bridge::drivers::buzzer::Melody;
use senseo_bridge::fsm::StateId;
use senseo_bridge::fsm::brew::BrewSize;
use senseo_bridge::sensors::led_classifier::LedState;

use crate::mock_hw::Rig;

fn brewed(r: &Rig) -> Vec<BrewSize> {
    r.sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::BrewedSize { size, .. } => Some(*size),
            _ => None,
        })
        .collect()
}

/// Brew cycle from Ready: press, blink for `ms`, settle back to steady on.
fn brew_cycle(r: &mut Rig, value: &str, ms: u32) {
    assert_eq!(r.command(CommandKind::Brew, value), CommandOutcome::Accepted);
    r.advance(200);
    r.blink_for(ms, 1000);
    r.hold_led(true, 3000);
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_announces_off() {
    let r = Rig::new(SystemConfig::default());
    assert_eq!(r.state(), StateId::Off);
    assert_eq!(r.sink.events.first(), Some(&AppEvent::Started(StateId::Off)));
    assert!(r.sink.contains(&AppEvent::Power(false)));
    assert_eq!(r.hw.melodies, vec![Melody::Startup]);
}

#[test]
fn dark_led_stays_off() {
    let mut r = Rig::new(SystemConfig::default());
    r.hold_led(false, 10_000);
    assert_eq!(r.state(), StateId::Off);
    assert!(r.sink.transitions().is_empty());
}

// ── Warm-up ───────────────────────────────────────────────────

#[test]
fn warm_up_goes_through_heating_to_ready() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    assert_eq!(
        r.sink.transitions(),
        vec![(StateId::Off, StateId::Heating), (StateId::Heating, StateId::Ready)]
    );
    assert!(r.sink.contains(&AppEvent::Power(true)));
    assert!(r.sink.contains(&AppEvent::LedChanged(LedState::SlowBlink)));
    assert!(r.sink.contains(&AppEvent::LedChanged(LedState::On)));
    assert_eq!(r.hw.melodies.last(), Some(&Melody::Ready));
}

#[test]
fn heating_dwell_reported_in_seconds() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    let secs = r.sink.events.iter().find_map(|e| match e {
        AppEvent::StateChanged {
            from: StateId::Heating,
            secs_in_previous,
            ..
        } => Some(*secs_in_previous),
        _ => None,
    });
    // Entered on the second same-polarity edge, left 1.5 s after the last.
    assert_eq!(secs, Some(39));
}

#[test]
fn machine_switched_on_while_already_hot_goes_straight_to_ready() {
    let mut r = Rig::new(SystemConfig::default());
    r.hold_led(true, 3000);
    assert_eq!(r.state(), StateId::Ready);
    assert_eq!(r.sink.transitions(), vec![(StateId::Off, StateId::Ready)]);
}

// ── Brewing ───────────────────────────────────────────────────

#[test]
fn one_cup_brew_detected() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    r.sink.clear();

    brew_cycle(&mut r, "1cup", 18_000);

    assert_eq!(r.state(), StateId::Ready);
    assert_eq!(
        r.sink.transitions(),
        vec![(StateId::Ready, StateId::Brewing), (StateId::Brewing, StateId::Ready)]
    );
    assert_eq!(brewed(&r), vec![BrewSize::OneCup]);
    assert!(r.sink.contains(&AppEvent::Brewing(true)));
    assert!(r.sink.contains(&AppEvent::Brewing(false)));
    assert!(r.sink.contains(&AppEvent::CupFull(true)));
}

#[test]
fn two_cup_brew_detected() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    r.sink.clear();

    brew_cycle(&mut r, "2cup", 35_000);

    assert_eq!(brewed(&r), vec![BrewSize::TwoCup]);
}

#[test]
fn short_brew_is_unexpected() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    r.sink.clear();

    brew_cycle(&mut r, "1cup", 8_000);

    let sizes = brewed(&r);
    assert_eq!(sizes.len(), 1);
    assert!(matches!(sizes[0], BrewSize::Unexpected { .. }));
    assert_eq!(sizes[0].code(), 0);
    assert_eq!(
        r.sink.count(|e| matches!(e, AppEvent::UnexpectedBrewDuration { .. })),
        1
    );
}

#[test]
fn brewed_cup_counts_as_full_until_removed() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    brew_cycle(&mut r, "1cup", 18_000);
    assert!(r.app.cup_full());

    assert_eq!(
        r.command(CommandKind::Brew, "1cup"),
        CommandOutcome::Rejected(senseo_bridge::error::CommandError::CupNotReady)
    );

    // Swap the cup.
    r.hw.cup.detected = false;
    r.advance(200);
    assert!(!r.app.cup_available());
    r.hw.cup.detected = true;
    r.advance(200);
    assert!(r.app.cup_available());
    assert!(!r.app.cup_full());
    assert_eq!(r.command(CommandKind::Brew, "1cup"), CommandOutcome::Accepted);
}

// ── Out of water ──────────────────────────────────────────────

#[test]
fn fast_blink_means_out_of_water() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    r.sink.clear();

    r.blink_for(5_000, 100);
    assert_eq!(r.state(), StateId::NoWater);
    assert!(r.sink.contains(&AppEvent::OutOfWater(true)));
    assert_eq!(r.hw.melodies.last(), Some(&Melody::NoWater));

    r.hold_led(true, 3000);
    assert_eq!(r.state(), StateId::Ready);
    assert!(r.sink.contains(&AppEvent::OutOfWater(false)));
}

#[test]
fn tank_refilled_while_cold_goes_back_to_heating() {
    let mut r = Rig::new(SystemConfig::default());
    r.blink_for(5_000, 100);
    assert_eq!(r.state(), StateId::NoWater);
    r.blink_for(10_000, 1000);
    assert_eq!(r.state(), StateId::Heating);
}

// ── Power off ─────────────────────────────────────────────────

#[test]
fn led_going_dark_powers_off_from_any_state() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    r.sink.clear();
    r.hold_led(false, 3000);
    assert_eq!(r.state(), StateId::Off);
    assert!(r.sink.contains(&AppEvent::Power(false)));
}

// ── Noise immunity ────────────────────────────────────────────

#[test]
fn glitch_on_steady_led_is_ignored() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    r.sink.clear();

    let t = r.now;
    r.hw.pulses.on_edge(false, t);
    r.hw.pulses.on_edge(true, t + 4);
    r.advance(5_000);

    assert_eq!(r.state(), StateId::Ready);
    assert!(r.sink.transitions().is_empty());
    assert!(r.sink.events.iter().all(|e| !matches!(e, AppEvent::LedChanged(_))));
}

#[test]
fn glitches_reported_only_when_debugging() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    r.sink.clear();
    let t = r.now;
    r.hw.pulses.on_edge(false, t);
    r.hw.pulses.on_edge(true, t + 4);
    r.advance(100);
    assert_eq!(r.sink.count(|e| matches!(e, AppEvent::PulseDiagnostic { .. })), 0);

    assert_eq!(r.command(CommandKind::Settings, r#"{"debugging": true}"#), CommandOutcome::Accepted);
    let t = r.now;
    r.hw.pulses.on_edge(false, t);
    r.hw.pulses.on_edge(true, t + 4);
    r.advance(100);
    assert!(r.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::PulseDiagnostic { glitches: 2, .. }
    )));
}

// ── Clock wrap ────────────────────────────────────────────────

#[test]
fn brew_across_clock_wrap() {
    let mut r = Rig::starting_at(SystemConfig::default(), u32::MAX - 50_000);
    r.warm_up();
    r.sink.clear();
    brew_cycle(&mut r, "1cup", 18_000);
    assert_eq!(brewed(&r), vec![BrewSize::OneCup]);
}

// ── Cup sensor faults ─────────────────────────────────────────

#[test]
fn cup_read_fault_keeps_last_state() {
    let mut r = Rig::new(SystemConfig::default());
    r.warm_up();
    r.hw.cup_fault = true;
    r.advance(500);
    assert!(r.app.cup_available());
    assert_eq!(r.command(CommandKind::Brew, "1cup"), CommandOutcome::Accepted);
}
