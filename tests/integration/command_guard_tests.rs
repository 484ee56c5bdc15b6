//! Integration tests for the gateway command guards.
//!
//! Every inbound command goes through `AppService::handle_request` against
//! the mock adapters; the tests assert on the outcome, the buttons pressed
//! and the events emitted.

use senseo_bridge::app::commands::{CommandKind, CommandOutcome};
use senseo_bridge::app::events::AppEvent;
use senseo_bridge::config::SystemConfig;
use senseo_bridge::drivers::buzzer::Melody;
use senseo_bridge::drivers::press::Button;
use senseo_bridge::error::CommandError;
use senseo_bridge::fsm::StateId;

use crate::mock_hw::{POLL_MS, Rig};

fn rig() -> Rig {
    Rig::new(SystemConfig::default())
}

fn ready_rig() -> Rig {
    let mut r = rig();
    r.warm_up();
    r.advance(200);
    r.sink.clear();
    r
}

// ── Power ─────────────────────────────────────────────────────

#[test]
fn power_on_from_off_presses_power() {
    let mut r = rig();
    assert_eq!(r.command(CommandKind::Power, "ON"), CommandOutcome::Accepted);
    assert_eq!(r.hw.presses, vec![Button::Power]);
}

#[test]
fn power_off_when_already_off_is_a_noop() {
    let mut r = rig();
    r.sink.clear();
    assert_eq!(r.command(CommandKind::Power, "OFF"), CommandOutcome::AlreadyInState);
    assert!(r.hw.presses.is_empty());
    assert!(r.sink.contains(&AppEvent::Power(false)), "current power state re-asserted");
}

#[test]
fn power_on_when_ready_is_a_noop() {
    let mut r = ready_rig();
    assert_eq!(r.command(CommandKind::Power, "ON"), CommandOutcome::AlreadyInState);
    assert!(r.hw.presses.is_empty());
    assert!(r.sink.contains(&AppEvent::Power(true)));
}

#[test]
fn power_off_when_ready_presses_power() {
    let mut r = ready_rig();
    assert_eq!(r.command(CommandKind::Power, "OFF"), CommandOutcome::Accepted);
    assert_eq!(r.hw.last_press(), Some(Button::Power));
}

#[test]
fn reset_is_always_accepted_and_plays_cue() {
    let mut r = ready_rig();
    assert_eq!(r.command(CommandKind::Power, "RESET"), CommandOutcome::ResetRequested);
    assert_eq!(r.hw.melodies.last(), Some(&Melody::Reset));
    assert!(r.hw.presses.is_empty(), "reset restarts the bridge, not the machine");
}

#[test]
fn second_press_while_holding_is_busy() {
    let mut r = rig();
    assert_eq!(r.command(CommandKind::Power, "ON"), CommandOutcome::Accepted);
    assert_eq!(
        r.command(CommandKind::Power, "ON"),
        CommandOutcome::Rejected(CommandError::Busy)
    );
    assert_eq!(r.hw.presses.len(), 1);

    // Once the hold time has elapsed the press is released.
    r.advance(200);
    assert_eq!(r.hw.releases, vec![Button::Power]);
    assert_eq!(r.command(CommandKind::Power, "ON"), CommandOutcome::Accepted);
}

#[test]
fn failed_gpio_write_is_reported_busy() {
    let mut r = rig();
    r.hw.fail_presses = true;
    assert_eq!(
        r.command(CommandKind::Power, "ON"),
        CommandOutcome::Rejected(CommandError::Busy)
    );
    assert!(r.sink.contains(&AppEvent::CommandRejected(CommandError::Busy)));
}

// ── Brew ──────────────────────────────────────────────────────

#[test]
fn brew_one_cup_presses_left() {
    let mut r = ready_rig();
    assert_eq!(r.command(CommandKind::Brew, "1cup"), CommandOutcome::Accepted);
    assert_eq!(r.hw.presses, vec![Button::Left]);
}

#[test]
fn brew_two_cup_presses_right() {
    let mut r = ready_rig();
    assert_eq!(r.command(CommandKind::Brew, "2cup"), CommandOutcome::Accepted);
    assert_eq!(r.hw.presses, vec![Button::Right]);
}

#[test]
fn brew_outside_ready_is_wrong_state() {
    let mut r = rig();
    r.sink.clear();
    assert_eq!(
        r.command(CommandKind::Brew, "1cup"),
        CommandOutcome::Rejected(CommandError::WrongState)
    );
    assert!(r.hw.presses.is_empty());
    assert!(r.sink.contains(&AppEvent::Brewing(false)), "negative acknowledgment");
    assert!(r.sink.contains(&AppEvent::CommandRejected(CommandError::WrongState)));
}

fn assert_brew_wrong_state(r: &mut Rig, expected: StateId) {
    assert_eq!(r.state(), expected);
    r.sink.clear();
    let presses = r.hw.presses.len();
    assert_eq!(
        r.command(CommandKind::Brew, "1cup"),
        CommandOutcome::Rejected(CommandError::WrongState),
        "brew in {:?}",
        expected
    );
    assert_eq!(r.hw.presses.len(), presses);
    assert!(r.sink.contains(&AppEvent::Brewing(false)));
}

#[test]
fn brew_while_heating_is_wrong_state() {
    let mut r = rig();
    r.blink_for(5_000, 1000);
    assert_brew_wrong_state(&mut r, StateId::Heating);
}

#[test]
fn brew_while_out_of_water_is_wrong_state() {
    let mut r = rig();
    r.blink_for(3_000, 100);
    assert_brew_wrong_state(&mut r, StateId::NoWater);
}

#[test]
fn brew_while_brewing_is_wrong_state() {
    let mut r = ready_rig();
    assert_eq!(r.command(CommandKind::Brew, "1cup"), CommandOutcome::Accepted);
    r.advance(200);
    r.blink_for(5_000, 1000);
    assert_brew_wrong_state(&mut r, StateId::Brewing);
}

#[test]
fn brew_without_cup_is_refused() {
    let mut r = ready_rig();
    r.hw.cup.detected = false;
    r.advance(200);
    assert!(!r.app.cup_available());
    assert_eq!(
        r.command(CommandKind::Brew, "1cup"),
        CommandOutcome::Rejected(CommandError::CupNotReady)
    );
    assert!(r.sink.contains(&AppEvent::Brewing(false)));
}

#[test]
fn brew_into_full_cup_is_refused() {
    let mut r = ready_rig();
    r.hw.cup.fill_level = 4000;
    r.advance(200);
    assert!(r.app.cup_full());
    assert_eq!(
        r.command(CommandKind::Brew, "2cup"),
        CommandOutcome::Rejected(CommandError::CupNotReady)
    );
}

#[test]
fn reenabled_detector_does_not_trust_old_cup_state() {
    let mut r = ready_rig();
    assert!(r.app.cup_available());
    assert_eq!(r.command(CommandKind::Settings, r#"{"available": false}"#), CommandOutcome::Accepted);

    // Cup taken away while nobody is looking.
    r.hw.cup.detected = false;
    r.advance(2_000);

    assert_eq!(r.command(CommandKind::Settings, r#"{"available": true}"#), CommandOutcome::Accepted);
    assert_eq!(
        r.command(CommandKind::Brew, "1cup"),
        CommandOutcome::Rejected(CommandError::CupNotReady),
        "before the next poll"
    );
    r.advance(POLL_MS);
    assert_eq!(
        r.command(CommandKind::Brew, "1cup"),
        CommandOutcome::Rejected(CommandError::CupNotReady),
        "after reseeding from the live reading"
    );
    assert!(r.hw.presses.is_empty());

    // Putting a cup back is picked up by the debouncer as usual.
    r.hw.cup.detected = true;
    r.advance(200);
    assert_eq!(r.command(CommandKind::Brew, "1cup"), CommandOutcome::Accepted);
}

#[test]
fn reenabled_detector_forgets_cup_filled_before() {
    let mut r = ready_rig();
    assert_eq!(r.command(CommandKind::Brew, "1cup"), CommandOutcome::Accepted);
    r.advance(200);
    r.blink_for(18_000, 1000);
    r.hold_led(true, 3000);
    assert!(r.app.cup_full(), "brewed cup counts as full");

    // Full cup swapped for an empty one while the detector is off.
    assert_eq!(r.command(CommandKind::Settings, r#"{"available": false}"#), CommandOutcome::Accepted);
    r.advance(1_000);
    assert_eq!(r.command(CommandKind::Settings, r#"{"available": true}"#), CommandOutcome::Accepted);
    r.advance(POLL_MS);

    assert!(r.app.cup_available());
    assert!(!r.app.cup_full());
    assert_eq!(r.command(CommandKind::Brew, "1cup"), CommandOutcome::Accepted);
}

#[test]
fn cup_ignored_when_detector_disabled() {
    let config = SystemConfig {
        cup_detector_enabled: false,
        ..SystemConfig::default()
    };
    let mut r = Rig::new(config);
    r.hw.cup.detected = false;
    r.warm_up();
    r.advance(200);
    assert_eq!(r.command(CommandKind::Brew, "1cup"), CommandOutcome::Accepted);
}

#[test]
fn brew_while_power_press_held_is_busy() {
    let mut r = ready_rig();
    assert_eq!(r.command(CommandKind::Power, "OFF"), CommandOutcome::Accepted);
    assert_eq!(
        r.command(CommandKind::Brew, "1cup"),
        CommandOutcome::Rejected(CommandError::Busy)
    );
    assert!(r.sink.contains(&AppEvent::Brewing(false)));
}

// ── Malformed ─────────────────────────────────────────────────

#[test]
fn unknown_literals_are_malformed() {
    let mut r = ready_rig();
    for (kind, value) in [
        (CommandKind::Power, "on"),
        (CommandKind::Power, ""),
        (CommandKind::Brew, "3cup"),
        (CommandKind::Brew, "1 cup"),
        (CommandKind::Settings, "{not json"),
    ] {
        assert_eq!(
            r.command(kind, value),
            CommandOutcome::Rejected(CommandError::Malformed),
            "{:?} {:?}",
            kind,
            value
        );
    }
    assert!(r.hw.presses.is_empty());
    assert_eq!(r.sink.count(|e| *e == AppEvent::Brewing(false)), 2);
}

// ── Settings / connected ──────────────────────────────────────

#[test]
fn settings_toggle_cup_detector_and_buzzer() {
    let mut r = rig();
    assert_eq!(
        r.command(CommandKind::Settings, r#"{"available": false, "buzzer": false}"#),
        CommandOutcome::Accepted
    );
    assert!(!r.app.config().cup_detector_enabled);
    assert!(!r.app.config().buzzer_enabled);

    r.hw.melodies.clear();
    r.warm_up();
    assert!(r.hw.melodies.is_empty(), "buzzer muted: no ready cue");
}

#[test]
fn settings_keep_unmentioned_fields() {
    let mut r = rig();
    assert_eq!(r.command(CommandKind::Settings, r#"{"debugging": true}"#), CommandOutcome::Accepted);
    assert!(r.app.config().debug_enabled);
    assert!(r.app.config().cup_detector_enabled);
    assert!(r.app.config().buzzer_enabled);
}

#[test]
fn gateway_connected_republishes_status() {
    let mut r = ready_rig();
    assert_eq!(r.command(CommandKind::Connected, ""), CommandOutcome::Accepted);
    assert_eq!(r.hw.melodies.last(), Some(&Melody::Connected));
    assert!(r.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::Status {
            state: StateId::Ready,
            cup_available: true,
            cup_full: false,
            ..
        }
    )));
}
