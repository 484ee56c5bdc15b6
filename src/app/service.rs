//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the LED classifier, the cup sensor, the appliance
//! FSM and its shared context.  It exposes a clean, hardware-agnostic API.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService           │
//! ActuatorPort ◀──│  Cup · Classifier · FSM       │
//!                 └──────────────────────────────┘
//! ```
//!
//! One poll runs strictly in this order: cup detector, LED classification,
//! FSM, then actuator housekeeping (button release, buzzer step).

use log::{debug, error, info, warn};

use crate::config::SystemConfig;
use crate::drivers::buzzer::Melody;
use crate::drivers::press::Button;
use crate::error::{CommandError, SensorError};
use crate::fsm::brew::BrewSize;
use crate::fsm::context::{MachineAction, MachineContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::sensors::cup::CupSensor;
use crate::sensors::led_classifier::{LedClassifier, LedState};

use super::commands::{AppCommand, BrewRequest, CommandKind, CommandOutcome, CommandRequest, PowerRequest};
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: MachineContext,
    classifier: LedClassifier,
    cup: CupSensor,
    /// Edge / glitch counters at the previous poll (diagnostics).
    seen_edges: u32,
    seen_glitches: u32,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM: call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let classifier = LedClassifier::new(&config);
        let cup = CupSensor::new(&config);
        let ctx = MachineContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Off);

        Self {
            fsm,
            ctx,
            classifier,
            cup,
            seen_edges: 0,
            seen_glitches: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Seed the cup sensor, start the FSM in `Off` and play the startup cue.
    pub fn start(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        if self.ctx.config.cup_detector_enabled {
            self.seed_cup(hw);
        }

        let pulses = hw.led_pulses();
        self.seen_edges = pulses.edges;
        self.seen_glitches = pulses.glitches;

        self.ctx.now_ms = now_ms;
        self.fsm.start(&mut self.ctx);
        self.play(Melody::Startup, now_ms, hw);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        self.dispatch_actions(now_ms, hw, sink);
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one poll: cup → LED classifier → FSM → release/buzzer.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]: this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        // 1. Cup detector
        if self.ctx.config.cup_detector_enabled {
            self.update_cup(hw, sink);
        }

        // 2. LED classification
        let pulses = hw.led_pulses();
        let led = self.classifier.update(&pulses, now_ms);
        if self.classifier.has_changed() {
            info!("LED state: {}", led.as_str());
            sink.emit(&AppEvent::LedChanged(led));
        }
        if pulses.edges != self.seen_edges || pulses.glitches != self.seen_glitches {
            if pulses.glitches != self.seen_glitches {
                debug!("LED sense: {} spurious pulse(s) rejected", pulses.glitches.wrapping_sub(self.seen_glitches));
            }
            if self.ctx.config.debug_enabled {
                sink.emit(&AppEvent::PulseDiagnostic {
                    last_pulse_ms: self.classifier.last_pulse_ms(),
                    glitches: pulses.glitches,
                });
            }
            self.seen_edges = pulses.edges;
            self.seen_glitches = pulses.glitches;
        }

        // 3. FSM tick (pure state logic)
        self.ctx.now_ms = now_ms;
        self.ctx.led = led;
        self.fsm.tick(&mut self.ctx);
        if self.fsm.state_changed() {
            sink.emit(&AppEvent::StateChanged {
                from: self.fsm.previous_state(),
                to: self.fsm.current_state(),
                secs_in_previous: self.fsm.ms_in_last_state() / 1000,
            });
        }
        self.dispatch_actions(now_ms, hw, sink);

        // 4. Actuator housekeeping
        for button in hw.release_if_due(now_ms) {
            debug!("released {} button", button.as_str());
        }
        hw.tick_buzzer(now_ms);
    }

    // ── Command handling ──────────────────────────────────────

    /// Parse and execute a raw gateway request.
    pub fn handle_request(
        &mut self,
        req: &CommandRequest,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> CommandOutcome {
        match AppCommand::from_request(req, &self.ctx.config) {
            Ok(cmd) => self.handle_command(cmd, now_ms, hw, sink),
            Err(e) => {
                warn!("command {:?} '{}' malformed", req.kind, req.value);
                if req.kind == CommandKind::Brew {
                    sink.emit(&AppEvent::Brewing(false));
                }
                self.reject(e, sink)
            }
        }
    }

    /// Execute a typed command.  Presses at most one button.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> CommandOutcome {
        match cmd {
            AppCommand::Power(PowerRequest::Reset) => {
                info!("Reset requested");
                self.play(Melody::Reset, now_ms, hw);
                CommandOutcome::ResetRequested
            }
            AppCommand::Power(req) => {
                let is_on = self.fsm.current_state() != StateId::Off;
                let want_on = req == PowerRequest::On;
                if want_on == is_on {
                    info!("Machine already powered {}", if is_on { "on" } else { "off" });
                    sink.emit(&AppEvent::Power(is_on));
                    return CommandOutcome::AlreadyInState;
                }
                info!("Powering {}", if want_on { "on" } else { "off" });
                self.press(Button::Power, now_ms, hw, sink)
            }
            AppCommand::Brew(req) => match self.brew_guard(hw) {
                Ok(()) => {
                    let button = match req {
                        BrewRequest::OneCup => Button::Left,
                        BrewRequest::TwoCup => Button::Right,
                    };
                    info!("Brewing {:?}", req);
                    self.press(button, now_ms, hw, sink)
                }
                Err(e) => {
                    sink.emit(&AppEvent::Brewing(false));
                    self.reject(e, sink)
                }
            },
            AppCommand::UpdateConfig(new_config) => {
                if let Err(e) = new_config.validate() {
                    warn!("Rejected config update: {}", e);
                    return self.reject(CommandError::Malformed, sink);
                }
                if new_config.cup_detector_enabled != self.ctx.config.cup_detector_enabled {
                    info!("Cup detector {}", if new_config.cup_detector_enabled { "enabled" } else { "disabled" });
                    if new_config.cup_detector_enabled {
                        // Readings were not taken while disabled; reseed on
                        // the next poll and treat the cup as absent until then.
                        self.cup = CupSensor::new(&new_config);
                    }
                }
                self.ctx.config = new_config;
                info!("Configuration updated at runtime");
                CommandOutcome::Accepted
            }
            AppCommand::GatewayConnected => {
                self.play(Melody::Connected, now_ms, hw);
                sink.emit(&AppEvent::Status {
                    state: self.fsm.current_state(),
                    led: self.classifier.state(),
                    cup_available: self.cup.is_available(),
                    cup_full: self.cup.is_full(),
                });
                CommandOutcome::Accepted
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn led_state(&self) -> LedState {
        self.classifier.state()
    }

    pub fn cup_available(&self) -> bool {
        self.cup.is_available()
    }

    pub fn cup_full(&self) -> bool {
        self.cup.is_full()
    }

    /// The live configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn seed_cup(&mut self, hw: &mut impl SensorPort) {
        match hw.read_cup() {
            Ok(first) => {
                self.cup.init(first);
                info!(
                    "Cup detector seeded: available={} full={}",
                    self.cup.is_available(),
                    self.cup.is_full()
                );
            }
            Err(e) => warn!("Cup detector seed failed: {}", e),
        }
    }

    fn update_cup(&mut self, hw: &mut impl SensorPort, sink: &mut impl EventSink) {
        let reading = match hw.read_cup() {
            Ok(r) => r,
            Err(e) => {
                warn!("Cup read failed: {}", e);
                return;
            }
        };
        match self.cup.update(reading) {
            Ok(()) => {}
            Err(SensorError::NotInitialised) => {
                warn!("Cup detector used before init, seeding from this sample");
                self.cup.init(reading);
                return;
            }
            Err(e) => {
                warn!("Cup update failed: {}", e);
                return;
            }
        }
        if self.cup.available_changed() {
            info!("Cup available: {}", self.cup.is_available());
            sink.emit(&AppEvent::CupAvailable(self.cup.is_available()));
        }
        if self.cup.full_changed() {
            info!("Cup full: {}", self.cup.is_full());
            sink.emit(&AppEvent::CupFull(self.cup.is_full()));
        }
    }

    fn brew_guard(&self, hw: &impl ActuatorPort) -> Result<(), CommandError> {
        if self.fsm.current_state() != StateId::Ready {
            return Err(CommandError::WrongState);
        }
        if self.ctx.config.cup_detector_enabled && (!self.cup.is_available() || self.cup.is_full()) {
            return Err(CommandError::CupNotReady);
        }
        if hw.is_pressing() {
            return Err(CommandError::Busy);
        }
        Ok(())
    }

    fn press(
        &mut self,
        button: Button,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> CommandOutcome {
        if hw.is_pressing() {
            return self.reject(CommandError::Busy, sink);
        }
        match hw.press(button, now_ms) {
            Ok(()) => CommandOutcome::Accepted,
            Err(e) => {
                error!("{} button press failed: {}", button.as_str(), e);
                self.reject(CommandError::Busy, sink)
            }
        }
    }

    fn reject(&mut self, e: CommandError, sink: &mut impl EventSink) -> CommandOutcome {
        warn!("Command rejected: {}", e);
        sink.emit(&AppEvent::CommandRejected(e));
        CommandOutcome::Rejected(e)
    }

    fn play(&mut self, melody: Melody, now_ms: u32, hw: &mut impl ActuatorPort) {
        if self.ctx.config.buzzer_enabled {
            hw.play(melody, now_ms);
        }
    }

    /// Turn queued FSM actions into events, cues and cup bookkeeping.
    fn dispatch_actions(&mut self, now_ms: u32, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        for action in self.ctx.drain() {
            match action {
                MachineAction::Power(on) => sink.emit(&AppEvent::Power(on)),
                MachineAction::Brewing(active) => sink.emit(&AppEvent::Brewing(active)),
                MachineAction::CupFilled => {
                    if self.ctx.config.cup_detector_enabled {
                        self.cup.fill_up();
                    }
                    sink.emit(&AppEvent::CupFull(true));
                }
                MachineAction::BrewedSize(size) => {
                    let dwell_ms = self.ctx.ms_in_last_state;
                    sink.emit(&AppEvent::BrewedSize { size, dwell_ms });
                    if let BrewSize::Unexpected { dwell_ms } = size {
                        warn!("Unexpected time in SENSEO_BREWING: {} ms", dwell_ms);
                        sink.emit(&AppEvent::UnexpectedBrewDuration { dwell_ms });
                    }
                }
                MachineAction::OutOfWater(empty) => sink.emit(&AppEvent::OutOfWater(empty)),
                MachineAction::Play(melody) => self.play(melody, now_ms, hw),
            }
        }
    }
}
