//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/LEDC registers, and owns its own
//! [`PulseTimer`] so a test can script the machine's LED edge by edge.

use heapless::Vec as HVec;

use senseo_bridge::app::commands::{CommandKind, CommandOutcome, CommandRequest};
use senseo_bridge::app::events::AppEvent;
use senseo_bridge::app::ports::{ActuatorPort, EventSink, SensorPort};
use senseo_bridge::app::service::AppService;
use senseo_bridge::config::SystemConfig;
use senseo_bridge::drivers::buzzer::Melody;
use senseo_bridge::drivers::press::Button;
use senseo_bridge::error::{ActuatorError, SensorError};
use senseo_bridge::fsm::StateId;
use senseo_bridge::sensors::cup::CupReading;
use senseo_bridge::sensors::pulse_timer::{PulseSnapshot, PulseTimer};

/// Poll period used by [`Rig`].
pub const POLL_MS: u32 = 20;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub pulses: PulseTimer,
    pub cup: CupReading,
    pub cup_fault: bool,
    pub fail_presses: bool,
    pub presses: Vec<Button>,
    pub releases: Vec<Button>,
    pub melodies: Vec<Melody>,
    press_ms: u32,
    held: Option<(Button, u32)>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            pulses: PulseTimer::new(config.led_min_pulse_width_ms),
            cup: CupReading {
                detected: true,
                fill_level: 0,
            },
            cup_fault: false,
            fail_presses: false,
            presses: Vec::new(),
            releases: Vec::new(),
            melodies: Vec::new(),
            press_ms: config.button_press_ms,
            held: None,
        }
    }

    pub fn last_press(&self) -> Option<Button> {
        self.presses.last().copied()
    }

    pub fn led_lit(&self) -> bool {
        self.pulses.snapshot().lit
    }
}

impl SensorPort for MockHardware {
    fn led_pulses(&self) -> PulseSnapshot {
        self.pulses.snapshot()
    }

    fn read_cup(&mut self) -> Result<CupReading, SensorError> {
        if self.cup_fault {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(self.cup)
    }
}

impl ActuatorPort for MockHardware {
    fn press(&mut self, button: Button, now_ms: u32) -> Result<(), ActuatorError> {
        if self.fail_presses {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.presses.push(button);
        self.held = Some((button, now_ms.wrapping_add(self.press_ms)));
        Ok(())
    }

    fn release_if_due(&mut self, now_ms: u32) -> HVec<Button, 3> {
        let mut released = HVec::new();
        if let Some((button, deadline)) = self.held {
            if now_ms.wrapping_sub(deadline) as i32 >= 0 {
                self.held = None;
                self.releases.push(button);
                let _ = released.push(button);
            }
        }
        released
    }

    fn is_pressing(&self) -> bool {
        self.held.is_some()
    }

    fn play(&mut self, melody: Melody, _now_ms: u32) {
        self.melodies.push(melody);
    }

    fn tick_buzzer(&mut self, _now_ms: u32) {}
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    /// Every `(from, to)` pair in emission order.
    pub fn transitions(&self) -> Vec<(StateId, StateId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig: app + mocks + simulated clock ────────────────────────

pub struct Rig {
    pub app: AppService,
    pub hw: MockHardware,
    pub sink: RecordingSink,
    pub now: u32,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: SystemConfig) -> Self {
        Self::starting_at(config, 0)
    }

    pub fn starting_at(config: SystemConfig, now: u32) -> Self {
        let mut hw = MockHardware::new(&config);
        hw.pulses.seed_level(false, now);
        let mut sink = RecordingSink::default();
        let mut app = AppService::new(config);
        app.start(now, &mut hw, &mut sink);
        Self { app, hw, sink, now }
    }

    pub fn state(&self) -> StateId {
        self.app.state()
    }

    fn tick(&mut self) {
        self.app.tick(self.now, &mut self.hw, &mut self.sink);
        self.now = self.now.wrapping_add(POLL_MS);
    }

    /// Poll for `ms` with the LED left as it is.
    pub fn advance(&mut self, ms: u32) {
        for _ in 0..ms / POLL_MS {
            self.tick();
        }
    }

    /// Drive the LED to a steady level for `ms`.
    pub fn hold_led(&mut self, lit: bool, ms: u32) {
        if self.hw.led_lit() != lit {
            self.hw.pulses.on_edge(lit, self.now);
        }
        self.advance(ms);
    }

    /// Square wave with half-period `half_ms` for `ms`, starting with a
    /// toggle of the current level.
    pub fn blink_for(&mut self, ms: u32, half_ms: u32) {
        let start = self.now;
        let mut next_edge = start;
        let mut lit = !self.hw.led_lit();
        while self.now.wrapping_sub(start) < ms {
            while next_edge.wrapping_sub(start) <= self.now.wrapping_sub(start)
                && next_edge.wrapping_sub(start) < ms
            {
                self.hw.pulses.on_edge(lit, next_edge);
                lit = !lit;
                next_edge = next_edge.wrapping_add(half_ms);
            }
            self.tick();
        }
    }

    /// Deliver a raw gateway request at the current time.
    pub fn command(&mut self, kind: CommandKind, value: &str) -> CommandOutcome {
        let req = CommandRequest::new(kind, value).unwrap();
        self.app.handle_request(&req, self.now, &mut self.hw, &mut self.sink)
    }

    /// Off → Heating (40 s slow blink) → Ready (steady on).
    pub fn warm_up(&mut self) {
        self.blink_for(40_000, 1000);
        self.hold_led(true, 3000);
        assert_eq!(self.state(), StateId::Ready, "warm-up should end in Ready");
    }
}
