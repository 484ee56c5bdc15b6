//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the button presser and the buzzer sequencer and reads the LED
//! pulse timer and cup detector, exposing them through [`SensorPort`] and
//! [`ActuatorPort`].  This is the only module in the system that touches
//! actual hardware.  On non-espidf targets, `hw_init` routes every call to
//! its simulation stubs.

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use heapless::Vec;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::buzzer::{Buzzer, Melody, Tone};
use crate::drivers::hw_init;
use crate::drivers::press::{Button, ButtonPresser};
use crate::error::{ActuatorError, SensorError};
use crate::pins;
use crate::sensors::cup::CupReading;
use crate::sensors::pulse_timer::{PulseSnapshot, PulseTimer};

// ── GPIO output pin ───────────────────────────────────────────

/// A GPIO configured as output by `hw_init`, exposed as an
/// `embedded-hal` pin so drivers stay generic.
pub struct GpioOutput {
    gpio: i32,
}

impl GpioOutput {
    pub const fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for GpioOutput {
    type Error = ErrorKind;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, false).map_err(|_| ErrorKind::Other)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, true).map_err(|_| ErrorKind::Other)
    }
}

// ── Adapter ───────────────────────────────────────────────────

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    pulses: &'static PulseTimer,
    presser: ButtonPresser<GpioOutput>,
    buzzer: Buzzer,
}

impl HardwareAdapter {
    pub fn new(pulses: &'static PulseTimer, press_ms: u32) -> Self {
        Self {
            pulses,
            presser: ButtonPresser::new(
                GpioOutput::new(pins::PRESS_POWER_GPIO),
                GpioOutput::new(pins::PRESS_LEFT_GPIO),
                GpioOutput::new(pins::PRESS_RIGHT_GPIO),
                press_ms,
            ),
            buzzer: Buzzer::new(),
        }
    }

    /// Whether a melody is still sounding (used to let the reset cue
    /// finish before restarting).
    pub fn is_buzzing(&self) -> bool {
        self.buzzer.is_playing()
    }

    fn apply_tone(tone: Tone) {
        match tone {
            Tone::Play(hz) => hw_init::tone_set(Some(hz)),
            Tone::Silence => hw_init::tone_set(None),
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn led_pulses(&self) -> PulseSnapshot {
        self.pulses.snapshot()
    }

    fn read_cup(&mut self) -> Result<CupReading, SensorError> {
        // Comparator output is active-low.
        let detected = !hw_init::gpio_read(pins::CUP_DETECT_GPIO);
        let fill_level =
            hw_init::adc1_read(hw_init::ADC1_CH_CUP_LEVEL).ok_or(SensorError::AdcReadFailed)?;
        Ok(CupReading { detected, fill_level })
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn press(&mut self, button: Button, now_ms: u32) -> Result<(), ActuatorError> {
        self.presser.press(button, now_ms)
    }

    fn release_if_due(&mut self, now_ms: u32) -> Vec<Button, 3> {
        self.presser.release_if_due(now_ms)
    }

    fn is_pressing(&self) -> bool {
        self.presser.is_pressing()
    }

    fn play(&mut self, melody: Melody, now_ms: u32) {
        Self::apply_tone(self.buzzer.play(melody, now_ms));
    }

    fn tick_buzzer(&mut self, now_ms: u32) {
        if let Some(tone) = self.buzzer.tick(now_ms) {
            Self::apply_tone(tone);
        }
    }
}
