//! Sensor subsystem: LED edge timing, LED pattern classification and cup
//! detection.
//!
//! The only state shared with interrupt context is [`LED_PULSES`], written
//! by the LED-sense GPIO ISR and read once per poll.

pub mod cup;
pub mod debounce;
pub mod led_classifier;
pub mod pulse_timer;

use pulse_timer::PulseTimer;

/// Edge timing for the machine's status LED.  Written from the GPIO ISR
/// registered in `hw_init::init_isr_service()`; the min width is retuned
/// from config at boot.
pub static LED_PULSES: PulseTimer = PulseTimer::new(20);
