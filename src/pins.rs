//! GPIO / peripheral pin assignments for the Senseo bridge board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Machine interface (open-collector, optocoupled)
// ---------------------------------------------------------------------------

/// Digital input: status LED sense.  Pulled up; the optocoupler pulls it
/// LOW while the machine's LED is lit.
pub const LED_SENSE_GPIO: i32 = 4;

/// Digital output: simulate the power button (active HIGH).
pub const PRESS_POWER_GPIO: i32 = 5;
/// Digital output: simulate the 1-cup (left) button (active HIGH).
pub const PRESS_LEFT_GPIO: i32 = 6;
/// Digital output: simulate the 2-cup (right) button (active HIGH).
pub const PRESS_RIGHT_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Cup detector (TCRT5000 reflex sensor module)
// ---------------------------------------------------------------------------

/// Digital input: comparator output, LOW while a cup reflects the beam.
pub const CUP_DETECT_GPIO: i32 = 8;
/// Analog input: raw reflex intensity, rises as the cup fills.
/// ADC1 channel 8 (GPIO 9 on ESP32-S3).
pub const CUP_LEVEL_ADC_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// Piezo buzzer driven by an LEDC channel.
pub const BUZZER_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// Initial LEDC frequency for the buzzer; retuned per note.
pub const BUZZER_BASE_FREQ_HZ: u32 = 1_024;
