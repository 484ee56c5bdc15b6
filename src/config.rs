//! System configuration parameters
//!
//! All tunable parameters for the Senseo bridge.  The three feature toggles
//! (`cup_detector_enabled`, `buzzer_enabled`, `debug_enabled`) are owned by
//! the control-plane gateway and pushed in as JSON; the timing values are
//! calibration constants for the machine model.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Gateway settings ---
    /// Gate brewing on the cup detector (TCRT5000 reflex sensor).
    pub cup_detector_enabled: bool,
    /// Audible feedback (ready, no water, reset, ...).
    pub buzzer_enabled: bool,
    /// Emit per-pulse diagnostics.
    pub debug_enabled: bool,

    // --- LED classifier ---
    /// No edge for this long means the LED is steady (on or off).
    pub led_quiescent_window_ms: u32,
    /// Same-polarity edge period below this is a fast blink.
    pub led_fast_blink_max_period_ms: u32,
    /// Edges closer together than this are electrical noise.
    pub led_min_pulse_width_ms: u32,

    // --- Brew size inference ---
    /// Expected time in BREWING for one cup (seconds).
    pub brew_time_1cup_secs: u32,
    /// Expected time in BREWING for two cups (seconds).
    pub brew_time_2cup_secs: u32,

    // --- Cup detector ---
    /// Consecutive agreeing samples before a cup reading is trusted.
    pub cup_debounce_samples: u8,
    /// Raw ADC level at or above which the cup counts as full.
    pub cup_full_threshold: u16,

    // --- Actuation / timing ---
    /// How long a simulated button is held (milliseconds).
    pub button_press_ms: u32,
    /// Poll loop period (milliseconds).
    pub poll_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Gateway settings
            cup_detector_enabled: true,
            buzzer_enabled: true,
            debug_enabled: false,

            // LED classifier: slow blink ≈ 1 s half-period, fast ≈ 100 ms
            led_quiescent_window_ms: 1500,
            led_fast_blink_max_period_ms: 600,
            led_min_pulse_width_ms: 20,

            // Brew size
            brew_time_1cup_secs: 18,
            brew_time_2cup_secs: 35,

            // Cup detector
            cup_debounce_samples: 5,
            cup_full_threshold: 2000,

            // Timing
            button_press_ms: 100,
            poll_interval_ms: 20, // 50 Hz
        }
    }
}

impl SystemConfig {
    /// Reject combinations that would make classification or actuation
    /// meaningless.  Called before any runtime config update is applied.
    pub fn validate(&self) -> Result<()> {
        if self.brew_time_2cup_secs <= self.brew_time_1cup_secs {
            return Err(Error::Config("2-cup brew time must exceed 1-cup brew time"));
        }
        if self.cup_debounce_samples == 0 {
            return Err(Error::Config("cup debounce needs at least one sample"));
        }
        if self.poll_interval_ms == 0 || self.button_press_ms <= self.poll_interval_ms {
            return Err(Error::Config("button press must outlast the poll interval"));
        }
        if self.led_quiescent_window_ms <= self.led_fast_blink_max_period_ms {
            return Err(Error::Config("quiescent window must exceed fast blink period"));
        }
        if self.led_min_pulse_width_ms >= self.led_fast_blink_max_period_ms / 2 {
            return Err(Error::Config("min pulse width would swallow fast blinks"));
        }
        Ok(())
    }

    /// Apply a gateway settings document on top of this config.
    ///
    /// Accepts either the flat field names or the gateway's short names
    /// (`available`, `buzzer`, `debugging`); unknown keys are ignored.
    pub fn apply_gateway_json(&self, json: &str) -> Result<Self> {
        let patch: GatewaySettings =
            serde_json::from_str(json).map_err(|_| Error::Config("settings JSON malformed"))?;
        let mut next = self.clone();
        if let Some(v) = patch.cup_detector_enabled {
            next.cup_detector_enabled = v;
        }
        if let Some(v) = patch.buzzer_enabled {
            next.buzzer_enabled = v;
        }
        if let Some(v) = patch.debug_enabled {
            next.debug_enabled = v;
        }
        next.validate()?;
        Ok(next)
    }

    /// Tolerance band for brew size inference, in milliseconds.
    pub fn brew_tolerance_ms(&self) -> u32 {
        self.brew_time_2cup_secs
            .saturating_sub(self.brew_time_1cup_secs)
            .saturating_mul(1000)
            / 2
    }
}

/// Partial settings pushed by the gateway.
#[derive(Debug, Default, Deserialize)]
struct GatewaySettings {
    #[serde(alias = "available")]
    cup_detector_enabled: Option<bool>,
    #[serde(alias = "buzzer")]
    buzzer_enabled: Option<bool>,
    #[serde(alias = "debugging")]
    debug_enabled: Option<bool>,
}
