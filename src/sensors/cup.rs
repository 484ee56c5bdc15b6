//! Cup presence / fill detector (TCRT5000 reflex sensor).
//!
//! Two signals come off the module: a digital comparator output (cup in
//! front of the sensor) and the raw analog reflex level (rises as liquid
//! fills the cup).  Both are debounced independently.
//!
//! ```text
//!   detected ──► Debounced ──► available
//!   fill_level ≥ threshold ──► Debounced ──┐
//!   filled_by_brew (set by fill_up) ───────┴─► full = available && (level || brew)
//! ```
//!
//! Removing the cup forgets that it was filled by a brew.

use crate::config::SystemConfig;
use crate::error::SensorError;

use super::debounce::Debounced;

/// One raw sample from the reflex sensor module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CupReading {
    /// Comparator output (already inverted to active-high).
    pub detected: bool,
    /// Raw ADC level.
    pub fill_level: u16,
}

struct Filters {
    presence: Debounced,
    level: Debounced,
}

pub struct CupSensor {
    filters: Option<Filters>,
    debounce_samples: u8,
    full_threshold: u16,
    available: bool,
    full: bool,
    filled_by_brew: bool,
    available_changed: bool,
    full_changed: bool,
}

impl CupSensor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            filters: None,
            debounce_samples: config.cup_debounce_samples,
            full_threshold: config.cup_full_threshold,
            available: false,
            full: false,
            filled_by_brew: false,
            available_changed: false,
            full_changed: false,
        }
    }

    /// Seed both debouncers from the first sample.  Raises no change flags.
    pub fn init(&mut self, first: CupReading) {
        let level_full = first.fill_level >= self.full_threshold;
        self.filters = Some(Filters {
            presence: Debounced::new(self.debounce_samples, first.detected),
            level: Debounced::new(self.debounce_samples, level_full),
        });
        self.available = first.detected;
        self.filled_by_brew = false;
        self.full = self.available && level_full;
        self.available_changed = false;
        self.full_changed = false;
    }

    /// Feed one poll's sample.  Change flags are valid until the next call.
    pub fn update(&mut self, reading: CupReading) -> Result<(), SensorError> {
        let filters = self.filters.as_mut().ok_or(SensorError::NotInitialised)?;

        filters.presence.update(reading.detected);
        filters
            .level
            .update(reading.fill_level >= self.full_threshold);

        let available = filters.presence.stable();
        if !available {
            self.filled_by_brew = false;
        }
        let full = available && (filters.level.stable() || self.filled_by_brew);

        self.available_changed = available != self.available;
        self.full_changed = full != self.full;
        self.available = available;
        self.full = full;
        Ok(())
    }

    /// A brew just finished into the cup.  The caller reports the new
    /// fullness itself, so no change flag is raised.
    pub fn fill_up(&mut self) {
        self.filled_by_brew = true;
        self.full = self.available;
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn available_changed(&self) -> bool {
        self.available_changed
    }

    pub fn full_changed(&self) -> bool {
        self.full_changed
    }
}
