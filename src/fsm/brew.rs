//! Brew size inference from time spent in `Brewing`.
//!
//! ```text
//!  0 ─────────|─────+─────|─────+─────|───────▶ dwell
//!             t1-tol  t1  t1+tol=t2-tol  t2  t2+tol
//!             └── OneCup ──┘└── TwoCup ──┘
//! ```
//!
//! `tol = (t2 - t1) / 2`, compared strictly, so the midpoint between the two
//! bands belongs to neither.

use serde::Serialize;

use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BrewSize {
    OneCup,
    TwoCup,
    /// Dwell time matched neither band (aborted or unknown brew).
    Unexpected { dwell_ms: u32 },
}

impl BrewSize {
    /// Classify a completed brew.  Integer milliseconds throughout.
    pub fn classify(dwell_ms: u32, config: &SystemConfig) -> Self {
        let tolerance = config.brew_tolerance_ms();
        let one = config.brew_time_1cup_secs.saturating_mul(1000);
        let two = config.brew_time_2cup_secs.saturating_mul(1000);

        if dwell_ms.abs_diff(one) < tolerance {
            Self::OneCup
        } else if dwell_ms.abs_diff(two) < tolerance {
            Self::TwoCup
        } else {
            Self::Unexpected { dwell_ms }
        }
    }

    /// Numeric code reported to the gateway: 1, 2 or 0.
    pub const fn code(self) -> u8 {
        match self {
            Self::OneCup => 1,
            Self::TwoCup => 2,
            Self::Unexpected { .. } => 0,
        }
    }
}
