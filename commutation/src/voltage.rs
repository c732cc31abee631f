//! Supply voltage tracking
//!
//! Supply voltage is only observable during the FET test (a phase driven high
//! reads the rail). The highest sample seen since power-on selects the
//! battery alert tier.

use crate::fmt::*;

/// ADC counts to volts
#[inline]
pub fn adc_to_volts(adc: u16, adc_per_volt: f32) -> f32 {
    adc as f32 / adc_per_volt
}

/// Volts to (fractional) ADC counts
#[inline]
pub fn volts_to_adc(volts: f32, adc_per_volt: f32) -> f32 {
    volts * adc_per_volt
}

/// Running maximum of the supply reading for the whole session
#[derive(Debug, Clone, Copy, Default)]
pub struct VoltageTracker {
    max_adc: u16,
}

impl VoltageTracker {
    /// Power-on state; the only point where the maximum goes back down
    pub const fn new() -> Self {
        Self { max_adc: 0 }
    }

    /// Fold in a supply sample. Returns `true` if it raised the maximum.
    pub fn record(&mut self, adc: u16) -> bool {
        if adc > self.max_adc {
            trace!("Supply max {} -> {}", self.max_adc, adc);
            self.max_adc = adc;
            true
        } else {
            false
        }
    }

    pub fn max_adc(&self) -> u16 {
        self.max_adc
    }

    pub fn max_volts(&self, adc_per_volt: f32) -> f32 {
        adc_to_volts(self.max_adc, adc_per_volt)
    }
}
