//! Default controller parameters.
//!
//! ADC values are in the 0–1023 domain regardless of the converter width on
//! the board; the firmware scales its readings before handing them over.

/// Throttle potentiometer mapping
pub mod throttle {
    /// Filtered ADC value at and below which the duty is zero
    pub const DEFAULT_ADC_MIN: u16 = 180;

    /// Filtered ADC value above which the duty saturates at 255
    pub const DEFAULT_ADC_MAX: u16 = 850;

    /// A presence-check sample strictly below this means a disconnected or shorted sensor
    pub const DEFAULT_DISCONNECT_THRESHOLD: u16 = 100;

    /// Moving-average window length
    pub const FILTER_LEN: usize = 10;

    /// Number of presence-check samples
    pub const CHECK_SAMPLES: usize = 3;

    /// Raw reads averaged into one presence-check sample
    pub const CHECK_READS: u32 = 8;

    /// Wait between presence-check samples [ms]
    pub const CHECK_SPACING_MS: u32 = 10;
}

/// Supply voltage measurement
pub mod voltage {
    /// ADC counts per volt of supply (divider + reference)
    pub const DEFAULT_ADC_PER_VOLT: f32 = 12.31;

    /// High-side FET samples below this supply voltage fail the FET test [V]
    pub const DEFAULT_CRITICAL_LOW_VOLTS: f32 = 32.5;
}

/// Current shunt limits (ADC units)
pub mod current {
    /// Any raw reading above this while running trips the controller
    pub const DEFAULT_KILL_LIMIT: u16 = 800;

    /// Filtered current above this with a zero throttle is a stuck/shorted bridge
    pub const DEFAULT_IDLE_LIMIT: u16 = 40;
}

/// FET continuity test
pub mod fet_test {
    /// Total attempts before a FET failure is treated as real
    pub const DEFAULT_ATTEMPTS: u8 = 3;

    /// Half-bridge settle time between drive and sample [ms]
    pub const SETTLE_MS: u32 = 5;

    /// Duty used when driving a high side during the test
    pub const HIGH_SIDE_DUTY: u8 = 255;
}

/// Hall sensor supervision
pub mod hall {
    /// Consecutive invalid readings tolerated before a hall fault
    pub const DEFAULT_INVALID_LIMIT: u16 = 100;
}

/// Idle / sleep supervision
pub mod idle {
    /// The self-test battery is re-run on every Nth idle iteration
    pub const DEFAULT_RECHECK_EVERY: u16 = 5;

    /// Idle iterations before dropping into sleep
    pub const DEFAULT_SLEEP_THRESHOLD: u16 = 60;

    /// Length of one idle iteration [ms]
    pub const DEFAULT_PERIOD_MS: u64 = 1_000;

    /// Time spent asleep before self-test is retried [ms]
    pub const DEFAULT_SLEEP_MS: u64 = 600_000;
}

/// Battery banding thresholds (ADC-equivalent units, strictly increasing)
pub mod battery {
    pub const DEFAULT_TIER_THRESHOLDS: [u16; 4] = [420, 437, 455, 470];
}

/// Control loop timing
pub mod timing {
    /// Throttle filter update period [ms]
    pub const DEFAULT_THROTTLE_PERIOD_MS: u64 = 100;
}
