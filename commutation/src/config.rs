//! Controller configuration
//!
//! Every option the core consumes, with defaults taken from [`params`].
//! Nothing here is persisted; the firmware builds a config at boot.

pub mod params;

use embassy_time::Duration;

pub use params::*;

/// Reason a [`ControllerConfig`] was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `throttle_adc_min` must be strictly below `throttle_adc_max`
    ThrottleBounds,
    /// The ADC-per-volt factor must be positive
    VoltageFactor,
    /// Battery tier thresholds must be strictly increasing
    BatteryThresholds,
    /// Retry counts, cadences and periods must be non-zero
    ZeroCount,
}

/// Runtime configuration of the commutation and safety engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    /// Raw current reading that trips `Overcurrent` while running (ADC)
    pub current_kill_limit: u16,
    /// Filtered current allowed with a zero throttle (ADC)
    pub idle_current_limit: u16,
    /// FET high-side samples below this voltage fail [V]
    pub critical_low_volts: f32,
    /// ADC counts per supply volt
    pub adc_per_volt: f32,
    /// Throttle ADC value mapped to zero duty
    pub throttle_adc_min: u16,
    /// Throttle ADC value mapped to full duty
    pub throttle_adc_max: u16,
    /// Throttle presence threshold (ADC)
    pub throttle_disconnect_threshold: u16,
    /// FET test attempts before failing
    pub fet_attempts: u8,
    /// Consecutive invalid hall readings tolerated
    pub invalid_hall_limit: u16,
    /// Idle iterations between self-test re-runs
    pub idle_recheck_every: u16,
    /// Idle iterations before sleep
    pub idle_sleep_threshold: u16,
    /// Duration of one idle iteration
    pub idle_period: Duration,
    /// Time asleep before self-test is retried
    pub sleep_duration: Duration,
    /// Throttle filter cadence
    pub throttle_period: Duration,
    /// Battery band thresholds, strictly increasing (ADC)
    pub battery_thresholds: [u16; 4],
}

impl ControllerConfig {
    pub const fn default_config() -> Self {
        Self {
            current_kill_limit: current::DEFAULT_KILL_LIMIT,
            idle_current_limit: current::DEFAULT_IDLE_LIMIT,
            critical_low_volts: voltage::DEFAULT_CRITICAL_LOW_VOLTS,
            adc_per_volt: voltage::DEFAULT_ADC_PER_VOLT,
            throttle_adc_min: throttle::DEFAULT_ADC_MIN,
            throttle_adc_max: throttle::DEFAULT_ADC_MAX,
            throttle_disconnect_threshold: throttle::DEFAULT_DISCONNECT_THRESHOLD,
            fet_attempts: fet_test::DEFAULT_ATTEMPTS,
            invalid_hall_limit: hall::DEFAULT_INVALID_LIMIT,
            idle_recheck_every: idle::DEFAULT_RECHECK_EVERY,
            idle_sleep_threshold: idle::DEFAULT_SLEEP_THRESHOLD,
            idle_period: Duration::from_millis(idle::DEFAULT_PERIOD_MS),
            sleep_duration: Duration::from_millis(idle::DEFAULT_SLEEP_MS),
            throttle_period: Duration::from_millis(timing::DEFAULT_THROTTLE_PERIOD_MS),
            battery_thresholds: battery::DEFAULT_TIER_THRESHOLDS,
        }
    }

    /// Supply voltage below which a high-side FET sample fails, in ADC counts.
    ///
    /// Kept fractional: the FET test compares with a strict `<`.
    pub fn critical_low_adc(&self) -> f32 {
        self.critical_low_volts * self.adc_per_volt
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle_adc_min >= self.throttle_adc_max {
            return Err(ConfigError::ThrottleBounds);
        }
        if self.adc_per_volt.is_nan() || self.adc_per_volt <= 0.0 {
            return Err(ConfigError::VoltageFactor);
        }
        if self.battery_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::BatteryThresholds);
        }
        if self.fet_attempts == 0
            || self.idle_recheck_every == 0
            || self.idle_sleep_threshold == 0
            || self.throttle_period.as_ticks() == 0
        {
            return Err(ConfigError::ZeroCount);
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
