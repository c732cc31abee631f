// Throttle filtering and ramping
// Moving average of the potentiometer, dead-zone mapping to duty and a
// rate-limited acceleration ramp. Runs at the coarse throttle cadence only.

use embedded_hal::delay::DelayNs;

use crate::config::{throttle, ControllerConfig};
use crate::fault::Fault;
use crate::fmt::*;
use crate::hardware::Sensors;

/// Fixed-capacity circular buffer averaging the last `N` samples.
///
/// Slots start at zero, so the mean reads low until `N` samples have been
/// pushed.
pub struct MovingAverage<const N: usize> {
    buffer: [u16; N],
    idx: usize,
}

impl<const N: usize> MovingAverage<N> {
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            idx: 0,
        }
    }

    /// Overwrite the oldest sample and return the new mean (floored)
    pub fn push(&mut self, value: u16) -> u16 {
        self.buffer[self.idx] = value;
        self.idx = (self.idx + 1) % N;
        self.mean()
    }

    pub fn mean(&self) -> u16 {
        let sum: u32 = self.buffer.iter().map(|v| *v as u32).sum();
        (sum / N as u32) as u16
    }

    pub fn reset(&mut self) {
        self.buffer = [0; N];
        self.idx = 0;
    }
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Throttle and current smoothing plus the duty ramp
pub struct ThrottleFilter {
    throttle: MovingAverage<{ throttle::FILTER_LEN }>,
    current: MovingAverage<{ throttle::FILTER_LEN }>,
    adc_min: u16,
    adc_max: u16,
    /// Duty the filtered throttle asks for
    target_duty: u8,
    /// Duty actually commanded after ramping
    duty: u8,
}

impl ThrottleFilter {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            throttle: MovingAverage::new(),
            current: MovingAverage::new(),
            adc_min: config.throttle_adc_min,
            adc_max: config.throttle_adc_max,
            target_duty: 0,
            duty: 0,
        }
    }

    /// Map a filtered throttle value to a duty
    ///
    /// Below `adc_min` is 0, above `adc_max` is 255, linear (floored) between.
    pub fn map_to_duty(&self, filtered: u16) -> u8 {
        if filtered < self.adc_min {
            0
        } else if filtered > self.adc_max {
            255
        } else {
            let span = (self.adc_max - self.adc_min) as u32;
            ((filtered - self.adc_min) as u32 * 255 / span) as u8
        }
    }

    /// Push one throttle and one current sample
    ///
    /// # Returns
    /// * `(duty, current_estimate)` - ramped duty and filtered current (ADC)
    pub fn update(&mut self, raw_throttle: u16, raw_current: u16) -> (u8, u16) {
        let filtered = self.throttle.push(raw_throttle);
        let current = self.current.push(raw_current);
        self.target_duty = self.map_to_duty(filtered);

        // Only acceleration is rate limited
        if self.duty < self.target_duty {
            self.duty += 1;
        } else {
            self.duty = self.target_duty;
        }

        trace!(
            "Throttle raw={} filtered={} target={} duty={} current={}",
            raw_throttle,
            filtered,
            self.target_duty,
            self.duty,
            current
        );

        (self.duty, current)
    }

    pub fn duty(&self) -> u8 {
        self.duty
    }

    pub fn target_duty(&self) -> u8 {
        self.target_duty
    }

    pub fn filtered(&self) -> u16 {
        self.throttle.mean()
    }

    pub fn current_estimate(&self) -> u16 {
        self.current.mean()
    }

    /// Drop the duty to zero and clear both windows
    pub fn reset(&mut self) {
        self.throttle.reset();
        self.current.reset();
        self.target_duty = 0;
        self.duty = 0;
    }
}

/// Throttle presence check.
///
/// Takes three averaged samples spaced apart; any sample strictly below the
/// disconnect threshold means the sensor is missing or shorted. Blocks for
/// tens of milliseconds, never call it from the commutation path.
pub fn check_throttle<S: Sensors, D: DelayNs>(
    sensors: &mut S,
    delay: &mut D,
    config: &ControllerConfig,
) -> Result<(), Fault> {
    for sample in 0..throttle::CHECK_SAMPLES {
        if sample > 0 {
            delay.delay_ms(throttle::CHECK_SPACING_MS);
        }
        let sum: u32 = (0..throttle::CHECK_READS)
            .map(|_| sensors.throttle() as u32)
            .sum();
        let averaged = (sum / throttle::CHECK_READS) as u16;

        if averaged < config.throttle_disconnect_threshold {
            warn!(
                "Throttle sample {} = {} below disconnect threshold {}",
                sample, averaged, config.throttle_disconnect_threshold
            );
            return Err(Fault::Throttle);
        }
    }
    Ok(())
}
