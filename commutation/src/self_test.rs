//! Self-test battery
//!
//! Checks run before the motor may be energized, in a fixed order: FET
//! continuity (with a bounded retry), hall validity, throttle presence, then
//! battery banding. The FET test blocks on settle delays and must never run
//! from the commutation path.

use embedded_hal::delay::DelayNs;

use crate::alert::{battery_tier, BatteryTier};
use crate::config::{fet_test, ControllerConfig};
use crate::fault::Fault;
use crate::fmt::*;
use crate::hardware::{Board, Sensors};
use crate::six_step::phase_driver::{de_energize, drive};
use crate::six_step::{decode, CommutationStep, Phase, SwitchCommand, ALL_OFF};
use crate::throttle::check_throttle;
use crate::voltage::VoltageTracker;

/// Phase voltages sampled while testing one half-bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetSample {
    pub phase: Phase,
    /// High side driven alone (expect the supply rail)
    pub high: u16,
    /// Low side driven alone (expect 0)
    pub low: u16,
}

/// Judge one half-bridge sample.
///
/// The high side fails when its sample is strictly below the critical
/// voltage; the low side fails on anything above zero.
pub fn judge_fet(sample: &FetSample, config: &ControllerConfig) -> Result<(), Fault> {
    let high_fail = (sample.high as f32) < config.critical_low_adc();
    let low_fail = sample.low > 0;
    match (high_fail, low_fail) {
        (false, false) => Ok(()),
        (true, false) => Err(Fault::FetHighSide),
        (false, true) => Err(Fault::FetLowSide),
        (true, true) => Err(Fault::FetTestFailed),
    }
}

/// Drive one half-bridge high then low and sample its phase voltage.
/// The board is de-energized on return.
fn sample_phase<B: Board, D: DelayNs>(board: &mut B, delay: &mut D, phase: Phase) -> FetSample {
    de_energize(board);
    delay.delay_ms(fet_test::SETTLE_MS);

    let mut commands = ALL_OFF;
    commands[phase.index()] = SwitchCommand::high(fet_test::HIGH_SIDE_DUTY);
    drive(board, &commands);
    delay.delay_ms(fet_test::SETTLE_MS);
    let high = board.phase_voltage(phase);

    commands[phase.index()] = SwitchCommand::low();
    drive(board, &commands);
    delay.delay_ms(fet_test::SETTLE_MS);
    let low = board.phase_voltage(phase);

    de_energize(board);
    FetSample { phase, high, low }
}

/// FET continuity test, one attempt.
///
/// Tests U, V, W in turn and stops at the first bad half-bridge. Every
/// high-side sample taken is folded into the session voltage maximum.
pub fn fet_test<B: Board, D: DelayNs>(
    board: &mut B,
    delay: &mut D,
    config: &ControllerConfig,
    voltage: &mut VoltageTracker,
) -> Result<(), Fault> {
    for phase in Phase::ALL {
        let sample = sample_phase(board, delay, phase);
        voltage.record(sample.high);
        debug!(
            "FET test {}: high={} low={}",
            phase.index(),
            sample.high,
            sample.low
        );
        judge_fet(&sample, config)?;
    }
    Ok(())
}

/// FET test with bounded retries against contact bounce.
///
/// The first passing attempt wins; after `fet_attempts` failures the last
/// attempt's fault is returned.
pub fn fet_test_with_retry<B: Board, D: DelayNs>(
    board: &mut B,
    delay: &mut D,
    config: &ControllerConfig,
    voltage: &mut VoltageTracker,
) -> Result<(), Fault> {
    let mut last = Fault::FetTestFailed;
    for attempt in 1..=config.fet_attempts {
        match fet_test(board, delay, config, voltage) {
            Ok(()) => return Ok(()),
            Err(fault) => {
                warn!("FET test attempt {} failed", attempt);
                last = fault;
            }
        }
    }
    Err(last)
}

/// Hall validity test: the current reading must decode to a step
pub fn hall_test<S: Sensors>(sensors: &mut S) -> Result<CommutationStep, Fault> {
    let step = decode(sensors.hall());
    if step.is_valid() {
        Ok(step)
    } else {
        Err(Fault::Hall)
    }
}

/// Throttle presence test
pub fn throttle_test<S: Sensors, D: DelayNs>(
    sensors: &mut S,
    delay: &mut D,
    config: &ControllerConfig,
) -> Result<(), Fault> {
    check_throttle(sensors, delay, config)
}

/// Battery banding from the session maximum. Informational only.
pub fn battery_check(voltage: &VoltageTracker, config: &ControllerConfig) -> BatteryTier {
    battery_tier(voltage.max_adc(), &config.battery_thresholds)
}

/// Outcome of one run of the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTestReport {
    pub fet: Result<(), Fault>,
    pub hall: Result<CommutationStep, Fault>,
    pub throttle: Result<(), Fault>,
    /// Informational, never fails
    pub battery: BatteryTier,
}

impl SelfTestReport {
    /// Failures in the order the checks ran
    pub fn faults(&self) -> impl Iterator<Item = Fault> {
        [self.fet.err(), self.hall.err(), self.throttle.err()]
            .into_iter()
            .flatten()
    }

    pub fn first_fault(&self) -> Option<Fault> {
        self.faults().next()
    }

    pub fn passed(&self) -> bool {
        self.first_fault().is_none()
    }
}

/// Run the whole battery in its fixed order.
///
/// Every check runs even after a failure so the report is complete; the
/// caller latches the failures in order and the first one sticks.
pub fn run<B: Board, D: DelayNs>(
    board: &mut B,
    delay: &mut D,
    config: &ControllerConfig,
    voltage: &mut VoltageTracker,
) -> SelfTestReport {
    let fet = fet_test_with_retry(board, delay, config, voltage);
    let hall = hall_test(board);
    let throttle = throttle_test(board, delay, config);
    let battery = battery_check(voltage, config);

    let report = SelfTestReport {
        fet,
        hall,
        throttle,
        battery,
    };
    info!(
        "Self-test: fet={} hall={} throttle={} battery={} (max {})",
        fet.is_ok(),
        hall.is_ok(),
        throttle.is_ok(),
        battery.beeps(),
        voltage.max_adc()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{NoDelay, Op, SimBoard};
    use crate::six_step::HallReading;

    fn config() -> ControllerConfig {
        ControllerConfig::default()
    }

    #[test]
    fn test_fet_test_healthy() {
        let mut board = SimBoard::healthy();
        let mut delay = NoDelay::default();
        let mut voltage = VoltageTracker::new();
        assert_eq!(
            fet_test(&mut board, &mut delay, &config(), &mut voltage),
            Ok(())
        );
        assert_eq!(voltage.max_adc(), 443);
        assert!(board.all_off());
        assert!(!board.shoot_through_seen());
        // Settle waits: three per phase
        assert_eq!(delay.total_ns, 9 * 5 * 1_000_000);
    }

    #[test]
    fn test_fet_test_sagging_supply_fails_high_side() {
        // 33.0 V pack sagging to 399/397/396 counts; threshold 32.5 V * 12.31 = 400.075
        let mut board = SimBoard::healthy();
        board.supply_adc = [399, 397, 396];
        let mut delay = NoDelay::default();
        let mut voltage = VoltageTracker::new();
        assert_eq!(
            fet_test(&mut board, &mut delay, &config(), &mut voltage),
            Err(Fault::FetHighSide)
        );
        // Stops at phase U, board left safe
        assert_eq!(voltage.max_adc(), 399);
        assert!(board.all_off());
    }

    #[test]
    fn test_fet_high_side_boundary_is_strict() {
        let cfg = config();
        let sample = |high| FetSample {
            phase: Phase::V,
            high,
            low: 0,
        };
        // 400 < 400.075 fails, 401 passes
        assert_eq!(judge_fet(&sample(400), &cfg), Err(Fault::FetHighSide));
        assert_eq!(judge_fet(&sample(401), &cfg), Ok(()));
    }

    #[test]
    fn test_fet_low_side_fault() {
        let mut board = SimBoard::healthy();
        board.low_side_adc = [0, 3, 0];
        let mut delay = NoDelay::default();
        let mut voltage = VoltageTracker::new();
        assert_eq!(
            fet_test(&mut board, &mut delay, &config(), &mut voltage),
            Err(Fault::FetLowSide)
        );
    }

    #[test]
    fn test_fet_both_sides_bad() {
        let sample = FetSample {
            phase: Phase::W,
            high: 12,
            low: 12,
        };
        assert_eq!(judge_fet(&sample, &config()), Err(Fault::FetTestFailed));
    }

    #[test]
    fn test_fet_test_drives_one_bridge_at_a_time() {
        let mut board = SimBoard::healthy();
        let mut delay = NoDelay::default();
        let mut voltage = VoltageTracker::new();
        fet_test(&mut board, &mut delay, &config(), &mut voltage).unwrap();
        for phase in Phase::ALL {
            let ops = board.ops();
            let high_on = ops
                .iter()
                .position(|op| *op == Op::High(phase, fet_test::HIGH_SIDE_DUTY))
                .unwrap();
            let low_on = ops
                .iter()
                .position(|op| *op == Op::Low(phase, true))
                .unwrap();
            assert!(high_on < low_on);
            assert!(ops[high_on..low_on].contains(&Op::High(phase, 0)));
        }
        assert!(!board.shoot_through_seen());
    }

    #[test]
    fn test_fet_retry_tolerates_bounce() {
        let mut board = SimBoard::healthy();
        board.high_side_glitches = 2;
        let mut delay = NoDelay::default();
        let mut voltage = VoltageTracker::new();
        assert_eq!(
            fet_test_with_retry(&mut board, &mut delay, &config(), &mut voltage),
            Ok(())
        );
    }

    #[test]
    fn test_fet_retry_gives_up_after_three() {
        let mut board = SimBoard::healthy();
        board.high_side_glitches = 3;
        let mut delay = NoDelay::default();
        let mut voltage = VoltageTracker::new();
        assert_eq!(
            fet_test_with_retry(&mut board, &mut delay, &config(), &mut voltage),
            Err(Fault::FetHighSide)
        );
        // The fourth attempt would have passed
        assert_eq!(
            fet_test(&mut board, &mut delay, &config(), &mut voltage),
            Ok(())
        );
    }

    #[test]
    fn test_fet_test_is_idempotent() {
        let mut board = SimBoard::healthy();
        let mut delay = NoDelay::default();
        let cfg = config();
        let mut voltage = VoltageTracker::new();

        let first = fet_test(&mut board, &mut delay, &cfg, &mut voltage);
        let first_tier = battery_check(&voltage, &cfg);
        let second = fet_test(&mut board, &mut delay, &cfg, &mut voltage);
        let second_tier = battery_check(&voltage, &cfg);

        assert_eq!(first, Ok(()));
        assert_eq!(first, second);
        assert_eq!(first_tier, second_tier);
    }

    #[test]
    fn test_hall_test() {
        let mut board = SimBoard::healthy();
        assert_eq!(hall_test(&mut board), Ok(CommutationStep::S1));
        board.hall = HallReading::new(true, true, true);
        assert_eq!(hall_test(&mut board), Err(Fault::Hall));
    }

    #[test]
    fn test_run_reports_all_failures_in_order() {
        let mut board = SimBoard::healthy();
        board.hall = HallReading::new(false, false, false);
        board.throttle_adc = 0;
        let mut delay = NoDelay::default();
        let mut voltage = VoltageTracker::new();
        let report = run(&mut board, &mut delay, &config(), &mut voltage);

        assert!(!report.passed());
        assert_eq!(report.fet, Ok(()));
        assert_eq!(report.first_fault(), Some(Fault::Hall));
        let mut faults = report.faults();
        assert_eq!(faults.next(), Some(Fault::Hall));
        assert_eq!(faults.next(), Some(Fault::Throttle));
        assert_eq!(faults.next(), None);
    }

    #[test]
    fn test_run_healthy_passes_with_battery_tier() {
        let mut board = SimBoard::healthy();
        board.supply_adc = [430; 3];
        let mut delay = NoDelay::default();
        let mut voltage = VoltageTracker::new();
        let report = run(&mut board, &mut delay, &config(), &mut voltage);
        assert!(report.passed());
        assert_eq!(report.battery, BatteryTier::Beeps2);
    }
}
