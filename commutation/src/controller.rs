//! Fault/mode state machine
//!
//! Arbitrates between the self-test battery and six-step commutation. One
//! call to [`Controller::poll`] is one control-loop iteration: it never blocks
//! while running, and all timing is compared against the `now` passed in by
//! the caller.

use embassy_time::Instant;
use embedded_hal::delay::DelayNs;

use crate::alert::{AlertPattern, BatteryTier, Severity};
use crate::config::ControllerConfig;
use crate::fault::{Fault, FaultCode, FaultLatch};
use crate::fmt::*;
use crate::hardware::{Board, DiagnosticEvent, Reporter};
use crate::self_test::{self, SelfTestReport};
use crate::six_step::{de_energize, decode, CommutationStep, PhaseDriver};
use crate::throttle::ThrottleFilter;
use crate::voltage::VoltageTracker;

/// Top-level controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerMode {
    /// Power-on state
    Disabled,
    /// Running the self-test battery
    SelfTest,
    /// Commutating
    Running,
    /// A fault was latched and the bridges de-energized
    Faulted,
    /// Waiting between periodic re-checks
    Idle,
    /// Long low-power wait
    Sleep,
}

impl ControllerMode {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::SelfTest),
            2 => Some(Self::Running),
            3 => Some(Self::Faulted),
            4 => Some(Self::Idle),
            5 => Some(Self::Sleep),
            _ => None,
        }
    }
}

pub struct Controller {
    config: ControllerConfig,
    mode: ControllerMode,
    latch: FaultLatch,
    voltage: VoltageTracker,
    throttle: ThrottleFilter,
    driver: PhaseDriver,
    idle_iterations: u16,
    /// Next throttle filter update while running
    next_throttle: Instant,
    /// Next idle iteration
    next_idle: Instant,
    /// End of the current sleep
    wake_at: Instant,
    enable_requested: bool,
    /// Last raw readings, for fault reports
    last_current: u16,
    last_throttle: u16,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            throttle: ThrottleFilter::new(&config),
            driver: PhaseDriver::new(config.invalid_hall_limit),
            config,
            mode: ControllerMode::Disabled,
            latch: FaultLatch::new(),
            voltage: VoltageTracker::new(),
            idle_iterations: 0,
            next_throttle: Instant::from_ticks(0),
            next_idle: Instant::from_ticks(0),
            wake_at: Instant::from_ticks(0),
            enable_requested: false,
            last_current: 0,
            last_throttle: 0,
        }
    }

    /// Run one control-loop iteration
    ///
    /// # Arguments
    /// * `board` - power stage and sensors
    /// * `delay` - blocking delay, only used by the self-test battery
    /// * `reporter` - alert and diagnostic sink
    /// * `now` - current monotonic time
    ///
    /// # Returns
    /// * Mode after this iteration
    pub fn poll<B: Board, D: DelayNs, R: Reporter>(
        &mut self,
        board: &mut B,
        delay: &mut D,
        reporter: &mut R,
        now: Instant,
    ) -> ControllerMode {
        if self.enable_requested {
            self.enable_requested = false;
            de_energize(board);
            self.latch.clear();
            self.idle_iterations = 0;
            self.transition(ControllerMode::SelfTest, reporter);
            return self.mode;
        }

        match self.mode {
            ControllerMode::Disabled => self.transition(ControllerMode::SelfTest, reporter),
            ControllerMode::SelfTest => {
                let report = self.run_self_test(board, delay);
                if report.passed() {
                    self.start_running(&report, reporter, now);
                } else {
                    self.latch_report(&report, reporter);
                    de_energize(board);
                    reporter.alert(AlertPattern::for_fault(self.latch.code()));
                    self.transition(ControllerMode::Faulted, reporter);
                }
            }
            ControllerMode::Running => {
                if let Err(fault) = self.control_cycle(board, reporter, now) {
                    self.enter_fault(fault, board, reporter);
                }
            }
            ControllerMode::Faulted => {
                de_energize(board);
                self.idle_iterations = self.idle_iterations.saturating_add(1);
                self.next_idle = now + self.config.idle_period;
                self.transition(ControllerMode::Idle, reporter);
            }
            ControllerMode::Idle => {
                if now >= self.next_idle {
                    self.next_idle = now + self.config.idle_period;
                    self.idle_iteration(board, delay, reporter, now);
                }
            }
            ControllerMode::Sleep => {
                if now >= self.wake_at {
                    self.idle_iterations = 0;
                    self.transition(ControllerMode::SelfTest, reporter);
                }
            }
        }
        self.mode
    }

    /// Request an explicit re-enable: clears the latched fault and re-runs
    /// self-test on the next poll.
    pub fn request_enable(&mut self) {
        self.enable_requested = true;
    }

    /// One running cycle: halt line, commutation, then throttle and current
    /// checks at the throttle cadence.
    fn control_cycle<B: Board, R: Reporter>(
        &mut self,
        board: &mut B,
        reporter: &mut R,
        now: Instant,
    ) -> Result<(), Fault> {
        if board.halt_asserted() {
            return Err(Fault::ExternalHalt);
        }

        let step = decode(board.hall());
        self.driver.commutate(board, step, self.throttle.duty())?;

        if now >= self.next_throttle {
            self.next_throttle = now + self.config.throttle_period;

            let raw_throttle = board.throttle();
            let raw_current = board.current();
            self.last_throttle = raw_throttle;
            self.last_current = raw_current;

            let (duty, current) = self.throttle.update(raw_throttle, raw_current);

            if raw_current > self.config.current_kill_limit {
                return Err(Fault::Overcurrent);
            }
            if self.throttle.target_duty() == 0 && current > self.config.idle_current_limit {
                return Err(Fault::IdleOvercurrent);
            }

            reporter.report(&DiagnosticEvent::Status {
                step: step.as_u8(),
                duty,
                current,
            });
        }
        Ok(())
    }

    fn idle_iteration<B: Board, D: DelayNs, R: Reporter>(
        &mut self,
        board: &mut B,
        delay: &mut D,
        reporter: &mut R,
        now: Instant,
    ) {
        self.idle_iterations = self.idle_iterations.saturating_add(1);
        trace!("Idle iteration {}", self.idle_iterations);

        if self.idle_iterations >= self.config.idle_sleep_threshold {
            de_energize(board);
            self.wake_at = now + self.config.sleep_duration;
            self.transition(ControllerMode::Sleep, reporter);
            return;
        }

        if self.idle_iterations.checked_rem(self.config.idle_recheck_every) == Some(0) {
            let report = self.run_self_test(board, delay);
            if report.passed() {
                self.start_running(&report, reporter, now);
            } else {
                self.latch_report(&report, reporter);
                de_energize(board);
                reporter.alert(AlertPattern::for_fault(self.latch.code()));
            }
        }
    }

    fn run_self_test<B: Board, D: DelayNs>(&mut self, board: &mut B, delay: &mut D) -> SelfTestReport {
        let report = self_test::run(board, delay, &self.config, &mut self.voltage);
        self.last_throttle = board.throttle();
        self.last_current = board.current();
        report
    }

    /// Self-test passed: clear the latch and begin commutating
    fn start_running<R: Reporter>(&mut self, report: &SelfTestReport, reporter: &mut R, now: Instant) {
        self.latch.clear();
        self.throttle.reset();
        self.driver.reset();
        self.idle_iterations = 0;
        self.next_throttle = now;

        reporter.report(&DiagnosticEvent::SelfTest {
            passed: true,
            code: FaultCode::None,
            max_voltage_adc: self.voltage.max_adc(),
        });
        reporter.alert(AlertPattern::Tone(Severity::Ready));
        if report.battery != BatteryTier::None {
            reporter.alert(AlertPattern::Battery(report.battery));
        }
        self.transition(ControllerMode::Running, reporter);
    }

    /// Latch every failure of a report in order; the first one sticks
    fn latch_report<R: Reporter>(&mut self, report: &SelfTestReport, reporter: &mut R) {
        for fault in report.faults() {
            if self.latch.record(fault) {
                reporter.report(&DiagnosticEvent::FaultLatched {
                    code: self.latch.code(),
                    current: self.last_current,
                    throttle: self.last_throttle,
                });
            }
        }
        reporter.report(&DiagnosticEvent::SelfTest {
            passed: false,
            code: self.latch.code(),
            max_voltage_adc: self.voltage.max_adc(),
        });
    }

    /// Runtime fault: de-energize in the same cycle and latch
    fn enter_fault<B: Board, R: Reporter>(&mut self, fault: Fault, board: &mut B, reporter: &mut R) {
        de_energize(board);
        self.throttle.reset();
        self.driver.reset();
        if self.latch.record(fault) {
            reporter.report(&DiagnosticEvent::FaultLatched {
                code: self.latch.code(),
                current: self.last_current,
                throttle: self.last_throttle,
            });
        }
        reporter.alert(AlertPattern::for_fault(self.latch.code()));
        self.transition(ControllerMode::Faulted, reporter);
    }

    fn transition<R: Reporter>(&mut self, to: ControllerMode, reporter: &mut R) {
        if self.mode == to {
            return;
        }
        info!("Mode {} -> {}", self.mode.as_u8(), to.as_u8());
        reporter.report(&DiagnosticEvent::ModeChanged {
            from: self.mode,
            to,
        });
        self.mode = to;
    }

    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    /// Latched (first) fault of the session
    pub fn fault(&self) -> FaultCode {
        self.latch.code()
    }

    pub fn max_voltage_adc(&self) -> u16 {
        self.voltage.max_adc()
    }

    /// Commanded PWM duty
    pub fn duty(&self) -> u8 {
        self.throttle.duty()
    }

    pub fn idle_iterations(&self) -> u16 {
        self.idle_iterations
    }

    /// Step applied on the last running cycle
    pub fn step(&self) -> CommutationStep {
        self.driver.step()
    }

    /// When the controller next has work to do, if it is waiting.
    ///
    /// `None` while commutating or testing: poll again immediately.
    pub fn next_wake(&self) -> Option<Instant> {
        match self.mode {
            ControllerMode::Idle => Some(self.next_idle),
            ControllerMode::Sleep => Some(self.wake_at),
            _ => None,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}
