//! Simulated board for unit tests

use embedded_hal::delay::DelayNs;

use crate::alert::AlertPattern;
use crate::hardware::{DiagnosticEvent, PowerStage, Reporter, Sensors};
use crate::six_step::{HallReading, Phase};

/// One write to the power stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    High(Phase, u8),
    Low(Phase, bool),
}

/// Power stage and sensors with scripted readings
pub struct SimBoard {
    high: [u8; 3],
    low: [bool; 3],
    ops: Vec<Op>,
    shoot_through: bool,
    /// Phase voltage seen with only the high side on
    pub supply_adc: [u16; 3],
    /// Phase voltage seen with only the low side on
    pub low_side_adc: [u16; 3],
    /// Number of upcoming high-side samples that read 0 (contact bounce)
    pub high_side_glitches: u8,
    pub hall: HallReading,
    pub throttle_adc: u16,
    pub current_adc: u16,
    pub halt: bool,
}

impl SimBoard {
    /// 36 V pack, sensors connected, rotor parked in step 1
    pub fn healthy() -> Self {
        Self {
            high: [0; 3],
            low: [false; 3],
            ops: Vec::new(),
            shoot_through: false,
            supply_adc: [443; 3],
            low_side_adc: [0; 3],
            high_side_glitches: 0,
            hall: HallReading::new(true, false, false),
            throttle_adc: 180,
            current_adc: 0,
            halt: false,
        }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Whether both switches of any bridge were ever on at the same time
    pub fn shoot_through_seen(&self) -> bool {
        self.shoot_through
    }

    pub fn all_off(&self) -> bool {
        self.high.iter().all(|d| *d == 0) && self.low.iter().all(|l| !*l)
    }

    pub fn high_duty(&self, phase: Phase) -> u8 {
        self.high[phase.index()]
    }

    pub fn low_on(&self, phase: Phase) -> bool {
        self.low[phase.index()]
    }

    fn check(&mut self, phase: Phase) {
        let i = phase.index();
        if self.high[i] > 0 && self.low[i] {
            self.shoot_through = true;
        }
    }
}

impl PowerStage for SimBoard {
    fn set_high_duty(&mut self, phase: Phase, duty: u8) {
        self.high[phase.index()] = duty;
        self.ops.push(Op::High(phase, duty));
        self.check(phase);
    }

    fn set_low(&mut self, phase: Phase, on: bool) {
        self.low[phase.index()] = on;
        self.ops.push(Op::Low(phase, on));
        self.check(phase);
    }
}

impl Sensors for SimBoard {
    fn hall(&mut self) -> HallReading {
        self.hall
    }

    fn phase_voltage(&mut self, phase: Phase) -> u16 {
        let i = phase.index();
        if self.high[i] > 0 && !self.low[i] {
            if self.high_side_glitches > 0 {
                self.high_side_glitches -= 1;
                return 0;
            }
            self.supply_adc[i]
        } else if self.low[i] {
            self.low_side_adc[i]
        } else {
            0
        }
    }

    fn current(&mut self) -> u16 {
        self.current_adc
    }

    fn throttle(&mut self) -> u16 {
        self.throttle_adc
    }

    fn halt_asserted(&mut self) -> bool {
        self.halt
    }
}

/// Delay that returns immediately and counts the requested time
#[derive(Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Reporter that keeps everything it is given
#[derive(Default)]
pub struct RecordingReporter {
    pub alerts: Vec<AlertPattern>,
    pub events: Vec<DiagnosticEvent>,
}

impl Reporter for RecordingReporter {
    fn alert(&mut self, pattern: AlertPattern) {
        self.alerts.push(pattern);
    }

    fn report(&mut self, event: &DiagnosticEvent) {
        self.events.push(*event);
    }
}
