//! Hardware seams
//!
//! The engine only sees named I/O lines: per-phase switch enables, hall and
//! halt inputs, and ADC channels in the 0–1023 domain. The firmware implements
//! these on the real power stage; tests use a simulated board.

use crate::alert::AlertPattern;
use crate::controller::ControllerMode;
use crate::fault::FaultCode;
use crate::six_step::{HallReading, Phase};

/// Half-bridge outputs
pub trait PowerStage {
    /// Set the high-side PWM duty (0 = off) of one phase
    fn set_high_duty(&mut self, phase: Phase, duty: u8);

    /// Switch the low side of one phase
    fn set_low(&mut self, phase: Phase, on: bool);
}

/// Sensor inputs
pub trait Sensors {
    /// Sample the three hall lines
    fn hall(&mut self) -> HallReading;

    /// Phase voltage (ADC, 0–1023)
    fn phase_voltage(&mut self, phase: Phase) -> u16;

    /// Current shunt (ADC, 0–1023)
    fn current(&mut self) -> u16;

    /// Throttle potentiometer (ADC, 0–1023)
    fn throttle(&mut self) -> u16;

    /// External halt line, already decoded from its active-low level
    fn halt_asserted(&mut self) -> bool;
}

/// Everything the controller drives or samples
pub trait Board: PowerStage + Sensors {}

impl<T: PowerStage + Sensors> Board for T {}

/// Structured event for the diagnostic sink
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagnosticEvent {
    ModeChanged {
        from: ControllerMode,
        to: ControllerMode,
    },
    FaultLatched {
        code: FaultCode,
        current: u16,
        throttle: u16,
    },
    SelfTest {
        passed: bool,
        code: FaultCode,
        max_voltage_adc: u16,
    },
    Status {
        step: u8,
        duty: u8,
        current: u16,
    },
}

/// Write-only outputs towards the operator. Never influences control decisions.
pub trait Reporter {
    /// Render an audio pattern (blocking, fire-and-forget)
    fn alert(&mut self, pattern: AlertPattern);

    /// Forward a diagnostic event to external logging
    fn report(&mut self, event: &DiagnosticEvent);
}
