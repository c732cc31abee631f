//! Fault taxonomy and the sticky first-fault latch

use crate::fmt::*;

/// A condition that stops the motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Throttle sensor missing or shorted
    Throttle,
    /// Both sides of one half-bridge misbehaved in the FET test
    FetTestFailed,
    /// High-side sample too low (blown FET, no supply, or undervoltage)
    FetHighSide,
    /// Low-side sample above zero (blown FET or short)
    FetLowSide,
    /// Rotor position unreadable
    Hall,
    /// Current flowing with the throttle closed
    IdleOvercurrent,
    /// Current above the kill limit
    Overcurrent,
    /// External halt line asserted
    ExternalHalt,
}

/// Fault code as seen by operators: no fault, or the latched cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultCode {
    #[default]
    None,
    ThrottleFault,
    FetTestFailed,
    HighSideFault,
    LowSideFault,
    HallFault,
    IdleOvercurrent,
    Overcurrent,
    ExternalHalt,
}

impl FaultCode {
    /// Numeric code used in diagnostic reports
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::ThrottleFault => 1,
            Self::FetTestFailed => 2,
            Self::HighSideFault => 3,
            Self::LowSideFault => 4,
            Self::HallFault => 5,
            Self::IdleOvercurrent => 6,
            Self::Overcurrent => 7,
            Self::ExternalHalt => 8,
        }
    }

    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Fault> for FaultCode {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Throttle => Self::ThrottleFault,
            Fault::FetTestFailed => Self::FetTestFailed,
            Fault::FetHighSide => Self::HighSideFault,
            Fault::FetLowSide => Self::LowSideFault,
            Fault::Hall => Self::HallFault,
            Fault::IdleOvercurrent => Self::IdleOvercurrent,
            Fault::Overcurrent => Self::Overcurrent,
            Fault::ExternalHalt => Self::ExternalHalt,
        }
    }
}

/// Holds the first fault of a session until explicitly cleared.
///
/// Later faults are logged but never overwrite the latched one, so the
/// operator always sees the originating cause.
#[derive(Debug, Default)]
pub struct FaultLatch {
    code: FaultCode,
}

impl FaultLatch {
    pub const fn new() -> Self {
        Self {
            code: FaultCode::None,
        }
    }

    /// Record a fault. Returns `true` if it became the latched fault.
    pub fn record(&mut self, fault: Fault) -> bool {
        let code = FaultCode::from(fault);
        if self.code.is_none() {
            error!("Fault latched: {}", code.as_u8());
            self.code = code;
            true
        } else {
            warn!(
                "Fault {} ignored, keeping first fault {}",
                code.as_u8(),
                self.code.as_u8()
            );
            false
        }
    }

    /// Clear on an explicit enable transition
    pub fn clear(&mut self) {
        self.code = FaultCode::None;
    }

    pub fn code(&self) -> FaultCode {
        self.code
    }

    pub fn is_set(&self) -> bool {
        !self.code.is_none()
    }
}
