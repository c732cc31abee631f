// Six-step (trapezoidal) commutation from hall feedback
// Hall decoding, per-phase switch commands and the shoot-through safe driver

pub mod hall;
pub mod phase_driver;

pub use hall::{decode, HallReading};
pub use phase_driver::{commands_for, de_energize, drive, Commutation, PhaseDriver};

/// One of the three motor phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    U,
    V,
    W,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::U, Phase::V, Phase::W];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Fixed storage of one value per phase, indexed by [`Phase`]
pub type PhaseArray<T> = [T; 3];

/// Energization pattern derived from the hall state.
///
/// `Invalid` is the sentinel for the all-zero and all-one hall patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommutationStep {
    Invalid,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
}

impl CommutationStep {
    pub const VALID: [CommutationStep; 6] = [
        CommutationStep::S1,
        CommutationStep::S2,
        CommutationStep::S3,
        CommutationStep::S4,
        CommutationStep::S5,
        CommutationStep::S6,
    ];

    /// Step number 1-6, or 0 for `Invalid`
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// (high-side phase, low-side phase) for a valid step; the third phase floats
    pub const fn phases(self) -> Option<(Phase, Phase)> {
        match self {
            Self::Invalid => None,
            Self::S1 => Some((Phase::U, Phase::V)),
            Self::S2 => Some((Phase::U, Phase::W)),
            Self::S3 => Some((Phase::V, Phase::W)),
            Self::S4 => Some((Phase::V, Phase::U)),
            Self::S5 => Some((Phase::W, Phase::U)),
            Self::S6 => Some((Phase::W, Phase::V)),
        }
    }
}

/// Desired state of one half-bridge.
///
/// `high` carries the PWM duty when the high side is active. The two sides
/// are never both active; constructors enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchCommand {
    high: Option<u8>,
    low: bool,
}

impl SwitchCommand {
    /// Both sides off
    pub const OFF: SwitchCommand = SwitchCommand {
        high: None,
        low: false,
    };

    /// High side switching at `duty`, low side off
    pub const fn high(duty: u8) -> Self {
        Self {
            high: Some(duty),
            low: false,
        }
    }

    /// Low side fully on, high side off
    pub const fn low() -> Self {
        Self {
            high: None,
            low: true,
        }
    }

    pub const fn is_high_active(&self) -> bool {
        self.high.is_some()
    }

    pub const fn is_low_active(&self) -> bool {
        self.low
    }

    /// Duty applied to the high side (0 when inactive)
    pub const fn high_duty(&self) -> u8 {
        match self.high {
            Some(duty) => duty,
            None => 0,
        }
    }

    pub const fn is_off(&self) -> bool {
        self.high.is_none() && !self.low
    }
}

/// All three half-bridges de-energized
pub const ALL_OFF: PhaseArray<SwitchCommand> = [SwitchCommand::OFF; 3];
