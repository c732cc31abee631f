//! Alert encoding
//!
//! Pure mappings from controller state to audio pattern identifiers. The
//! audio collaborator renders a pattern from its tone table; nothing here
//! performs I/O.

use crate::fault::FaultCode;

/// Audible severity of the current fault state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    /// No fault: confirmation tone
    Ready,
    /// Overcurrent: descending alarm
    Overload,
    /// Three-tone error
    GeneralError,
    /// Four-tone high alarm, hall and FET faults
    SevereError,
}

/// Battery band, encoded as a number of beep bursts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryTier {
    None,
    Beeps1,
    Beeps2,
    Beeps3,
    Beeps4,
}

impl BatteryTier {
    pub const fn beeps(self) -> u8 {
        self as u8
    }
}

/// Opaque pattern handed to the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertPattern {
    Tone(Severity),
    Battery(BatteryTier),
}

/// Select the severity for a fault code
pub const fn severity_for(code: FaultCode) -> Severity {
    match code {
        FaultCode::None => Severity::Ready,
        FaultCode::IdleOvercurrent | FaultCode::Overcurrent => Severity::Overload,
        FaultCode::ThrottleFault | FaultCode::ExternalHalt => Severity::GeneralError,
        FaultCode::HallFault
        | FaultCode::FetTestFailed
        | FaultCode::HighSideFault
        | FaultCode::LowSideFault => Severity::SevereError,
    }
}

/// Select the battery tier for the session's supply maximum.
///
/// `thresholds` are strictly increasing and bound half-open bands compared
/// with a strict `<`. A maximum of zero means no supply sample has been taken
/// and produces no alert. Below the first threshold is one burst, each band
/// above adds one, capped at four.
pub fn battery_tier(max_adc: u16, thresholds: &[u16; 4]) -> BatteryTier {
    if max_adc == 0 {
        return BatteryTier::None;
    }
    let band = thresholds
        .iter()
        .position(|t| max_adc < *t)
        .unwrap_or(thresholds.len());
    match band {
        0 => BatteryTier::Beeps1,
        1 => BatteryTier::Beeps2,
        2 => BatteryTier::Beeps3,
        _ => BatteryTier::Beeps4,
    }
}

/// Tone step: (frequency [Hz], duration [ms]). Frequency 0 is a rest.
pub type Tone = (u16, u16);

const READY_TONES: &[Tone] = &[(1047, 80), (0, 40), (1319, 80), (0, 40), (1568, 120)];
const OVERLOAD_TONES: &[Tone] = &[(2093, 150), (1760, 150), (1397, 150), (1047, 300)];
const GENERAL_ERROR_TONES: &[Tone] = &[(880, 200), (0, 80), (660, 200), (0, 80), (440, 300)];
const SEVERE_ERROR_TONES: &[Tone] = &[
    (2637, 150),
    (0, 50),
    (2637, 150),
    (0, 50),
    (2637, 150),
    (0, 50),
    (2637, 400),
];
const BEEP_1: &[Tone] = &[(1760, 100), (0, 300)];
const BEEP_2: &[Tone] = &[(1760, 100), (0, 150), (1760, 100), (0, 300)];
const BEEP_3: &[Tone] = &[
    (1760, 100),
    (0, 150),
    (1760, 100),
    (0, 150),
    (1760, 100),
    (0, 300),
];
const BEEP_4: &[Tone] = &[
    (1760, 100),
    (0, 150),
    (1760, 100),
    (0, 150),
    (1760, 100),
    (0, 150),
    (1760, 100),
    (0, 300),
];

impl AlertPattern {
    /// Tone sequence for the audio collaborator
    pub const fn tones(self) -> &'static [Tone] {
        match self {
            Self::Tone(Severity::Ready) => READY_TONES,
            Self::Tone(Severity::Overload) => OVERLOAD_TONES,
            Self::Tone(Severity::GeneralError) => GENERAL_ERROR_TONES,
            Self::Tone(Severity::SevereError) => SEVERE_ERROR_TONES,
            Self::Battery(BatteryTier::None) => &[],
            Self::Battery(BatteryTier::Beeps1) => BEEP_1,
            Self::Battery(BatteryTier::Beeps2) => BEEP_2,
            Self::Battery(BatteryTier::Beeps3) => BEEP_3,
            Self::Battery(BatteryTier::Beeps4) => BEEP_4,
        }
    }

    /// Pattern for a fault code
    pub const fn for_fault(code: FaultCode) -> Self {
        Self::Tone(severity_for(code))
    }
}
