// Hall sensor decoding for six-step commutation
// Pure lookup from the sampled 3-bit pattern to a commutation step; it must be
// re-run every control cycle since the rotor keeps moving.

use super::CommutationStep;

/// Hall pattern to commutation step.
/// Index format: (U << 2) | (V << 1) | W
/// 0b000 and 0b111 cannot occur with healthy sensors and map to Invalid
const HALL_STEP_TABLE: [CommutationStep; 8] = [
    CommutationStep::Invalid, // 0b000
    CommutationStep::S5,      // 0b001: W
    CommutationStep::S3,      // 0b010: V
    CommutationStep::S4,      // 0b011: V+W
    CommutationStep::S1,      // 0b100: U
    CommutationStep::S6,      // 0b101: U+W
    CommutationStep::S2,      // 0b110: U+V
    CommutationStep::Invalid, // 0b111
];

/// One sample of the three hall sensor lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HallReading {
    pub u: bool,
    pub v: bool,
    pub w: bool,
}

impl HallReading {
    pub const fn new(u: bool, v: bool, w: bool) -> Self {
        Self { u, v, w }
    }

    /// Build from a packed pattern (U = bit 2, V = bit 1, W = bit 0)
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            u: bits & 0b100 != 0,
            v: bits & 0b010 != 0,
            w: bits & 0b001 != 0,
        }
    }

    /// Packed pattern (U = bit 2, V = bit 1, W = bit 0)
    pub const fn bits(&self) -> u8 {
        ((self.u as u8) << 2) | ((self.v as u8) << 1) | (self.w as u8)
    }
}

/// Decode a hall reading into a commutation step
#[inline]
pub fn decode(reading: HallReading) -> CommutationStep {
    HALL_STEP_TABLE[reading.bits() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_table() {
        let expected = [
            ((true, false, false), 1),
            ((true, true, false), 2),
            ((false, true, false), 3),
            ((false, true, true), 4),
            ((false, false, true), 5),
            ((true, false, true), 6),
            ((false, false, false), 0),
            ((true, true, true), 0),
        ];
        for ((u, v, w), step) in expected {
            assert_eq!(decode(HallReading::new(u, v, w)).as_u8(), step);
        }
    }

    #[test]
    fn test_decode_is_pure() {
        for bits in 0..8u8 {
            let reading = HallReading::from_bits(bits);
            let first = decode(reading);
            assert_eq!(decode(reading), first);
            assert_eq!(reading.bits(), bits);
        }
    }

    #[test]
    fn test_only_two_invalid_patterns() {
        let invalid = (0..8u8)
            .filter(|&b| !decode(HallReading::from_bits(b)).is_valid())
            .count();
        assert_eq!(invalid, 2);
    }
}
