// Half-bridge switching for six-step commutation
// Computes the per-phase switch commands for a step and writes them to the
// power stage without ever letting both sides of one bridge conduct.

use super::{CommutationStep, Phase, PhaseArray, SwitchCommand, ALL_OFF};
use crate::fault::Fault;
use crate::fmt::*;
use crate::hardware::PowerStage;

/// Switch commands for a step, ignoring history.
///
/// One phase switches its high side at `duty`, another holds its low side on,
/// the third floats. `Invalid` yields all-off.
pub fn commands_for(step: CommutationStep, duty: u8) -> PhaseArray<SwitchCommand> {
    let mut commands = ALL_OFF;
    if let Some((high, low)) = step.phases() {
        commands[high.index()] = SwitchCommand::high(duty);
        commands[low.index()] = SwitchCommand::low();
    }
    commands
}

/// Write commands to the power stage.
///
/// Per phase: an active high side is only switched on after its low side has
/// been forced off; otherwise the high side is forced off before the low side
/// is applied. Do not reorder.
pub fn drive<P: PowerStage>(stage: &mut P, commands: &PhaseArray<SwitchCommand>) {
    for phase in Phase::ALL {
        let cmd = commands[phase.index()];
        if cmd.is_high_active() {
            stage.set_low(phase, false);
            stage.set_high_duty(phase, cmd.high_duty());
        } else {
            stage.set_high_duty(phase, 0);
            stage.set_low(phase, cmd.is_low_active());
        }
    }
}

/// Turn every switch off
pub fn de_energize<P: PowerStage>(stage: &mut P) {
    drive(stage, &ALL_OFF);
}

/// Output of one commutation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commutation {
    /// The step changed: de-energize everything before `commands`
    pub blank_first: bool,
    pub commands: PhaseArray<SwitchCommand>,
}

/// Commutation state carried across control cycles
pub struct PhaseDriver {
    /// Step applied on the previous cycle
    prev_step: CommutationStep,
    /// Consecutive invalid hall readings
    invalid_count: u16,
    /// Invalid readings tolerated before a hall fault
    invalid_limit: u16,
}

impl PhaseDriver {
    /// Create a new phase driver
    ///
    /// # Arguments
    /// * `invalid_limit` - Consecutive invalid steps tolerated; one more is a hall fault
    pub fn new(invalid_limit: u16) -> Self {
        Self {
            prev_step: CommutationStep::Invalid,
            invalid_count: 0,
            invalid_limit,
        }
    }

    /// Compute this cycle's commands
    ///
    /// # Returns
    /// * `Ok(Commutation)` - commands to drive, flagged when the step changed
    /// * `Err(Fault::Hall)` - too many consecutive invalid readings
    pub fn apply(&mut self, step: CommutationStep, duty: u8) -> Result<Commutation, Fault> {
        let blank_first = step != self.prev_step;
        self.prev_step = step;

        if !step.is_valid() {
            self.invalid_count = self.invalid_count.saturating_add(1);
            if self.invalid_count > self.invalid_limit {
                error!(
                    "Hall invalid for {} consecutive cycles",
                    self.invalid_count
                );
                return Err(Fault::Hall);
            }
            trace!("Invalid hall step ({} in a row)", self.invalid_count);
            return Ok(Commutation {
                blank_first,
                commands: ALL_OFF,
            });
        }

        self.invalid_count = 0;
        Ok(Commutation {
            blank_first,
            commands: commands_for(step, duty),
        })
    }

    /// Run one commutation cycle on the power stage.
    ///
    /// On a step edge every bridge is de-energized before the new commands
    /// are written. On a fault the stage is left de-energized.
    pub fn commutate<P: PowerStage>(
        &mut self,
        stage: &mut P,
        step: CommutationStep,
        duty: u8,
    ) -> Result<(), Fault> {
        match self.apply(step, duty) {
            Ok(commutation) => {
                if commutation.blank_first {
                    de_energize(stage);
                }
                drive(stage, &commutation.commands);
                Ok(())
            }
            Err(fault) => {
                de_energize(stage);
                Err(fault)
            }
        }
    }

    /// Forget the previous step and the invalid streak
    pub fn reset(&mut self) {
        self.prev_step = CommutationStep::Invalid;
        self.invalid_count = 0;
    }

    pub fn step(&self) -> CommutationStep {
        self.prev_step
    }

    pub fn invalid_count(&self) -> u16 {
        self.invalid_count
    }
}
