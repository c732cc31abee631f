//! Six-step commutation and safety-interlock engine for a hall-sensored
//! e-bike BLDC controller.
//!
//! The crate owns every decision that touches the power stage: hall
//! decoding, shoot-through safe switching, the throttle ramp, the self-test
//! battery and the fault/idle/sleep state machine. Board access goes through
//! the traits in [`hardware`] so the whole engine runs on the host in tests.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
pub(crate) mod fmt;

pub mod alert;
pub mod config;
pub mod controller;
pub mod fault;
pub mod hardware;
pub mod self_test;
pub mod six_step;
pub mod throttle;
pub mod voltage;

#[cfg(test)]
mod sim;

pub use alert::{AlertPattern, BatteryTier, Severity};
pub use config::{ConfigError, ControllerConfig};
pub use controller::{Controller, ControllerMode};
pub use fault::{Fault, FaultCode};
pub use hardware::{Board, DiagnosticEvent, PowerStage, Reporter, Sensors};
pub use six_step::{CommutationStep, HallReading, Phase};
