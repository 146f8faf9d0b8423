//! # Locomotion control module
//!
//! Locomotion control converts chassis-level demands into demands on the two
//! sides of the differential drivetrain, and owns the [`Drivetrain`] which
//! writes those demands out to the actuators.
//!
//! The chain for a closed-loop demand is:
//!
//! 1. [`DiffDriveKinematics`] maps a [`ChassisVelocity`] into [`WheelSpeeds`].
//! 2. [`Feedforward`] estimates the voltage needed to hold each wheel speed.
//! 3. A feedback voltage is added by the caller (see `traj_ctrl`).
//! 4. [`compose`] sums, clamps and normalises each side into a duty command.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod drivetrain;
mod feedforward;
mod kinematics;
mod output;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// Internal
pub use drivetrain::*;
pub use feedforward::Feedforward;
pub use kinematics::DiffDriveKinematics;
pub use output::*;
pub use params::Params;
#[cfg(test)]
pub(crate) use params::test_params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity of the chassis.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisVelocity {
    /// Forward speed
    ///
    /// Units: meters/second
    pub linear_ms: f64,

    /// Yaw rate, counter-clockwise positive
    ///
    /// Units: radians/second
    pub angular_rads: f64,
}

/// Linear speed of each side of the drivetrain.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelSpeeds {
    /// Units: meters/second
    pub left_ms: f64,

    /// Units: meters/second
    pub right_ms: f64,
}

/// A voltage for each side of the drivetrain.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelVoltages {
    /// Units: volts
    pub left_v: f64,

    /// Units: volts
    pub right_v: f64,
}

/// Normalised duty command for each side, in [-1, 1].
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveOutput {
    pub left: f64,
    pub right: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LocoCtrl operation.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriveError {
    #[error("The drivetrain is already owned by `{owner}`, cannot be claimed by `{claimant}`")]
    AlreadyOwned {
        owner: &'static str,
        claimant: &'static str
    },

    #[error("`{claimant}` cannot release the drivetrain as it is owned by {owner:?}")]
    NotOwner {
        owner: Option<&'static str>,
        claimant: &'static str
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisVelocity {
    pub fn new(linear_ms: f64, angular_rads: f64) -> Self {
        Self { linear_ms, angular_rads }
    }
}

impl WheelSpeeds {
    pub fn new(left_ms: f64, right_ms: f64) -> Self {
        Self { left_ms, right_ms }
    }
}

impl WheelVoltages {
    pub fn new(left_v: f64, right_v: f64) -> Self {
        Self { left_v, right_v }
    }
}

impl DriveOutput {
    /// Zero output on both sides.
    pub const STOP: DriveOutput = DriveOutput { left: 0.0, right: 0.0 };

    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}
