//! # Command module
//!
//! Commands are the units of behaviour which drive the vehicle. Each command
//! follows the same life cycle:
//!
//! ```text
//! Idle --start--> Running --tick...--> Done
//!                    |                   |
//!                    +------- end -------+
//! ```
//!
//! The [`CmdRunner`] owns the [`Drivetrain`](crate::loco_ctrl::Drivetrain)
//! and at most one active command. Every cycle it updates the drivetrain with
//! fresh sensor data, ticks the command and writes the drivetrain's output to
//! the actuators.
//!
//! A command must claim the drivetrain in `start` and must always stop it and
//! release it in `end`, whether the command completed or was interrupted.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod arcade;
mod drive_dist;
mod follow_traj;
mod params;
mod runner;
mod turn;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
pub use arcade::ArcadeDrive;
pub use drive_dist::DriveDistance;
pub use follow_traj::{FollowTrajectory, StatusReport};
pub use params::Params;
#[cfg(test)]
pub(crate) use params::test_params;
pub use runner::{CmdRunner, RunnerEvent};
pub use turn::TurnToHeading;

use crate::loc::LocError;
use crate::loco_ctrl::{DriveError, Drivetrain};
use crate::traj_ctrl::TrajectoryError;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A unit of behaviour which drives the vehicle.
pub trait Command {
    /// Name of the command, also used to claim the drivetrain.
    fn name(&self) -> &'static str;

    /// Current life cycle state.
    fn state(&self) -> CmdState;

    /// Begin executing the command.
    fn start(&mut self, drive: &mut Drivetrain) -> Result<(), CmdError>;

    /// Execute one cycle of the command, `dt_s` seconds after the previous
    /// cycle.
    fn tick(&mut self, dt_s: f64, drive: &mut Drivetrain) -> Result<(), CmdError>;

    /// True once the command has achieved its goal.
    fn is_done(&self) -> bool;

    /// Finish the command, zeroing the output and releasing the drivetrain.
    fn end(&mut self, drive: &mut Drivetrain, interrupted: bool);

    /// Tracking status of the last cycle, for commands which follow a
    /// trajectory.
    fn status_report(&self) -> Option<StatusReport> {
        None
    }
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Life cycle state of a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum CmdState {
    Idle,
    Running,
    Done,
}

/// Possible errors when running commands.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CmdError {
    #[error("Invalid sensor data: {0}")]
    InvalidSensorData(#[from] LocError),

    #[error("Drivetrain error: {0}")]
    DriveError(#[from] DriveError),

    #[error("Invalid trajectory: {0}")]
    TrajectoryError(#[from] TrajectoryError),

    #[error("Command `{0}` is not running")]
    NotRunning(&'static str),

    #[error("Command `{0}` has already been started")]
    AlreadyStarted(&'static str),

    #[error("Cycle time must be finite and not negative, found {0} s")]
    InvalidCycleTime(f64),
}

impl Default for CmdState {
    fn default() -> Self {
        CmdState::Idle
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that a command may be started from the given state.
pub(crate) fn check_startable(name: &'static str, state: CmdState) -> Result<(), CmdError> {
    match state {
        CmdState::Running => Err(CmdError::AlreadyStarted(name)),
        _ => Ok(())
    }
}

/// Check that a command may be ticked from the given state.
pub(crate) fn check_running(name: &'static str, state: CmdState) -> Result<(), CmdError> {
    match state {
        CmdState::Running => Ok(()),
        _ => Err(CmdError::NotRunning(name))
    }
}

/// Zero the drivetrain's output and give up the named command's claim on it.
pub(crate) fn stop_and_release(drive: &mut Drivetrain, name: &'static str) {
    drive.stop();

    if let Err(e) = drive.release(name) {
        debug!("{}", e);
    }
}
