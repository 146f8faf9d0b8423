//! # Drive library.
//!
//! This library provides the control core of the drive software, so that the
//! executable, tests and benchmarks can all use it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command module - commands which drive the vehicle and the runner which executes them
pub mod cmd;

/// Localisation module - provides the vehicle with an idea of where it is in the world
pub mod loc;

/// Locomotion control module - converts chassis demands into individual wheel commands
pub mod loco_ctrl;

/// Simulation module - a simulated drivetrain to run commands against
pub mod sim;

/// Telemetry module - records of the drivetrain state for archiving
pub mod tm;

/// Trajectory control module - keeps the vehicle on the given trajectory
pub mod traj_ctrl;
