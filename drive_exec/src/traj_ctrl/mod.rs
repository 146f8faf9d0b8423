//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the vehicle on a
//! time-parameterised trajectory. Each cycle the [`Trajectory`] is sampled at
//! the elapsed time to get the desired state, and the [`RamseteController`]
//! converts the error between the current pose and the desired pose into a
//! corrected chassis velocity.
//!
//! The tracking error is expressed in the vehicle's own frame: `e_x` is the
//! error along the direction of travel, `e_y` the error to the left of the
//! vehicle and `e_theta` the heading error, counter-clockwise positive.
//!
//! The corrected chassis velocity is then turned into wheel speeds, and an
//! inner [`PidController`] per wheel closes the loop on the measured wheel
//! velocity. The two gain sets (tracking and wheel velocity) are independent.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::Params;
pub use trajectory::*;
#[cfg(test)]
pub(crate) use params::test_params;
