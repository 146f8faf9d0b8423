//! # Drive distance command
//!
//! Drives straight forwards (or backwards for a negative distance) until the
//! mean distance travelled by both sides is within tolerance of the target.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use super::{check_running, check_startable, stop_and_release, CmdError, CmdState, Command};
use crate::loco_ctrl::Drivetrain;
use crate::traj_ctrl::PidController;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NAME: &str = "DriveDistance";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive a fixed distance in a straight line.
#[derive(Debug, Clone)]
pub struct DriveDistance {
    /// Units: meters
    target_m: f64,

    /// Units: meters
    tolerance_m: f64,

    ctrl: PidController,

    state: CmdState,

    /// Drivetrain distance when the command started
    start_dist_m: f64,

    elapsed_s: f64,

    /// Distance still to go
    error_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveDistance {
    pub fn new(distance_m: f64, params: &super::Params) -> Self {
        Self {
            target_m: distance_m,
            tolerance_m: params.drive_dist_tolerance_m,
            ctrl: PidController::new(
                params.drive_dist_k_p, params.drive_dist_k_i, params.drive_dist_k_d
            ).with_output_limit(1.0),
            state: CmdState::Idle,
            start_dist_m: 0.0,
            elapsed_s: 0.0,
            error_m: distance_m,
        }
    }

    /// Distance still to travel.
    ///
    /// Units: meters
    pub fn error_m(&self) -> f64 {
        self.error_m
    }
}

impl Command for DriveDistance {
    fn name(&self) -> &'static str {
        NAME
    }

    fn state(&self) -> CmdState {
        self.state
    }

    fn start(&mut self, drive: &mut Drivetrain) -> Result<(), CmdError> {
        check_startable(NAME, self.state)?;
        drive.claim(NAME)?;

        self.start_dist_m = drive.distance_m();
        self.error_m = self.target_m;
        self.elapsed_s = 0.0;
        self.ctrl.reset();
        self.state = CmdState::Running;

        info!("Driving {:.3} m", self.target_m);

        Ok(())
    }

    fn tick(&mut self, dt_s: f64, drive: &mut Drivetrain) -> Result<(), CmdError> {
        check_running(NAME, self.state)?;

        self.elapsed_s += dt_s;
        self.error_m = self.target_m - (drive.distance_m() - self.start_dist_m);

        let duty = self.ctrl.get(self.error_m, self.elapsed_s);
        drive.tank_drive(duty, duty);

        if self.error_m.abs() <= self.tolerance_m {
            self.state = CmdState::Done;
        }

        Ok(())
    }

    fn is_done(&self) -> bool {
        self.state == CmdState::Done
    }

    fn end(&mut self, drive: &mut Drivetrain, interrupted: bool) {
        stop_and_release(drive, NAME);

        if interrupted {
            warn!("Drive distance interrupted with {:.3} m to go", self.error_m);
        }
        else {
            info!("Drive distance complete");
        }

        self.state = CmdState::Done;
    }
}
