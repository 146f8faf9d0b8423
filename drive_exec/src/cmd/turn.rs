//! # Turn to heading command
//!
//! Turns on the spot until the heading is within tolerance of the target. The
//! heading controller works in degrees, counter-clockwise positive.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use super::{check_running, check_startable, stop_and_release, CmdError, CmdState, Command};
use crate::loco_ctrl::Drivetrain;
use crate::traj_ctrl::PidController;
use util::maths::{get_ang_dist, norm_angle};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NAME: &str = "TurnToHeading";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Turn on the spot to a heading.
#[derive(Debug, Clone)]
pub struct TurnToHeading {
    target: Target,

    /// Units: degrees
    tolerance_deg: f64,

    ctrl: PidController,

    state: CmdState,

    /// Absolute heading target, set on start
    ///
    /// Units: radians
    target_rad: f64,

    elapsed_s: f64,

    /// Units: degrees
    error_deg: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone)]
enum Target {
    /// Turn by an angle from the heading at start
    Relative(f64),

    /// Turn to an absolute heading
    Absolute(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TurnToHeading {
    /// Turn by `angle_deg` from the heading when the command starts.
    pub fn relative(angle_deg: f64, params: &super::Params) -> Self {
        Self::new(Target::Relative(angle_deg.to_radians()), params)
    }

    /// Turn to the absolute heading `heading_deg`.
    pub fn absolute(heading_deg: f64, params: &super::Params) -> Self {
        Self::new(Target::Absolute(heading_deg.to_radians()), params)
    }

    fn new(target: Target, params: &super::Params) -> Self {
        Self {
            target,
            tolerance_deg: params.turn_tolerance_deg,
            ctrl: PidController::new(params.turn_k_p, params.turn_k_i, params.turn_k_d)
                .with_output_limit(1.0),
            state: CmdState::Idle,
            target_rad: 0.0,
            elapsed_s: 0.0,
            error_deg: 0.0,
        }
    }

    /// Heading error of the last cycle.
    ///
    /// Units: degrees
    pub fn error_deg(&self) -> f64 {
        self.error_deg
    }
}

impl Command for TurnToHeading {
    fn name(&self) -> &'static str {
        NAME
    }

    fn state(&self) -> CmdState {
        self.state
    }

    fn start(&mut self, drive: &mut Drivetrain) -> Result<(), CmdError> {
        check_startable(NAME, self.state)?;
        drive.claim(NAME)?;

        let heading_rad = drive.pose().theta_rad;
        self.target_rad = match self.target {
            Target::Relative(a) => norm_angle(heading_rad + a),
            Target::Absolute(h) => norm_angle(h)
        };
        self.error_deg = get_ang_dist(heading_rad, self.target_rad).to_degrees();
        self.elapsed_s = 0.0;
        self.ctrl.reset();
        self.state = CmdState::Running;

        info!("Turning to {:.1} deg", self.target_rad.to_degrees());

        Ok(())
    }

    fn tick(&mut self, dt_s: f64, drive: &mut Drivetrain) -> Result<(), CmdError> {
        check_running(NAME, self.state)?;

        self.elapsed_s += dt_s;
        self.error_deg = get_ang_dist(drive.pose().theta_rad, self.target_rad).to_degrees();

        // Positive output turns counter-clockwise
        let duty = self.ctrl.get(self.error_deg, self.elapsed_s);
        drive.tank_drive(-duty, duty);

        if self.error_deg.abs() <= self.tolerance_deg {
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
            warn!("Turn interrupted {:.1} deg from target", self.error_deg);
        }
        else {
            info!("Turn complete");
        }

        self.state = CmdState::Done;
    }
}
