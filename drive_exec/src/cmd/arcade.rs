//! # Arcade drive command
//!
//! Manual driving from a forward axis and a turn axis, such as a joystick.
//! The command never finishes on its own, it runs until interrupted.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};

// Internal
use super::{check_running, check_startable, stop_and_release, CmdError, CmdState, Command};
use crate::loco_ctrl::Drivetrain;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NAME: &str = "ArcadeDrive";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive from manual forward and turn inputs.
#[derive(Debug, Clone)]
pub struct ArcadeDrive {
    params: super::Params,

    state: CmdState,

    /// Forward input in [-1, 1]
    forward: f64,

    /// Turn input in [-1, 1], clockwise positive
    turn: f64,

    slow: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArcadeDrive {
    pub fn new(params: &super::Params) -> Self {
        Self {
            params: params.clone(),
            state: CmdState::Idle,
            forward: 0.0,
            turn: 0.0,
            slow: false,
        }
    }

    /// Set the inputs to use from the next cycle onwards.
    pub fn set_input(&mut self, forward: f64, turn: f64, slow: bool) {
        self.forward = forward;
        self.turn = turn;
        self.slow = slow;
    }

    /// The forward and turn duties for the current inputs.
    pub fn duties(&self) -> (f64, f64) {
        let mut forward = self.deadband(self.forward) * self.params.drive_speed;
        if self.slow {
            forward *= self.params.slow_multiplier;
        }

        (forward, self.deadband(self.turn) * self.params.turn_speed)
    }

    fn deadband(&self, input: f64) -> f64 {
        if input.abs() < self.params.axis_threshold {
            0.0
        }
        else {
            input.clamp(-1.0, 1.0)
        }
    }
}

impl Command for ArcadeDrive {
    fn name(&self) -> &'static str {
        NAME
    }

    fn state(&self) -> CmdState {
        self.state
    }

    fn start(&mut self, drive: &mut Drivetrain) -> Result<(), CmdError> {
        check_startable(NAME, self.state)?;
        drive.claim(NAME)?;

        self.state = CmdState::Running;
        info!("Manual drive started");

        Ok(())
    }

    fn tick(&mut self, _dt_s: f64, drive: &mut Drivetrain) -> Result<(), CmdError> {
        check_running(NAME, self.state)?;

        let (forward, turn) = self.duties();
        trace!("Arcade duties: forward {:.3}, turn {:.3}", forward, turn);

        drive.arcade_drive(forward, turn);

        Ok(())
    }

    fn is_done(&self) -> bool {
        false
    }

    fn end(&mut self, drive: &mut Drivetrain, _interrupted: bool) {
        stop_and_release(drive, NAME);
        info!("Manual drive ended");

        self.state = CmdState::Done;
    }
}
