//! # Follow trajectory command
//!
//! Follows a [`Trajectory`] using the Ramsete tracking law, with a
//! feedforward and a PID velocity loop on each wheel.
//!
//! Each cycle:
//!
//! 1. The trajectory is sampled at the elapsed time.
//! 2. The tracking controller corrects the desired chassis velocity using the
//!    error between the current pose and the desired pose.
//! 3. The corrected chassis velocity is converted into wheel speed targets.
//! 4. Each wheel's voltage is the feedforward for its target speed and
//!    acceleration, plus the output of its velocity controller.
//!
//! The command is done once the elapsed time reaches the trajectory duration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::{check_running, check_startable, stop_and_release, CmdError, CmdState, Command};
use crate::loco_ctrl::{Drivetrain, WheelSpeeds, WheelVoltages};
use crate::traj_ctrl::{
    self, tracking_error, PidController, RamseteController, Trajectory, TrajectoryState
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NAME: &str = "FollowTrajectory";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows a trajectory from the current position of the vehicle.
#[derive(Debug, Clone)]
pub struct FollowTrajectory {
    traj: Trajectory,

    ramsete: RamseteController,

    left_ctrl: PidController,
    right_ctrl: PidController,

    state: CmdState,

    /// Time since the command was started
    elapsed_s: f64,

    /// Wheel speed targets of the previous cycle
    prev_targets: Option<WheelSpeeds>,

    report: StatusReport,
}

/// Status of the trajectory follower for a single cycle.
///
/// Flat so that it can be archived as CSV.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// Units: seconds
    pub time_s: f64,

    // ---- TRACKING ERROR ----

    pub e_x_m: f64,
    pub e_y_m: f64,
    pub e_theta_rad: f64,

    // ---- DESIRED STATE ----

    pub desired_x_m: f64,
    pub desired_y_m: f64,
    pub desired_theta_rad: f64,
    pub desired_vel_ms: f64,
    pub desired_ang_vel_rads: f64,

    // ---- CORRECTED DEMAND ----

    pub cmd_vel_ms: f64,
    pub cmd_ang_vel_rads: f64,

    // ---- WHEELS ----

    pub left_target_ms: f64,
    pub right_target_ms: f64,
    pub left_meas_ms: f64,
    pub right_meas_ms: f64,
    pub left_ff_v: f64,
    pub right_ff_v: f64,
    pub left_fb_v: f64,
    pub right_fb_v: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FollowTrajectory {
    /// Create a new command to follow the given trajectory.
    ///
    /// `max_voltage_v` bounds the integral term of the wheel controllers.
    pub fn new(traj: Trajectory, params: &traj_ctrl::Params, max_voltage_v: f64) -> Self {
        Self {
            traj,
            ramsete: params.ramsete(),
            left_ctrl: params.wheel_vel_ctrl(max_voltage_v),
            right_ctrl: params.wheel_vel_ctrl(max_voltage_v),
            state: CmdState::Idle,
            elapsed_s: 0.0,
            prev_targets: None,
            report: StatusReport::default(),
        }
    }

    /// Create the command from raw trajectory states.
    ///
    /// Malformed trajectories are rejected here so the command never starts.
    pub fn from_states(
        states: Vec<TrajectoryState>,
        params: &traj_ctrl::Params,
        max_voltage_v: f64
    ) -> Result<Self, CmdError> {
        Ok(Self::new(Trajectory::new(states)?, params, max_voltage_v))
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.traj
    }

    /// Time since the command started.
    ///
    /// Units: seconds
    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    /// Status of the last cycle.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }
}

impl Command for FollowTrajectory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn state(&self) -> CmdState {
        self.state
    }

    fn start(&mut self, drive: &mut Drivetrain) -> Result<(), CmdError> {
        check_startable(NAME, self.state)?;
        drive.claim(NAME)?;

        // Trajectories are planned from the origin
        drive.reset_odometry();

        self.left_ctrl.reset();
        self.right_ctrl.reset();
        self.elapsed_s = 0.0;
        self.prev_targets = None;
        self.report = StatusReport::default();
        self.state = CmdState::Running;

        info!(
            "Following trajectory of {} states over {:.2} s",
            self.traj.states().len(),
            self.traj.duration_s()
        );

        Ok(())
    }

    fn tick(&mut self, dt_s: f64, drive: &mut Drivetrain) -> Result<(), CmdError> {
        check_running(NAME, self.state)?;

        self.elapsed_s += dt_s;

        let desired = self.traj.sample(self.elapsed_s);
        let pose = drive.pose();

        let chassis = self.ramsete.correct(&pose, &desired);
        let targets = drive.kinematics().to_wheel_speeds(chassis);

        // Wheel accelerations from the change in targets since the last cycle
        let (left_accel, right_accel) = match self.prev_targets {
            Some(prev) if dt_s > 0.0 => (
                (targets.left_ms - prev.left_ms) / dt_s,
                (targets.right_ms - prev.right_ms) / dt_s
            ),
            _ => (0.0, 0.0)
        };
        self.prev_targets = Some(targets);

        let ff = WheelVoltages::new(
            drive.feedforward().voltage(targets.left_ms, left_accel),
            drive.feedforward().voltage(targets.right_ms, right_accel)
        );

        let meas = drive.wheel_speeds();
        let fb = WheelVoltages::new(
            self.left_ctrl.get(targets.left_ms - meas.left_ms, self.elapsed_s),
            self.right_ctrl.get(targets.right_ms - meas.right_ms, self.elapsed_s)
        );

        drive.drive_wheel_volts(ff, fb);

        let err = tracking_error(&pose, &desired.pose);
        self.report = StatusReport {
            time_s: self.elapsed_s,
            e_x_m: err.e_x_m,
            e_y_m: err.e_y_m,
            e_theta_rad: err.e_theta_rad,
            desired_x_m: desired.pose.x_m,
            desired_y_m: desired.pose.y_m,
            desired_theta_rad: desired.pose.theta_rad,
            desired_vel_ms: desired.vel_ms,
            desired_ang_vel_rads: desired.ang_vel_rads,
            cmd_vel_ms: chassis.linear_ms,
            cmd_ang_vel_rads: chassis.angular_rads,
            left_target_ms: targets.left_ms,
            right_target_ms: targets.right_ms,
            left_meas_ms: meas.left_ms,
            right_meas_ms: meas.right_ms,
            left_ff_v: ff.left_v,
            right_ff_v: ff.right_v,
            left_fb_v: fb.left_v,
            right_fb_v: fb.right_v,
        };

        if self.elapsed_s >= self.traj.duration_s() {
            debug!("Trajectory time elapsed");
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
            warn!(
                "Trajectory interrupted after {:.2} s of {:.2} s",
                self.elapsed_s,
                self.traj.duration_s()
            );
        }
        else {
            info!("Trajectory complete, final pose: {:?}", drive.pose());
        }

        self.state = CmdState::Done;
    }

    fn status_report(&self) -> Option<StatusReport> {
        Some(self.report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loc::{Pose, SensorData};
    use crate::loco_ctrl::{test_params, DriveOutput};

    fn line(vel_ms: f64) -> Trajectory {
        Trajectory::new(vec![
            TrajectoryState {
                time_s: 0.0,
                pose: Pose::default(),
                vel_ms,
                ang_vel_rads: 0.0,
                accel_mss: None
            },
            TrajectoryState {
                time_s: 2.0,
                pose: Pose::new(2.0 * vel_ms, 0.0, 0.0),
                vel_ms,
                ang_vel_rads: 0.0,
                accel_mss: None
            },
        ]).unwrap()
    }

    #[test]
    fn test_life_cycle() {
        let mut drive = Drivetrain::new(test_params());
        let mut cmd = FollowTrajectory::new(line(0.5), &traj_ctrl::test_params(), 12.0);

        assert_eq!(cmd.state(), CmdState::Idle);
        assert_eq!(cmd.tick(0.02, &mut drive), Err(CmdError::NotRunning(NAME)));

        cmd.start(&mut drive).unwrap();
        assert_eq!(cmd.state(), CmdState::Running);
        assert_eq!(drive.owner(), Some(NAME));
        assert_eq!(cmd.start(&mut drive), Err(CmdError::AlreadyStarted(NAME)));

        cmd.end(&mut drive, true);
        assert_eq!(cmd.state(), CmdState::Done);
        assert_eq!(drive.owner(), None);
        assert_eq!(drive.output(), DriveOutput::STOP);
    }

    #[test]
    fn test_on_path_is_feedforward_only() {
        let mut drive = Drivetrain::new(test_params());
        let mut cmd = FollowTrajectory::new(line(0.5), &traj_ctrl::test_params(), 12.0);
        cmd.start(&mut drive).unwrap();

        // Vehicle exactly on the path and at the desired speed
        drive.periodic(&SensorData {
            left_dist_m: 0.25,
            right_dist_m: 0.25,
            left_vel_ms: 0.5,
            right_vel_ms: 0.5,
            ..Default::default()
        }).unwrap();
        cmd.tick(0.5, &mut drive).unwrap();

        let report = cmd.report();
        assert!(report.e_x_m.abs() < 1e-12);
        assert!(report.e_y_m.abs() < 1e-12);
        assert_eq!(report.cmd_vel_ms, 0.5);
        assert_eq!(report.cmd_ang_vel_rads, 0.0);
        assert!(report.left_fb_v.abs() < 1e-12);

        let expected = drive.feedforward().voltage(0.5, 0.0) / 12.0;
        assert!((drive.output().left - expected).abs() < 1e-12);
        assert!((drive.output().right - expected).abs() < 1e-12);
    }

    #[test]
    fn test_done_at_duration() {
        let mut drive = Drivetrain::new(test_params());
        let mut cmd = FollowTrajectory::new(line(0.5), &traj_ctrl::test_params(), 12.0);
        cmd.start(&mut drive).unwrap();

        for _ in 0..7 {
            cmd.tick(0.25, &mut drive).unwrap();
            assert!(!cmd.is_done());
        }
        cmd.tick(0.25, &mut drive).unwrap();
        assert!(cmd.is_done());
        assert_eq!(cmd.elapsed_s(), 2.0);
    }

    #[test]
    fn test_rejects_malformed_trajectory() {
        let res = FollowTrajectory::from_states(vec![], &traj_ctrl::test_params(), 12.0);
        assert!(matches!(
            res,
            Err(CmdError::TrajectoryError(traj_ctrl::TrajectoryError::TooFewStates(0)))
        ));
    }
}
