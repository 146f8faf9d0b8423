//! Drivetrain subsystem
//!
//! The [`Drivetrain`] owns the pose estimate, the latest sensor readings and
//! the last commanded output. Commands drive the vehicle through it, and the
//! command runner writes its output to a [`DriveActuator`] once per cycle.
//!
//! Only one command may drive at a time. This is enforced by protocol: a
//! command must [`Drivetrain::claim`] the drivetrain when it starts and
//! [`Drivetrain::release`] it when it ends.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};

// Internal
use super::{
    compose, compose_output, limit_output,
    DiffDriveKinematics, DriveError, DriveOutput, Feedforward, Params,
    WheelSpeeds, WheelVoltages,
};
use crate::loc::{LocError, Pose, PoseEstimator, SensorData};
use crate::tm::DriveTm;
use util::maths::norm_angle;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Interface to the motor controllers of both sides of the drivetrain.
pub trait DriveActuator {
    /// Apply the normalised duty commands, each in [-1, 1].
    fn set_output(&mut self, output: DriveOutput);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The differential drivetrain subsystem.
#[derive(Debug, Clone)]
pub struct Drivetrain {
    params: Params,
    kinematics: DiffDriveKinematics,
    feedforward: Feedforward,

    estimator: PoseEstimator,

    /// Latest valid raw sensor data
    raw_sensors: Option<SensorData>,

    /// Raw readings which correspond to zero heading and distance
    sensor_zero: SensorData,

    /// Latest measured side speeds
    wheel_speeds: WheelSpeeds,

    /// Last commanded output
    output: DriveOutput,

    /// Name of the command currently driving
    owner: Option<&'static str>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Drivetrain {
    /// Create a new drivetrain, stopped and at the origin.
    pub fn new(params: Params) -> Self {
        Self {
            kinematics: params.kinematics(),
            feedforward: params.feedforward(),
            params,
            estimator: PoseEstimator::new(),
            raw_sensors: None,
            sensor_zero: SensorData::default(),
            wheel_speeds: WheelSpeeds::default(),
            output: DriveOutput::STOP,
            owner: None,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn kinematics(&self) -> &DiffDriveKinematics {
        &self.kinematics
    }

    pub fn feedforward(&self) -> &Feedforward {
        &self.feedforward
    }

    // ---- SENSING ----

    /// Integrate this cycle's sensor data into the pose estimate.
    ///
    /// Must be called once per cycle before any command is ticked. Non-finite
    /// data, or data which would integrate to a non-finite pose, is rejected
    /// and the previous pose and wheel speeds are held.
    pub fn periodic(&mut self, raw: &SensorData) -> Result<Pose, LocError> {
        raw.validate()?;

        let pose = self.estimator.update(
            norm_angle(raw.heading_rad - self.sensor_zero.heading_rad),
            raw.left_dist_m - self.sensor_zero.left_dist_m,
            raw.right_dist_m - self.sensor_zero.right_dist_m,
        )?;

        self.raw_sensors = Some(*raw);
        self.wheel_speeds = WheelSpeeds::new(raw.left_vel_ms, raw.right_vel_ms);

        Ok(pose)
    }

    /// Zero the heading and both distances and put the pose at the origin.
    ///
    /// The latest raw readings become the new zero, equivalent to resetting
    /// the gyro and encoders.
    pub fn reset_odometry(&mut self) {
        if let Some(raw) = self.raw_sensors {
            self.sensor_zero = raw;
        }
        self.estimator.reset();

        debug!("Odometry reset, sensor zero: {:?}", self.sensor_zero);
    }

    /// The current pose estimate.
    pub fn pose(&self) -> Pose {
        self.estimator.pose()
    }

    /// The latest measured side speeds.
    pub fn wheel_speeds(&self) -> WheelSpeeds {
        self.wheel_speeds
    }

    /// Mean distance travelled by both sides since the last odometry reset.
    ///
    /// Units: meters
    pub fn distance_m(&self) -> f64 {
        self.estimator.mean_distance_m()
    }

    // ---- OWNERSHIP ----

    /// Claim exclusive use of the drivetrain for the named command.
    ///
    /// Claiming an already held claim again is allowed.
    pub fn claim(&mut self, claimant: &'static str) -> Result<(), DriveError> {
        match self.owner {
            Some(owner) if owner != claimant => Err(DriveError::AlreadyOwned { owner, claimant }),
            _ => {
                self.owner = Some(claimant);
                debug!("Drivetrain claimed by {}", claimant);
                Ok(())
            }
        }
    }

    /// Release the claim held by the named command.
    ///
    /// A claim held by another command is left untouched.
    pub fn release(&mut self, claimant: &'static str) -> Result<(), DriveError> {
        if self.owner == Some(claimant) {
            self.owner = None;
            debug!("Drivetrain released by {}", claimant);
            Ok(())
        }
        else {
            Err(DriveError::NotOwner { owner: self.owner, claimant })
        }
    }

    /// Name of the command currently holding the drivetrain.
    pub fn owner(&self) -> Option<&'static str> {
        self.owner
    }

    // ---- DRIVING ----

    /// Drive each side with the given duty.
    pub fn tank_drive(&mut self, left: f64, right: f64) {
        self.set_output(DriveOutput::new(left, right));
    }

    /// Drive each side with the given voltage.
    pub fn tank_drive_volts(&mut self, left_v: f64, right_v: f64) {
        let max_v = self.params.max_voltage_v;
        self.set_output(DriveOutput::new(
            compose(left_v, 0.0, max_v),
            compose(right_v, 0.0, max_v)
        ));
    }

    /// Drive with a forward duty and a turn duty.
    ///
    /// The turn is clockwise positive, as a joystick X axis is.
    pub fn arcade_drive(&mut self, forward: f64, turn: f64) {
        self.set_output(DriveOutput::new(forward + turn, forward - turn));
    }

    /// Drive each side with the sum of a feedforward and feedback voltage.
    pub fn drive_wheel_volts(&mut self, ff: WheelVoltages, fb: WheelVoltages) {
        let output = compose_output(ff, fb, self.params.max_voltage_v);
        self.set_output(output);
    }

    /// Command zero output on both sides.
    pub fn stop(&mut self) {
        if self.output != DriveOutput::STOP {
            info!("Drivetrain stopped");
        }
        self.output = DriveOutput::STOP;
    }

    /// The last commanded output.
    pub fn output(&self) -> DriveOutput {
        self.output
    }

    /// Telemetry snapshot of the drivetrain.
    pub fn tm(&self, time_s: f64) -> DriveTm {
        let pose = self.pose();

        DriveTm {
            time_s,
            x_m: pose.x_m,
            y_m: pose.y_m,
            heading_deg: pose.heading_deg(),
            left_output: self.output.left,
            right_output: self.output.right,
        }
    }

    fn set_output(&mut self, output: DriveOutput) {
        // Each side is clamped on its own value only
        self.output = limit_output(output, self.params.duty_limit.min(1.0));

        trace!("Drivetrain output: {:?}", self.output);
    }
}
