//! # Simulated drivetrain
//!
//! A first-order model of a differential drivetrain, used in place of the
//! real motor controllers and sensors. Each side is driven by a DC motor
//! model:
//!
//! ```text
//! a = (V - kS * sign(v) - kV * v) / kA
//! ```
//!
//! where `V` is the commanded duty multiplied by the supply voltage. The
//! vehicle pose is integrated exactly along the arc defined by the two side
//! speeds.
//!
//! Sensors are reported the way the vehicle's own hardware reports them:
//! encoders count motor rotations and the gyro is clockwise positive in
//! degrees. [`SimTank::sensor_data`] converts them into [`SensorData`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::loc::{heading_from_cw_deg, Pose, SensorData};
use crate::loco_ctrl::{self, DriveActuator, DriveOutput, Feedforward};
use util::maths::{norm_angle, sign};
use util::params::{require_non_negative, require_positive, InvalidParam};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Yaw rates below this are integrated as a straight line.
///
/// Units: radians/second
const STRAIGHT_LINE_THRESHOLD_RADS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Constants of the simulated motors, which may differ from the constants
/// the controllers were characterised with.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct SimParams {
    /// Units: volts
    pub k_s: f64,

    /// Units: volts / (meters/second)
    pub k_v: f64,

    /// Units: volts / (meters/second^2)
    pub k_a: f64,
}

/// Simulated differential drivetrain.
#[derive(Debug, Clone)]
pub struct SimTank {
    plant: SimParams,

    track_width_m: f64,
    distance_per_rotation_m: f64,
    max_voltage_v: f64,

    /// Output applied to the motors
    output: DriveOutput,

    left: Side,
    right: Side,

    /// Wrapped true pose
    pose: Pose,

    /// Unwrapped true heading
    ///
    /// Units: radians
    heading_rad: f64,
}

/// State of one side of the drivetrain
#[derive(Debug, Copy, Clone, Default)]
struct Side {
    /// Units: meters/second
    vel_ms: f64,

    /// Units: meters
    dist_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimParams {
    /// Plant constants which exactly match the given feedforward model.
    pub fn from_feedforward(ff: &Feedforward) -> Self {
        Self { k_s: ff.k_s, k_v: ff.k_v, k_a: ff.k_a }
    }

    /// Check the constants describe a plant which can be integrated.
    pub fn validate(&self) -> Result<(), InvalidParam> {
        require_non_negative("k_s", self.k_s)?;
        require_non_negative("k_v", self.k_v)?;
        require_positive("k_a", self.k_a)
    }
}

impl SimTank {
    /// Create a new simulated drivetrain at rest at the origin.
    pub fn new(loco_params: &loco_ctrl::Params, plant: SimParams) -> Self {
        Self {
            plant,
            track_width_m: loco_params.track_width_m,
            distance_per_rotation_m: loco_params.distance_per_rotation_m(),
            max_voltage_v: loco_params.max_voltage_v,
            output: DriveOutput::STOP,
            left: Side::default(),
            right: Side::default(),
            pose: Pose::default(),
            heading_rad: 0.0,
        }
    }

    /// Advance the simulation by `dt_s` seconds with the current output.
    pub fn step(&mut self, dt_s: f64) {
        if dt_s <= 0.0 {
            return
        }

        let left_v = self.output.left * self.max_voltage_v;
        let right_v = self.output.right * self.max_voltage_v;
        self.left.step(&self.plant, left_v, dt_s);
        self.right.step(&self.plant, right_v, dt_s);

        // Chassis motion over the step
        let vel_ms = 0.5 * (self.left.vel_ms + self.right.vel_ms);
        let ang_vel_rads = (self.right.vel_ms - self.left.vel_ms) / self.track_width_m;

        let theta_0 = self.pose.theta_rad;
        let theta_1 = theta_0 + ang_vel_rads * dt_s;

        if ang_vel_rads.abs() < STRAIGHT_LINE_THRESHOLD_RADS {
            self.pose.x_m += vel_ms * theta_0.cos() * dt_s;
            self.pose.y_m += vel_ms * theta_0.sin() * dt_s;
        }
        else {
            let r = vel_ms / ang_vel_rads;
            self.pose.x_m += r * (theta_1.sin() - theta_0.sin());
            self.pose.y_m += r * (theta_0.cos() - theta_1.cos());
        }

        self.pose.theta_rad = norm_angle(theta_1);
        self.heading_rad += ang_vel_rads * dt_s;
    }

    /// The true pose of the simulated vehicle.
    pub fn true_pose(&self) -> Pose {
        self.pose
    }

    /// Encoder readings of each side.
    ///
    /// Units: motor rotations
    pub fn encoder_rotations(&self) -> (f64, f64) {
        (
            self.left.dist_m / self.distance_per_rotation_m,
            self.right.dist_m / self.distance_per_rotation_m
        )
    }

    /// Gyro reading, clockwise positive and unwrapped.
    ///
    /// Units: degrees
    pub fn gyro_angle_deg(&self) -> f64 {
        -self.heading_rad.to_degrees()
    }

    /// Sensor readings converted into physical units.
    pub fn sensor_data(&self) -> SensorData {
        let (left_rot, right_rot) = self.encoder_rotations();

        SensorData {
            heading_rad: heading_from_cw_deg(self.gyro_angle_deg()),
            left_dist_m: left_rot * self.distance_per_rotation_m,
            right_dist_m: right_rot * self.distance_per_rotation_m,
            left_vel_ms: self.left.vel_ms,
            right_vel_ms: self.right.vel_ms,
        }
    }

    /// The output currently applied to the motors.
    pub fn output(&self) -> DriveOutput {
        self.output
    }
}

impl DriveActuator for SimTank {
    fn set_output(&mut self, output: DriveOutput) {
        self.output = output;
    }
}

impl Side {
    fn step(&mut self, plant: &SimParams, voltage_v: f64, dt_s: f64) {
        // Static friction holds a stationary side until it is overcome
        if self.vel_ms == 0.0 && voltage_v.abs() <= plant.k_s {
            return
        }

        let friction_dir = if self.vel_ms == 0.0 {
            sign(voltage_v)
        }
        else {
            sign(self.vel_ms)
        };

        let accel_mss = (voltage_v - plant.k_s * friction_dir - plant.k_v * self.vel_ms)
            / plant.k_a;
        let vel_ms = self.vel_ms + accel_mss * dt_s;

        // Friction can stop the side but never reverse it
        let vel_ms = if sign(vel_ms) == -friction_dir && voltage_v.abs() <= plant.k_s {
            0.0
        }
        else {
            vel_ms
        };

        self.vel_ms = vel_ms;
        self.dist_m += vel_ms * dt_s;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loco_ctrl::test_params;

    fn tank() -> SimTank {
        let params = test_params();
        SimTank::new(&params, SimParams::from_feedforward(&params.feedforward()))
    }

    fn run(sim: &mut SimTank, secs: f64) {
        let steps = (secs / 0.01).round() as usize;
        for _ in 0..steps {
            sim.step(0.01);
        }
    }

    #[test]
    fn test_static_friction() {
        let mut sim = tank();

        // Below the static friction voltage nothing moves
        sim.set_output(DriveOutput::new(0.01, -0.01));
        run(&mut sim, 1.0);
        assert_eq!(sim.true_pose(), Pose::default());
        assert_eq!(sim.sensor_data(), SensorData::default());
    }

    #[test]
    fn test_straight_line_steady_state() {
        let mut sim = tank();
        let ff = test_params().feedforward();

        // Feedforward voltage for 1 m/s gives 1 m/s at steady state
        let duty = ff.voltage(1.0, 0.0) / 12.0;
        sim.set_output(DriveOutput::new(duty, duty));
        run(&mut sim, 10.0);

        let data = sim.sensor_data();
        assert!((data.left_vel_ms - 1.0).abs() < 1e-3);
        assert!((data.right_vel_ms - 1.0).abs() < 1e-3);
        assert!(data.heading_rad.abs() < 1e-12);
        assert!(sim.true_pose().y_m.abs() < 1e-12);
        assert!((sim.true_pose().x_m - data.left_dist_m).abs() < 1e-9);
    }

    #[test]
    fn test_turn_on_the_spot() {
        let mut sim = tank();

        // Right side forwards turns counter-clockwise, which the gyro
        // reports as a negative angle.
        sim.set_output(DriveOutput::new(-0.2, 0.2));
        run(&mut sim, 0.5);

        assert!(sim.true_pose().theta_rad > 0.0);
        assert!(sim.gyro_angle_deg() < 0.0);
        assert!((sim.sensor_data().heading_rad - sim.true_pose().theta_rad).abs() < 1e-9);
        assert!(sim.true_pose().x_m.abs() < 1e-9);
        assert!(sim.true_pose().y_m.abs() < 1e-9);

        // Encoders count rotations of the motor
        let (left_rot, right_rot) = sim.encoder_rotations();
        let dpr = test_params().distance_per_rotation_m();
        assert!((right_rot * dpr - sim.sensor_data().right_dist_m).abs() < 1e-12);
        assert!(left_rot < 0.0);
    }

    #[test]
    fn test_coasts_to_stop() {
        let mut sim = tank();
        sim.set_output(DriveOutput::new(0.5, 0.5));
        run(&mut sim, 1.0);
        assert!(sim.sensor_data().left_vel_ms > 0.0);

        sim.set_output(DriveOutput::STOP);
        run(&mut sim, 5.0);
        assert_eq!(sim.sensor_data().left_vel_ms, 0.0);
        assert_eq!(sim.sensor_data().right_vel_ms, 0.0);
    }
}
