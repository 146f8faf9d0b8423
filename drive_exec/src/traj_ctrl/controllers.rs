//! # Trajectory controllers module
//!
//! This module provides the controllers used for trajectory following: the
//! nonlinear Ramsete tracking law which corrects the chassis velocity, and the
//! PID controller used for the inner wheel velocity loops.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Rotation2;
use serde::Serialize;

// Internal
use crate::loc::Pose;
use crate::loco_ctrl::ChassisVelocity;
use util::maths::{get_ang_dist, sinc};

use super::TrajectoryState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Limit on the magnitude of the integral accumulation
    integral_limit: Option<f64>,

    /// Time of the previous call
    prev_time_s: Option<f64>,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

/// The Ramsete nonlinear tracking controller.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RamseteController {
    /// Convergence gain
    k_b: f64,

    /// Damping ratio
    k_zeta: f64,
}

/// Error between the current pose and a desired pose, in the frame of the
/// current pose.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct TrackingError {
    /// Error along the direction of travel
    ///
    /// Units: meters
    pub e_x_m: f64,

    /// Error to the left of the direction of travel
    ///
    /// Units: meters
    pub e_y_m: f64,

    /// Heading error, counter-clockwise positive
    ///
    /// Units: radians
    pub e_theta_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            integral_limit: None,
            integral: 0f64,
            prev_time_s: None,
            prev_error: None
        }
    }

    /// Bound the integral accumulation to `[-limit, limit]`.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit.abs());
        self
    }

    /// Bound the integral accumulation so that the integral term alone never
    /// exceeds `max_output` in magnitude.
    ///
    /// Has no effect if the integral gain is zero.
    pub fn with_output_limit(self, max_output: f64) -> Self {
        if self.k_i != 0.0 {
            let limit = max_output / self.k_i;
            self.with_integral_limit(limit)
        }
        else {
            self
        }
    }

    pub fn integral_limit(&self) -> Option<f64> {
        self.integral_limit
    }

    /// Get the value of the controller for the given error at the given time.
    ///
    /// On the first call after creation or a reset there is no previous time,
    /// so only the proportional term contributes.
    pub fn get(&mut self, error: f64, time_s: f64) -> f64 {
        // Calculate dt, ignoring time that doesn't move forwards
        let dt = match self.prev_time_s {
            Some(t0) if time_s > t0 => Some(time_s - t0),
            _ => None
        };

        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral
        self.integral += match dt {
            Some(t) => error * t,
            None => 0f64
        };
        if let Some(limit) = self.integral_limit {
            self.integral = self.integral.clamp(-limit, limit);
        }

        // Calculate the derivative, assuming none without a previous error
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64
        };

        // Calculate the output
        let out =
            self.k_p * error
            + self.k_i * self.integral
            + self.k_d * deriv;

        // Remember the previous error and time
        self.prev_error = Some(error);
        self.prev_time_s = Some(time_s);

        out
    }

    /// Clear the integral, previous error and previous time.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
        self.prev_time_s = None;
    }
}

impl RamseteController {
    pub fn new(k_b: f64, k_zeta: f64) -> Self {
        Self { k_b, k_zeta }
    }

    /// The time varying gain for the given desired velocities.
    pub fn gain(&self, vel_ms: f64, ang_vel_rads: f64) -> f64 {
        2.0 * self.k_zeta * (ang_vel_rads.powi(2) + self.k_b * vel_ms.powi(2)).sqrt()
    }

    /// Get the corrected chassis velocity which drives the vehicle from
    /// `pose` towards the desired state.
    ///
    /// With no error the desired velocities are returned exactly.
    pub fn correct(&self, pose: &Pose, desired: &TrajectoryState) -> ChassisVelocity {
        let err = tracking_error(pose, &desired.pose);

        let v_d = desired.vel_ms;
        let w_d = desired.ang_vel_rads;
        let k = self.gain(v_d, w_d);

        let vel_ms = v_d * err.e_theta_rad.cos() + k * err.e_x_m;
        let ang_vel_rads = w_d
            + k * err.e_theta_rad
            + self.k_b * v_d * sinc(err.e_theta_rad) * err.e_y_m;

        trace!(
            "Ramsete: err {:?}, k {:.4}, cmd ({:.4} m/s, {:.4} rad/s)",
            err, k, vel_ms, ang_vel_rads
        );

        ChassisVelocity::new(vel_ms, ang_vel_rads)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the error from `pose` to `desired`, rotated into the frame of
/// `pose`.
pub fn tracking_error(pose: &Pose, desired: &Pose) -> TrackingError {
    let err_m = Rotation2::new(-pose.theta_rad) * (desired.position() - pose.position());

    TrackingError {
        e_x_m: err_m[0],
        e_y_m: err_m[1],
        e_theta_rad: get_ang_dist(pose.theta_rad, desired.theta_rad)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn desired(x_m: f64, y_m: f64, theta_rad: f64, vel_ms: f64, ang_vel_rads: f64)
        -> TrajectoryState
    {
        TrajectoryState {
            time_s: 0.0,
            pose: Pose::new(x_m, y_m, theta_rad),
            vel_ms,
            ang_vel_rads,
            accel_mss: None
        }
    }

    #[test]
    fn test_zero_error_is_feedforward_only() {
        let ctrl = RamseteController::new(2.0, 0.7);

        for &(x, y, theta, v, w) in &[
            (0.0, 0.0, 0.0, 1.0, 0.0),
            (1.3, -2.1, 0.4, 0.8, 0.25),
            (-4.0, 0.5, -2.9, -1.2, -0.6),
            (0.0, 0.0, 0.0, 0.0, 0.0),
        ] {
            let d = desired(x, y, theta, v, w);
            let out = ctrl.correct(&d.pose, &d);

            assert_eq!(out, ChassisVelocity::new(v, w));
        }
    }

    #[test]
    fn test_lateral_offset() {
        let ctrl = RamseteController::new(2.0, 0.7);
        let d = desired(0.0, 0.1, 0.0, 1.0, 0.0);

        let k = ctrl.gain(1.0, 0.0);
        assert!((k - 1.979_898_987).abs() < 1e-6);

        let out = ctrl.correct(&Pose::default(), &d);
        assert!((out.linear_ms - 1.0).abs() < 1e-12);
        assert!((out.angular_rads - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_singularity_guard() {
        let ctrl = RamseteController::new(2.0, 0.7);

        // Position error but no heading error
        let d = desired(0.3, -0.2, 0.0, 0.5, 0.0);
        let out = ctrl.correct(&Pose::default(), &d);
        assert!(out.linear_ms.is_finite());
        assert!(out.angular_rads.is_finite());

        // Stationary desired state gives zero gain and no NaN
        let d = desired(0.3, -0.2, 0.0, 0.0, 0.0);
        let out = ctrl.correct(&Pose::default(), &d);
        assert_eq!(out, ChassisVelocity::new(0.0, 0.0));
    }

    #[test]
    fn test_tracking_error_frame() {
        // Facing +Y, a target at +X is to the right of the vehicle
        let pose = Pose::new(0.0, 0.0, FRAC_PI_2);
        let err = tracking_error(&pose, &Pose::new(1.0, 0.0, FRAC_PI_2));

        assert!(err.e_x_m.abs() < 1e-12);
        assert!((err.e_y_m + 1.0).abs() < 1e-12);
        assert_eq!(err.e_theta_rad, 0.0);

        // Heading error takes the short way round
        let err = tracking_error(&Pose::new(0.0, 0.0, 3.0), &Pose::new(0.0, 0.0, -3.0));
        assert!((err.e_theta_rad - (2.0 * std::f64::consts::PI - 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_pid_first_call_proportional_only() {
        let mut pid = PidController::new(2.0, 1.0, 0.5);
        assert_eq!(pid.get(0.5, 0.0), 1.0);

        // Second call adds the integral and derivative terms
        let out = pid.get(1.0, 0.5);
        let expected = 2.0 * 1.0 + 1.0 * 0.5 + 0.5 * (0.5 / 0.5);
        assert!((out - expected).abs() < 1e-12);
    }

    #[test]
    fn test_pid_reset() {
        let mut pid = PidController::new(1.0, 3.0, 0.2);
        let mut fresh = pid.clone();

        for i in 0..50 {
            pid.get(0.8, i as f64 * 0.02);
        }
        pid.reset();

        // No residual bias after a reset
        assert_eq!(pid.get(0.0, 5.0), 0.0);
        assert_eq!(pid.get(0.0, 5.02), fresh.get(0.0, 0.0));
        assert_eq!(pid.get(0.0, 5.04), 0.0);
    }

    #[test]
    fn test_pid_anti_windup() {
        let mut pid = PidController::new(0.0, 2.0, 0.0).with_output_limit(12.0);
        assert_eq!(pid.integral_limit(), Some(6.0));

        for i in 0..1000 {
            pid.get(100.0, i as f64 * 0.02);
        }
        assert!((pid.get(100.0, 20.0) - 12.0).abs() < 1e-12);

        // Unwinds as soon as the error changes sign
        let out = pid.get(-100.0, 20.02);
        assert!(out < 12.0);
    }
}
