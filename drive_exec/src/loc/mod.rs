//! # Localisation module
//!
//! This module provides localisation for the vehicle in the form of wheel
//! odometry. The heading comes from the gyro and the travelled distance from
//! the encoders on each side of the drivetrain, these are dead-reckoned by the
//! [`PoseEstimator`] into a pose in the world frame.
//!
//! All angles inside this module are counter-clockwise positive radians.
//! Sensors which report clockwise-positive angles must be converted at the
//! boundary with [`heading_from_cw_deg`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod estimator;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use util::maths::norm_angle;

pub use estimator::PoseEstimator;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading) of the vehicle in the world frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position along the world X axis
    ///
    /// Units: meters
    pub x_m: f64,

    /// Position along the world Y axis
    ///
    /// Units: meters
    pub y_m: f64,

    /// Heading, the angle from the world X axis, counter-clockwise positive.
    ///
    /// Units: radians, in the range (-pi, pi]
    pub theta_rad: f64,
}

/// Sensor readings for a single control cycle, already converted into
/// physical units.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// Absolute heading of the vehicle, counter-clockwise positive.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Cumulative distance travelled by the left side.
    ///
    /// Units: meters
    pub left_dist_m: f64,

    /// Cumulative distance travelled by the right side.
    ///
    /// Units: meters
    pub right_dist_m: f64,

    /// Instantaneous velocity of the left side.
    ///
    /// Units: meters/second
    pub left_vel_ms: f64,

    /// Instantaneous velocity of the right side.
    ///
    /// Units: meters/second
    pub right_vel_ms: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by the localisation module.
#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum LocError {
    /// A sensor reading was NaN or infinite and was not integrated.
    #[error("Sensor reading `{field}` is not finite ({value})")]
    NonFiniteReading {
        field: &'static str,
        value: f64
    },

    /// Integrating the readings would have produced a non-finite pose.
    #[error("Integrated pose is not finite ({x_m}, {y_m}, {theta_rad})")]
    NonFinitePose {
        x_m: f64,
        y_m: f64,
        theta_rad: f64
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Create a new pose, normalising the heading into (-pi, pi].
    pub fn new(x_m: f64, y_m: f64, theta_rad: f64) -> Self {
        Self {
            x_m,
            y_m,
            theta_rad: norm_angle(theta_rad),
        }
    }

    /// The position of the pose as a vector in the world frame.
    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x_m, self.y_m)
    }

    /// The heading in degrees, for display.
    pub fn heading_deg(&self) -> f64 {
        self.theta_rad.to_degrees()
    }

    /// True if every component of the pose is finite.
    pub fn is_finite(&self) -> bool {
        self.x_m.is_finite() && self.y_m.is_finite() && self.theta_rad.is_finite()
    }
}

impl SensorData {
    /// Check that every reading is finite.
    ///
    /// The first non-finite reading found is reported.
    pub fn validate(&self) -> Result<(), LocError> {
        let fields = [
            ("heading_rad", self.heading_rad),
            ("left_dist_m", self.left_dist_m),
            ("right_dist_m", self.right_dist_m),
            ("left_vel_ms", self.left_vel_ms),
            ("right_vel_ms", self.right_vel_ms),
        ];

        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some(&(field, value)) => Err(LocError::NonFiniteReading { field, value }),
            None => Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a clockwise-positive gyro angle in degrees into a counter-clockwise
/// positive heading in radians.
pub fn heading_from_cw_deg(angle_deg: f64) -> f64 {
    norm_angle(-angle_deg.to_radians())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_pose_normalises_heading() {
        let pose = Pose::new(1.0, 2.0, 3.0 * PI);
        assert!((pose.theta_rad - PI).abs() < 1e-9);
        assert!((pose.heading_deg() - 180.0).abs() < 1e-6);
        assert_eq!(pose.position(), Vector2::new(1.0, 2.0));
    }

    #[test]
    fn test_heading_from_cw_deg() {
        assert!((heading_from_cw_deg(90.0) + PI / 2.0).abs() < 1e-12);
        assert!((heading_from_cw_deg(-45.0) - PI / 4.0).abs() < 1e-12);
        assert!((heading_from_cw_deg(270.0) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sensor_validation() {
        let mut data = SensorData::default();
        assert_eq!(data.validate(), Ok(()));

        data.right_dist_m = std::f64::INFINITY;
        assert_eq!(
            data.validate(),
            Err(LocError::NonFiniteReading {
                field: "right_dist_m",
                value: std::f64::INFINITY
            })
        );

        data.heading_rad = std::f64::NAN;
        match data.validate() {
            Err(LocError::NonFiniteReading { field, .. }) => assert_eq!(field, "heading_rad"),
            _ => panic!("Expected a non-finite heading")
        }
    }
}
