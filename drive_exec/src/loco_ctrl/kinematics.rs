//! Differential drive kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{ChassisVelocity, WheelSpeeds};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Maps between chassis velocity and the speeds of the two sides.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DiffDriveKinematics {
    /// Distance between the left and right wheels.
    ///
    /// Units: meters
    pub track_width_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DiffDriveKinematics {
    pub fn new(track_width_m: f64) -> Self {
        Self { track_width_m }
    }

    /// Get the side speeds needed to achieve the chassis velocity.
    pub fn to_wheel_speeds(&self, vel: ChassisVelocity) -> WheelSpeeds {
        let half_track_rate = vel.angular_rads * self.track_width_m / 2.0;

        WheelSpeeds {
            left_ms: vel.linear_ms - half_track_rate,
            right_ms: vel.linear_ms + half_track_rate,
        }
    }

    /// Get the chassis velocity produced by the side speeds.
    pub fn to_chassis_velocity(&self, speeds: WheelSpeeds) -> ChassisVelocity {
        ChassisVelocity {
            linear_ms: (speeds.left_ms + speeds.right_ms) / 2.0,
            angular_rads: (speeds.right_ms - speeds.left_ms) / self.track_width_m,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_wheel_speeds() {
        let kin = DiffDriveKinematics::new(0.7);

        let s = kin.to_wheel_speeds(ChassisVelocity::new(1.0, 0.0));
        assert_eq!(s, WheelSpeeds::new(1.0, 1.0));

        // CCW turn on the spot, right side forwards
        let s = kin.to_wheel_speeds(ChassisVelocity::new(0.0, 2.0));
        assert!((s.left_ms + 0.7).abs() < 1e-12);
        assert!((s.right_ms - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let kin = DiffDriveKinematics::new(0.7112);

        for &v in &[-2.0, -0.3, 0.0, 0.5, 3.7] {
            for &w in &[-4.0, -1.1, 0.0, 0.2, 6.0] {
                let vel = kin.to_chassis_velocity(
                    kin.to_wheel_speeds(ChassisVelocity::new(v, w)));
                assert!((vel.linear_ms - v).abs() < 1e-9);
                assert!((vel.angular_rads - w).abs() < 1e-9);
            }
        }
    }
}
