//! Drivetrain feedforward model
//!
//! Voltage estimate for a permanent magnet DC motor driven side:
//!
//! ```text
//! V = kS * sign(v) + kV * v + kA * a
//! ```
//!
//! The static friction term is dropped at zero velocity so that a stationary
//! demand doesn't chatter between +kS and -kS.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::sign;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Feedforward constants, found by characterising the drivetrain.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedforward {
    /// Static friction voltage
    ///
    /// Units: volts
    pub k_s: f64,

    /// Velocity gain
    ///
    /// Units: volts / (meters/second)
    pub k_v: f64,

    /// Acceleration gain
    ///
    /// Units: volts / (meters/second^2)
    pub k_a: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Feedforward {
    pub fn new(k_s: f64, k_v: f64, k_a: f64) -> Self {
        Self { k_s, k_v, k_a }
    }

    /// Voltage needed to hold the given velocity while accelerating at the
    /// given rate. Pass zero acceleration for a constant speed estimate.
    pub fn voltage(&self, vel_ms: f64, accel_mss: f64) -> f64 {
        self.k_s * sign(vel_ms) + self.k_v * vel_ms + self.k_a * accel_mss
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_voltage() {
        let ff = Feedforward::new(0.17247, 2.8886, 2.1367);

        assert!((ff.voltage(1.0, 0.0) - (0.17247 + 2.8886)).abs() < 1e-12);
        assert!((ff.voltage(-1.0, 0.0) + (0.17247 + 2.8886)).abs() < 1e-12);
        assert!((ff.voltage(0.5, 2.0) - (0.17247 + 1.4443 + 4.2734)).abs() < 1e-12);
    }

    #[test]
    fn test_no_static_term_at_zero_velocity() {
        let ff = Feedforward::new(0.5, 2.0, 1.0);

        assert_eq!(ff.voltage(0.0, 0.0), 0.0);

        // Accelerating from rest only has the acceleration term
        assert_eq!(ff.voltage(0.0, 1.5), 1.5);
    }
}
