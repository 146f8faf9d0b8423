//! Command parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::params::{require_non_negative, require_positive, require_unit, InvalidParam};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the drive commands.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- DRIVE DISTANCE ----

    /// Distance controller proportional gain
    ///
    /// Units: duty / meter
    pub drive_dist_k_p: f64,

    /// Distance controller integral gain
    pub drive_dist_k_i: f64,

    /// Distance controller derivative gain
    pub drive_dist_k_d: f64,

    /// Distance error under which the drive is considered complete
    ///
    /// Units: meters
    pub drive_dist_tolerance_m: f64,

    // ---- TURN TO HEADING ----

    /// Heading controller proportional gain
    ///
    /// Units: duty / degree
    pub turn_k_p: f64,

    /// Heading controller integral gain
    pub turn_k_i: f64,

    /// Heading controller derivative gain
    pub turn_k_d: f64,

    /// Heading error under which the turn is considered complete
    ///
    /// Units: degrees
    pub turn_tolerance_deg: f64,

    // ---- MANUAL DRIVE ----

    /// Duty for a full forward input
    pub drive_speed: f64,

    /// Duty for a full turn input
    pub turn_speed: f64,

    /// Multiplier applied to the forward duty in slow mode
    pub slow_multiplier: f64,

    /// Inputs smaller in magnitude than this are treated as zero
    pub axis_threshold: f64,
}

impl Params {
    /// Check that every parameter is in its valid range.
    pub fn validate(&self) -> Result<(), InvalidParam> {
        require_non_negative("drive_dist_k_p", self.drive_dist_k_p)?;
        require_non_negative("drive_dist_k_i", self.drive_dist_k_i)?;
        require_non_negative("drive_dist_k_d", self.drive_dist_k_d)?;
        require_positive("drive_dist_tolerance_m", self.drive_dist_tolerance_m)?;

        require_non_negative("turn_k_p", self.turn_k_p)?;
        require_non_negative("turn_k_i", self.turn_k_i)?;
        require_non_negative("turn_k_d", self.turn_k_d)?;
        require_positive("turn_tolerance_deg", self.turn_tolerance_deg)?;

        require_unit("drive_speed", self.drive_speed)?;
        require_unit("turn_speed", self.turn_speed)?;
        require_unit("slow_multiplier", self.slow_multiplier)?;
        require_unit("axis_threshold", self.axis_threshold)
    }
}

/// Parameters matching the original vehicle's tuning.
#[cfg(test)]
pub(crate) fn test_params() -> Params {
    Params {
        drive_dist_k_p: 0.3,
        drive_dist_k_i: 0.0,
        drive_dist_k_d: 0.0,
        drive_dist_tolerance_m: 0.02,
        turn_k_p: 0.006,
        turn_k_i: 0.0,
        turn_k_d: 0.0001,
        turn_tolerance_deg: 2.0,
        drive_speed: 0.3,
        turn_speed: 0.2,
        slow_multiplier: 0.25,
        axis_threshold: 0.1,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        assert_eq!(test_params().validate(), Ok(()));

        let mut params = test_params();
        params.turn_tolerance_deg = 0.0;
        assert_eq!(params.validate().map_err(|e| e.name), Err("turn_tolerance_deg"));

        let mut params = test_params();
        params.drive_speed = 1.2;
        assert_eq!(params.validate().map_err(|e| e.name), Err("drive_speed"));
    }
}
