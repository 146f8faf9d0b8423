//! # Drive Executable Parameters
//!
//! This module provide parameters for the drive executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use drive_lib::sim::SimParams;
use util::params::{require_finite, require_non_negative, require_positive, InvalidParam};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DriveExecParams {

    /// Period of one control cycle
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Time allowed beyond the trajectory duration before the command is
    /// interrupted
    ///
    /// Units: seconds
    pub timeout_margin_s: f64,

    /// Period between status log messages
    ///
    /// Units: seconds
    pub log_period_s: f64,

    /// If true each cycle is paced to the cycle period in wall clock time,
    /// otherwise the simulation runs as fast as possible.
    pub realtime: bool,

    /// Absolute heading to turn to once the trajectory is complete. If not
    /// given the vehicle stops at the end of the trajectory.
    ///
    /// Units: degrees
    pub final_heading_deg: Option<f64>,

    /// Time allowed for the final turn
    ///
    /// Units: seconds
    pub final_turn_timeout_s: f64,

    /// Constants of the simulated drivetrain
    pub sim: SimParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DriveExecParams {
    pub fn validate(&self) -> Result<(), InvalidParam> {
        require_positive("cycle_period_s", self.cycle_period_s)?;
        require_non_negative("timeout_margin_s", self.timeout_margin_s)?;
        require_positive("log_period_s", self.log_period_s)?;
        if let Some(h) = self.final_heading_deg {
            require_finite("final_heading_deg", h)?;
        }
        require_positive("final_turn_timeout_s", self.final_turn_timeout_s)?;
        self.sim.validate()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PARAMS: &str = r#"
        cycle_period_s = 0.02
        timeout_margin_s = 2.0
        log_period_s = 1.0
        realtime = false
        final_turn_timeout_s = 5.0

        [sim]
        k_s = 0.19
        k_v = 3.05
        k_a = 2.3
    "#;

    #[test]
    fn test_load() {
        let params: DriveExecParams = util::params::load_str(PARAMS).unwrap();
        assert_eq!(params.final_heading_deg, None);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn test_validate() {
        let params: DriveExecParams = util::params::load_str(
            &PARAMS.replace("cycle_period_s = 0.02", "cycle_period_s = 0.0")
        ).unwrap();
        assert_eq!(params.validate().map_err(|e| e.name), Err("cycle_period_s"));

        let params: DriveExecParams = util::params::load_str(
            &PARAMS.replace("k_a = 2.3", "k_a = 0.0")
        ).unwrap();
        assert_eq!(params.validate().map_err(|e| e.name), Err("k_a"));
    }
}
