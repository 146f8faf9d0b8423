//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use util::params::{require_non_negative, require_positive, InvalidParam};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {

    // ---- TRACKING ----

    /// Ramsete convergence gain, larger values correct position error more
    /// aggressively. Must be greater than zero.
    ///
    /// Units: radians^2 / meters^2
    pub k_b: f64,

    /// Ramsete damping ratio, in (0, 1).
    pub k_zeta: f64,

    // ---- WHEEL VELOCITY ----

    /// Wheel velocity controller proportional gain
    ///
    /// Units: volts / (meters/second)
    pub vel_k_p: f64,

    /// Wheel velocity controller integral gain
    pub vel_k_i: f64,

    /// Wheel velocity controller derivative gain
    pub vel_k_d: f64,
}

impl Params {
    /// Check that every gain is in its valid range.
    pub fn validate(&self) -> Result<(), InvalidParam> {
        require_positive("k_b", self.k_b)?;
        require_positive("k_zeta", self.k_zeta)?;
        if self.k_zeta >= 1.0 {
            return Err(InvalidParam {
                name: "k_zeta",
                value: self.k_zeta,
                requirement: "less than one"
            })
        }
        require_non_negative("vel_k_p", self.vel_k_p)?;
        require_non_negative("vel_k_i", self.vel_k_i)?;
        require_non_negative("vel_k_d", self.vel_k_d)
    }

    /// Build the tracking controller from these gains.
    pub fn ramsete(&self) -> super::RamseteController {
        super::RamseteController::new(self.k_b, self.k_zeta)
    }

    /// Build one wheel velocity controller, with its integral limited so the
    /// integral term alone can never exceed the given voltage.
    pub fn wheel_vel_ctrl(&self, max_voltage_v: f64) -> super::PidController {
        super::PidController::new(self.vel_k_p, self.vel_k_i, self.vel_k_d)
            .with_output_limit(max_voltage_v)
    }
}

/// Default gains for the tracking law, used for tests.
#[cfg(test)]
pub(crate) fn test_params() -> Params {
    Params {
        k_b: 2.0,
        k_zeta: 0.7,
        vel_k_p: 1.0,
        vel_k_i: 0.0,
        vel_k_d: 0.0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load() {
        let params: Params = util::params::load_str(r#"
            k_b = 2.0
            k_zeta = 0.7
            vel_k_p = 1.5
            vel_k_i = 0.5
            vel_k_d = 0.0
        "#).unwrap();

        assert_eq!(params.ramsete(), crate::traj_ctrl::RamseteController::new(2.0, 0.7));

        let ctrl = params.wheel_vel_ctrl(12.0);
        assert_eq!(ctrl.integral_limit(), Some(24.0));
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn test_validate() {
        let params: Params = util::params::load_str(r#"
            k_b = -2.0
            k_zeta = 0.7
            vel_k_p = 1.5
            vel_k_i = 0.5
            vel_k_d = 0.0
        "#).unwrap();
        assert_eq!(params.validate().map_err(|e| e.name), Err("k_b"));

        let mut params = test_params();
        params.k_zeta = 1.0;
        assert_eq!(params.validate().map_err(|e| e.name), Err("k_zeta"));

        let mut params = test_params();
        params.vel_k_i = -0.1;
        assert_eq!(params.validate().map_err(|e| e.name), Err("vel_k_i"));
    }
}
