//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::params::{require_non_negative, require_positive, require_unit, InvalidParam};

use super::{DiffDriveKinematics, Feedforward};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Distance between the left and right wheels.
    ///
    /// Units: meters
    pub track_width_m: f64,

    /// Diameter of the drive wheels.
    ///
    /// Units: meters
    pub wheel_diameter_m: f64,

    /// Number of wheel rotations per motor (encoder) rotation.
    pub gear_ratio: f64,

    // ---- CHARACTERISATION ----

    /// Static friction voltage
    ///
    /// Units: volts
    pub k_s: f64,

    /// Velocity feedforward gain
    ///
    /// Units: volts / (meters/second)
    pub k_v: f64,

    /// Acceleration feedforward gain
    ///
    /// Units: volts / (meters/second^2)
    pub k_a: f64,

    // ---- CAPABILITIES ----

    /// Voltage that corresponds to a duty of 1.
    ///
    /// Units: volts
    pub max_voltage_v: f64,

    /// Absolute limit applied to both sides' duty after composition, in
    /// (0, 1].
    pub duty_limit: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that every parameter is in its valid range.
    pub fn validate(&self) -> Result<(), InvalidParam> {
        require_positive("track_width_m", self.track_width_m)?;
        require_positive("wheel_diameter_m", self.wheel_diameter_m)?;
        require_positive("gear_ratio", self.gear_ratio)?;
        require_non_negative("k_s", self.k_s)?;
        require_non_negative("k_v", self.k_v)?;
        require_non_negative("k_a", self.k_a)?;
        require_positive("max_voltage_v", self.max_voltage_v)?;
        require_positive("duty_limit", self.duty_limit)?;
        require_unit("duty_limit", self.duty_limit)
    }

    /// Distance travelled by the wheel for one encoder rotation.
    ///
    /// Units: meters
    pub fn distance_per_rotation_m(&self) -> f64 {
        std::f64::consts::PI * self.wheel_diameter_m * self.gear_ratio
    }

    pub fn kinematics(&self) -> DiffDriveKinematics {
        DiffDriveKinematics::new(self.track_width_m)
    }

    pub fn feedforward(&self) -> Feedforward {
        Feedforward::new(self.k_s, self.k_v, self.k_a)
    }
}

/// Parameters matching the characterised test vehicle.
#[cfg(test)]
pub(crate) fn test_params() -> Params {
    Params {
        track_width_m: 0.7112,
        wheel_diameter_m: 0.1016,
        gear_ratio: 1.0 / 7.5833,
        k_s: 0.17247,
        k_v: 2.8886,
        k_a: 2.1367,
        max_voltage_v: 12.0,
        duty_limit: 1.0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load() {
        let params: Params = util::params::load_str(r#"
            track_width_m = 0.7112
            wheel_diameter_m = 0.1016
            gear_ratio = 0.13187
            k_s = 0.17247
            k_v = 2.8886
            k_a = 2.1367
            max_voltage_v = 12.0
            duty_limit = 1.0
        "#).unwrap();

        let expected = std::f64::consts::PI * 0.1016 * 0.13187;
        assert!((params.distance_per_rotation_m() - expected).abs() < 1e-12);
        assert_eq!(params.kinematics().track_width_m, 0.7112);
        assert_eq!(params.feedforward().k_v, 2.8886);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn test_validate() {
        let params: Params = util::params::load_str(r#"
            track_width_m = 0.0
            wheel_diameter_m = 0.1016
            gear_ratio = 0.13187
            k_s = 0.17247
            k_v = 2.8886
            k_a = 2.1367
            max_voltage_v = 12.0
            duty_limit = 1.0
        "#).unwrap();
        assert_eq!(params.validate().map_err(|e| e.name), Err("track_width_m"));

        fn check(f: impl Fn(&mut Params)) -> Result<(), &'static str> {
            let mut params = test_params();
            f(&mut params);
            params.validate().map_err(|e| e.name)
        }
        assert_eq!(check(|p| p.duty_limit = -0.5), Err("duty_limit"));
        assert_eq!(check(|p| p.duty_limit = 1.5), Err("duty_limit"));
        assert_eq!(check(|p| p.max_voltage_v = 0.0), Err("max_voltage_v"));
        assert_eq!(check(|p| p.max_voltage_v = -12.0), Err("max_voltage_v"));
        assert_eq!(check(|p| p.k_s = std::f64::NAN), Err("k_s"));
        assert_eq!(check(|_| ()), Ok(()));
    }
}
