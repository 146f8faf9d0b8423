//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (DRIVE_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error)
}

/// A loaded parameter whose value is outside of its valid range.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
#[error("Parameter `{name}` is {value}, but must be {requirement}")]
pub struct InvalidParam {
    pub name: &'static str,
    pub value: f64,
    pub requirement: &'static str,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "$DRIVE_SW_ROOT/params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    // Get the params dir
    let mut path = crate::host::get_drive_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    // Load the file into a string
    let params_str = match read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(e))
    };

    load_str(params_str.as_str())
}

/// Parse a parameter struct from a TOML string.
pub fn load_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

/// Require that a parameter is finite and greater than zero.
pub fn require_positive(name: &'static str, value: f64) -> Result<(), InvalidParam> {
    require(name, value, value.is_finite() && value > 0.0, "finite and greater than zero")
}

/// Require that a parameter is finite and not negative.
pub fn require_non_negative(name: &'static str, value: f64) -> Result<(), InvalidParam> {
    require(name, value, value.is_finite() && value >= 0.0, "finite and not negative")
}

/// Require that a parameter is finite.
pub fn require_finite(name: &'static str, value: f64) -> Result<(), InvalidParam> {
    require(name, value, value.is_finite(), "finite")
}

/// Require that a parameter is in the range [0, 1].
pub fn require_unit(name: &'static str, value: f64) -> Result<(), InvalidParam> {
    require(name, value, (0.0..=1.0).contains(&value), "in [0, 1]")
}

fn require(
    name: &'static str,
    value: f64,
    valid: bool,
    requirement: &'static str
) -> Result<(), InvalidParam> {
    if valid {
        Ok(())
    }
    else {
        Err(InvalidParam { name, value, requirement })
    }
}
