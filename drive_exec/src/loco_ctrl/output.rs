//! Output composition
//!
//! Feedforward and feedback voltages are summed per side, saturated to the
//! supply limit and normalised into a duty command. Each side only ever sees
//! its own sum, one saturated side never limits the other. A NaN on either
//! side is commanded as zero.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{DriveOutput, WheelVoltages};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Compose a single side's duty command in [-1, 1].
///
/// `max_voltage_v` must be positive, see [`super::Params::validate`].
pub fn compose(ff_v: f64, fb_v: f64, max_voltage_v: f64) -> f64 {
    let sum_v = ff_v + fb_v;
    if sum_v.is_nan() {
        return 0.0
    }

    sum_v.clamp(-max_voltage_v, max_voltage_v) / max_voltage_v
}

/// Compose both sides' duty commands.
pub fn compose_output(
    ff: WheelVoltages,
    fb: WheelVoltages,
    max_voltage_v: f64
) -> DriveOutput {
    DriveOutput {
        left: compose(ff.left_v, fb.left_v, max_voltage_v),
        right: compose(ff.right_v, fb.right_v, max_voltage_v),
    }
}

/// Limit both sides of an output to `[-limit, limit]`.
pub fn limit_output(output: DriveOutput, limit: f64) -> DriveOutput {
    let limit_side = |duty: f64| if duty.is_nan() { 0.0 } else { duty.clamp(-limit, limit) };

    DriveOutput {
        left: limit_side(output.left),
        right: limit_side(output.right),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_compose() {
        assert_eq!(compose(3.0, 3.0, 12.0), 0.5);
        assert_eq!(compose(10.0, 5.0, 12.0), 1.0);
        assert_eq!(compose(-10.0, -5.0, 12.0), -1.0);
        assert_eq!(compose(0.0, 0.0, 12.0), 0.0);
    }

    #[test]
    fn test_sides_are_independent() {
        // Left saturates, right does not
        let out = compose_output(
            WheelVoltages::new(20.0, 1.0),
            WheelVoltages::new(4.0, 2.0),
            12.0
        );
        assert_eq!(out, DriveOutput::new(1.0, 0.25));

        // Swapping the left sum doesn't change the right
        for &left in &[-100.0, -6.0, 0.0, 6.0, 100.0] {
            let out = compose_output(
                WheelVoltages::new(left, -3.0),
                WheelVoltages::new(0.0, 0.0),
                12.0
            );
            assert_eq!(out.right, -0.25);
        }
    }

    #[test]
    fn test_limit_output() {
        let out = limit_output(DriveOutput::new(0.9, -0.1), 0.2);
        assert_eq!(out, DriveOutput::new(0.2, -0.1));

        let out = limit_output(DriveOutput::new(std::f64::NAN, std::f64::INFINITY), 0.2);
        assert_eq!(out, DriveOutput::new(0.0, 0.2));
    }

    #[test]
    fn test_nan_is_zero() {
        assert_eq!(compose(std::f64::NAN, 1.0, 12.0), 0.0);
        assert_eq!(compose(std::f64::INFINITY, std::f64::NEG_INFINITY, 12.0), 0.0);
        assert_eq!(compose(std::f64::INFINITY, 0.0, 12.0), 1.0);

        let out = compose_output(
            WheelVoltages::new(std::f64::NAN, 6.0),
            WheelVoltages::new(0.0, 0.0),
            12.0
        );
        assert_eq!(out, DriveOutput::new(0.0, 0.5));
    }
}
