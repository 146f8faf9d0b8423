//! # Trajectory
//!
//! A trajectory is a time ordered list of states the vehicle should pass
//! through, produced by an external planner. It is immutable once built and
//! can be sampled at any time, interpolating between the bracketing states.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::convert::TryFrom;
use serde::{Deserialize, Serialize};

// Internal
use crate::loc::Pose;
use crate::loco_ctrl::ChassisVelocity;
use util::maths::{get_ang_dist, lerp, norm_angle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single target state of a trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryState {
    /// Time since the start of the trajectory
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Desired pose at this time
    pub pose: Pose,

    /// Desired forward speed
    ///
    /// Units: meters/second
    pub vel_ms: f64,

    /// Desired yaw rate, counter-clockwise positive
    ///
    /// Units: radians/second
    pub ang_vel_rads: f64,

    /// Desired forward acceleration, if the planner provides one.
    ///
    /// Units: meters/second^2
    #[serde(default)]
    pub accel_mss: Option<f64>,
}

/// A validated, time ordered sequence of [`TrajectoryState`]s.
///
/// Always holds at least two states with strictly increasing times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TrajectoryState>", into = "Vec<TrajectoryState>")]
pub struct Trajectory {
    states: Vec<TrajectoryState>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a trajectory can be rejected.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum TrajectoryError {
    #[error("A trajectory needs at least 2 states but {0} were given")]
    TooFewStates(usize),

    #[error("State {index} has time {time_s} s which is not after the previous state's {prev_time_s} s")]
    NonIncreasingTime {
        index: usize,
        time_s: f64,
        prev_time_s: f64
    },

    #[error("State {0} contains a non-finite value")]
    NonFiniteState(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryState {
    /// The desired chassis velocity of this state.
    pub fn chassis_velocity(&self) -> ChassisVelocity {
        ChassisVelocity::new(self.vel_ms, self.ang_vel_rads)
    }

    fn is_finite(&self) -> bool {
        self.time_s.is_finite()
            && self.pose.is_finite()
            && self.vel_ms.is_finite()
            && self.ang_vel_rads.is_finite()
            && self.accel_mss.map_or(true, f64::is_finite)
    }

    /// Interpolate between this state and `other`, `frac` being in [0, 1].
    ///
    /// The heading is interpolated along the shortest arc.
    fn interpolate(&self, other: &TrajectoryState, frac: f64) -> TrajectoryState {
        let theta_rad = self.pose.theta_rad
            + get_ang_dist(self.pose.theta_rad, other.pose.theta_rad) * frac;

        TrajectoryState {
            time_s: lerp(self.time_s, other.time_s, frac),
            pose: Pose::new(
                lerp(self.pose.x_m, other.pose.x_m, frac),
                lerp(self.pose.y_m, other.pose.y_m, frac),
                theta_rad
            ),
            vel_ms: lerp(self.vel_ms, other.vel_ms, frac),
            ang_vel_rads: lerp(self.ang_vel_rads, other.ang_vel_rads, frac),
            accel_mss: match (self.accel_mss, other.accel_mss) {
                (Some(a), Some(b)) => Some(lerp(a, b, frac)),
                (a, _) => a
            }
        }
    }
}

impl Trajectory {
    /// Build a new trajectory from the given states.
    ///
    /// Headings are normalised into (-pi, pi].
    pub fn new(mut states: Vec<TrajectoryState>) -> Result<Self, TrajectoryError> {
        if states.len() < 2 {
            return Err(TrajectoryError::TooFewStates(states.len()))
        }

        for (index, state) in states.iter().enumerate() {
            if !state.is_finite() {
                return Err(TrajectoryError::NonFiniteState(index))
            }
        }

        for (index, pair) in states.windows(2).enumerate() {
            if pair[1].time_s <= pair[0].time_s {
                return Err(TrajectoryError::NonIncreasingTime {
                    index: index + 1,
                    time_s: pair[1].time_s,
                    prev_time_s: pair[0].time_s
                })
            }
        }

        for state in states.iter_mut() {
            state.pose.theta_rad = norm_angle(state.pose.theta_rad);
        }

        Ok(Self { states })
    }

    /// Total duration of the trajectory, the time of the last state.
    ///
    /// Units: seconds
    pub fn duration_s(&self) -> f64 {
        self.final_state().time_s
    }

    pub fn states(&self) -> &[TrajectoryState] {
        &self.states
    }

    pub fn initial_state(&self) -> &TrajectoryState {
        &self.states[0]
    }

    pub fn final_state(&self) -> &TrajectoryState {
        &self.states[self.states.len() - 1]
    }

    /// Sample the trajectory at the given time.
    ///
    /// Times at or before the first state give the first state, times at or
    /// after the last state give the last state, both unchanged. Otherwise the
    /// two states either side of the time are interpolated. A NaN time gives
    /// the first state.
    pub fn sample(&self, time_s: f64) -> TrajectoryState {
        let first = self.initial_state();
        let last = self.final_state();

        if time_s.is_nan() || time_s <= first.time_s.max(0.0) {
            return *first
        }
        if time_s >= last.time_s {
            return *last
        }

        // Index of the first state after the sample time. The checks above
        // guarantee this is in [1, len - 1].
        let upper = self.states.partition_point(|s| s.time_s <= time_s);
        let prev = &self.states[upper - 1];
        let next = &self.states[upper];

        let frac = (time_s - prev.time_s) / (next.time_s - prev.time_s);

        prev.interpolate(next, frac)
    }
}

impl TryFrom<Vec<TrajectoryState>> for Trajectory {
    type Error = TrajectoryError;

    fn try_from(states: Vec<TrajectoryState>) -> Result<Self, Self::Error> {
        Self::new(states)
    }
}

impl From<Trajectory> for Vec<TrajectoryState> {
    fn from(traj: Trajectory) -> Self {
        traj.states
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    fn state(time_s: f64, x_m: f64, theta_rad: f64, vel_ms: f64) -> TrajectoryState {
        TrajectoryState {
            time_s,
            pose: Pose::new(x_m, 0.0, theta_rad),
            vel_ms,
            ang_vel_rads: 0.0,
            accel_mss: None,
        }
    }

    fn straight() -> Trajectory {
        Trajectory::new(vec![
            state(0.0, 0.0, 0.0, 0.0),
            state(1.0, 0.5, 0.0, 1.0),
            state(2.0, 1.5, 0.0, 1.0),
        ]).unwrap()
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            Trajectory::new(vec![state(0.0, 0.0, 0.0, 0.0)]),
            Err(TrajectoryError::TooFewStates(1))
        );
        assert_eq!(Trajectory::new(vec![]), Err(TrajectoryError::TooFewStates(0)));

        assert_eq!(
            Trajectory::new(vec![
                state(0.0, 0.0, 0.0, 0.0),
                state(1.0, 0.0, 0.0, 0.0),
                state(1.0, 0.0, 0.0, 0.0),
            ]),
            Err(TrajectoryError::NonIncreasingTime { index: 2, time_s: 1.0, prev_time_s: 1.0 })
        );

        assert_eq!(
            Trajectory::new(vec![
                state(0.0, 0.0, 0.0, 0.0),
                state(1.0, std::f64::NAN, 0.0, 0.0),
            ]),
            Err(TrajectoryError::NonFiniteState(1))
        );
    }

    #[test]
    fn test_sample_out_of_range() {
        let traj = straight();

        // Before the start and after the end give the end states unchanged
        assert_eq!(traj.sample(-1.0), traj.states()[0]);
        assert_eq!(traj.sample(0.0), traj.states()[0]);
        assert_eq!(traj.sample(2.0), traj.states()[2]);
        assert_eq!(traj.sample(10.0), traj.states()[2]);
        assert_eq!(traj.duration_s(), 2.0);

        // Non-finite times still give an end state
        assert_eq!(traj.sample(std::f64::NAN), traj.states()[0]);
        assert_eq!(traj.sample(std::f64::NEG_INFINITY), traj.states()[0]);
        assert_eq!(traj.sample(std::f64::INFINITY), traj.states()[2]);
    }

    #[test]
    fn test_sample_interpolates() {
        let traj = straight();

        let s = traj.sample(0.5);
        assert!((s.time_s - 0.5).abs() < 1e-12);
        assert!((s.pose.x_m - 0.25).abs() < 1e-12);
        assert!((s.vel_ms - 0.5).abs() < 1e-12);

        // Exactly on an interior state
        let s = traj.sample(1.0);
        assert!((s.pose.x_m - 0.5).abs() < 1e-12);

        let s = traj.sample(1.25);
        assert!((s.pose.x_m - 0.75).abs() < 1e-12);
        assert!((s.vel_ms - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_shortest_angle() {
        // Heading goes from just below +pi to just above -pi, so the shortest
        // arc passes through pi rather than through zero.
        let traj = Trajectory::new(vec![
            state(0.0, 0.0, PI - 0.1, 0.0),
            state(1.0, 0.0, -PI + 0.1, 0.0),
        ]).unwrap();

        let s = traj.sample(0.5);
        assert!((s.pose.theta_rad.abs() - PI).abs() < 1e-9);

        let s = traj.sample(0.25);
        assert!((s.pose.theta_rad - (PI - 0.05)).abs() < 1e-9);
    }

    #[test]
    fn test_deserialise() {
        let json = r#"[
            {"time_s": 0.0, "pose": {"x_m": 0.0, "y_m": 0.0, "theta_rad": 0.0},
             "vel_ms": 0.0, "ang_vel_rads": 0.0},
            {"time_s": 1.0, "pose": {"x_m": 1.0, "y_m": 0.0, "theta_rad": 0.0},
             "vel_ms": 1.0, "ang_vel_rads": 0.0, "accel_mss": 0.5}
        ]"#;

        let traj: Trajectory = serde_json::from_str(json).unwrap();
        assert_eq!(traj.states().len(), 2);
        assert_eq!(traj.final_state().accel_mss, Some(0.5));

        // The same validation applies when deserialising
        let json = r#"[
            {"time_s": 0.0, "pose": {"x_m": 0.0, "y_m": 0.0, "theta_rad": 0.0},
             "vel_ms": 0.0, "ang_vel_rads": 0.0}
        ]"#;
        assert!(serde_json::from_str::<Trajectory>(json).is_err());
    }
}
