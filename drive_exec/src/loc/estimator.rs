//! Dead-reckoning pose estimator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{LocError, Pose, SensorData};
use util::maths::norm_angle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Integrates heading and wheel distance measurements into a pose.
///
/// The estimator owns the only mutable copy of the vehicle's pose. Consumers
/// get copies through [`PoseEstimator::pose`].
#[derive(Debug, Clone, Default)]
pub struct PoseEstimator {
    /// The current estimate
    pose: Pose,

    /// Cumulative left distance at the previous update
    prev_left_m: f64,

    /// Cumulative right distance at the previous update
    prev_right_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseEstimator {
    /// Create a new estimator at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the pose to the origin and zero the previous distances.
    ///
    /// The next update will compute deltas from zero, so the cumulative
    /// distance sources must also be zeroed.
    pub fn reset(&mut self) {
        self.pose = Pose::default();
        self.prev_left_m = 0.0;
        self.prev_right_m = 0.0;
    }

    /// Integrate a new set of measurements and return the updated pose.
    ///
    /// - `heading_rad`: absolute heading, counter-clockwise positive
    /// - `left_dist_m`, `right_dist_m`: cumulative distance of each side
    ///
    /// The forward motion is the mean of the distance deltas, applied along
    /// the new heading. If the integrated pose would not be finite nothing is
    /// stored and the previous pose is held.
    pub fn update(
        &mut self,
        heading_rad: f64,
        left_dist_m: f64,
        right_dist_m: f64
    ) -> Result<Pose, LocError> {
        let delta_left_m = left_dist_m - self.prev_left_m;
        let delta_right_m = right_dist_m - self.prev_right_m;

        // Halved before summing so large finite deltas can't overflow
        let delta_m = 0.5 * delta_left_m + 0.5 * delta_right_m;
        let (sin, cos) = heading_rad.sin_cos();

        let pose = Pose {
            x_m: self.pose.x_m + delta_m * cos,
            y_m: self.pose.y_m + delta_m * sin,
            theta_rad: norm_angle(heading_rad),
        };

        if !pose.is_finite() {
            return Err(LocError::NonFinitePose {
                x_m: pose.x_m,
                y_m: pose.y_m,
                theta_rad: pose.theta_rad
            })
        }

        self.pose = pose;
        self.prev_left_m = left_dist_m;
        self.prev_right_m = right_dist_m;

        trace!(
            "Odometry update: d = {:.4} m, pose = ({:.3}, {:.3}, {:.3})",
            delta_m, self.pose.x_m, self.pose.y_m, self.pose.theta_rad
        );

        Ok(self.pose)
    }

    /// Validate the sensor data and integrate it if it is finite.
    ///
    /// On error nothing is integrated and the previous pose is held.
    pub fn update_checked(&mut self, data: &SensorData) -> Result<Pose, LocError> {
        data.validate()?;

        self.update(data.heading_rad, data.left_dist_m, data.right_dist_m)
    }

    /// The current pose estimate.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Mean of the cumulative distances at the last update.
    pub fn mean_distance_m(&self) -> f64 {
        0.5 * (self.prev_left_m + self.prev_right_m)
    }
}
