//! Constant-velocity Kalman filter over `[cx, cy, s, r, vcx, vcy, vs]` using
//! ndarray and a nalgebra-based 4x4 inverse.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tracker::rect::MIN_BOX_EXTENT;

const STATE_DIM: usize = 7;
const MEASURE_DIM: usize = 4;

/// Diagonal noise terms of the box motion model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanNoise {
    /// Initial state covariance diagonal
    pub initial: [f64; 7],
    /// Process noise added on every prediction
    pub process: [f64; 7],
    /// Measurement noise of the observed `[cx, cy, s, r]`
    pub measurement: [f64; 4],
}

impl Default for KalmanNoise {
    fn default() -> Self {
        Self {
            initial: [10.0, 10.0, 10.0, 10.0, 1e4, 1e4, 1e4],
            process: [1.0, 1.0, 1.0, 1.0, 1e-2, 1e-2, 1e-4],
            measurement: [1.0, 1.0, 10.0, 10.0],
        }
    }
}

impl KalmanNoise {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: &f64| v.is_finite() && *v > 0.0;
        if !self.initial.iter().all(positive) {
            return Err(ConfigError::KalmanNoise { name: "initial" });
        }
        if !self.process.iter().all(positive) {
            return Err(ConfigError::KalmanNoise { name: "process" });
        }
        if !self.measurement.iter().all(positive) {
            return Err(ConfigError::KalmanNoise {
                name: "measurement",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    initial_cov: Array2<f64>,
    process_cov: Array2<f64>,
    measurement_cov: Array2<f64>,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new(&KalmanNoise::default())
    }
}

impl KalmanFilter {
    pub fn new(noise: &KalmanNoise) -> Self {
        // cx, cy and s carry a rate term; r is constant.
        let mut motion_mat = Array2::eye(STATE_DIM);
        for i in 0..3 {
            motion_mat[[i, MEASURE_DIM + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((MEASURE_DIM, STATE_DIM));
        for i in 0..MEASURE_DIM {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            initial_cov: Array2::from_diag(&Array1::from_vec(noise.initial.to_vec())),
            process_cov: Array2::from_diag(&Array1::from_vec(noise.process.to_vec())),
            measurement_cov: Array2::from_diag(&Array1::from_vec(noise.measurement.to_vec())),
        }
    }

    /// Seed a new state from a `[cx, cy, s, r]` measurement with zero velocity.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(STATE_DIM);
        for i in 0..MEASURE_DIM {
            mean[i] = measurement[i];
        }
        (mean, self.initial_cov.clone())
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let mut mean_to_predict = mean.clone();
        // A shrinking box must not overshoot into negative area.
        if mean_to_predict[2] + mean_to_predict[6] <= 0.0 {
            mean_to_predict[6] = 0.0;
        }

        let mut new_mean = self.motion_mat.dot(&mean_to_predict);
        clamp_geometry(&mut new_mean);
        let new_covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + &self.process_cov;

        (new_mean, new_covariance)
    }

    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + &self.measurement_cov;

        (mean_proj, covariance_proj)
    }

    /// Correct the state with an observed `[cx, cy, s, r]`.
    ///
    /// Returns `None` when the innovation covariance is singular; callers
    /// keep the predicted state in that case.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Option<(Array1<f64>, Array2<f64>)> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let measurement_arr = Array1::from_vec(measurement.to_vec());
        let innovation = measurement_arr - projected_mean;

        // K = P * H^T * S^-1
        let s_inv = invert_4x4(&projected_cov)?;
        let pht = covariance.dot(&self.update_mat.t()); // 7x4
        let kalman_gain = pht.dot(&s_inv); // 7x4

        let mut new_mean = mean + &kalman_gain.dot(&innovation);
        clamp_geometry(&mut new_mean);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        if new_mean.iter().all(|v| v.is_finite()) && new_covariance.iter().all(|v| v.is_finite())
        {
            Some((new_mean, new_covariance))
        } else {
            None
        }
    }
}

/// Keep scale and aspect ratio strictly positive.
fn clamp_geometry(mean: &mut Array1<f64>) {
    let eps = MIN_BOX_EXTENT as f64;
    for i in [2, 3] {
        if mean[i].is_nan() || mean[i] <= eps {
            mean[i] = eps;
        }
    }
}

fn invert_4x4(m: &Array2<f64>) -> Option<Array2<f64>> {
    let mut nm = nalgebra::Matrix4::zeros();
    for i in 0..4 {
        for j in 0..4 {
            nm[(i, j)] = m[[i, j]];
        }
    }
    let inv = nm.try_inverse()?;
    let mut res = Array2::zeros((4, 4));
    for i in 0..4 {
        for j in 0..4 {
            res[[i, j]] = inv[(i, j)];
        }
    }
    Some(res)
}
