//! Single object track for multi-object tracking.

use ndarray::{Array1, Array2};

use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Single object track.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier
    pub track_id: u64,
    /// Current lifecycle state
    pub state: TrackState,
    /// Detection confidence score of the last matched detection
    pub score: f32,
    /// Frames since creation
    pub age: u32,
    /// Frames since the last matched detection
    pub time_since_update: u32,
    /// Consecutive matched frames, reset on any miss
    pub hit_streak: u32,
    /// Kalman filter state mean `[cx, cy, s, r, vcx, vcy, vs]`
    mean: Array1<f64>,
    /// Kalman filter state covariance (7x7)
    covariance: Array2<f64>,
    /// Last observed or predicted horizontal center
    pub last_centroid_x: f32,
}

impl Track {
    /// Create a tentative track seeded from a detection box with zero velocity.
    pub fn new(track_id: u64, bbox: Rect, score: f32, kalman_filter: &KalmanFilter) -> Self {
        let (mean, covariance) = kalman_filter.initiate(to_measurement(&bbox));
        Self {
            track_id,
            state: TrackState::Tentative,
            score,
            age: 0,
            time_since_update: 0,
            hit_streak: 1,
            mean,
            covariance,
            last_centroid_x: bbox.center().0,
        }
    }

    /// Current bounding box from the filter state.
    pub fn rect(&self) -> Rect {
        Rect::from_z(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    /// Estimated per-frame motion of the box center.
    pub fn velocity(&self) -> (f32, f32) {
        (self.mean[4] as f32, self.mean[5] as f32)
    }

    /// Advance the state one frame and return the predicted box.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) -> Rect {
        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;

        let rect = self.rect();
        self.last_centroid_x = rect.center().0;
        rect
    }

    /// Apply a matched detection.
    ///
    /// Returns `false` when the filter could not be corrected; the match
    /// still counts toward the hit streak and the predicted state is kept.
    pub fn update(
        &mut self,
        bbox: &Rect,
        score: f32,
        kalman_filter: &KalmanFilter,
        min_hits: u32,
    ) -> bool {
        let measurement = to_measurement(bbox);
        let corrected = match kalman_filter.update(&self.mean, &self.covariance, measurement) {
            Some((mean, covariance)) => {
                self.mean = mean;
                self.covariance = covariance;
                true
            }
            None => false,
        };

        self.time_since_update = 0;
        self.hit_streak += 1;
        self.score = score;
        self.last_centroid_x = self.rect().center().0;

        if self.hit_streak >= min_hits {
            self.confirm();
        }
        corrected
    }

    /// Record a frame without a matching detection.
    pub fn mark_missed(&mut self) {
        self.time_since_update += 1;
        self.hit_streak = 0;
    }

    pub fn confirm(&mut self) {
        self.state = TrackState::Confirmed;
    }

    pub fn mark_deleted(&mut self) {
        self.state = TrackState::Deleted;
    }
}

fn to_measurement(bbox: &Rect) -> [f64; 4] {
    let z = bbox.to_z();
    [z[0] as f64, z[1] as f64, z[2] as f64, z[3] as f64]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_track_is_tentative() {
        let kf = KalmanFilter::default();
        let track = Track::new(7, Rect::new(10.0, 10.0, 20.0, 40.0), 0.8, &kf);

        assert_eq!(track.track_id, 7);
        assert_eq!(track.state, TrackState::Tentative);
        assert_eq!(track.hit_streak, 1);
        assert_eq!(track.velocity(), (0.0, 0.0));
        assert_abs_diff_eq!(track.last_centroid_x, 20.0);

        let rect = track.rect();
        assert_abs_diff_eq!(rect.width, 20.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rect.height, 40.0, epsilon = 1e-3);
    }

    #[test]
    fn test_confirmation_is_monotone() {
        let kf = KalmanFilter::default();
        let bbox = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut track = Track::new(1, bbox, 0.9, &kf);

        for _ in 0..2 {
            track.predict(&kf);
            assert!(track.update(&bbox, 0.9, &kf, 3));
        }
        assert!(track.is_confirmed());

        track.predict(&kf);
        track.mark_missed();
        assert_eq!(track.hit_streak, 0);
        assert_eq!(track.time_since_update, 1);
        assert!(track.is_confirmed());
    }

    #[test]
    fn test_velocity_learned_from_updates() {
        let kf = KalmanFilter::default();
        let mut track = Track::new(1, Rect::new(0.0, 0.0, 10.0, 10.0), 0.9, &kf);

        for frame in 1..6 {
            track.predict(&kf);
            let bbox = Rect::new(frame as f32 * 4.0, 0.0, 10.0, 10.0);
            track.update(&bbox, 0.9, &kf, 3);
        }
        let (vx, vy) = track.velocity();
        assert!(vx > 2.0, "vx = {vx}");
        assert!(vy.abs() < 0.5);
    }
}
