//! Error types for detection validation and tracker configuration.

use thiserror::Error;

/// Reason a detection was rejected before reaching the tracker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("non-finite box coordinates ({x1}, {y1}, {x2}, {y2})")]
    NonFinite { x1: f32, y1: f32, x2: f32, y2: f32 },

    #[error("degenerate box ({x1}, {y1}, {x2}, {y2}): expected x1 < x2 and y1 < y2")]
    InvalidBox { x1: f32, y1: f32, x2: f32, y2: f32 },

    #[error("confidence {0} outside [0, 1]")]
    ScoreOutOfRange(f32),
}

/// Invalid tracker configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max_age must be greater than zero")]
    ZeroMaxAge,

    #[error("min_hits must be greater than zero")]
    ZeroMinHits,

    #[error("iou_threshold {0} outside [0, 1]")]
    IouThreshold(f32),

    #[error("line_x {0} must be finite and non-negative")]
    LinePosition(f32),

    #[error("max_assignment_size must be greater than zero")]
    ZeroAssignmentBudget,

    #[error("kalman noise term {name} must be finite and positive")]
    KalmanNoise { name: &'static str },
}
