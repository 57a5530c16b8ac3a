//! Multi-object tracking over per-frame bounding boxes with a directional
//! line-crossing counter.
//!
//! The tracker follows SORT: a constant-velocity Kalman filter per track,
//! IoU similarity, optimal assignment and hit/miss driven lifecycle. Confirmed
//! track centroids are fed to a [`CrossingCounter`] that counts left-to-right
//! and right-to-left passes over a vertical reference line.
//!
//! ```rust,ignore
//! use linecount_rs::{Detection, FrameTracker, TrackerConfig};
//!
//! let mut tracker = FrameTracker::new(TrackerConfig::default())?;
//! tracker.set_frame_size(1280, 720);
//!
//! let output = tracker.update(vec![Detection::new(100.0, 100.0, 160.0, 260.0, 0.9)]);
//! for track in &output.tracks {
//!     println!("{} {:?}", track.track_id, track.bbox.to_tlbr());
//! }
//! println!("{:?}", output.counts);
//! ```

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{ConfigError, DetectionError};
pub use integration::{
    CountingPipeline, DetectionBuilder, DetectionFilter, DetectionSource, IntoDetections,
    LabeledDetection,
};
pub use tracker::{
    AssignmentStrategy, CentroidMode, CountingMode, CrossingCounter, CrossingCounts,
    CrossingDirection, CrossingEvent, Detection, FrameOutput, FrameTracker, KalmanNoise, Rect,
    TrackOutput, TrackState, TrackerConfig,
};
