mod crossing;
mod frame_tracker;
mod kalman_filter;
mod lifecycle;
mod matching;
mod rect;
mod track;
mod track_state;

pub use crossing::{CountingMode, CrossingCounter, CrossingCounts, CrossingDirection, CrossingEvent};
pub use frame_tracker::{CentroidMode, FrameOutput, FrameTracker, TrackOutput, TrackerConfig};
pub use kalman_filter::{KalmanFilter, KalmanNoise};
pub use lifecycle::{LifecycleChanges, TrackTable};
pub use matching::{AssignmentResult, AssignmentStrategy, Detection, associate, greedy_assignment};
pub use rect::{Rect, similarity_matrix};
pub use track::Track;
pub use track_state::TrackState;
