//! Integration module for connecting object detection backends with the tracker.
//!
//! Detection itself is external: this module only defines the seam a
//! detector plugs into, filtering of labeled detector output, and a
//! pipeline that drives a tracking session frame by frame.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionFilter, DetectionSource, IntoDetections, LabeledDetection};
pub use pipeline::CountingPipeline;
