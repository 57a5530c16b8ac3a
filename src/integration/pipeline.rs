//! CountingPipeline for combining detection with tracking and counting.

use crate::error::ConfigError;
use crate::tracker::{CrossingCounts, FrameOutput, FrameTracker, TrackerConfig};

use super::DetectionSource;

/// Bundles a `DetectionSource` with a [`FrameTracker`] session.
///
/// Each frame runs the detector, updates the frame size (and with it the
/// crossing line), then feeds the detections to the tracker.
pub struct CountingPipeline<D: DetectionSource> {
    detector: D,
    tracker: FrameTracker,
}

impl<D: DetectionSource> CountingPipeline<D> {
    /// Create a new pipeline with the given detector and tracker config.
    pub fn new(detector: D, config: TrackerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            detector,
            tracker: FrameTracker::new(config)?,
        })
    }

    /// Create a new pipeline with default tracker configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self {
            detector,
            tracker: FrameTracker::default(),
        }
    }

    /// Process a single frame.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    ///
    /// # Returns
    /// The tracker's output for this frame, or a detection error. A failed
    /// detection leaves the tracker untouched.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<FrameOutput, D::Error> {
        let detections = self.detector.detect(input, width, height)?;
        self.tracker.set_frame_size(width, height);
        Ok(self.tracker.update(detections))
    }

    pub fn counts(&self) -> CrossingCounts {
        self.tracker.counts()
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &FrameTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut FrameTracker {
        &mut self.tracker
    }
}
