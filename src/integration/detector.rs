//! Trait for object detection backends and pre-tracking filtering.

use serde::{Deserialize, Serialize};

use crate::tracker::Detection;

/// Trait for object detection inference backends.
///
/// Implement this trait to feed any detection model into the tracker.
/// Returned detections should already be restricted to the class of
/// interest; [`DetectionFilter`] does that for multi-class output.
///
/// # Example
///
/// ```ignore
/// use linecount_rs::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// A detection carrying the detector's class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDetection {
    pub detection: Detection,
    pub class_id: usize,
}

impl LabeledDetection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: usize) -> Self {
        Self {
            detection: Detection::new(x1, y1, x2, y2, score),
            class_id,
        }
    }
}

/// Keeps one class above a confidence floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionFilter {
    /// Class to keep; `None` keeps all classes
    pub class_id: Option<usize>,
    /// Scores must be strictly greater than this
    pub min_score: f32,
}

impl Default for DetectionFilter {
    fn default() -> Self {
        // COCO class 0 is "person".
        Self {
            class_id: Some(0),
            min_score: 0.5,
        }
    }
}

impl DetectionFilter {
    pub fn accepts(&self, det: &LabeledDetection) -> bool {
        self.class_id.is_none_or(|c| c == det.class_id) && det.detection.score > self.min_score
    }

    /// Keep accepted detections, dropping their labels.
    pub fn apply(&self, labeled: Vec<LabeledDetection>) -> Vec<Detection> {
        labeled
            .into_iter()
            .filter(|d| self.accepts(d))
            .map(|d| d.detection)
            .collect()
    }
}
