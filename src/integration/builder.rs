//! Builder for creating Detection objects from various input formats.

use crate::error::DetectionError;
use crate::integration::LabeledDetection;
use crate::tracker::Detection;

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.0;
        self.y1 = cy - h / 2.0;
        self.x2 = cx + w / 2.0;
        self.y2 = cy + h / 2.0;
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.x1 = x;
        self.y1 = y;
        self.x2 = x + w;
        self.y2 = y + h;
        self
    }

    /// Set the confidence score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Build the final `Detection`, rejecting degenerate boxes and scores
    /// outside `[0, 1]` the same way the tracker does.
    pub fn build(self) -> Result<Detection, DetectionError> {
        let det = Detection::new(self.x1, self.y1, self.x2, self.y2, self.score);
        det.validate()?;
        Ok(det)
    }

    /// Build a detection tagged with the detector's class id.
    pub fn build_labeled(self, class_id: usize) -> Result<LabeledDetection, DetectionError> {
        Ok(LabeledDetection {
            detection: self.build()?,
            class_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .score(0.95)
            .build()
            .unwrap();

        assert_eq!(det.score, 0.95);
        assert_eq!(det.bbox.to_tlbr(), [10.0, 20.0, 50.0, 80.0]);
    }

    #[test]
    fn test_box_formats_agree() {
        let a = DetectionBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).score(0.7).build();
        let b = DetectionBuilder::new().tlwh(10.0, 20.0, 40.0, 60.0).score(0.7).build();
        assert_eq!(a.unwrap().bbox, b.unwrap().bbox);
    }

    #[test]
    fn test_build_rejects_invalid_input() {
        let zero_width = DetectionBuilder::new().xywh(30.0, 50.0, 0.0, 60.0).score(0.7).build();
        assert!(matches!(zero_width, Err(DetectionError::InvalidBox { .. })));

        let score = DetectionBuilder::new().tlwh(0.0, 0.0, 10.0, 10.0).score(1.3).build();
        assert_eq!(score, Err(DetectionError::ScoreOutOfRange(1.3)));
    }

    #[test]
    fn test_build_labeled() {
        let labeled = DetectionBuilder::new()
            .tlbr(0.0, 0.0, 10.0, 30.0)
            .score(0.8)
            .build_labeled(2)
            .unwrap();
        assert_eq!(labeled.class_id, 2);
        assert_eq!(labeled.detection.score, 0.8);
    }
}
