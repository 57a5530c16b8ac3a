use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Smallest scale or aspect ratio a box may take before it is clamped.
pub const MIN_BOX_EXTENT: f32 = 1e-3;

/// Bounding box representation with format conversion utilities.
///
/// Supports three box formats:
/// - TLWH: Top-Left X, Top-Left Y, Width, Height
/// - TLBR: Top-Left X, Top-Left Y, Bottom-Right X, Bottom-Right Y
/// - Z: Center X, Center Y, Scale (w*h), Aspect Ratio (w/h), the Kalman measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Create a Rect from Z format (center x, center y, scale, aspect ratio).
    ///
    /// Non-positive scale or aspect ratio is clamped to [`MIN_BOX_EXTENT`] so
    /// the resulting box always has positive width and height.
    pub fn from_z(cx: f32, cy: f32, scale: f32, aspect_ratio: f32) -> Self {
        let scale = clamp_extent(scale);
        let aspect_ratio = clamp_extent(aspect_ratio);
        let width = (scale * aspect_ratio).sqrt();
        let height = scale / width;
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Convert to Z format: (center_x, center_y, scale, aspect_ratio).
    #[inline]
    pub fn to_z(&self) -> [f32; 4] {
        let (cx, cy) = self.center();
        let aspect_ratio = if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        };
        [cx, cy, self.area(), aspect_ratio]
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Get the area of the bounding box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            (inter_area / union_area).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[inline]
fn clamp_extent(v: f32) -> f32 {
    if v.is_finite() && v > MIN_BOX_EXTENT {
        v
    } else {
        MIN_BOX_EXTENT
    }
}

/// Calculate the IoU similarity matrix between predicted track boxes and detections.
///
/// Returns a matrix of shape (M, N) where rows follow `track_boxes` and
/// columns follow `det_boxes`.
pub fn similarity_matrix(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f32> {
    let mut sims = Array2::zeros((track_boxes.len(), det_boxes.len()));
    for (i, t) in track_boxes.iter().enumerate() {
        for (j, d) in det_boxes.iter().enumerate() {
            sims[[i, j]] = t.iou(d);
        }
    }
    sims
}
