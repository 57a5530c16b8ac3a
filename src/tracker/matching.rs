//! Detection input and track-to-detection assignment.

use std::cmp::Ordering;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DetectionError;
use crate::tracker::rect::Rect;

/// Detection input for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box, built from TLBR format (x1, y1, x2, y2)
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self { bbox, score }
    }

    /// Check the box is finite with `x1 < x2`, `y1 < y2` and the score lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), DetectionError> {
        let [x1, y1, x2, y2] = self.bbox.to_tlbr();
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(DetectionError::NonFinite { x1, y1, x2, y2 });
        }
        if x1 >= x2 || y1 >= y2 {
            return Err(DetectionError::InvalidBox { x1, y1, x2, y2 });
        }
        if !(0.0..=1.0).contains(&self.score) {
            return Err(DetectionError::ScoreOutOfRange(self.score));
        }
        Ok(())
    }
}

/// Which solver produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssignmentStrategy {
    /// No solve was needed because one side was empty.
    #[default]
    Trivial,
    /// Globally optimal assignment (Jonker-Volgenant).
    Exact,
    /// Highest-IoU-first approximation, used when the problem exceeds the
    /// size budget or the exact solver fails.
    Greedy,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentResult {
    /// (track index, detection index) pairs, ordered by track index
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
    pub strategy: AssignmentStrategy,
}

/// Match tracks (rows) to detections (columns) from an IoU similarity matrix.
///
/// The exact solver minimises `1 - IoU` over the whole matrix. Pairs whose
/// IoU falls below `iou_threshold` are split back into the unmatched sets.
/// Matrices whose larger side exceeds `max_size` use [`greedy_assignment`].
pub fn associate(
    similarity: &Array2<f32>,
    iou_threshold: f32,
    max_size: usize,
) -> AssignmentResult {
    let (num_rows, num_cols) = similarity.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
            strategy: AssignmentStrategy::Trivial,
        };
    }

    let size = num_rows.max(num_cols);
    if size > max_size {
        debug!(
            tracks = num_rows,
            detections = num_cols,
            max_size,
            "assignment exceeds size budget, using greedy matching"
        );
        return greedy_assignment(similarity, iou_threshold);
    }

    let mut padded = Array2::<f64>::from_elem((size, size), 1e6);
    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = 1.0 - similarity[[i, j]] as f64;
        }
    }

    let row_to_col = match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => row_to_col,
        Err(err) => {
            warn!(?err, "exact assignment failed, using greedy matching");
            return greedy_assignment(similarity, iou_threshold);
        }
    };

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
        if col_idx < num_cols && similarity[[row_idx, col_idx]] >= iou_threshold {
            matches.push((row_idx, col_idx));
            unmatched_detections_mask[col_idx] = false;
        } else {
            unmatched_tracks.push(row_idx);
        }
    }

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections: collect_unmatched(&unmatched_detections_mask),
        strategy: AssignmentStrategy::Exact,
    }
}

/// Highest-IoU-first matching. Ties are broken by track, then detection index.
pub fn greedy_assignment(similarity: &Array2<f32>, iou_threshold: f32) -> AssignmentResult {
    let (num_rows, num_cols) = similarity.dim();

    let mut candidates: Vec<(f32, usize, usize)> = similarity
        .indexed_iter()
        .filter(|&(_, &iou)| iou >= iou_threshold)
        .map(|((i, j), &iou)| (iou, i, j))
        .collect();

    candidates.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    let mut used_tracks = vec![false; num_rows];
    let mut used_detections = vec![false; num_cols];
    let mut matches = Vec::new();

    for (_, track_idx, det_idx) in candidates {
        if !used_tracks[track_idx] && !used_detections[det_idx] {
            matches.push((track_idx, det_idx));
            used_tracks[track_idx] = true;
            used_detections[det_idx] = true;
        }
    }
    matches.sort_unstable();

    AssignmentResult {
        matches,
        unmatched_tracks: collect_unmatched(&used_tracks.iter().map(|u| !u).collect::<Vec<_>>()),
        unmatched_detections: collect_unmatched(
            &used_detections.iter().map(|u| !u).collect::<Vec<_>>(),
        ),
        strategy: AssignmentStrategy::Greedy,
    }
}

fn collect_unmatched(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect()
}
