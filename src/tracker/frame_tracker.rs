//! Per-frame predict, associate, update and count cycle.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{ConfigError, DetectionError};
use crate::tracker::crossing::{CountingMode, CrossingCounter, CrossingCounts, CrossingEvent};
use crate::tracker::kalman_filter::{KalmanFilter, KalmanNoise};
use crate::tracker::lifecycle::TrackTable;
use crate::tracker::matching::{self, AssignmentStrategy, Detection};
use crate::tracker::rect::{Rect, similarity_matrix};
use crate::tracker::track::Track;

/// How a track centroid is derived for crossing checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CentroidMode {
    /// Floating-point box center.
    #[default]
    Exact,
    /// `(x1 + x2) / 2` on integer-truncated corners, floor division.
    Integer,
}

/// Configuration for the [`FrameTracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Consecutive unmatched frames before a track is deleted
    pub max_age: u32,
    /// Consecutive matched frames before a track is confirmed
    pub min_hits: u32,
    /// Minimum IoU for an accepted match
    pub iou_threshold: f32,
    /// Fixed line position; `None` follows half the frame width
    pub line_x: Option<f32>,
    pub counting_mode: CountingMode,
    pub centroid_mode: CentroidMode,
    /// Largest matrix side solved exactly; bigger problems match greedily
    pub max_assignment_size: usize,
    /// Also report confirmed tracks that missed this frame, at their
    /// predicted box. They never feed the crossing counter.
    pub report_coasting: bool,
    /// Confirm tracks matched or born during the first `min_hits` frames
    pub confirm_during_warmup: bool,
    pub kalman_noise: KalmanNoise,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 20,
            min_hits: 3,
            iou_threshold: 0.3,
            line_x: None,
            counting_mode: CountingMode::default(),
            centroid_mode: CentroidMode::default(),
            max_assignment_size: 256,
            report_coasting: false,
            confirm_during_warmup: false,
            kalman_noise: KalmanNoise::default(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_age == 0 {
            return Err(ConfigError::ZeroMaxAge);
        }
        if self.min_hits == 0 {
            return Err(ConfigError::ZeroMinHits);
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfigError::IouThreshold(self.iou_threshold));
        }
        if let Some(x) = self.line_x {
            if !x.is_finite() || x < 0.0 {
                return Err(ConfigError::LinePosition(x));
            }
        }
        if self.max_assignment_size == 0 {
            return Err(ConfigError::ZeroAssignmentBudget);
        }
        self.kalman_noise.validate()
    }
}

/// A confirmed track as reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackOutput {
    pub track_id: u64,
    pub bbox: Rect,
    pub score: f32,
    /// Zero when the track was matched this frame
    pub time_since_update: u32,
}

/// Everything produced by one [`FrameTracker::update`] call.
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    pub frame_id: u64,
    /// Confirmed tracks in ascending id order
    pub tracks: Vec<TrackOutput>,
    /// Crossings completed on this frame
    pub crossings: Vec<CrossingEvent>,
    pub counts: CrossingCounts,
    /// Input index and reason of every dropped detection
    pub rejected: Vec<(usize, DetectionError)>,
    pub assignment: AssignmentStrategy,
    /// Matched tracks whose filter correction was skipped
    pub degenerate_tracks: Vec<u64>,
}

/// SORT tracker with a line-crossing counter. One value is one session.
#[derive(Debug, Clone)]
pub struct FrameTracker {
    config: TrackerConfig,
    tracks: TrackTable,
    counter: CrossingCounter,
    frame_id: u64,
    frame_size: Option<(u32, u32)>,
}

impl Default for FrameTracker {
    fn default() -> Self {
        Self::from_valid_config(TrackerConfig::default())
    }
}

impl FrameTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TrackerConfig) -> Self {
        let kalman_filter = KalmanFilter::new(&config.kalman_noise);
        Self {
            tracks: TrackTable::new(config.max_age, config.min_hits, kalman_filter)
                .with_warmup_confirmation(config.confirm_during_warmup),
            counter: CrossingCounter::new(config.counting_mode, config.line_x),
            frame_id: 0,
            frame_size: None,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame_size
    }

    /// Set the frame dimensions; the crossing line follows the new width.
    pub fn set_frame_size(&mut self, width: u32, height: u32) {
        if self.frame_size != Some((width, height)) {
            self.frame_size = Some((width, height));
            self.counter.set_frame_width(width);
        }
    }

    pub fn line_x(&self) -> f32 {
        self.counter.line_x()
    }

    pub fn counter(&self) -> &CrossingCounter {
        &self.counter
    }

    pub fn counts(&self) -> CrossingCounts {
        self.counter.counts()
    }

    /// All live tracks, tentative ones included.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Confirmed tracks in ascending id order. Tracks that missed this
    /// frame are included only with `report_coasting`.
    pub fn active_tracks(&self) -> Vec<TrackOutput> {
        self.tracks
            .iter()
            .filter(|t| t.is_confirmed())
            .filter(|t| self.config.report_coasting || t.time_since_update == 0)
            .map(|t| TrackOutput {
                track_id: t.track_id,
                bbox: t.rect(),
                score: t.score,
                time_since_update: t.time_since_update,
            })
            .collect()
    }

    /// Process one frame of detections.
    pub fn update(&mut self, detections: Vec<Detection>) -> FrameOutput {
        self.frame_id += 1;

        let mut rejected = Vec::new();
        let detections: Vec<Detection> = detections
            .into_iter()
            .enumerate()
            .filter_map(|(idx, det)| match det.validate() {
                Ok(()) => Some(det),
                Err(err) => {
                    warn!(frame_id = self.frame_id, index = idx, %err, "detection rejected");
                    rejected.push((idx, err));
                    None
                }
            })
            .collect();

        let (track_ids, predicted) = self.tracks.predict_all();
        let det_rects: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let similarity = similarity_matrix(&predicted, &det_rects);

        let assignment = matching::associate(
            &similarity,
            self.config.iou_threshold,
            self.config.max_assignment_size,
        );

        let changes = self.tracks.apply(&assignment, &track_ids, &detections);
        for track in &changes.deleted {
            self.counter.forget(track.track_id);
        }

        let line_x = self.counter.line_x();
        let mut crossings = Vec::new();
        // Only observed positions count; a coasting prediction can drift over the line.
        let observed = self
            .tracks
            .iter()
            .filter(|t| t.is_confirmed() && t.time_since_update == 0);
        for track in observed {
            let centroid_x = centroid_x(track, self.config.centroid_mode);
            if let Some(event) = self.counter.observe(track.track_id, centroid_x, line_x) {
                crossings.push(event);
            }
        }

        let tracks = self.active_tracks();
        trace!(
            frame_id = self.frame_id,
            detections = detections.len(),
            matches = assignment.matches.len(),
            live = self.tracks.len(),
            confirmed = tracks.len(),
            "frame processed"
        );

        FrameOutput {
            frame_id: self.frame_id,
            tracks,
            crossings,
            counts: self.counter.counts(),
            rejected,
            assignment: assignment.strategy,
            degenerate_tracks: changes.degenerate,
        }
    }

    /// Drop all tracks and counts, restarting id numbering.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.counter.reset();
        self.frame_id = 0;
    }
}

fn centroid_x(track: &Track, mode: CentroidMode) -> f32 {
    match mode {
        CentroidMode::Exact => track.last_centroid_x,
        CentroidMode::Integer => {
            let [x1, _, x2, _] = track.rect().to_tlbr();
            (x1 as i64 + x2 as i64).div_euclid(2) as f32
        }
    }
}
