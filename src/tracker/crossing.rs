//! Directional crossing counts against a vertical reference line.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossingDirection {
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossingEvent {
    pub track_id: u64,
    pub direction: CrossingDirection,
    /// Centroid x that completed the crossing
    pub centroid_x: f32,
    pub line_x: f32,
}

/// How repeated crossings by the same track are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CountingMode {
    /// A track counts at most once per direction.
    #[default]
    UniquePerTrack,
    /// Every crossing event counts.
    EveryCrossing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CrossingCounts {
    pub left_to_right: usize,
    pub right_to_left: usize,
    pub total: usize,
}

/// Crossing state for one session.
#[derive(Debug, Clone, Default)]
pub struct CrossingCounter {
    mode: CountingMode,
    line_x: f32,
    pinned_line_x: Option<f32>,
    left_to_right: BTreeSet<u64>,
    right_to_left: BTreeSet<u64>,
    events: Vec<CrossingEvent>,
    previous_x: HashMap<u64, f32>,
}

impl CrossingCounter {
    /// Create a counter. `pinned_line_x` fixes the line; otherwise it follows
    /// the frame center set through [`CrossingCounter::set_frame_width`].
    pub fn new(mode: CountingMode, pinned_line_x: Option<f32>) -> Self {
        Self {
            mode,
            line_x: pinned_line_x.unwrap_or(0.0),
            pinned_line_x,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> CountingMode {
        self.mode
    }

    pub fn line_x(&self) -> f32 {
        self.line_x
    }

    /// Recompute the line for a new frame width, keeping `0 <= line_x <= width`.
    pub fn set_frame_width(&mut self, width: u32) {
        self.line_x = match self.pinned_line_x {
            Some(x) => x.clamp(0.0, width as f32),
            None => (width / 2) as f32,
        };
    }

    /// Record a centroid and report whether it crossed `line_x` since the
    /// previous observation of the same track.
    pub fn observe(
        &mut self,
        track_id: u64,
        centroid_x: f32,
        line_x: f32,
    ) -> Option<CrossingEvent> {
        let previous = self.previous_x.insert(track_id, centroid_x)?;

        let direction = if previous < line_x && centroid_x >= line_x {
            CrossingDirection::LeftToRight
        } else if previous > line_x && centroid_x <= line_x {
            CrossingDirection::RightToLeft
        } else {
            return None;
        };

        let event = CrossingEvent {
            track_id,
            direction,
            centroid_x,
            line_x,
        };

        let first = match direction {
            CrossingDirection::LeftToRight => self.left_to_right.insert(track_id),
            CrossingDirection::RightToLeft => self.right_to_left.insert(track_id),
        };
        if self.mode == CountingMode::EveryCrossing {
            self.events.push(event);
        }
        debug!(track_id, ?direction, first, "line crossed");

        Some(event)
    }

    /// [`CrossingCounter::observe`] against the counter's own line.
    pub fn observe_centroid(&mut self, track_id: u64, centroid_x: f32) -> Option<CrossingEvent> {
        self.observe(track_id, centroid_x, self.line_x)
    }

    /// Drop the last position of a track that no longer exists.
    pub fn forget(&mut self, track_id: u64) {
        self.previous_x.remove(&track_id);
    }

    pub fn has_crossed(&self, track_id: u64, direction: CrossingDirection) -> bool {
        match direction {
            CrossingDirection::LeftToRight => self.left_to_right.contains(&track_id),
            CrossingDirection::RightToLeft => self.right_to_left.contains(&track_id),
        }
    }

    /// Crossing log, kept only in [`CountingMode::EveryCrossing`].
    pub fn events(&self) -> &[CrossingEvent] {
        &self.events
    }

    pub fn left_to_right_count(&self) -> usize {
        match self.mode {
            CountingMode::UniquePerTrack => self.left_to_right.len(),
            CountingMode::EveryCrossing => self.count_events(CrossingDirection::LeftToRight),
        }
    }

    pub fn right_to_left_count(&self) -> usize {
        match self.mode {
            CountingMode::UniquePerTrack => self.right_to_left.len(),
            CountingMode::EveryCrossing => self.count_events(CrossingDirection::RightToLeft),
        }
    }

    pub fn total_count(&self) -> usize {
        self.left_to_right_count() + self.right_to_left_count()
    }

    pub fn counts(&self) -> CrossingCounts {
        let left_to_right = self.left_to_right_count();
        let right_to_left = self.right_to_left_count();
        CrossingCounts {
            left_to_right,
            right_to_left,
            total: left_to_right + right_to_left,
        }
    }

    /// Clear counts and positions. The line placement is kept.
    pub fn reset(&mut self) {
        self.left_to_right.clear();
        self.right_to_left.clear();
        self.events.clear();
        self.previous_x.clear();
    }

    fn count_events(&self, direction: CrossingDirection) -> usize {
        self.events
            .iter()
            .filter(|e| e.direction == direction)
            .count()
    }
}
