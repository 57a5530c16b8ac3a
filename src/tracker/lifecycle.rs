//! Live track table: birth, confirmation, ageing and deletion.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{AssignmentResult, Detection};
use crate::tracker::rect::Rect;
use crate::tracker::track::Track;

/// Tracks touched by one lifecycle pass.
#[derive(Debug, Clone, Default)]
pub struct LifecycleChanges {
    pub born: Vec<u64>,
    pub confirmed: Vec<u64>,
    /// Removed tracks in their final `Deleted` state
    pub deleted: Vec<Track>,
    /// Matched tracks whose filter correction was skipped
    pub degenerate: Vec<u64>,
}

/// Owns every live track, keyed by id.
#[derive(Debug, Clone)]
pub struct TrackTable {
    tracks: BTreeMap<u64, Track>,
    next_id: u64,
    max_age: u32,
    min_hits: u32,
    confirm_during_warmup: bool,
    frame_count: u64,
    kalman_filter: KalmanFilter,
}

impl TrackTable {
    pub fn new(max_age: u32, min_hits: u32, kalman_filter: KalmanFilter) -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: 1,
            max_age,
            min_hits,
            confirm_during_warmup: false,
            frame_count: 0,
            kalman_filter,
        }
    }

    /// Confirm every track matched or born during the first `min_hits`
    /// frames of the session.
    pub fn with_warmup_confirmation(mut self, enabled: bool) -> Self {
        self.confirm_during_warmup = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Live tracks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Predict every live track one frame ahead.
    ///
    /// Returns the ids and predicted boxes in matching order; these are the
    /// rows of the similarity matrix.
    pub fn predict_all(&mut self) -> (Vec<u64>, Vec<Rect>) {
        let mut ids = Vec::with_capacity(self.tracks.len());
        let mut boxes = Vec::with_capacity(self.tracks.len());
        for (&id, track) in self.tracks.iter_mut() {
            ids.push(id);
            boxes.push(track.predict(&self.kalman_filter));
        }
        (ids, boxes)
    }

    /// Apply one frame's assignment. `track_ids` must be the ids returned by
    /// the preceding [`TrackTable::predict_all`].
    pub fn apply(
        &mut self,
        assignment: &AssignmentResult,
        track_ids: &[u64],
        detections: &[Detection],
    ) -> LifecycleChanges {
        let mut changes = LifecycleChanges::default();
        self.frame_count += 1;
        let in_warmup =
            self.confirm_during_warmup && self.frame_count <= u64::from(self.min_hits);

        for &(itrack, idet) in &assignment.matches {
            let Some(track) = self.tracks.get_mut(&track_ids[itrack]) else {
                continue;
            };
            let was_confirmed = track.is_confirmed();
            let det = &detections[idet];
            if !track.update(&det.bbox, det.score, &self.kalman_filter, self.min_hits) {
                warn!(
                    track_id = track.track_id,
                    "singular innovation covariance, keeping prediction"
                );
                changes.degenerate.push(track.track_id);
            }
            if in_warmup {
                track.confirm();
            }
            if !was_confirmed && track.is_confirmed() {
                debug!(track_id = track.track_id, "track confirmed");
                changes.confirmed.push(track.track_id);
            }
        }

        for &itrack in &assignment.unmatched_tracks {
            let id = track_ids[itrack];
            let Some(track) = self.tracks.get_mut(&id) else {
                continue;
            };
            track.mark_missed();
            if track.time_since_update > self.max_age {
                if let Some(mut track) = self.tracks.remove(&id) {
                    track.mark_deleted();
                    debug!(track_id = id, age = track.age, "track deleted");
                    changes.deleted.push(track);
                }
            }
        }

        for track in self.tracks.values_mut() {
            track.age += 1;
        }

        for &idet in &assignment.unmatched_detections {
            let det = &detections[idet];
            let id = self.next_id;
            self.next_id += 1;

            let mut track = Track::new(id, det.bbox, det.score, &self.kalman_filter);
            if in_warmup || track.hit_streak >= self.min_hits {
                track.confirm();
                changes.confirmed.push(id);
            }
            debug!(track_id = id, "track born");
            self.tracks.insert(id, track);
            changes.born.push(id);
        }

        changes
    }

    /// Drop every track and restart id numbering.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.next_id = 1;
        self.frame_count = 0;
    }
}
