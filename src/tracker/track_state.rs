use serde::{Deserialize, Serialize};

/// Track state enumeration for the tracking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackState {
    /// Newly created track, not yet confirmed
    #[default]
    Tentative,
    /// Track matched for `min_hits` consecutive frames; never reverts
    Confirmed,
    /// Unmatched for longer than `max_age`; removed from the live set
    Deleted,
}
