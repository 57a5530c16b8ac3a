use linecount_rs::{
    AssignmentStrategy, CountingMode, Detection, FrameTracker, TrackState, TrackerConfig,
};

fn person(x: f32, y: f32) -> Detection {
    Detection::new(x, y, x + 50.0, y + 100.0, 0.9)
}

fn ids(tracker: &FrameTracker) -> Vec<u64> {
    tracker.active_tracks().iter().map(|t| t.track_id).collect()
}

#[test]
fn test_single_track_continuity() {
    let mut tracker = FrameTracker::new(TrackerConfig::default()).unwrap();

    let mut seen = Vec::new();
    for frame in 0..30 {
        let output = tracker.update(vec![person(100.0 + frame as f32 * 5.0, 200.0)]);
        if frame < 2 {
            // Tentative until min_hits consecutive matches.
            assert!(output.tracks.is_empty(), "frame {frame}");
        } else {
            assert_eq!(output.tracks.len(), 1, "frame {frame}");
            assert_eq!(output.tracks[0].time_since_update, 0);
            seen.push(output.tracks[0].track_id);
        }
    }

    assert!(seen.iter().all(|&id| id == 1));
    assert_eq!(tracker.tracks().count(), 1);
}

#[test]
fn test_track_survives_occlusion_within_max_age() {
    let mut tracker = FrameTracker::new(TrackerConfig::default()).unwrap();
    for _ in 0..5 {
        tracker.update(vec![person(100.0, 100.0)]);
    }
    assert_eq!(ids(&tracker), vec![1]);

    for _ in 0..20 {
        let output = tracker.update(vec![]);
        // Coasting tracks stay alive but are not reported.
        assert!(output.tracks.is_empty());
        assert_eq!(tracker.tracks().count(), 1);
    }

    let output = tracker.update(vec![person(100.0, 100.0)]);
    assert_eq!(output.tracks.len(), 1);
    assert_eq!(output.tracks[0].track_id, 1);
    assert_eq!(output.tracks[0].time_since_update, 0);
}

#[test]
fn test_track_deleted_after_max_age() {
    let mut tracker = FrameTracker::new(TrackerConfig::default()).unwrap();
    for _ in 0..5 {
        tracker.update(vec![person(100.0, 100.0)]);
    }

    for _ in 0..21 {
        tracker.update(vec![]);
    }
    assert_eq!(tracker.tracks().count(), 0);

    tracker.update(vec![person(100.0, 100.0)]);
    let reborn: Vec<_> = tracker.tracks().collect();
    assert_eq!(reborn.len(), 1);
    assert_eq!(reborn[0].track_id, 2);
    assert_eq!(reborn[0].state, TrackState::Tentative);
}

#[test]
fn test_empty_input_handling() {
    let mut tracker = FrameTracker::new(TrackerConfig::default()).unwrap();

    let output = tracker.update(vec![
        person(0.0, 0.0),
        person(200.0, 0.0),
        person(400.0, 0.0),
    ]);
    assert!(output.tracks.is_empty());
    assert_eq!(output.assignment, AssignmentStrategy::Trivial);
    assert_eq!(tracker.tracks().count(), 3);
    assert!(tracker.tracks().all(|t| t.state == TrackState::Tentative));

    for _ in 0..25 {
        let output = tracker.update(vec![]);
        assert!(output.tracks.is_empty());
    }
    assert_eq!(tracker.tracks().count(), 0);
}

#[test]
fn test_opposite_crossings_are_counted() {
    let mut tracker = FrameTracker::new(TrackerConfig::default()).unwrap();
    tracker.set_frame_size(640, 480);
    assert_eq!(tracker.line_x(), 320.0);

    let mut events = Vec::new();
    for frame in 0..40 {
        let step = frame as f32 * 10.0;
        let output = tracker.update(vec![person(100.0 + step, 50.0), person(500.0 - step, 300.0)]);
        events.extend(output.crossings);
    }

    let counts = tracker.counts();
    assert_eq!(counts.left_to_right, 1);
    assert_eq!(counts.right_to_left, 1);
    assert_eq!(counts.total, 2);
    assert_eq!(events.len(), 2);
    assert_ne!(events[0].track_id, events[1].track_id);
}

#[test]
fn test_recrossing_modes() {
    fn run(mode: CountingMode) -> (usize, usize) {
        let config = TrackerConfig {
            counting_mode: mode,
            line_x: Some(300.0),
            ..TrackerConfig::default()
        };
        let mut tracker = FrameTracker::new(config).unwrap();
        tracker.set_frame_size(640, 480);

        // Walk right across the line, back left, then right again.
        let mut x = 200.0;
        for velocity in [6.0, -6.0, 6.0] {
            for _ in 0..25 {
                tracker.update(vec![person(x, 100.0)]);
                x += velocity;
            }
        }
        let counts = tracker.counts();
        (counts.left_to_right, counts.right_to_left)
    }

    assert_eq!(run(CountingMode::UniquePerTrack), (1, 1));
    assert_eq!(run(CountingMode::EveryCrossing), (2, 1));
}

#[test]
fn test_determinism() {
    fn run() -> Vec<(u64, Vec<(u64, [f32; 4])>, usize)> {
        let mut tracker = FrameTracker::new(TrackerConfig::default()).unwrap();
        tracker.set_frame_size(800, 600);
        (0..40)
            .map(|frame| {
                let f = frame as f32;
                let mut dets = vec![person(50.0 + f * 12.0, 40.0), person(700.0 - f * 9.0, 260.0)];
                if frame % 7 != 3 {
                    dets.push(person(380.0, 420.0 + f));
                }
                let output = tracker.update(dets);
                let tracks = output
                    .tracks
                    .iter()
                    .map(|t| (t.track_id, t.bbox.to_tlbr()))
                    .collect();
                (output.frame_id, tracks, output.counts.total)
            })
            .collect()
    }

    assert_eq!(run(), run());
}

#[test]
fn test_sessions_are_independent() {
    let mut a = FrameTracker::new(TrackerConfig::default()).unwrap();
    let mut b = FrameTracker::new(TrackerConfig::default()).unwrap();

    a.update(vec![person(0.0, 0.0), person(300.0, 0.0)]);
    b.update(vec![person(0.0, 0.0)]);

    let a_ids: Vec<u64> = a.tracks().map(|t| t.track_id).collect();
    let b_ids: Vec<u64> = b.tracks().map(|t| t.track_id).collect();
    assert_eq!(a_ids, vec![1, 2]);
    assert_eq!(b_ids, vec![1]);
}

#[test]
fn test_rejected_detections_do_not_spawn_tracks() {
    let mut tracker = FrameTracker::new(TrackerConfig::default()).unwrap();
    let output = tracker.update(vec![
        Detection::new(10.0, 10.0, 10.0, 50.0, 0.9),
        Detection::new(10.0, 10.0, 60.0, 50.0, -0.1),
        Detection::new(f32::NAN, 10.0, 60.0, 50.0, 0.9),
    ]);

    assert_eq!(output.rejected.len(), 3);
    assert_eq!(tracker.tracks().count(), 0);
}

#[test]
fn test_config_from_json() {
    let config: TrackerConfig =
        serde_json::from_str(r#"{ "max_age": 5, "counting_mode": "EveryCrossing" }"#).unwrap();
    assert_eq!(config.max_age, 5);
    assert_eq!(config.min_hits, 3);
    assert_eq!(config.counting_mode, CountingMode::EveryCrossing);
    assert!(config.validate().is_ok());

    let text = serde_json::to_string(&TrackerConfig::default()).unwrap();
    let back: TrackerConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, TrackerConfig::default());
}

#[test]
fn test_greedy_fallback_inside_frame_cycle() {
    let config = TrackerConfig {
        max_assignment_size: 1,
        ..TrackerConfig::default()
    };
    let mut tracker = FrameTracker::new(config).unwrap();

    let first = tracker.update(vec![person(0.0, 0.0), person(300.0, 0.0)]);
    assert_eq!(first.assignment, AssignmentStrategy::Trivial);

    let second = tracker.update(vec![person(4.0, 0.0), person(304.0, 0.0)]);
    assert_eq!(second.assignment, AssignmentStrategy::Greedy);
    let ids: Vec<u64> = tracker.tracks().map(|t| t.track_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(tracker.tracks().all(|t| t.hit_streak == 2));

    let exact = FrameTracker::new(TrackerConfig::default()).map(|mut t| {
        t.update(vec![person(0.0, 0.0), person(300.0, 0.0)]);
        t.update(vec![person(4.0, 0.0), person(304.0, 0.0)]).assignment
    });
    assert_eq!(exact.unwrap(), AssignmentStrategy::Exact);
}

#[test]
fn test_coasting_tracks_reported_on_request() {
    let config = TrackerConfig {
        report_coasting: true,
        ..TrackerConfig::default()
    };
    let mut tracker = FrameTracker::new(config).unwrap();
    for _ in 0..4 {
        tracker.update(vec![person(100.0, 100.0)]);
    }

    let output = tracker.update(vec![]);
    assert_eq!(output.tracks.len(), 1);
    assert_eq!(output.tracks[0].time_since_update, 1);
}
