use storyline::{
    HostEvent, ManualTimer, MemorySurface, PlaybackCursor, PlaybackState, QueuedTransport,
    Surface, Timeline, TimelineDataset, TimelineOpts,
};

type TestTimeline = Timeline<MemorySurface, ManualTimer, QueuedTransport>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn chip() -> TimelineDataset {
    TimelineDataset::from_json(include_str!("data/chip.json")).unwrap()
}

fn fresh() -> TestTimeline {
    init_tracing();
    Timeline::new(
        TimelineOpts::default(),
        MemorySurface::new(),
        ManualTimer::new(),
        QueuedTransport::new(),
    )
    .unwrap()
}

fn rendered_with_chip() -> TestTimeline {
    let mut t = fresh().with_dataset(chip());
    t.render(None).unwrap();
    t
}

fn frame_classes(t: &TestTimeline) -> Vec<String> {
    t.renderer()
        .frame_nodes()
        .iter()
        .map(|&n| t.surface().class(n).unwrap_or_default().to_owned())
        .collect()
}

fn control_text(t: &TestTimeline) -> String {
    let control = t.renderer().mounted().unwrap().control;
    t.surface().inner_html(control)
}

#[test]
fn play_without_data_only_flips_the_label() {
    let mut t = fresh();
    t.play();
    assert_eq!(t.state(), PlaybackState::Playing);
    assert_eq!(t.control_label(), "Pause");
    assert!(t.cursor().is_none());
    assert!(t.timer_id().is_none());
    assert_eq!(t.timer().running_count(), 0);
}

#[test]
fn rendered_play_without_data_shows_pause() {
    let mut t = fresh();
    t.render(None).unwrap();
    t.play();
    assert_eq!(control_text(&t), "Pause");
    assert!(t.timer_id().is_none());
}

#[test]
fn play_pause_play_preserves_the_cursor() {
    let mut t = rendered_with_chip();
    t.play();
    let id = t.timer_id().unwrap();
    for _ in 0..40 {
        t.tick(id);
    }
    let cursor = t.cursor().unwrap();
    assert_eq!(
        cursor,
        PlaybackCursor {
            frame: 1,
            remaining: 56
        }
    );

    t.pause();
    assert_eq!(t.state(), PlaybackState::Paused);
    assert!(t.timer_id().is_none());
    assert_eq!(control_text(&t), "Play");
    assert_eq!(t.cursor(), Some(cursor));

    t.play();
    assert_eq!(t.cursor(), Some(cursor));
    assert_eq!(t.durations().unwrap().as_slice(), &[32, 64, 272]);
    assert!(t.timer_id().is_some());
}

#[test]
fn reset_false_returns_to_title() {
    let mut t = rendered_with_chip();
    t.play();
    let id = t.timer_id().unwrap();
    for _ in 0..100 {
        t.tick(id);
    }
    t.reset(false);

    assert_eq!(t.state(), PlaybackState::Reset);
    assert!(t.cursor().is_none());
    assert!(t.durations().is_none());
    assert!(t.timer_id().is_none());
    assert_eq!(t.timer().running_count(), 0);
    assert_eq!(control_text(&t), "Play");
    assert_eq!(
        frame_classes(&t),
        vec!["frame active", "frame staged", "frame staged", "frame staged"]
    );
}

#[test]
fn reset_restages_frames_whatever_their_classes() {
    let mut t = rendered_with_chip();
    let nodes = t.renderer().frame_nodes().to_vec();
    let last = nodes.len() - 1;
    for (i, &n) in nodes.iter().enumerate() {
        let class = if i == last { "frame active" } else { "frame staged" };
        t.surface_mut().set_class(n, class).unwrap();
    }
    t.reset(false);
    assert_eq!(
        frame_classes(&t),
        vec!["frame active", "frame staged", "frame staged", "frame staged"]
    );
}

#[test]
fn reset_with_autoplay_starts_a_new_cycle() {
    let mut t = rendered_with_chip();
    t.reset(true);
    assert_eq!(t.state(), PlaybackState::Playing);
    assert!(t.timer_id().is_some());
    assert_eq!(t.cursor().unwrap().frame, 0);
    assert_eq!(t.durations().unwrap().len(), 3);
}

#[test]
fn ticking_the_total_completes_playback() {
    let mut t = rendered_with_chip();
    t.play();
    let id = t.timer_id().unwrap();
    let total = t.durations().unwrap().total_ticks();
    for _ in 0..total {
        t.dispatch(HostEvent::Tick(id));
    }

    assert_eq!(t.state(), PlaybackState::Completed);
    assert!(t.timer_id().is_none());
    assert!(!t.timer().is_running(id));
    assert_eq!(control_text(&t), "Reset");
    assert_eq!(t.cursor().unwrap().frame, t.durations().unwrap().len());
}

#[test]
fn frames_advance_at_age_boundaries() {
    let mut t = rendered_with_chip();
    t.play();
    assert_eq!(
        frame_classes(&t),
        vec!["frame inactive", "frame active", "frame staged", "frame staged"]
    );

    let id = t.timer_id().unwrap();
    for _ in 0..31 {
        t.tick(id);
    }
    assert_eq!(t.renderer().active_frame(), Some(1));
    t.tick(id);
    assert_eq!(t.renderer().active_frame(), Some(2));
    assert_eq!(
        frame_classes(&t),
        vec!["frame inactive", "frame inactive", "frame active", "frame staged"]
    );
    assert_eq!(t.cursor().unwrap().remaining, 64);
}

#[test]
fn completed_play_is_a_no_op_until_reset() {
    let mut t = rendered_with_chip();
    t.play();
    let id = t.timer_id().unwrap();
    for _ in 0..368 {
        t.tick(id);
    }
    t.play();
    assert_eq!(t.state(), PlaybackState::Completed);
    assert!(t.timer_id().is_none());
}

#[test]
fn leading_empty_frames_are_skipped_at_cycle_start() {
    let ds = TimelineDataset::from_json(
        r#"{"firstName":"Chip","age":10,"events":[{"age":0,"content":"a"},{"age":0,"content":"b"}]}"#,
    )
    .unwrap();
    let mut t = fresh().with_dataset(ds);
    t.render(None).unwrap();
    t.reset(true);

    assert_eq!(t.durations().unwrap().as_slice(), &[0, 80]);
    assert_eq!(
        t.cursor(),
        Some(PlaybackCursor {
            frame: 1,
            remaining: 80
        })
    );
    assert_eq!(t.renderer().active_frame(), Some(2));
    assert!(t.timer_id().is_some());
}

#[test]
fn old_timer_ticks_are_ignored_after_reset() {
    let mut t = rendered_with_chip();
    t.play();
    let old = t.timer_id().unwrap();
    for _ in 0..10 {
        t.tick(old);
    }

    t.reset(false);
    t.tick(old);
    assert!(t.cursor().is_none());
    assert_eq!(t.state(), PlaybackState::Reset);

    t.play();
    let before = t.cursor();
    t.tick(old);
    assert_eq!(t.cursor(), before);
}

#[test]
fn old_timer_ticks_are_ignored_after_autoplay_reset() {
    let mut t = rendered_with_chip();
    t.play();
    let old = t.timer_id().unwrap();
    for _ in 0..10 {
        t.tick(old);
    }

    t.reset(true);
    let new = t.timer_id().unwrap();
    assert_ne!(new, old);
    let restarted = t.cursor();
    assert_eq!(
        restarted,
        Some(PlaybackCursor {
            frame: 0,
            remaining: 32
        })
    );
    for _ in 0..5 {
        t.dispatch(HostEvent::Tick(old));
    }
    assert_eq!(t.cursor(), restarted);

    t.tick(new);
    assert_eq!(t.cursor().unwrap().remaining, 31);
}
