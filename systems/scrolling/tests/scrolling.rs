use tactical_core::{CellIndex, ScrollRequest, ViewSnapshot, WorldPosition};
use tactical_system_scrolling::{Config, Easing, ScrollInput, Scrolling};

fn classic_view() -> ViewSnapshot {
    ViewSnapshot {
        origin: WorldPosition::from_pixels(480, 480),
        screen_x: 0,
        screen_y: 16,
        width: 640,
        height: 384,
    }
}

fn pointer_at(x: i32, y: i32) -> ScrollInput {
    ScrollInput {
        pointer: Some((x, y)),
        ..ScrollInput::default()
    }
}

fn frame(scrolling: &mut Scrolling, input: ScrollInput) -> Vec<ScrollRequest> {
    let mut out = Vec::new();
    scrolling.handle(&input, &classic_view(), &mut out);
    out
}

#[test]
fn pointer_in_the_middle_does_not_scroll() {
    let mut scrolling = Scrolling::default();
    assert!(frame(&mut scrolling, pointer_at(320, 200)).is_empty());
    assert!(!scrolling.is_scrolling());
}

#[test]
fn outer_edge_scrolls_at_full_speed() {
    let mut scrolling = Scrolling::default();
    assert_eq!(
        frame(&mut scrolling, pointer_at(0, 200)),
        vec![ScrollRequest::By { dx: -32, dy: 0 }],
    );
    assert!(scrolling.is_scrolling());
}

#[test]
fn corner_scrolls_diagonally() {
    let mut scrolling = Scrolling::default();
    assert_eq!(
        frame(&mut scrolling, pointer_at(639, 16 + 383)),
        vec![ScrollRequest::By { dx: 30, dy: 30 }],
        "the last pixel row and column sit 15 px into the band",
    );
}

#[test]
fn acceleration_bonus_caps_at_half_speed() {
    let mut scrolling = Scrolling::default();
    let mut last = Vec::new();
    for _ in 0..40 {
        last = frame(&mut scrolling, pointer_at(0, 200));
    }
    assert_eq!(last, vec![ScrollRequest::By { dx: -48, dy: 0 }]);
}

#[test]
fn leaving_the_band_resets_acceleration() {
    let mut scrolling = Scrolling::default();
    for _ in 0..20 {
        let _ = frame(&mut scrolling, pointer_at(0, 200));
    }
    assert!(frame(&mut scrolling, pointer_at(320, 200)).is_empty());
    assert_eq!(
        frame(&mut scrolling, pointer_at(0, 200)),
        vec![ScrollRequest::By { dx: -32, dy: 0 }],
    );
}

#[test]
fn pointer_above_tactical_area_is_ignored() {
    let mut scrolling = Scrolling::default();
    assert!(frame(&mut scrolling, pointer_at(0, 4)).is_empty());
}

#[test]
fn keyboard_scroll_honours_speed_multiplier() {
    let mut scrolling = Scrolling::new(Config::CLASSIC.with_speed_percent(50));
    let input = ScrollInput {
        up: true,
        right: true,
        ..ScrollInput::default()
    };
    assert_eq!(
        frame(&mut scrolling, input),
        vec![ScrollRequest::By { dx: 8, dy: -8 }],
    );
}

#[test]
fn left_and_up_win_over_opposing_keys() {
    let mut scrolling = Scrolling::default();
    let input = ScrollInput {
        left: true,
        right: true,
        up: true,
        down: true,
        ..ScrollInput::default()
    };
    assert_eq!(
        frame(&mut scrolling, input),
        vec![ScrollRequest::By { dx: -16, dy: -16 }],
    );
}

#[test]
fn disabled_scrolling_emits_nothing() {
    let mut scrolling = Scrolling::default();
    scrolling.set_enabled(false);
    let input = ScrollInput {
        pointer: Some((0, 200)),
        down: true,
        ..ScrollInput::default()
    };
    assert!(frame(&mut scrolling, input).is_empty());
}

#[test]
fn tracking_respects_dead_zone() {
    let mut scrolling = Scrolling::default();
    let centre = classic_view().center();

    scrolling.track(centre.offset(90 * 256, -90 * 256));
    assert!(frame(&mut scrolling, ScrollInput::default()).is_empty());

    scrolling.track(centre.offset(150 * 256, 4 * 256));
    assert_eq!(
        frame(&mut scrolling, ScrollInput::default()),
        vec![ScrollRequest::By { dx: 18, dy: 1 }],
    );

    scrolling.stop_tracking();
    assert!(frame(&mut scrolling, ScrollInput::default()).is_empty());
}

#[test]
fn animated_centre_lands_exactly_on_target() {
    let mut scrolling = Scrolling::default();
    let view = classic_view();
    let mut out = Vec::new();
    let cell = CellIndex::from_xy(64, 64);
    scrolling.center_on_cell(&view, cell, Easing::EaseInOut, 6, &mut out);
    assert!(out.is_empty());
    assert!(scrolling.is_animating());

    let mut positions = Vec::new();
    for _ in 0..6 {
        for request in frame(&mut scrolling, pointer_at(0, 200)) {
            match request {
                ScrollRequest::To { position } => positions.push(position),
                other => panic!("unexpected request during animation: {other:?}"),
            }
        }
    }

    let expected = view.origin_centering(tactical_core::cell_to_world(cell));
    assert_eq!(positions.len(), 6);
    assert_eq!(positions.last(), Some(&expected));
    assert!(positions.windows(2).all(|pair| pair[0].x() <= pair[1].x()));
    assert!(!scrolling.is_animating());
}

#[test]
fn instant_scroll_jumps_immediately() {
    let mut scrolling = Scrolling::default();
    let mut out = Vec::new();
    let target = WorldPosition::from_pixels(1_000, 800);
    scrolling.scroll_to(&classic_view(), target, Easing::Instant, 10, &mut out);
    assert_eq!(out, vec![ScrollRequest::To { position: target }]);
    assert!(!scrolling.is_animating());
}
