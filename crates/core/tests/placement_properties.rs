use postermill_core::placement::{resize, Dimension, ManualEntry};
use postermill_core::{DragMode, PlacementSession, PlacementSettings};
use postermill_model::{ImageSize, PlacementRect, Point2D, HISTORY_LIMIT, MIN_SIZE};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

#[derive(Debug, Clone)]
enum Op {
    Drag {
        mode: DragMode,
        steps: Vec<(f64, f64)>,
    },
    Manual {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    Width(f64),
    Height(f64),
    Center,
    Reset,
    Lock(bool),
}

fn drag_mode() -> impl Strategy<Value = DragMode> {
    prop_oneof![
        Just(DragMode::Move),
        Just(DragMode::ResizeTopLeft),
        Just(DragMode::ResizeTopRight),
        Just(DragMode::ResizeBottomLeft),
        Just(DragMode::ResizeBottomRight),
    ]
}

/// The corner a resize handle must not move, before and after the step.
fn opposite_corners(
    before: PlacementRect,
    after: PlacementRect,
    mode: DragMode,
) -> ((f64, f64), (f64, f64)) {
    let corner = |r: PlacementRect| match mode {
        DragMode::ResizeTopLeft => (r.right(), r.bottom()),
        DragMode::ResizeTopRight => (r.x, r.bottom()),
        DragMode::ResizeBottomLeft => (r.right(), r.y),
        _ => (r.x, r.y),
    };
    (corner(before), corner(after))
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (
            drag_mode(),
            prop::collection::vec((-400.0f64..400.0, -400.0f64..400.0), 1..6)
        )
            .prop_map(|(mode, steps)| Op::Drag { mode, steps }),
        (
            -500.0f64..2500.0,
            -500.0f64..2500.0,
            1.0f64..3000.0,
            1.0f64..3000.0
        )
            .prop_map(|(x, y, w, h)| Op::Manual { x, y, w, h }),
        (1.0f64..3000.0).prop_map(Op::Width),
        (1.0f64..3000.0).prop_map(Op::Height),
        Just(Op::Center),
        Just(Op::Reset),
        any::<bool>().prop_map(Op::Lock),
    ]
}

fn apply(session: &mut PlacementSession, op: &Op) {
    match op {
        Op::Drag { mode, steps } => {
            let mut pointer = Point2D::new(100.0, 100.0);
            session.begin_drag(*mode, pointer);
            for (dx, dy) in steps {
                pointer = Point2D::new(pointer.x + dx, pointer.y + dy);
                session.update_drag(pointer);
            }
            session.end_drag();
        }
        Op::Manual { x, y, w, h } => {
            session.manual_set(*x, *y, *w, *h).unwrap();
        }
        Op::Width(w) => {
            session.set_dimension(Dimension::Width(*w)).unwrap();
        }
        Op::Height(h) => {
            session.set_dimension(Dimension::Height(*h)).unwrap();
        }
        Op::Center => {
            session.center().unwrap();
        }
        Op::Reset => {
            session.reset_to_original().unwrap();
        }
        Op::Lock(enable) => {
            session.toggle_aspect_lock(*enable);
        }
    }
}

fn loaded_session(base: ImageSize, overlay: ImageSize) -> PlacementSession {
    let mut session = PlacementSession::new(PlacementSettings::default());
    session.set_view_size(1200.0, 900.0);
    session.load_base(base);
    session.load_overlay(overlay);
    session
}

fn assert_in_bounds(rect: PlacementRect, base: ImageSize) -> Result<(), TestCaseError> {
    prop_assert!(rect.x >= -EPS, "x out of bounds: {rect:?}");
    prop_assert!(rect.y >= -EPS, "y out of bounds: {rect:?}");
    prop_assert!(rect.right() <= base.width as f64 + EPS, "right out of bounds: {rect:?}");
    prop_assert!(rect.bottom() <= base.height as f64 + EPS, "bottom out of bounds: {rect:?}");
    prop_assert!(rect.w >= MIN_SIZE - EPS && rect.h >= MIN_SIZE - EPS, "below floor: {rect:?}");
    Ok(())
}

proptest! {
    #[test]
    fn committed_rect_stays_inside_base(
        bw in 100u32..2000,
        bh in 100u32..2000,
        ow in 1u32..1500,
        oh in 1u32..1500,
        ops in prop::collection::vec(op(), 1..25),
    ) {
        let base = ImageSize::new(bw, bh);
        let mut session = loaded_session(base, ImageSize::new(ow, oh));
        assert_in_bounds(session.rect(), base)?;

        for op in &ops {
            apply(&mut session, op);
            assert_in_bounds(session.rect(), base)?;
            if let Some(current) = session.history().current() {
                prop_assert_eq!(current, session.rect());
            }
        }
    }

    #[test]
    fn locked_resize_keeps_ratio(
        ratio in 0.2f64..5.0,
        w in 20.0f64..800.0,
        mode in drag_mode().prop_filter("resize only", |m| m.is_resize()),
        steps in prop::collection::vec((-300.0f64..300.0, -300.0f64..300.0), 1..10),
    ) {
        let mut rect = PlacementRect::new(500.0, 500.0, w.max(MIN_SIZE * ratio), 0.0);
        rect.h = rect.w / ratio;

        for (dx, dy) in steps {
            let before = rect;
            rect = resize(rect, mode, dx, dy, Some(ratio));
            prop_assert!((rect.w / rect.h - ratio).abs() < 1e-9 * ratio.max(1.0));
            prop_assert!(rect.w >= MIN_SIZE && rect.h >= MIN_SIZE - EPS);

            let (fixed_before, fixed_after) = opposite_corners(before, rect, mode);
            prop_assert!((fixed_before.0 - fixed_after.0).abs() < EPS);
            prop_assert!((fixed_before.1 - fixed_after.1).abs() < EPS);
        }
    }

    #[test]
    fn resize_never_goes_below_floor(
        mode in drag_mode().prop_filter("resize only", |m| m.is_resize()),
        locked in any::<bool>(),
        steps in prop::collection::vec((-1000.0f64..1000.0, -1000.0f64..1000.0), 1..10),
    ) {
        let mut rect = PlacementRect::new(100.0, 100.0, 120.0, 80.0);
        let ratio = locked.then_some(1.5);
        for (dx, dy) in steps {
            rect = resize(rect, mode, dx, dy, ratio);
            prop_assert!(rect.w >= MIN_SIZE - EPS);
            prop_assert!(rect.h >= MIN_SIZE - EPS);
        }
    }

    #[test]
    fn undo_then_redo_restores_latest(
        entries in prop::collection::vec(
            (0.0f64..500.0, 0.0f64..500.0, 20.0f64..300.0, 20.0f64..300.0),
            1..(HISTORY_LIMIT - 1),
        ),
    ) {
        let mut session = PlacementSession::default();
        let initial = session.load_base(ImageSize::new(1000, 1000));
        for (x, y, w, h) in &entries {
            session.manual_set(*x, *y, *w, *h).unwrap();
        }
        let latest = session.rect();

        for _ in 0..entries.len() {
            session.undo().unwrap();
        }
        prop_assert_eq!(session.rect(), initial);
        prop_assert!(session.undo().is_err());

        for _ in 0..entries.len() {
            session.redo().unwrap();
        }
        prop_assert_eq!(session.rect(), latest);
        prop_assert!(session.redo().is_err());
    }

    #[test]
    fn history_never_reaches_past_bound(extra in 1usize..40) {
        let mut session = PlacementSession::default();
        session.load_base(ImageSize::new(4000, 1000));
        let commits = HISTORY_LIMIT + extra;
        for i in 0..commits {
            session.manual_set(i as f64, 0.0, 20.0, 20.0).unwrap();
        }

        let mut oldest = session.rect();
        while let Ok(rect) = session.undo() {
            oldest = rect;
        }
        prop_assert_eq!(oldest.x, (commits - HISTORY_LIMIT) as f64);
    }
}

#[test]
fn manual_set_scenario_clamps_position() {
    let mut session = PlacementSession::default();
    let initial = session.load_base(ImageSize::new(800, 600));
    assert_eq!(initial, PlacementRect::new(300.0, 200.0, 200.0, 200.0));

    let rect = session.manual_set(-50.0, 700.0, 300.0, 300.0).unwrap();
    assert_eq!(rect, PlacementRect::new(0.0, 300.0, 300.0, 300.0));
}

#[test]
fn locked_bottom_right_drag_scenario() {
    let mut session = loaded_session(ImageSize::new(800, 600), ImageSize::new(600, 400));
    session.set_snap(false);
    session.manual_set(0.0, 0.0, 300.0, 200.0).unwrap();
    let lock = session.toggle_aspect_lock(true);
    assert_eq!(lock.ratio, 1.5);

    let scale = session.transform().scale();
    let handle = session.handles_in_view()[3].1;
    assert_eq!(session.hit_test(handle), DragMode::ResizeBottomRight);

    session.begin_drag(DragMode::ResizeBottomRight, handle);
    session.update_drag(Point2D::new(handle.x + 30.0 * scale, handle.y));
    let rect = session.end_drag().unwrap();

    assert!((rect.w - 315.0).abs() < 1e-9);
    assert!((rect.h - 210.0).abs() < 1e-9);
    assert!((rect.w / rect.h - 1.5).abs() < 1e-12);
}

#[test]
fn entry_parsing_feeds_manual_set() {
    let mut session = PlacementSession::default();
    session.load_base(ImageSize::new(800, 600));
    let depth = session.history().undo_depth();

    let entry = ManualEntry::parse("10", "20", "0", "50").unwrap();
    assert!(session.apply_entry(entry).is_err());
    assert!(ManualEntry::parse("10", "twenty", "50", "50").is_err());
    assert_eq!(session.history().undo_depth(), depth);

    let entry = ManualEntry::parse("10", "20", "50", "50").unwrap();
    let rect = session.apply_entry(entry).unwrap();
    assert_eq!(rect, PlacementRect::new(10.0, 20.0, 50.0, 50.0));
    assert_eq!(session.history().undo_depth(), depth + 1);
}
