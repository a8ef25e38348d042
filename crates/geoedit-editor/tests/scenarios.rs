//! Integration tests: store transitions over a loaded collection.
//!
//! Drives the reducer through the store the way a session would, checking
//! snapping priority, hover bookkeeping, and drag commits end to end.

use geoedit_core::projection::to_canvas;
use geoedit_core::{
    EditorConfig, Flattened, Geometry, LinearProjection, LngLat, Point, Segment, Settings, SnapMode,
    Vertex,
};
use geoedit_editor::{Event, Store};
use pretty_assertions::assert_eq;

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn square(x: f64, y: f64, size: f64) -> Geometry<LngLat> {
    let ring = [(x, y), (x, y + size), (x + size, y + size), (x + size, y), (x, y)]
        .iter()
        .map(|&(lng, lat)| LngLat::new(lng, lat))
        .collect();
    Geometry::polygon(vec![ring])
}

fn flat(data: &[Geometry<LngLat>]) -> Flattened<Vertex> {
    to_canvas(data, &LinearProjection::identity())
}

fn loaded() -> Store {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut store = Store::new(EditorConfig::default());
    store.dispatch(Event::Init(flat(&[square(0.0, 0.0, 10.0)])));
    store
}

// ─── Indexing ───────────────────────────────────────────────────────────

#[test]
fn point_index_finds_the_corner() {
    let store = loaded();
    let hits = store.state().indexes.points.within(p(0.0, 0.0), 1.0);
    assert!(hits.contains(&0));
    // The closing coordinate is indexed too.
    assert!(hits.contains(&4));
}

#[test]
fn reinit_with_same_data_is_idempotent() {
    let mut store = loaded();
    let before = store.state().clone();
    store.dispatch(Event::Init(flat(&[square(0.0, 0.0, 10.0)])));
    let after = store.state();
    assert_eq!(after.data, before.data);
    assert_eq!(after.coordinates, before.coordinates);
    assert_eq!(after.lines, before.lines);
    assert_eq!(
        after.indexes.points.within(p(10.0, 10.0), 0.5),
        before.indexes.points.within(p(10.0, 10.0), 0.5)
    );
}

// ─── Hover ──────────────────────────────────────────────────────────────

#[test]
fn cursor_inside_square_hovers_it() {
    let mut store = loaded();
    store.dispatch(Event::UpdateMousePosition(p(5.0, 5.0)));
    assert_eq!(store.state().hover_index, Some(0));
    assert_eq!(store.state().hover_transition, 0.0);
}

#[test]
fn hover_is_frozen_while_editing() {
    let mut store = loaded();
    store.dispatch(Event::UpdateMousePosition(p(5.0, 5.0)));
    store.dispatch(Event::Click(p(5.0, 5.0)));
    assert_eq!(store.state().editing, Some(0));

    store.dispatch(Event::UpdateMousePosition(p(50.0, 50.0)));
    assert_eq!(store.state().hover_index, Some(0));

    store.dispatch(Event::Finish);
    store.dispatch(Event::UpdateMousePosition(p(50.0, 50.0)));
    assert_eq!(store.state().hover_index, None);
}

#[test]
fn hover_fade_stays_within_bounds() {
    let mut store = loaded();
    store.dispatch(Event::UpdateMousePosition(p(5.0, 5.0)));
    let max = store.config().hover_transition_max;
    for _ in 0..200 {
        store.dispatch(Event::IncreaseHoverTransition);
        let t = store.state().hover_transition;
        assert!((0.0..=max).contains(&t), "fade counter {t} out of range");
    }
    assert_eq!(store.state().hover_transition, max);

    // Leaving the square restarts the fade.
    store.dispatch(Event::UpdateMousePosition(p(50.0, 50.0)));
    assert_eq!(store.state().hover_transition, 0.0);
}

#[test]
fn click_outside_everything_selects_nothing() {
    let mut store = loaded();
    store.dispatch(Event::UpdateMousePosition(p(50.0, 50.0)));
    store.dispatch(Event::Click(p(50.0, 50.0)));
    assert_eq!(store.state().editing, None);
}

// ─── Snapping ───────────────────────────────────────────────────────────

#[test]
fn edge_snap_with_point_snap_off() {
    let mut store = loaded();
    let settings = Settings::default().with_point_snap(false);
    store.dispatch(Event::UpdateSettings(settings));
    store.dispatch(Event::UpdateMousePosition(p(0.2, 5.0)));

    let state = store.state();
    assert_eq!(state.snap, SnapMode::Line);
    assert_eq!(state.mouse_position, p(0.0, 5.0));
    assert_eq!(state.line, Some(Segment::new(p(0.0, 0.0), p(0.0, 10.0))));
    assert!(state.near.is_empty());
}

#[test]
fn vertex_snap_beats_edge_snap() {
    let mut store = loaded();
    // 0.5 from the left edge, about 4.03 from the corner.
    store.dispatch(Event::UpdateMousePosition(p(0.5, 4.0)));
    let state = store.state();
    assert_eq!(state.snap, SnapMode::Point);
    assert_eq!(state.mouse_position, p(0.0, 0.0));
    assert_eq!(state.line, None);
}

#[test]
fn no_snap_keeps_raw_cursor_and_near_set() {
    let mut store = loaded();
    let settings = Settings::default().with_point_snap(false).with_line_snap(false);
    store.dispatch(Event::UpdateSettings(settings));
    store.dispatch(Event::UpdateMousePosition(p(3.0, 3.0)));

    let state = store.state();
    assert_eq!(state.snap, SnapMode::None);
    assert_eq!(state.mouse_position, p(3.0, 3.0));
    // Every corner of the small square is within the radius; the nearest
    // corner and its closing copy come first.
    assert_eq!(state.near.len(), 5);
    assert_eq!(&state.near[..2], &[p(0.0, 0.0), p(0.0, 0.0)]);
}

// ─── Dragging ───────────────────────────────────────────────────────────

#[test]
fn committed_drag_moves_the_indexed_vertex() {
    let mut store = loaded();
    store.dispatch(Event::ToggleDrag(vec![p(0.0, 0.0)]));
    assert!(store.state().is_dragging());

    let moved = Geometry::polygon(vec![
        [(1.0, 1.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (1.0, 1.0)]
            .iter()
            .map(|&(lng, lat)| LngLat::new(lng, lat))
            .collect(),
    ]);
    store.dispatch(Event::UpdatePositions(flat(&[moved])));

    let state = store.state();
    assert!(!state.is_dragging());
    assert!(!state.indexes.points.within(p(1.0, 1.0), 0.0).is_empty());
    assert!(state.indexes.points.within(p(0.0, 0.0), 0.5).is_empty());
}

#[test]
fn edited_shape_is_appended_and_selected() {
    let mut store = loaded();
    let shape = flat(&[square(20.0, 20.0, 5.0)]).data.remove(0);
    store.dispatch(Event::Edit(shape));
    let state = store.state();
    assert_eq!(state.data.len(), 2);
    assert_eq!(state.editing, Some(1));
    assert_eq!(state.coordinates.len(), 10);
}
