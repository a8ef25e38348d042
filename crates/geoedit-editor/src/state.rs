//! Interaction state and its transitions.
//!
//! [`EditorState`] is an immutable snapshot. [`reduce`] computes the next
//! snapshot for an [`Event`] without touching the previous one. Geometry,
//! flat lists, and indexes sit behind `Rc` so unchanged parts are shared
//! between snapshots and "did the data change" is a pointer comparison.

use geoedit_core::hit::hit_test;
use geoedit_core::snap::{self, NearPoints};
use geoedit_core::{
    EditorConfig, Flattened, Geometry, Indexes, Point, Segment, Settings, SnapMode, Vertex, flatten,
};
use std::rc::Rc;

/// One snapshot of the editor.
#[derive(Debug, Clone)]
pub struct EditorState {
    /// Top-level geometries; collection order decides hit-test ties.
    pub data: Rc<Vec<Geometry<Vertex>>>,
    /// Every vertex position across `data`, aligned with the point index.
    pub coordinates: Rc<Vec<Point>>,
    /// Every consecutive-vertex edge across `data`.
    pub lines: Rc<Vec<Segment>>,
    pub indexes: Rc<Indexes>,
    /// Effective cursor, snapped when a snap applies.
    pub mouse_position: Point,
    pub near: NearPoints,
    pub line: Option<Segment>,
    pub snap: SnapMode,
    pub hover_index: Option<usize>,
    /// Hover fade counter, `0..=hover_transition_max`.
    pub hover_transition: f64,
    pub editing: Option<usize>,
    /// Original positions of the vertices under drag; empty when idle.
    pub dragging: Vec<Point>,
    pub settings: Settings,
}

impl EditorState {
    /// Empty geometry, default settings, hover fully faded in.
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            data: Rc::new(Vec::new()),
            coordinates: Rc::new(Vec::new()),
            lines: Rc::new(Vec::new()),
            indexes: Rc::new(Indexes::default()),
            mouse_position: Point::ZERO,
            near: NearPoints::new(),
            line: None,
            snap: SnapMode::None,
            hover_index: None,
            hover_transition: config.hover_transition_max,
            editing: None,
            dragging: Vec::new(),
            settings: Settings::default(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        !self.dragging.is_empty()
    }

    /// Positions a press would drag: every copy of the nearest vertex and
    /// nothing else. Other vertices inside the snap radius stay put.
    pub fn grabbed(&self) -> NearPoints {
        match self.near.first() {
            Some(&target) => self.near.iter().copied().filter(|&q| q == target).collect(),
            None => NearPoints::new(),
        }
    }

    /// The geometry open for editing, if any.
    pub fn edited(&self) -> Option<&Geometry<Vertex>> {
        self.editing.and_then(|i| self.data.get(i))
    }

    /// Swap in new geometry and rebuild both indexes from its flat lists.
    /// Selections that no longer point into `data` are dropped.
    fn with_geometry(&self, flat: Flattened<Vertex>) -> Self {
        let len = flat.data.len();
        let indexes = Indexes::build(&flat.coordinates, &flat.bounds);
        Self {
            data: Rc::new(flat.data),
            coordinates: Rc::new(flat.coordinates),
            lines: Rc::new(flat.lines),
            indexes: Rc::new(indexes),
            editing: self.editing.filter(|&i| i < len),
            hover_index: self.hover_index.filter(|&i| i < len),
            ..self.clone()
        }
    }
}

/// Named state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Replace the geometry with a freshly projected collection.
    Init(Flattened<Vertex>),
    /// Raw cursor position; runs hover detection and snapping.
    UpdateMousePosition(Point),
    /// Open the hovered geometry for editing.
    Click(Point),
    Finish,
    /// Start (non-empty) or clear (empty) a drag of these positions.
    ToggleDrag(Vec<Point>),
    /// Commit geometry after a drag or an edge insertion.
    UpdatePositions(Flattened<Vertex>),
    UpdateSettings(Settings),
    IncreaseHoverTransition,
    /// Append a new shape and open it for editing.
    Edit(Geometry<Vertex>),
    /// Replace the geometry while a new shape is under construction.
    Update(Vec<Geometry<Vertex>>),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::UpdateMousePosition(_) => "update_mouse_position",
            Self::Click(_) => "click",
            Self::Finish => "finish",
            Self::ToggleDrag(_) => "toggle_drag",
            Self::UpdatePositions(_) => "update_positions",
            Self::UpdateSettings(_) => "update_settings",
            Self::IncreaseHoverTransition => "increase_hover_transition",
            Self::Edit(_) => "edit",
            Self::Update(_) => "update",
        }
    }
}

/// The next snapshot after `event`. Pure: no I/O, `state` is untouched.
pub fn reduce(state: &EditorState, event: Event, config: &EditorConfig) -> EditorState {
    match event {
        Event::Init(flat) => state.with_geometry(flat),

        Event::UpdateMousePosition(cursor) => {
            // Editing locks hover in place.
            let hover_index = if state.editing.is_some() {
                state.hover_index
            } else {
                hit_test(&state.data, &state.indexes, cursor)
            };
            let hover_transition = if hover_index == state.hover_index {
                state.hover_transition
            } else {
                0.0
            };
            let snap = snap::resolve(
                cursor,
                &state.settings,
                config,
                &state.indexes.points,
                &state.lines,
            );
            EditorState {
                mouse_position: snap.position,
                near: snap.near,
                line: snap.line,
                snap: snap.mode,
                hover_index,
                hover_transition,
                ..state.clone()
            }
        }

        Event::Click(_) => EditorState {
            editing: state.hover_index.filter(|&i| i < state.data.len()),
            ..state.clone()
        },

        Event::Finish => EditorState {
            editing: None,
            ..state.clone()
        },

        Event::ToggleDrag(positions) => EditorState {
            dragging: positions,
            ..state.clone()
        },

        Event::UpdatePositions(flat) => EditorState {
            dragging: Vec::new(),
            ..state.with_geometry(flat)
        },

        Event::UpdateSettings(settings) => EditorState {
            settings,
            ..state.clone()
        },

        Event::IncreaseHoverTransition => {
            let max = config.hover_transition_max;
            let next = (state.hover_transition + config.hover_transition_step)
                .min(max)
                .max(0.0);
            EditorState {
                hover_transition: next,
                ..state.clone()
            }
        }

        Event::Edit(geometry) => {
            let mut data = state.data.as_ref().clone();
            let index = data.len();
            data.push(geometry);
            EditorState {
                editing: Some(index),
                ..state.with_geometry(flatten(&data))
            }
        }

        Event::Update(data) => state.with_geometry(flatten(&data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoedit_core::LngLat;
    use pretty_assertions::assert_eq;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square() -> Geometry<Vertex> {
        let ring = [(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]
            .iter()
            .map(|&(x, y)| Vertex::new(p(x, y), LngLat::new(x, y)))
            .collect();
        Geometry::polygon(vec![ring])
    }

    fn loaded() -> EditorState {
        let config = EditorConfig::default();
        reduce(&EditorState::new(&config), Event::Init(flatten(&[square()])), &config)
    }

    #[test]
    fn transitions_leave_the_previous_snapshot_alone() {
        let config = EditorConfig::default();
        let before = loaded();
        let after = reduce(&before, Event::UpdateMousePosition(p(5.0, 5.0)), &config);
        assert_eq!(before.hover_index, None);
        assert_eq!(after.hover_index, Some(0));
        assert!(Rc::ptr_eq(&before.data, &after.data));
    }

    #[test]
    fn hover_change_restarts_the_fade() {
        let config = EditorConfig::default();
        let state = loaded();
        assert_eq!(state.hover_transition, 20.0);
        let hovered = reduce(&state, Event::UpdateMousePosition(p(5.0, 5.0)), &config);
        assert_eq!(hovered.hover_transition, 0.0);
        let stepped = reduce(&hovered, Event::IncreaseHoverTransition, &config);
        let still = reduce(&stepped, Event::UpdateMousePosition(p(6.0, 5.0)), &config);
        assert_eq!(still.hover_transition, stepped.hover_transition);
    }

    #[test]
    fn click_without_hover_selects_nothing() {
        let config = EditorConfig::default();
        let state = reduce(&loaded(), Event::Click(p(50.0, 50.0)), &config);
        assert_eq!(state.editing, None);
    }

    #[test]
    fn edit_appends_and_opens_the_new_shape() {
        let config = EditorConfig::default();
        let shape = Geometry::point(Vertex::new(p(30.0, 30.0), LngLat::new(30.0, 30.0)));
        let state = reduce(&loaded(), Event::Edit(shape), &config);
        assert_eq!(state.editing, Some(1));
        assert_eq!(state.data.len(), 2);
        assert_eq!(state.coordinates.len(), 6);
        assert_eq!(state.indexes.points.within(p(30.0, 30.0), 0.0).as_slice(), &[5]);
    }

    #[test]
    fn shrinking_data_drops_stale_selections() {
        let config = EditorConfig::default();
        let hovered = reduce(&loaded(), Event::UpdateMousePosition(p(5.0, 5.0)), &config);
        let editing = reduce(&hovered, Event::Click(p(5.0, 5.0)), &config);
        let emptied = reduce(&editing, Event::Update(Vec::new()), &config);
        assert_eq!(emptied.editing, None);
        assert_eq!(emptied.hover_index, None);
    }
}
