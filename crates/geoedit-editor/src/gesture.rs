//! Gesture controller: raw pointer and key input → editor actions.
//!
//! The controller is a small state machine over an interaction [`Mode`]
//! and the current press. It never mutates editor state itself; each input
//! yields at most one [`GestureAction`] for the session to carry out.
//!
//! Press-and-hold on a vertex is disambiguated from a click with a deadline
//! rather than a timer callback: the host calls [`GestureController::tick`]
//! with the current time, and an early pointer-up simply clears the
//! deadline, so a stale drag start can never fire after release.
//!
//! Listeners are derived from the state machine ([`GestureController::armed`])
//! instead of being registered and removed by hand, so every listener a
//! gesture arms is disarmed by the transition that ends it.

use crate::state::{EditorState, Event};
use geoedit_core::snap::NearPoints;
use geoedit_core::{Point, Segment};
use serde::Serialize;
use smallvec::SmallVec;

/// What pointer input currently means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Hover and select geometries.
    #[default]
    Browse,
    /// Drag or insert vertices of the selected geometry.
    Edit,
    /// Place vertices of a new shape, one per click.
    AddShape,
}

/// A logical input listener. See [`GestureController::armed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Listener {
    SelectDown,
    SelectMove,
    SelectUp,
    EditDown,
    DragMove,
    DragUp,
    DragTimer,
    ShapeClick,
    FinishKey,
}

/// Work for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureAction {
    Dispatch(Event),
    /// Commit the staged drag geometry.
    CommitDrag,
    /// First click of a new shape, at the current cursor.
    BeginShape,
    /// Next click of a new shape, at the current cursor.
    AddVertex,
    /// Tap on a snapped edge: insert `at` into `segment`.
    InsertVertex { segment: Segment, at: Point },
}

#[derive(Debug, Clone, PartialEq)]
enum Press {
    Idle,
    /// Browse press; becomes a selection on release, nothing if moved.
    Select { at: Point },
    /// Press on a vertex, waiting for a move or the deadline. `near` holds
    /// the copies of that one vertex.
    Pending { deadline: f64, near: NearPoints },
    Dragging,
    /// Press on a snapped edge with no vertex nearby.
    EdgeTap { segment: Segment, at: Point },
}

#[derive(Debug, Clone)]
pub struct GestureController {
    mode: Mode,
    press: Press,
    shape_started: bool,
    drag_delay_ms: f64,
}

impl GestureController {
    pub fn new(drag_delay_ms: f64) -> Self {
        Self {
            mode: Mode::Browse,
            press: Press::Idle,
            shape_started: false,
            drag_delay_ms,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// When the host should call [`tick`](Self::tick) next, if at all.
    pub fn next_deadline(&self) -> Option<f64> {
        match self.press {
            Press::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Listeners live in the current mode and press.
    pub fn armed(&self) -> SmallVec<[Listener; 6]> {
        let mut out = SmallVec::new();
        match self.mode {
            Mode::Browse => {
                out.push(Listener::SelectDown);
                if matches!(self.press, Press::Select { .. }) {
                    out.extend([Listener::SelectMove, Listener::SelectUp]);
                }
            }
            Mode::Edit => {
                out.extend([Listener::EditDown, Listener::FinishKey]);
                match self.press {
                    Press::Pending { .. } => {
                        out.extend([Listener::DragMove, Listener::DragUp, Listener::DragTimer])
                    }
                    Press::EdgeTap { .. } => out.extend([Listener::DragMove, Listener::DragUp]),
                    Press::Dragging => out.push(Listener::DragUp),
                    Press::Idle | Press::Select { .. } => {}
                }
            }
            Mode::AddShape => out.extend([Listener::ShapeClick, Listener::FinishKey]),
        }
        out
    }

    pub fn pointer_down(&mut self, at: Point, now: f64, state: &EditorState) -> Option<GestureAction> {
        match self.mode {
            Mode::Browse if state.editing.is_none() => {
                self.press = Press::Select { at };
            }
            Mode::Edit if matches!(self.press, Press::Idle) => {
                let grabbed = state.grabbed();
                if !grabbed.is_empty() {
                    self.press = Press::Pending {
                        deadline: now + self.drag_delay_ms,
                        near: grabbed,
                    };
                } else if let Some(segment) = state.line {
                    self.press = Press::EdgeTap {
                        segment,
                        at: state.mouse_position,
                    };
                }
            }
            _ => {}
        }
        None
    }

    /// Called after the session has applied the new cursor position.
    pub fn pointer_move(&mut self) -> Option<GestureAction> {
        match std::mem::replace(&mut self.press, Press::Idle) {
            Press::Pending { near, .. } => Some(self.start_drag(near)),
            Press::Dragging => {
                self.press = Press::Dragging;
                None
            }
            Press::Idle | Press::Select { .. } | Press::EdgeTap { .. } => None,
        }
    }

    pub fn pointer_up(&mut self, state: &EditorState) -> Option<GestureAction> {
        match std::mem::replace(&mut self.press, Press::Idle) {
            Press::Select { at } if state.hover_index.is_some() => {
                self.mode = Mode::Edit;
                Some(GestureAction::Dispatch(Event::Click(at)))
            }
            Press::Dragging => Some(GestureAction::CommitDrag),
            Press::EdgeTap { segment, at } => Some(GestureAction::InsertVertex { segment, at }),
            // Released before the deadline: a click, not a drag.
            Press::Pending { .. } | Press::Select { .. } | Press::Idle => None,
        }
    }

    pub fn tick(&mut self, now: f64) -> Option<GestureAction> {
        if self.next_deadline().is_none_or(|deadline| now < deadline) {
            return None;
        }
        match std::mem::replace(&mut self.press, Press::Idle) {
            Press::Pending { near, .. } => Some(self.start_drag(near)),
            other => {
                self.press = other;
                None
            }
        }
    }

    pub fn click(&mut self) -> Option<GestureAction> {
        if self.mode != Mode::AddShape {
            return None;
        }
        if self.shape_started {
            Some(GestureAction::AddVertex)
        } else {
            self.shape_started = true;
            Some(GestureAction::BeginShape)
        }
    }

    /// Enter add-shape mode, abandoning any press in progress.
    pub fn begin_add_shape(&mut self) {
        self.mode = Mode::AddShape;
        self.press = Press::Idle;
        self.shape_started = false;
    }

    /// End the current edit or add-shape gesture and return to browsing.
    pub fn finish(&mut self) -> Option<GestureAction> {
        if self.mode == Mode::Browse {
            return None;
        }
        self.mode = Mode::Browse;
        self.press = Press::Idle;
        self.shape_started = false;
        Some(GestureAction::Dispatch(Event::Finish))
    }

    fn start_drag(&mut self, near: NearPoints) -> GestureAction {
        self.press = Press::Dragging;
        GestureAction::Dispatch(Event::ToggleDrag(near.into_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoedit_core::EditorConfig;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn editing_near(near: NearPoints) -> (GestureController, EditorState) {
        let mut g = GestureController::new(100.0);
        g.mode = Mode::Edit;
        let state = EditorState {
            editing: Some(0),
            near,
            ..EditorState::new(&EditorConfig::default())
        };
        (g, state)
    }

    #[test]
    fn release_before_deadline_cancels_the_drag() {
        let (mut g, state) = editing_near(smallvec![p(0.0, 0.0)]);
        g.pointer_down(p(1.0, 1.0), 1000.0, &state);
        assert_eq!(g.next_deadline(), Some(1100.0));
        assert_eq!(g.pointer_up(&state), None);
        assert_eq!(g.next_deadline(), None);
        assert_eq!(g.tick(2000.0), None);
    }

    #[test]
    fn deadline_starts_the_drag() {
        let (mut g, state) = editing_near(smallvec![p(0.0, 0.0)]);
        g.pointer_down(p(1.0, 1.0), 1000.0, &state);
        assert_eq!(g.tick(1050.0), None);
        assert_eq!(
            g.tick(1100.0),
            Some(GestureAction::Dispatch(Event::ToggleDrag(vec![p(0.0, 0.0)])))
        );
        assert_eq!(g.pointer_up(&state), Some(GestureAction::CommitDrag));
    }

    #[test]
    fn move_starts_the_drag_immediately() {
        let (mut g, state) = editing_near(smallvec![p(0.0, 0.0), p(0.0, 0.0)]);
        g.pointer_down(p(1.0, 1.0), 0.0, &state);
        assert_eq!(
            g.pointer_move(),
            Some(GestureAction::Dispatch(Event::ToggleDrag(vec![p(0.0, 0.0), p(0.0, 0.0)])))
        );
        assert_eq!(g.pointer_move(), None);
        assert_eq!(g.armed().as_slice(), &[Listener::EditDown, Listener::FinishKey, Listener::DragUp]);
    }

    #[test]
    fn drag_takes_only_copies_of_the_nearest_vertex() {
        let (mut g, state) = editing_near(smallvec![p(0.0, 8.0), p(0.0, 0.0), p(0.0, 0.0)]);
        g.pointer_down(p(1.0, 7.0), 0.0, &state);
        assert_eq!(
            g.pointer_move(),
            Some(GestureAction::Dispatch(Event::ToggleDrag(vec![p(0.0, 8.0)])))
        );
    }

    #[test]
    fn press_away_from_vertices_and_edges_does_nothing() {
        let (mut g, state) = editing_near(NearPoints::new());
        g.pointer_down(p(1.0, 1.0), 0.0, &state);
        assert_eq!(g.armed().as_slice(), &[Listener::EditDown, Listener::FinishKey]);
        assert_eq!(g.pointer_up(&state), None);
    }

    #[test]
    fn browse_press_moved_is_not_a_selection() {
        let mut g = GestureController::new(100.0);
        let state = EditorState {
            hover_index: Some(0),
            ..EditorState::new(&EditorConfig::default())
        };
        g.pointer_down(p(5.0, 5.0), 0.0, &state);
        g.pointer_move();
        assert_eq!(g.pointer_up(&state), None);
        assert_eq!(g.mode(), Mode::Browse);
    }

    #[test]
    fn add_shape_clicks_begin_then_extend() {
        let mut g = GestureController::new(100.0);
        assert_eq!(g.click(), None);
        g.begin_add_shape();
        assert_eq!(g.click(), Some(GestureAction::BeginShape));
        assert_eq!(g.click(), Some(GestureAction::AddVertex));
        assert_eq!(g.finish(), Some(GestureAction::Dispatch(Event::Finish)));
        assert_eq!(g.finish(), None);
        assert_eq!(g.armed().as_slice(), &[Listener::SelectDown]);
    }
}
