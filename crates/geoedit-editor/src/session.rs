//! Editor session: the object a host embeds.
//!
//! Owns the store, the gesture controller, the drawing surface, and the
//! host projection. Every dispatched event is followed by a redraw, and
//! change listeners hear about every new geometry collection, re-projected
//! to geographic coordinates.

use crate::gesture::{GestureAction, GestureController, Listener, Mode};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::state::{EditorState, Event};
use crate::store::Store;
use geoedit_core::construct::next_geometry;
use geoedit_core::projection::{to_canvas, to_geographic};
use geoedit_core::{
    EditorConfig, Geometry, GeometryError, LngLat, Point, Projection, Segment, Settings, SnapMode,
    Vertex, flatten, insert_vertex, parse_geometries, project_all, replace_vertex,
};
use geoedit_render::{CursorStyle, DrawSurface, Frame, RenderTheme, RenderView, redraw};
use serde::Serialize;
use serde_json::json;
use std::rc::Rc;

/// Handle returned by [`EditorSession::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

type ChangeListener = Box<dyn FnMut(&[Geometry<LngLat>])>;

/// Debug snapshot for host tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub geometries: usize,
    pub coordinates: usize,
    pub lines: usize,
    pub editing: Option<usize>,
    pub hover_index: Option<usize>,
    pub hover_transition: f64,
    pub dragging: usize,
    pub snap: SnapMode,
    pub mouse_position: [f64; 2],
    pub settings: Settings,
    pub mode: Mode,
    pub armed: Vec<Listener>,
    pub change_listeners: usize,
    pub markers: usize,
}

pub struct EditorSession<S: DrawSurface, P: Projection> {
    store: Store,
    gesture: GestureController,
    surface: S,
    projection: P,
    theme: RenderTheme,
    frame: Frame,
    /// Snapshot `frame` was drawn from.
    rendered: Option<Rc<EditorState>>,
    paused: bool,
    /// Last raw pointer position seen.
    raw_cursor: Option<Point>,
    listeners: Vec<(ListenerId, ChangeListener)>,
    next_listener: u64,
}

impl<S: DrawSurface, P: Projection> EditorSession<S, P> {
    pub fn new(surface: S, projection: P, config: EditorConfig) -> Self {
        let mut session = Self {
            gesture: GestureController::new(config.drag_delay_ms),
            store: Store::new(config),
            surface,
            projection,
            theme: RenderTheme::default(),
            frame: Frame::default(),
            rendered: None,
            paused: false,
            raw_cursor: None,
            listeners: Vec::new(),
            next_listener: 0,
        };
        session.render();
        session
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn state(&self) -> &Rc<EditorState> {
        self.store.state()
    }

    pub fn config(&self) -> &EditorConfig {
        self.store.config()
    }

    pub fn last_frame(&self) -> &Frame {
        &self.frame
    }

    pub fn cursor(&self) -> CursorStyle {
        self.frame.cursor
    }

    pub fn mode(&self) -> Mode {
        self.gesture.mode()
    }

    /// Logical listeners the host should have attached right now.
    pub fn armed_listeners(&self) -> Vec<Listener> {
        self.gesture.armed().into_vec()
    }

    /// Time at which the host should call [`tick`](Self::tick).
    pub fn next_deadline(&self) -> Option<f64> {
        self.gesture.next_deadline()
    }

    /// Whether a vertex drag is live (hosts suspend map panning meanwhile).
    pub fn is_dragging(&self) -> bool {
        self.state().is_dragging()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// Update the projection in place; follow with [`reproject`](Self::reproject).
    pub fn projection_mut(&mut self) -> &mut P {
        &mut self.projection
    }

    // ─── Data ────────────────────────────────────────────────────────────

    /// Replace the edited collection with host geometry.
    pub fn load(&mut self, data: &[Geometry<LngLat>]) {
        let flat = to_canvas(data, &self.projection);
        log::debug!(
            "loading {} geometries ({} vertices, {} edges)",
            flat.data.len(),
            flat.coordinates.len(),
            flat.lines.len()
        );
        self.dispatch(Event::Init(flat));
    }

    /// Decode GeoJSON and load it. Returns the number of geometries loaded.
    pub fn load_json(&mut self, text: &str) -> Result<usize, GeometryError> {
        let data = parse_geometries(text)?;
        self.load(&data);
        Ok(data.len())
    }

    /// The edited collection in geographic coordinates.
    pub fn geometries(&self) -> Vec<Geometry<LngLat>> {
        to_geographic(&self.state().data, &self.projection)
    }

    /// Re-run the forward projection after the host view moved.
    /// Abandons a drag in progress. Change listeners are not called: the
    /// geographic collection is the same.
    pub fn reproject(&mut self) {
        if self.is_dragging() {
            log::debug!("reprojecting mid-drag, drag abandoned");
            self.dispatch(Event::ToggleDrag(Vec::new()));
        }
        let flat = to_canvas(&self.geometries(), &self.projection);
        self.store.dispatch(Event::Init(flat));
        self.render();
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.store.set_config(config);
        self.render();
    }

    /// New canvas size; the projection is assumed to have been updated.
    pub fn resize(&mut self, width: f64, height: f64) {
        let config = self.config().with_viewport(width, height);
        self.store.set_config(config);
        self.reproject();
    }

    pub fn set_theme(&mut self, theme: RenderTheme) {
        self.theme = theme;
        self.render();
    }

    /// Suspend drawing (hidden canvas). Resuming redraws immediately.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if !paused {
            self.render();
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, at: Point, now: f64) {
        self.track_cursor(at);
        if let Some(action) = self.gesture.pointer_down(at, now, self.store.state()) {
            self.apply(action);
        }
    }

    pub fn pointer_move(&mut self, at: Point) {
        self.raw_cursor = Some(at);
        self.dispatch(Event::UpdateMousePosition(at));
        if let Some(action) = self.gesture.pointer_move() {
            self.apply(action);
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(action) = self.gesture.pointer_up(self.store.state()) {
            self.apply(action);
        }
    }

    /// A completed click. Only add-shape mode listens for clicks.
    pub fn click(&mut self, at: Point) {
        if self.gesture.mode() != Mode::AddShape {
            return;
        }
        self.track_cursor(at);
        if let Some(action) = self.gesture.click() {
            self.apply(action);
        }
    }

    /// Returns whether the key was bound.
    pub fn key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return false;
        };
        match action {
            ShortcutAction::ToggleTopology => self.toggle_topology(),
            ShortcutAction::ToggleLineSnap => self.toggle_line_snap(),
            ShortcutAction::TogglePointSnap => self.toggle_point_snap(),
            ShortcutAction::Finish => return self.finish(),
        }
        true
    }

    /// Fire the press-and-hold deadline if it has passed.
    pub fn tick(&mut self, now: f64) -> bool {
        match self.gesture.tick(now) {
            Some(action) => {
                self.apply(action);
                true
            }
            None => false,
        }
    }

    /// One hover-fade animation frame. Returns whether the host should
    /// request another.
    pub fn advance_hover(&mut self) -> bool {
        if self.paused || !self.frame.animating {
            return false;
        }
        self.dispatch(Event::IncreaseHoverTransition);
        self.frame.animating
    }

    // ─── Settings ────────────────────────────────────────────────────────

    pub fn settings(&self) -> Settings {
        self.state().settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.dispatch(Event::UpdateSettings(settings));
    }

    pub fn toggle_point_snap(&mut self) {
        let s = self.settings();
        self.set_settings(s.with_point_snap(!s.snap.points));
    }

    pub fn toggle_line_snap(&mut self) {
        let s = self.settings();
        self.set_settings(s.with_line_snap(!s.snap.lines));
    }

    pub fn toggle_topology(&mut self) {
        let s = self.settings();
        self.set_settings(s.with_topology(!s.topology));
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Start placing a new shape; each following click adds a vertex.
    pub fn begin_add_shape(&mut self) {
        self.finish();
        self.gesture.begin_add_shape();
        log::debug!("add-shape gesture started");
    }

    /// End the current edit or add-shape gesture. Returns whether one was
    /// active.
    pub fn finish(&mut self) -> bool {
        match self.gesture.finish() {
            Some(action) => {
                self.apply(action);
                true
            }
            None => false,
        }
    }

    // ─── Change notification ─────────────────────────────────────────────

    pub fn on_change(&mut self, listener: impl FnMut(&[Geometry<LngLat>]) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether `id` was registered.
    pub fn remove_change_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    pub fn inspect(&self) -> Inspection {
        let state = self.state();
        Inspection {
            geometries: state.data.len(),
            coordinates: state.coordinates.len(),
            lines: state.lines.len(),
            editing: state.editing,
            hover_index: state.hover_index,
            hover_transition: state.hover_transition,
            dragging: state.dragging.len(),
            snap: state.snap,
            mouse_position: [state.mouse_position.x, state.mouse_position.y],
            settings: state.settings,
            mode: self.gesture.mode(),
            armed: self.armed_listeners(),
            change_listeners: self.listeners.len(),
            markers: self.frame.markers.len(),
        }
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn dispatch(&mut self, event: Event) {
        let prev = self.store.dispatch(event);
        self.render();
        if !Rc::ptr_eq(&prev.data, &self.store.state().data) {
            self.notify();
        }
    }

    fn apply(&mut self, action: GestureAction) {
        match action {
            GestureAction::Dispatch(event) => self.dispatch(event),
            GestureAction::CommitDrag => self.commit_drag(),
            GestureAction::BeginShape => self.begin_shape(),
            GestureAction::AddVertex => self.add_vertex(),
            GestureAction::InsertVertex { segment, at } => self.insert_on_edge(segment, at),
        }
    }

    /// Bring snapping up to date for a press or click that arrived without
    /// a preceding move (touch input).
    fn track_cursor(&mut self, at: Point) {
        if self.raw_cursor != Some(at) {
            self.raw_cursor = Some(at);
            self.dispatch(Event::UpdateMousePosition(at));
        }
    }

    fn render(&mut self) {
        if self.paused {
            return;
        }
        let state = Rc::clone(self.store.state());
        let view = RenderView {
            data: &state.data,
            indexes: &state.indexes,
            config: self.store.config(),
            editing: state.editing,
            hover: state.hover_index,
            hover_transition: state.hover_transition,
            dragging: &state.dragging,
            mouse_position: state.mouse_position,
            line: state.line,
            topology: state.settings.topology,
            projection: &self.projection,
        };
        self.frame = redraw(&mut self.surface, &view, &self.theme);
        self.rendered = Some(state);
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let data = to_geographic(&self.store.state().data, &self.projection);
        for (_, listener) in &mut self.listeners {
            listener(&data);
        }
    }

    /// Commit the drag: the last frame's staged geometry when it was drawn
    /// from the current snapshot, otherwise a direct substitution.
    fn commit_drag(&mut self) {
        let state = Rc::clone(self.store.state());
        if !state.is_dragging() {
            return;
        }
        let staged = match &self.rendered {
            Some(drawn) if Rc::ptr_eq(drawn, &state) => self.frame.next_data.clone(),
            _ => substitute_drag(&state),
        };
        let projection = &self.projection;
        let flat = project_all(&staged, |v: &Vertex| projection.resolve(v));
        log::debug!(
            "committing drag of {} vertices to {:?}",
            state.dragging.len(),
            state.mouse_position
        );
        self.dispatch(Event::UpdatePositions(flat));
    }

    fn begin_shape(&mut self) {
        let at = self.state().mouse_position;
        let vertex = self.projection.vertex_at(at);
        let shape = Geometry::feature(Geometry::point(vertex), json!({ "editing": true }));
        self.dispatch(Event::Edit(shape));
    }

    fn add_vertex(&mut self) {
        let state = Rc::clone(self.store.state());
        let Some(index) = state.editing else {
            log::warn!("add-shape click with no shape under construction");
            return;
        };
        let vertex = self.projection.vertex_at(state.mouse_position);
        let mut data = state.data.as_ref().clone();
        if let Some(shape) = data.get_mut(index) {
            let next = next_geometry(shape, vertex);
            *shape = next;
        }
        self.dispatch(Event::Update(data));
    }

    /// Insert the tapped edge point into the edited geometry, or into every
    /// geometry sharing that edge in topology mode.
    fn insert_on_edge(&mut self, segment: Segment, at: Point) {
        let state = Rc::clone(self.store.state());
        let vertex = self.projection.vertex_at(at);
        let data: Vec<Geometry<Vertex>> = state
            .data
            .iter()
            .enumerate()
            .map(|(i, g)| {
                if state.settings.topology || state.editing == Some(i) {
                    insert_vertex(g, segment, &vertex)
                } else {
                    g.clone()
                }
            })
            .collect();
        if data == *state.data {
            log::debug!("edge tap matched no edge of the edited geometry");
            return;
        }
        self.dispatch(Event::UpdatePositions(flatten(&data)));
    }
}

/// Drag geometry computed straight from the snapshot: every copy of the
/// dragged positions moves to the cursor, across the whole collection in
/// topology mode and within the edited geometry otherwise.
fn substitute_drag(state: &EditorState) -> Vec<Geometry<Vertex>> {
    let cursor = Vertex::staged(state.mouse_position);
    state
        .data
        .iter()
        .enumerate()
        .map(|(i, g)| {
            if state.settings.topology || state.editing == Some(i) {
                replace_vertex(g, &state.dragging, &cursor)
            } else {
                g.clone()
            }
        })
        .collect()
}
