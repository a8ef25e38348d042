//! The redraw pass.
//!
//! Runs once per state change: clear, cull areas against the viewport, walk
//! every surviving geometry, then draw the edit overlays on top. The pass
//! never touches the state it reads. Vertex substitutions made for drawing
//! (a dragged vertex ghosted at the cursor, the cursor joined into a snapped
//! edge) land in [`Frame::next_data`], which the caller commits on
//! pointer-up.

use crate::surface::DrawSurface;
use crate::theme::RenderTheme;
use geoedit_core::{Coord, EditorConfig, Geometry, Indexes, Projection, Ring, Segment, Vertex};
use kurbo::Point;
use std::collections::HashSet;
use std::f64::consts::TAU;

/// Pointer affordance for the host to apply to the canvas element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    /// Editing: the pass draws its own cursor indicator.
    Hidden,
    /// Hovering a selectable area.
    Pointer,
    #[default]
    Default,
}

impl CursorStyle {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Hidden => "none",
            Self::Pointer => "pointer",
            Self::Default => "inherit",
        }
    }
}

/// Read-only inputs of one redraw.
pub struct RenderView<'a> {
    pub data: &'a [Geometry<Vertex>],
    pub indexes: &'a Indexes,
    pub config: &'a EditorConfig,
    pub editing: Option<usize>,
    pub hover: Option<usize>,
    /// Hover fade counter, `0..=config.hover_transition_max`.
    pub hover_transition: f64,
    /// Original positions of the vertices being dragged.
    pub dragging: &'a [Point],
    /// Effective (snapped) cursor.
    pub mouse_position: Point,
    /// Edge the cursor is snapped to.
    pub line: Option<Segment>,
    pub topology: bool,
    /// Used only for the cursor label.
    pub projection: &'a dyn Projection,
}

/// What one redraw produced besides pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// `data` with drag substitutions applied; staged vertices have no
    /// geographic half yet.
    pub next_data: Vec<Geometry<Vertex>>,
    /// Editable-vertex handles of the edited geometry, in draw order.
    pub markers: Vec<Point>,
    /// Dashed guides around every ghosted vertex.
    pub placeholder_lines: Vec<Segment>,
    pub cursor: CursorStyle,
    /// Whether the hover fade still needs animation frames.
    pub animating: bool,
    /// Top-level geometries walked (not culled).
    pub drawn: usize,
}

/// Redraw everything and report the staged geometry.
pub fn redraw<S: DrawSurface + ?Sized>(surface: &mut S, view: &RenderView<'_>, theme: &RenderTheme) -> Frame {
    let len = view.data.len();
    let editing = checked_index(view.editing, len, "editing");
    let hover = checked_index(view.hover, len, "hover");

    surface.clear_rect(view.config.viewport);

    let visible = view.indexes.geometries_in(view.config.viewport);
    let mut pass = Pass {
        surface: &mut *surface,
        view,
        theme,
        editing,
        hover,
        markers: Vec::new(),
        placeholders: Vec::new(),
        index: 0,
        dragged_drawn: false,
    };

    let mut drawn = 0;
    let mut next_data = Vec::with_capacity(len);
    for (i, geom) in view.data.iter().enumerate() {
        if visible.binary_search(&i).is_ok() || !geom.is_poly_like() {
            drawn += 1;
            next_data.push(pass.top_level(i, geom));
        } else {
            next_data.push(geom.clone());
        }
    }
    let Pass {
        markers,
        placeholders,
        ..
    } = pass;

    if editing.is_some() {
        if let Some(line) = view.line {
            draw_snapped_line(surface, line, theme);
        }
        draw_placeholders(surface, &placeholders, theme);
        draw_markers(surface, &markers, view.config.marker_radius, theme);
        draw_cursor(surface, view, theme);
    }

    log::trace!(
        "redraw: {drawn}/{len} geometries, {} markers, {} guides",
        markers.len(),
        placeholders.len()
    );

    let cursor = if editing.is_some() {
        CursorStyle::Hidden
    } else if hover.is_some() {
        CursorStyle::Pointer
    } else {
        CursorStyle::Default
    };

    Frame {
        next_data,
        markers,
        placeholder_lines: placeholders,
        cursor,
        animating: view.hover_transition < view.config.hover_transition_max,
        drawn,
    }
}

/// Out-of-range selections are treated as no selection.
fn checked_index(index: Option<usize>, len: usize, what: &str) -> Option<usize> {
    match index {
        Some(i) if i >= len => {
            log::warn!("{what} index {i} out of range for {len} geometries, ignoring");
            None
        }
        other => other,
    }
}

#[derive(Debug, Clone, Copy)]
enum Pen {
    Move,
    Line,
    /// Standalone point.
    Dot,
}

/// Walk state. `index` and `dragged_drawn` are reset per top-level geometry.
struct Pass<'p, 'v, S: ?Sized> {
    surface: &'p mut S,
    view: &'p RenderView<'v>,
    theme: &'p RenderTheme,
    editing: Option<usize>,
    hover: Option<usize>,
    markers: Vec<Point>,
    placeholders: Vec<Segment>,
    index: usize,
    dragged_drawn: bool,
}

impl<S: DrawSurface + ?Sized> Pass<'_, '_, S> {
    fn top_level(&mut self, index: usize, geom: &Geometry<Vertex>) -> Geometry<Vertex> {
        self.index = index;
        self.dragged_drawn = false;
        self.geometry(geom)
    }

    fn is_edited(&self) -> bool {
        self.editing == Some(self.index)
    }

    fn geometry(&mut self, geom: &Geometry<Vertex>) -> Geometry<Vertex> {
        match geom {
            Geometry::Point { coordinates } => Geometry::Point {
                coordinates: self.vertex(coordinates, None, None, Pen::Dot),
            },
            Geometry::MultiPoint { coordinates } => Geometry::MultiPoint {
                coordinates: coordinates
                    .iter()
                    .map(|v| self.vertex(v, None, None, Pen::Dot))
                    .collect(),
            },
            Geometry::LineString { coordinates } => {
                self.surface.begin_path();
                let coordinates = self.line(coordinates);
                self.stroke_outline();
                Geometry::LineString { coordinates }
            }
            Geometry::MultiLineString { coordinates } => {
                self.surface.begin_path();
                let coordinates = coordinates.iter().map(|l| self.line(l)).collect();
                self.stroke_outline();
                Geometry::MultiLineString { coordinates }
            }
            Geometry::Polygon { coordinates } => Geometry::Polygon {
                coordinates: self.polygon(coordinates),
            },
            Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates.iter().map(|p| self.polygon(p)).collect(),
            },
            Geometry::GeometryCollection { geometries } => Geometry::GeometryCollection {
                geometries: geometries.iter().map(|g| self.geometry(g)).collect(),
            },
            Geometry::Feature {
                geometry,
                properties,
            } => Geometry::Feature {
                geometry: geometry.as_deref().map(|g| Box::new(self.geometry(g))),
                properties: properties.clone(),
            },
            Geometry::FeatureCollection { features } => Geometry::FeatureCollection {
                features: features.iter().map(|g| self.geometry(g)).collect(),
            },
        }
    }

    fn polygon(&mut self, rings: &[Ring<Vertex>]) -> Vec<Ring<Vertex>> {
        self.surface.begin_path();
        let out = rings.iter().map(|r| self.ring(r)).collect();

        let alpha = if self.hover == Some(self.index) {
            let max = self.view.config.hover_transition_max;
            let progress = if max > 0.0 { self.view.hover_transition / max } else { 1.0 };
            self.theme.hover_alpha(progress)
        } else {
            self.theme.fill_alpha
        };
        self.surface.set_fill_style(&self.theme.fill_style(alpha));
        self.surface.fill();
        self.stroke_outline();
        out
    }

    /// One ring as a closed subpath. The closing coordinate is not walked;
    /// a closed ring is re-closed on its (possibly substituted) first vertex.
    fn ring(&mut self, ring: &[Vertex]) -> Ring<Vertex> {
        let closed = match (ring.first(), ring.last()) {
            (Some(first), Some(last)) => ring.len() > 1 && first.same_position(last.screen),
            _ => false,
        };
        let body = if closed { &ring[..ring.len() - 1] } else { ring };
        if body.len() < 3 {
            log::debug!(
                "geometry {}: ring with {} coordinates is degenerate, not drawn",
                self.index,
                ring.len()
            );
            return ring.to_vec();
        }

        let n = body.len();
        let mut out = Vec::with_capacity(ring.len() + 1);
        for (k, v) in body.iter().enumerate() {
            let prev = body[(k + n - 1) % n].screen;
            let next = body[(k + 1) % n].screen;
            self.join(prev, v.screen, &mut out);
            let pen = if k == 0 { Pen::Move } else { Pen::Line };
            out.push(self.vertex(v, Some(prev), Some(next), pen));
        }
        self.surface.close_path();

        if closed && let Some(&first) = out.first() {
            out.push(first);
        }
        out
    }

    /// An open path (LineString member).
    fn line(&mut self, line: &[Vertex]) -> Vec<Vertex> {
        if line.len() < 2 {
            log::debug!(
                "geometry {}: line with {} coordinates is degenerate, not drawn",
                self.index,
                line.len()
            );
            return line.to_vec();
        }

        let mut out = Vec::with_capacity(line.len() + 1);
        for (k, v) in line.iter().enumerate() {
            let prev = k.checked_sub(1).map(|i| line[i].screen);
            let next = line.get(k + 1).map(|n| n.screen);
            if let Some(p) = prev {
                self.join(p, v.screen, &mut out);
            }
            let pen = if k == 0 { Pen::Move } else { Pen::Line };
            out.push(self.vertex(v, prev, next, pen));
        }
        out
    }

    /// In topology mode, a drag snapped onto the edge `a`-`b` stages the
    /// cursor as a new vertex of that edge. Edges incident to the dragged
    /// vertex are skipped: the ghosted endpoint already sits at the cursor.
    fn join(&self, a: Point, b: Point, out: &mut Vec<Vertex>) {
        let view = self.view;
        let incident = view.dragging.iter().any(|d| *d == a || *d == b);
        if view.topology
            && !view.dragging.is_empty()
            && !incident
            && view.line.is_some_and(|l| l.matches(a, b) || l.matches(b, a))
        {
            out.push(Vertex::staged(view.mouse_position));
        }
    }

    /// Draw one vertex, ghosting it at the cursor when it is being dragged.
    ///
    /// With topology on every coincident copy follows the cursor; otherwise
    /// only the first copy inside the edited geometry does.
    fn vertex(&mut self, v: &Vertex, prev: Option<Point>, next: Option<Point>, pen: Pen) -> Vertex {
        let view = self.view;
        let edited = self.is_edited();
        let dragged = view.dragging.iter().any(|d| v.same_position(*d));

        if dragged && (view.topology || (!self.dragged_drawn && edited)) {
            self.dragged_drawn = true;
            let m = view.mouse_position;
            self.pen(pen, m);
            if edited {
                self.markers.push(m);
            }
            self.placeholders.extend(prev.map(|p| Segment::new(p, m)));
            self.placeholders.extend(next.map(|n| Segment::new(m, n)));
            return Vertex::staged(m);
        }

        if edited {
            self.markers.push(v.screen);
        }
        self.pen(pen, v.screen);
        *v
    }

    fn pen(&mut self, pen: Pen, p: Point) {
        match pen {
            Pen::Move => self.surface.move_to(p),
            Pen::Line => self.surface.line_to(p),
            Pen::Dot => {
                self.surface.begin_path();
                self.surface.arc(p, self.theme.point_radius, 0.0, TAU);
                self.surface.set_fill_style(self.theme.point);
                self.surface.fill();
            }
        }
    }

    fn stroke_outline(&mut self) {
        self.surface.set_stroke_style(self.theme.outline);
        self.surface.set_line_width(self.theme.outline_width);
        self.surface.stroke();
    }
}

// ─── Overlays ────────────────────────────────────────────────────────────

fn draw_snapped_line<S: DrawSurface + ?Sized>(surface: &mut S, line: Segment, theme: &RenderTheme) {
    surface.begin_path();
    surface.move_to(line.a);
    surface.line_to(line.b);
    surface.set_stroke_style(theme.snapped_line);
    surface.set_line_width(theme.snapped_line_width);
    surface.stroke();
    surface.set_line_width(theme.outline_width);
}

fn draw_placeholders<S: DrawSurface + ?Sized>(surface: &mut S, lines: &[Segment], theme: &RenderTheme) {
    if lines.is_empty() {
        return;
    }
    surface.set_stroke_style(theme.placeholder);
    surface.set_line_dash(&theme.placeholder_dash);
    for line in lines {
        surface.begin_path();
        surface.move_to(line.a);
        surface.line_to(line.b);
        surface.stroke();
    }
    surface.set_line_dash(&[]);
}

/// Vertex handles. A handle at a position already drawn marks a shared
/// vertex and gets the duplicate color.
fn draw_markers<S: DrawSurface + ?Sized>(surface: &mut S, markers: &[Point], radius: f64, theme: &RenderTheme) {
    let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(markers.len());
    surface.set_stroke_style(theme.marker_stroke);
    for m in markers {
        let first = seen.insert((m.x.to_bits(), m.y.to_bits()));
        surface.begin_path();
        surface.arc(*m, radius, 0.0, TAU);
        surface.set_fill_style(if first { theme.marker_fill } else { theme.marker_duplicate });
        surface.fill();
        surface.stroke();
    }
}

/// Dot, ring, and the live geographic position rounded to 6 decimals.
fn draw_cursor<S: DrawSurface + ?Sized>(surface: &mut S, view: &RenderView<'_>, theme: &RenderTheme) {
    let m = view.mouse_position;
    let geo = view.projection.to_geo(m).rounded(6);

    surface.begin_path();
    surface.arc(m, theme.cursor_dot_radius, 0.0, TAU);
    surface.set_fill_style(theme.cursor);
    surface.fill();

    surface.begin_path();
    surface.arc(m, theme.cursor_ring_radius, 0.0, TAU);
    surface.set_stroke_style(theme.cursor);
    surface.stroke();

    let (dx, dy) = theme.label_offset;
    surface.set_font(theme.label_font);
    surface.fill_text(&format!("{}, {}", geo.lng, geo.lat), Point::new(m.x + dx, m.y + dy));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};
    use geoedit_core::{LinearProjection, flatten};
    use pretty_assertions::assert_eq;

    fn v(x: f64, y: f64) -> Vertex {
        Vertex::staged(Point::new(x, y))
    }

    fn square() -> Geometry<Vertex> {
        Geometry::polygon(vec![vec![
            v(0.0, 0.0),
            v(0.0, 10.0),
            v(10.0, 10.0),
            v(10.0, 0.0),
            v(0.0, 0.0),
        ]])
    }

    fn frame_for(data: &[Geometry<Vertex>], editing: Option<usize>, surface: &mut RecordingSurface) -> Frame {
        let flat = flatten(data);
        let indexes = Indexes::build(&flat.coordinates, &flat.bounds);
        let config = EditorConfig::default();
        let projection = LinearProjection::identity();
        let view = RenderView {
            data,
            indexes: &indexes,
            config: &config,
            editing,
            hover: None,
            hover_transition: config.hover_transition_max,
            dragging: &[],
            mouse_position: Point::new(3.0, 4.0),
            line: None,
            topology: true,
            projection: &projection,
        };
        redraw(surface, &view, &RenderTheme::light())
    }

    #[test]
    fn degenerate_ring_passes_through_undrawn() {
        let data = vec![Geometry::polygon(vec![vec![v(0.0, 0.0), v(5.0, 5.0), v(0.0, 0.0)]])];
        let mut surface = RecordingSurface::new();
        let frame = frame_for(&data, None, &mut surface);
        assert_eq!(frame.next_data, data);
        assert_eq!(surface.count(|op| matches!(op, DrawOp::LineTo(_))), 0);
    }

    #[test]
    fn out_of_range_editing_is_no_selection() {
        let data = vec![square()];
        let mut surface = RecordingSurface::new();
        let frame = frame_for(&data, Some(7), &mut surface);
        assert_eq!(frame.cursor, CursorStyle::Default);
        assert!(frame.markers.is_empty());
        assert!(surface.texts().is_empty());
    }

    #[test]
    fn closed_ring_walks_each_vertex_once() {
        let data = vec![square()];
        let mut surface = RecordingSurface::new();
        let frame = frame_for(&data, Some(0), &mut surface);
        assert_eq!(frame.markers.len(), 4);
        assert_eq!(frame.next_data, data);
        assert_eq!(surface.count(|op| matches!(op, DrawOp::ClosePath)), 1);
    }
}
