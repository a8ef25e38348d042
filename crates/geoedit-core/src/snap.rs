//! Snap resolution: should the cursor be overridden by an existing vertex
//! or by the nearest point on an existing edge?
//!
//! Priority is fixed and mutually exclusive: vertex snap, then edge snap,
//! then no snap.

use crate::config::{EditorConfig, Settings};
use crate::index::PointIndex;
use crate::model::Segment;
use kurbo::Point;
use serde::Serialize;
use smallvec::SmallVec;

/// Vertices near the cursor, nearest first.
pub type NearPoints = SmallVec<[Point; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    #[default]
    None,
    Point,
    Line,
}

/// Result of resolving one cursor position.
#[derive(Debug, Clone, PartialEq)]
pub struct Snap {
    pub mode: SnapMode,
    /// Effective cursor: the raw cursor, or the snap target.
    pub position: Point,
    /// Vertices within the point radius (empty while edge-snapped).
    pub near: NearPoints,
    /// The edge snapped to, if any.
    pub line: Option<Segment>,
}

/// Closest point on the closest edge within `max_distance` of `p`.
/// Ties keep the earlier edge.
pub fn nearest_on_lines(p: Point, lines: &[Segment], max_distance: f64) -> Option<(Point, Segment)> {
    let mut best: Option<(Point, f64, Segment)> = None;
    for seg in lines {
        let (q, d) = seg.closest_point(p);
        if d <= max_distance && best.is_none_or(|(_, bd, _)| d < bd) {
            best = Some((q, d, *seg));
        }
    }
    best.map(|(q, _, seg)| (q, seg))
}

/// Resolve the effective cursor position for `cursor`.
///
/// 1. Point snap on and a vertex within `point_snap_radius`: snap to the
///    nearest vertex.
/// 2. Else line snap on and an edge within `line_snap_distance`: snap to the
///    closest point on that edge.
/// 3. Else the raw cursor. `near` still lists vertices within the point
///    radius so the caller can offer drag affordances with snapping off.
pub fn resolve(
    cursor: Point,
    settings: &Settings,
    config: &EditorConfig,
    points: &PointIndex,
    lines: &[Segment],
) -> Snap {
    let hits: NearPoints = points
        .within(cursor, config.point_snap_radius)
        .iter()
        .filter_map(|&id| points.point(id))
        .collect();

    if settings.snap.points
        && let Some(&nearest) = hits.first()
    {
        return Snap {
            mode: SnapMode::Point,
            position: nearest,
            near: hits,
            line: None,
        };
    }

    if settings.snap.lines
        && let Some((position, seg)) = nearest_on_lines(cursor, lines, config.line_snap_distance)
    {
        return Snap {
            mode: SnapMode::Line,
            position,
            near: NearPoints::new(),
            line: Some(seg),
        };
    }

    Snap {
        mode: SnapMode::None,
        position: cursor,
        near: hits,
        line: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn square_edges() -> Vec<Segment> {
        let p = [(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)];
        p.windows(2)
            .map(|w| Segment::new(Point::new(w[0].0, w[0].1), Point::new(w[1].0, w[1].1)))
            .collect()
    }

    fn square_points() -> PointIndex {
        PointIndex::new(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
        ])
    }

    #[test]
    fn closest_edge_wins_over_first_edge() {
        // (0.2, 5) is 0.2 from the left edge and exactly 5 from the bottom edge.
        let hit = nearest_on_lines(Point::new(0.2, 5.0), &square_edges(), 5.0);
        assert_eq!(hit.map(|(p, _)| p), Some(Point::new(0.0, 5.0)));
    }

    #[test]
    fn cursor_on_edge_still_snaps() {
        let hit = nearest_on_lines(Point::new(0.0, 5.0), &square_edges(), 5.0);
        assert_eq!(hit.map(|(_, s)| s), Some(square_edges()[0]));
    }

    #[test]
    fn point_snap_beats_line_snap() {
        let s = resolve(
            Point::new(1.0, 4.0),
            &Settings::default(),
            &EditorConfig::default(),
            &square_points(),
            &square_edges(),
        );
        assert_eq!(s.mode, SnapMode::Point);
        assert_eq!(s.position, Point::new(0.0, 0.0));
        assert_eq!(s.line, None);
    }

    #[test]
    fn no_snap_still_reports_near_vertices() {
        let settings = Settings::default().with_point_snap(false).with_line_snap(false);
        let s = resolve(
            Point::new(3.0, 3.0),
            &settings,
            &EditorConfig::default(),
            &square_points(),
            &square_edges(),
        );
        assert_eq!(s.mode, SnapMode::None);
        assert_eq!(s.position, Point::new(3.0, 3.0));
        assert_eq!(s.near.first(), Some(&Point::new(0.0, 0.0)));
    }

    #[test]
    fn empty_indexes_resolve_to_raw_cursor() {
        let s = resolve(
            Point::new(3.0, 3.0),
            &Settings::default(),
            &EditorConfig::default(),
            &PointIndex::default(),
            &[],
        );
        assert_eq!(s.mode, SnapMode::None);
        assert!(s.near.is_empty());
    }
}
