//! Geometry tree walks.
//!
//! `project` maps every coordinate through a transform while preserving
//! structure, optionally flattening the result into a vertex list and an
//! edge list in the same pass. Both spatial indexes are rebuilt from that
//! flat output, so one walk serves projection and indexing.

use crate::model::{Coord, Geometry, Segment};
use kurbo::{Point, Rect};

/// Flat side product of a projection walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collector {
    /// Every visited coordinate, in visitation order.
    pub coordinates: Vec<Point>,
    /// `[previous, current]` for every non-initial coordinate of a line or ring.
    pub lines: Vec<Segment>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_point(&mut self, p: Point) {
        self.coordinates.push(p);
    }

    fn push_path_point(&mut self, p: Point, index: usize) {
        if index > 0
            && let Some(&prev) = self.coordinates.last()
        {
            self.lines.push(Segment::new(prev, p));
        }
        self.coordinates.push(p);
    }
}

struct Projector<'c, F> {
    transform: F,
    collector: Option<&'c mut Collector>,
}

impl<F> Projector<'_, F> {
    fn geometry<A, B>(&mut self, geom: &Geometry<A>) -> Geometry<B>
    where
        F: FnMut(&A) -> B,
        B: Coord,
    {
        match geom {
            Geometry::Point { coordinates } => Geometry::Point {
                coordinates: self.point(coordinates),
            },
            Geometry::MultiPoint { coordinates } => Geometry::MultiPoint {
                coordinates: coordinates.iter().map(|c| self.point(c)).collect(),
            },
            Geometry::LineString { coordinates } => Geometry::LineString {
                coordinates: self.path(coordinates),
            },
            Geometry::MultiLineString { coordinates } => Geometry::MultiLineString {
                coordinates: coordinates.iter().map(|l| self.path(l)).collect(),
            },
            Geometry::Polygon { coordinates } => Geometry::Polygon {
                coordinates: coordinates.iter().map(|r| self.path(r)).collect(),
            },
            Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates
                    .iter()
                    .map(|poly| poly.iter().map(|r| self.path(r)).collect())
                    .collect(),
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

    fn point<A, B>(&mut self, c: &A) -> B
    where
        F: FnMut(&A) -> B,
        B: Coord,
    {
        let out = (self.transform)(c);
        if let Some(col) = self.collector.as_deref_mut() {
            col.push_point(out.position());
        }
        out
    }

    fn path<A, B>(&mut self, coords: &[A]) -> Vec<B>
    where
        F: FnMut(&A) -> B,
        B: Coord,
    {
        let mut out = Vec::with_capacity(coords.len());
        for (i, c) in coords.iter().enumerate() {
            let next = (self.transform)(c);
            if let Some(col) = self.collector.as_deref_mut() {
                col.push_path_point(next.position(), i);
            }
            out.push(next);
        }
        out
    }
}

/// Apply `transform` to every coordinate of `geom`, returning a new tree
/// with identical structure and non-coordinate fields.
///
/// With a collector, every output coordinate is appended to
/// `collector.coordinates` and every consecutive pair within a line or ring
/// to `collector.lines`. Lines with fewer than two coordinates add no edges.
pub fn project<A, B, F>(geom: &Geometry<A>, transform: F, collector: Option<&mut Collector>) -> Geometry<B>
where
    F: FnMut(&A) -> B,
    B: Coord,
{
    Projector {
        transform,
        collector,
    }
    .geometry(geom)
}

/// Substitute every coordinate exactly equal to one of `targets` with
/// `replacement`. Matching is by position only, so coincident vertices in
/// different rings (or different geometries, when the caller walks the
/// whole collection) move together.
pub fn replace_vertex<C>(geom: &Geometry<C>, targets: &[Point], replacement: &C) -> Geometry<C>
where
    C: Coord + Clone,
{
    project(
        geom,
        |c: &C| {
            if targets.iter().any(|t| c.same_position(*t)) {
                replacement.clone()
            } else {
                c.clone()
            }
        },
        None,
    )
}

/// Insert `point` into every line or ring edge equal to `segment` (in
/// either direction). Points and multipoints are untouched.
pub fn insert_vertex<C>(geom: &Geometry<C>, segment: Segment, point: &C) -> Geometry<C>
where
    C: Coord + Clone,
{
    map_paths(geom, &mut |path: &[C]| {
        let mut out = Vec::with_capacity(path.len() + 1);
        for (i, c) in path.iter().enumerate() {
            if i > 0 {
                let (a, b) = (path[i - 1].position(), c.position());
                if segment.matches(a, b) || segment.matches(b, a) {
                    out.push(point.clone());
                }
            }
            out.push(c.clone());
        }
        out
    })
}

fn map_paths<C: Clone>(geom: &Geometry<C>, f: &mut impl FnMut(&[C]) -> Vec<C>) -> Geometry<C> {
    match geom {
        Geometry::Point { .. } | Geometry::MultiPoint { .. } => geom.clone(),
        Geometry::LineString { coordinates } => Geometry::LineString {
            coordinates: f(coordinates),
        },
        Geometry::MultiLineString { coordinates } => Geometry::MultiLineString {
            coordinates: coordinates.iter().map(|l| f(l)).collect(),
        },
        Geometry::Polygon { coordinates } => Geometry::Polygon {
            coordinates: coordinates.iter().map(|r| f(r)).collect(),
        },
        Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
            coordinates: coordinates
                .iter()
                .map(|poly| poly.iter().map(|r| f(r)).collect())
                .collect(),
        },
        Geometry::GeometryCollection { geometries } => Geometry::GeometryCollection {
            geometries: geometries.iter().map(|g| map_paths(g, f)).collect(),
        },
        Geometry::Feature {
            geometry,
            properties,
        } => Geometry::Feature {
            geometry: geometry.as_deref().map(|g| Box::new(map_paths(g, f))),
            properties: properties.clone(),
        },
        Geometry::FeatureCollection { features } => Geometry::FeatureCollection {
            features: features.iter().map(|g| map_paths(g, f)).collect(),
        },
    }
}

// ─── Whole-collection walks ──────────────────────────────────────────────

/// A projected collection plus everything needed to rebuild the indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened<C> {
    pub data: Vec<Geometry<C>>,
    pub coordinates: Vec<Point>,
    pub lines: Vec<Segment>,
    /// Bounding box per entry of `data`, `None` for empty geometries.
    pub bounds: Vec<Option<Rect>>,
}

impl<C> Flattened<C> {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            coordinates: Vec::new(),
            lines: Vec::new(),
            bounds: Vec::new(),
        }
    }
}

/// Project a whole collection in one walk, collecting the flat vertex and
/// edge lists and a bounding box per top-level geometry.
pub fn project_all<A, B, F>(geoms: &[Geometry<A>], transform: F) -> Flattened<B>
where
    F: FnMut(&A) -> B,
    B: Coord,
{
    let mut collector = Collector::new();
    let mut bounds = Vec::with_capacity(geoms.len());
    let mut projector = Projector {
        transform,
        collector: Some(&mut collector),
    };
    let mut data = Vec::with_capacity(geoms.len());
    let mut ranges = Vec::with_capacity(geoms.len());
    for g in geoms {
        let start = projector.collector.as_deref().map_or(0, |c| c.coordinates.len());
        data.push(projector.geometry(g));
        let end = projector.collector.as_deref().map_or(0, |c| c.coordinates.len());
        ranges.push(start..end);
    }
    drop(projector);

    for range in ranges {
        bounds.push(bounds_of(&collector.coordinates[range]));
    }

    Flattened {
        data,
        coordinates: collector.coordinates,
        lines: collector.lines,
        bounds,
    }
}

/// Re-flatten a collection without changing any coordinate.
pub fn flatten<C: Coord + Clone>(geoms: &[Geometry<C>]) -> Flattened<C> {
    project_all(geoms, C::clone)
}

fn bounds_of(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    Some(
        rest.iter()
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
    )
}
